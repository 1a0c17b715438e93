// Grave Walk - a first-person stroll through a graveyard of records.
// One headstone per record, revealed in batches; walk up to read the
// plaques, hover for a card, click for the full record.

mod data;
mod engine;
mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use bevy_ecs::prelude::*;
use clap::Parser;
use winit::{
    event::{ElementState, Event as WinitEvent, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorIcon, Window},
};

use engine::camera::FirstPersonCamera;
use engine::debug_overlay::{DebugOverlay, DebugStats, OverlayState};
use engine::input::InputState;
use engine::interaction::{
    HoverFrame, HoverTracker, PointerKind, PointerPort, Viewport, pick_headstone, pixel_ray,
};
use engine::records::RecordSet;
use engine::reveal::RevealScheduler;
use engine::systems::{FrameClock, build_world, frame_schedule, revealed_graves};
use engine::DetailLabel;
use render::Renderer;

/// Long stalls (window drag, breakpoint) advance the scene by at most this much.
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Parser, Debug)]
#[command(version, about = "Walk a procedurally laid out graveyard of records")]
struct Args {
    /// JSON array of records (`[{"id": 1, ...}]`). Demo data is used when omitted.
    #[arg(long)]
    records: Option<PathBuf>,

    /// Number of demo records to generate.
    #[arg(long, default_value_t = 200)]
    count: usize,

    /// Seed for demo record generation. R advances it.
    #[arg(long, default_value_t = 1)]
    data_seed: u64,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

// ============================================================================
// CURSOR PORT
// ============================================================================

/// Sets the OS cursor icon on the window.
struct WindowCursor<'a>(&'a Window);

impl PointerPort for WindowCursor<'_> {
    fn set_pointer(&mut self, kind: PointerKind) {
        let icon = match kind {
            PointerKind::Default => CursorIcon::Default,
            PointerKind::Pointer => CursorIcon::Pointer,
        };
        self.0.set_cursor(icon);
    }
}

// ============================================================================
// FRAME TIMING
// ============================================================================

/// Frame-time samples over the current one-second window.
struct FrameTimer {
    window_start: Instant,
    samples_ms: Vec<f32>,
    fps: u32,
    avg_ms: f32,
    min_ms: f32,
    max_ms: f32,
}

impl FrameTimer {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            samples_ms: Vec::new(),
            fps: 0,
            avg_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        }
    }

    fn record(&mut self, dt: f32, now: Instant) {
        self.samples_ms.push(dt * 1000.0);
        if (now - self.window_start).as_secs_f32() < 1.0 {
            return;
        }
        let n = self.samples_ms.len().max(1) as f32;
        self.fps = self.samples_ms.len() as u32;
        self.avg_ms = self.samples_ms.iter().sum::<f32>() / n;
        self.min_ms = self.samples_ms.iter().copied().fold(f32::INFINITY, f32::min);
        self.max_ms = self.samples_ms.iter().copied().fold(0.0, f32::max);
        self.samples_ms.clear();
        self.window_start = now;
    }
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

struct App {
    window: Arc<Window>,
    renderer: Renderer,
    overlay: DebugOverlay,
    overlay_state: OverlayState,
    hover: HoverTracker,

    // ECS World
    world: World,
    schedule: Schedule,

    args: Args,
    demo_seed: u64,
    last_update: Instant,
    timer: FrameTimer,
}

impl App {
    fn new(window: Arc<Window>, args: Args) -> anyhow::Result<Self> {
        let records = initial_records(&args)?;
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;
        let overlay = DebugOverlay::new(&window, renderer.device(), renderer.surface_format());

        let world = build_world(RecordSet::new(records));

        Ok(Self {
            window,
            renderer,
            overlay,
            overlay_state: OverlayState::default(),
            hover: HoverTracker::new(),
            world,
            schedule: frame_schedule(),
            demo_seed: args.data_seed,
            args,
            last_update: Instant::now(),
            timer: FrameTimer::new(),
        })
    }

    fn viewport(&self) -> Viewport {
        let size = self.renderer.size();
        Viewport::new(size.width, size.height)
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_update).as_secs_f32();
        self.last_update = now;
        self.timer.record(dt, now);

        self.world.resource_mut::<FrameClock>().advance(dt.min(MAX_FRAME_DT));
        self.schedule.run(&mut self.world);
        self.update_hover();
    }

    /// Pick the grave under the cursor and forward hover/click changes.
    fn update_hover(&mut self) {
        let viewport = self.viewport();
        let view_proj = self
            .world
            .resource::<FirstPersonCamera>()
            .view_projection(viewport.aspect());

        let cursor = if self.overlay.wants_pointer() {
            None
        } else {
            self.world.resource::<InputState>().cursor()
        };
        let hit = match cursor.and_then(|px| pixel_ray(px, view_proj, viewport)) {
            Some(ray) => pick_headstone(ray, revealed_graves(&mut self.world)),
            None => None,
        };
        let clicked = self.world.resource_mut::<InputState>().take_click();

        let records = self.world.resource::<RecordSet>();
        let frame = HoverFrame { records, view_proj, viewport };
        let mut cursor_port = WindowCursor(&self.window);
        self.hover.update(hit, &frame, &mut self.overlay_state, &mut cursor_port);
        if clicked {
            self.hover.click(records, &mut self.overlay_state);
        }
    }

    /// Replace the record list: re-read the file, or regenerate demo data with the next seed.
    fn reload_records(&mut self) {
        let records = match &self.args.records {
            Some(path) => match data::load_records(path) {
                Ok(records) => records,
                Err(err) => {
                    log::error!("keeping current records: {err:#}");
                    return;
                }
            },
            None => {
                self.demo_seed += 1;
                data::demo_records(self.args.count, self.demo_seed)
            }
        };

        self.hover
            .pointer_leave(&mut self.overlay_state, &mut WindowCursor(&self.window));
        self.overlay_state.selected = None;
        self.world.resource_mut::<RecordSet>().replace(records);
    }

    fn stats(&mut self) -> DebugStats {
        let labels_visible = self
            .world
            .query::<&DetailLabel>()
            .iter(&self.world)
            .filter(|label| label.visible)
            .count();
        let scheduler = self.world.resource::<RevealScheduler>();
        let camera = self.world.resource::<FirstPersonCamera>();
        let position = camera.position();
        let size = self.renderer.size();

        DebugStats {
            fps: self.timer.fps,
            frame_time_avg_ms: self.timer.avg_ms,
            frame_time_min_ms: self.timer.min_ms,
            frame_time_max_ms: self.timer.max_ms,
            graves_revealed: scheduler.visible_count(),
            graves_total: scheduler.total(),
            reveal_phase: scheduler.phase(),
            labels_visible,
            draw_calls: self.renderer.draw_calls(),
            resolution: (size.width, size.height),
            camera_position: (position.x, position.y, position.z),
            camera_yaw_deg: camera.yaw().to_degrees(),
            camera_pitch_deg: camera.pitch().to_degrees(),
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let camera = self.world.resource::<FirstPersonCamera>();
        let view_proj = camera.view_projection(self.viewport().aspect());
        let eye = camera.position();
        self.renderer.prepare(&mut self.world, view_proj, eye);

        let stats = self.stats();
        self.renderer
            .render(&self.window, &mut self.overlay, &self.overlay_state, &stats)
    }
}

fn initial_records(args: &Args) -> anyhow::Result<Vec<engine::records::Record>> {
    match &args.records {
        Some(path) => data::load_records(path),
        None => {
            log::info!("no --records given, generating {} demo records", args.count);
            Ok(data::demo_records(args.count, args.data_seed))
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let event_loop = EventLoop::new().context("creating event loop")?;

    let window_attributes = Window::default_attributes()
        .with_title("Grave Walk")
        .with_inner_size(winit::dpi::LogicalSize::new(args.width, args.height));

    let window = Arc::new(
        event_loop
            .create_window(window_attributes)
            .context("creating window")?,
    );

    let mut app = App::new(window.clone(), args)?;

    event_loop.run(move |event, control_flow| {
        match event {
            WinitEvent::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                let _ = app.overlay.handle_window_event(&window, event);
                let over_ui = app.overlay.wants_pointer();
                {
                    let mut input = app.world.resource_mut::<InputState>();
                    input.set_pointer_over_ui(over_ui);
                    input.process_event(event);
                }

                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                ..
                            },
                        ..
                    } => control_flow.exit(),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(key),
                                repeat: false,
                                ..
                            },
                        ..
                    } => match key {
                        KeyCode::F3 => app.overlay.toggle_stats(),
                        KeyCode::KeyR => app.reload_records(),
                        _ => {}
                    },
                    WindowEvent::Resized(physical_size) => {
                        app.renderer.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        app.update();
                        match app.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                log::warn!("surface lost, reconfiguring");
                                app.renderer.resize(app.renderer.size());
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("GPU out of memory, exiting");
                                control_flow.exit();
                            }
                            Err(e) => log::warn!("{e:?}"),
                        }
                    }
                    _ => {}
                }
            }
            WinitEvent::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_timer_summarises_each_second() {
        let mut timer = FrameTimer::new();
        let start = timer.window_start;
        timer.record(0.010, start + std::time::Duration::from_millis(300));
        timer.record(0.030, start + std::time::Duration::from_millis(600));
        assert_eq!(timer.fps, 0);

        timer.record(0.020, start + std::time::Duration::from_millis(1000));
        assert_eq!(timer.fps, 3);
        assert!((timer.avg_ms - 20.0).abs() < 1e-3);
        assert!((timer.min_ms - 10.0).abs() < 1e-3);
        assert!((timer.max_ms - 30.0).abs() < 1e-3);
        assert!(timer.samples_ms.is_empty());
    }

    #[test]
    fn args_default_to_demo_data() {
        let args = Args::parse_from(["grave_walk"]);
        assert!(args.records.is_none());
        assert_eq!(args.count, 200);
        assert_eq!((args.width, args.height), (1280, 720));
    }
}
