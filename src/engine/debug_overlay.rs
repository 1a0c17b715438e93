// egui overlay: hover card, selected-record panel, and the F3 stats panel.
// Doubles as the InteractionSink that receives hover/click reports.

use egui::epaint::Shadow;
use glam::Vec2;
use super::interaction::InteractionSink;
use super::records::Record;
use super::reveal::RevealPhase;

pub struct DebugStats {
    pub fps: u32,
    pub frame_time_avg_ms: f32,
    pub frame_time_min_ms: f32,
    pub frame_time_max_ms: f32,
    pub graves_revealed: usize,
    pub graves_total: usize,
    pub reveal_phase: RevealPhase,
    pub labels_visible: usize,
    pub draw_calls: u32,
    pub resolution: (u32, u32),
    pub camera_position: (f32, f32, f32),
    pub camera_yaw_deg: f32,
    pub camera_pitch_deg: f32,
}

/// Hover card contents, anchored in physical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverCard {
    pub title: String,
    pub id: i64,
    pub at: Vec2,
}

/// What the overlay currently shows for interaction reports.
#[derive(Debug, Default)]
pub struct OverlayState {
    pub hover: Option<HoverCard>,
    pub selected: Option<Record>,
}

impl InteractionSink for OverlayState {
    fn hover(&mut self, record: Option<&Record>, at: Option<Vec2>) {
        self.hover = match (record, at) {
            (Some(record), Some(at)) => Some(HoverCard { title: record.title(), id: record.id, at }),
            _ => None,
        };
    }

    fn click(&mut self, record: &Record) {
        log::info!("selected record {} ({})", record.id, record.title());
        self.selected = Some(record.clone());
    }
}

pub struct DebugOverlay {
    pub stats_visible: bool,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl DebugOverlay {
    pub fn new(
        window: &winit::window::Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        // Style: dark, semi-transparent, small monospace white font
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_premultiplied(0, 0, 0, 180);
        visuals.window_stroke = egui::Stroke::NONE;
        visuals.window_shadow = Shadow::NONE;
        visuals.override_text_color = Some(egui::Color32::WHITE);
        egui_ctx.set_visuals(visuals);

        let mut style = (*egui_ctx.style()).clone();
        style.override_font_id = Some(egui::FontId::monospace(13.0));
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            None,  // drawn after the scene, no depth test
            1,     // msaa samples
            false, // no dithering
        );

        Self {
            stats_visible: false,
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    pub fn toggle_stats(&mut self) {
        self.stats_visible = !self.stats_visible;
    }

    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// True while the pointer is over an egui panel; picking should pause.
    pub fn wants_pointer(&self) -> bool {
        self.egui_ctx.wants_pointer_input()
    }

    /// Render one egui frame on top of the scene.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &winit::window::Window,
        view: &wgpu::TextureView,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        overlay: &OverlayState,
        stats: &DebugStats,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);
        let pixels_per_point = screen_descriptor.pixels_per_point;
        let stats_visible = self.stats_visible;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            // ── Hover card, anchored above the hovered grave ─────────────────
            if let Some(card) = &overlay.hover {
                let anchor = egui::pos2(card.at.x / pixels_per_point, card.at.y / pixels_per_point);
                egui::Area::new(egui::Id::new("hover_card"))
                    .fixed_pos(anchor)
                    .pivot(egui::Align2::CENTER_BOTTOM)
                    .interactable(false)
                    .show(ctx, |ui| {
                        panel_frame().show(ui, |ui: &mut egui::Ui| {
                            ui.label(&card.title);
                            ui.label(format!("id {}", card.id));
                        });
                    });
            }

            // ── Selected record: every payload field, verbatim ───────────────
            if let Some(record) = &overlay.selected {
                egui::Area::new(egui::Id::new("selected_record"))
                    .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
                    .show(ctx, |ui| {
                        panel_frame().show(ui, |ui: &mut egui::Ui| {
                            ui.label(record.title());
                            ui.separator();
                            ui.label(format!("id: {}", record.id));
                            for (key, value) in &record.payload {
                                let text = match value.as_str() {
                                    Some(s) => s.to_owned(),
                                    None => value.to_string(),
                                };
                                ui.label(format!("{key}: {text}"));
                            }
                        });
                    });
            }

            // ── F3: stats panel ──────────────────────────────────────────────
            if stats_visible {
                egui::Area::new(egui::Id::new("debug_overlay"))
                    .fixed_pos(egui::pos2(10.0, 10.0))
                    .show(ctx, |ui| {
                        panel_frame().show(ui, |ui: &mut egui::Ui| {
                            ui.label(format!("FPS: {}", stats.fps));
                            ui.label(format!(
                                "Frame: {:.2} ms (min: {:.1} | max: {:.1})",
                                stats.frame_time_avg_ms,
                                stats.frame_time_min_ms,
                                stats.frame_time_max_ms
                            ));
                            ui.label(format!(
                                "Graves: {}/{} {}",
                                stats.graves_revealed,
                                stats.graves_total,
                                match stats.reveal_phase {
                                    RevealPhase::Growing => "(revealing)",
                                    RevealPhase::Complete => "(complete)",
                                },
                            ));
                            ui.label(format!("Labels in range: {}", stats.labels_visible));
                            ui.label(format!("Draw calls: {}", stats.draw_calls));
                            ui.label(format!(
                                "Resolution: {} x {}",
                                stats.resolution.0, stats.resolution.1
                            ));
                            let (x, y, z) = stats.camera_position;
                            ui.label(format!(
                                "Camera: ({x:.1}, {y:.1}, {z:.1})  yaw {:.0}°  pitch {:.0}°",
                                stats.camera_yaw_deg, stats.camera_pitch_deg
                            ));
                            ui.label("WASD/arrows walk · drag look · wheel dolly · R reload");
                        });
                    });
            }
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn panel_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(egui::Color32::from_rgba_premultiplied(0, 0, 0, 180))
        .inner_margin(egui::Margin::same(8.0))
        .rounding(4.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_tracks_hover_and_selection() {
        let mut overlay = OverlayState::default();
        let record = Record::new(9).with_field("name", "Quibi").with_field("raised", 1_750_000_000u64);

        overlay.hover(Some(&record), Some(Vec2::new(120.0, 80.0)));
        assert_eq!(
            overlay.hover,
            Some(HoverCard { title: "Quibi".into(), id: 9, at: Vec2::new(120.0, 80.0) })
        );

        overlay.hover(None, None);
        assert!(overlay.hover.is_none());

        overlay.click(&record);
        assert_eq!(overlay.selected.as_ref().map(|r| r.id), Some(9));
    }
}
