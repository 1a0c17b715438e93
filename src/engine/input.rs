// Input state tracking for keyboard and mouse
// Buffers winit events into held-key state plus per-frame accumulators that
// the frame systems drain exactly once per tick.

use std::collections::HashSet;
use bevy_ecs::prelude::*;
use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// A press/release pair that moved less than this many pixels is a click.
pub const CLICK_SLOP_PX: f32 = 4.0;
/// Pixel-based wheels report roughly this many pixels per notch.
const PIXELS_PER_SCROLL_LINE: f32 = 100.0;

/// Deltas accumulated since the last drain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameDeltas {
    /// Cursor movement while a mouse button was held, in pixels.
    pub drag: Vec2,
    /// Wheel lines; positive = away from the user.
    pub scroll: f32,
}

#[derive(Resource, Debug)]
pub struct InputState {
    // Keyboard
    keys_held: HashSet<KeyCode>,

    // Mouse
    cursor: Option<Vec2>,
    buttons_held: HashSet<MouseButton>,
    drag_delta: Vec2,
    /// Total cursor travel since the left button went down.
    press_travel: f32,
    pending_click: bool,
    /// Set while an overlay panel owns the pointer; the scene ignores it.
    pointer_over_ui: bool,

    // Scroll: accumulated vertical scroll since the last drain
    scroll_delta: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_held: HashSet::new(),
            cursor: None,
            buttons_held: HashSet::new(),
            drag_delta: Vec2::ZERO,
            press_travel: 0.0,
            pending_click: false,
            pointer_over_ui: false,
            scroll_delta: 0.0,
        }
    }

    /// Feed a winit WindowEvent into the input state.
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.key_down(key),
                        ElementState::Released => self.key_up(key),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.button_down(*button),
                ElementState::Released => self.button_up(*button),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_SCROLL_LINE,
                };
                self.scroll(y);
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    pub fn key_down(&mut self, key: KeyCode) {
        self.keys_held.insert(key);
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    /// Tell the scene whether the overlay currently owns the pointer.
    pub fn set_pointer_over_ui(&mut self, over: bool) {
        self.pointer_over_ui = over;
    }

    /// Presses that land on an overlay panel never start a drag or a click.
    pub fn button_down(&mut self, button: MouseButton) {
        if self.pointer_over_ui {
            return;
        }
        self.buttons_held.insert(button);
        if button == MouseButton::Left {
            self.press_travel = 0.0;
        }
    }

    pub fn button_up(&mut self, button: MouseButton) {
        let was_held = self.buttons_held.remove(&button);
        if was_held && button == MouseButton::Left && self.press_travel < CLICK_SLOP_PX {
            self.pending_click = true;
        }
    }

    pub fn cursor_moved(&mut self, to: Vec2) {
        if let Some(from) = self.cursor {
            if self.is_dragging() && !self.pointer_over_ui {
                let d = to - from;
                self.drag_delta += d;
                self.press_travel += d.length();
            }
        }
        self.cursor = Some(to);
    }

    pub fn scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    /// Forget held keys and buttons, e.g. when the window loses focus and
    /// the matching release events will never arrive.
    pub fn release_all(&mut self) {
        self.keys_held.clear();
        self.buttons_held.clear();
        self.drag_delta = Vec2::ZERO;
        self.pending_click = false;
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn any_key_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|&k| self.is_key_held(k))
    }

    pub fn is_dragging(&self) -> bool {
        !self.buttons_held.is_empty()
    }

    /// Cursor position in physical pixels, `None` when outside the window.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Return and clear the drag and wheel accumulators.
    pub fn take_deltas(&mut self) -> FrameDeltas {
        let deltas = FrameDeltas { drag: self.drag_delta, scroll: self.scroll_delta };
        self.drag_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
        deltas
    }

    /// Return and clear the click recorded by the last left release.
    pub fn take_click(&mut self) -> bool {
        std::mem::take(&mut self.pending_click)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_accumulates_only_while_a_button_is_held() {
        let mut input = InputState::new();
        input.cursor_moved(Vec2::new(100.0, 100.0));
        input.cursor_moved(Vec2::new(110.0, 100.0));
        assert_eq!(input.take_deltas().drag, Vec2::ZERO);

        input.button_down(MouseButton::Left);
        input.cursor_moved(Vec2::new(120.0, 95.0));
        input.cursor_moved(Vec2::new(125.0, 90.0));
        assert_eq!(input.take_deltas().drag, Vec2::new(15.0, -10.0));
        // Drained.
        assert_eq!(input.take_deltas(), FrameDeltas::default());
    }

    #[test]
    fn short_press_is_a_click_long_drag_is_not() {
        let mut input = InputState::new();
        input.cursor_moved(Vec2::new(50.0, 50.0));
        input.button_down(MouseButton::Left);
        input.cursor_moved(Vec2::new(51.0, 51.0));
        input.button_up(MouseButton::Left);
        assert!(input.take_click());
        assert!(!input.take_click());

        input.button_down(MouseButton::Left);
        input.cursor_moved(Vec2::new(90.0, 51.0));
        input.button_up(MouseButton::Left);
        assert!(!input.take_click());
    }

    #[test]
    fn scroll_sums_until_drained() {
        let mut input = InputState::new();
        input.scroll(1.0);
        input.scroll(0.5);
        assert_eq!(input.take_deltas().scroll, 1.5);
        assert_eq!(input.take_deltas().scroll, 0.0);
    }

    #[test]
    fn overlay_pointer_does_not_turn_the_camera() {
        let mut input = InputState::new();
        input.cursor_moved(Vec2::new(20.0, 20.0));
        input.set_pointer_over_ui(true);
        input.button_down(MouseButton::Left);
        input.cursor_moved(Vec2::new(80.0, 20.0));
        input.button_up(MouseButton::Left);
        assert!(!input.is_dragging());
        assert_eq!(input.take_deltas().drag, Vec2::ZERO);
        assert!(!input.take_click());

        // A scene drag stops counting while it crosses a panel.
        input.set_pointer_over_ui(false);
        input.button_down(MouseButton::Left);
        input.cursor_moved(Vec2::new(90.0, 20.0));
        input.set_pointer_over_ui(true);
        input.cursor_moved(Vec2::new(150.0, 20.0));
        assert_eq!(input.take_deltas().drag, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn focus_loss_releases_keys() {
        let mut input = InputState::new();
        input.key_down(KeyCode::KeyW);
        input.button_down(MouseButton::Left);
        input.release_all();
        assert!(!input.is_key_held(KeyCode::KeyW));
        assert!(!input.is_dragging());
    }
}
