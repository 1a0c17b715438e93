// First-person walk camera
//
// Camera model:
//   - Eye position in world space plus yaw/pitch orientation
//   - yaw = 0 looks along -Z; yaw = PI looks along +Z (into the grave rows)
//   - WASD / arrow keys move on the XZ plane relative to yaw (pitch ignored)
//   - Mouse drag (any button held) turns yaw and pitch
//   - Mouse wheel dollies along the flattened forward vector
//   - Eye height and pitch are clamped every update
//   - Orientation is rebuilt from (yaw, pitch) each frame, never accumulated

use bevy_ecs::prelude::*;
use glam::{EulerRot, Mat4, Quat, Vec3};
use super::input::InputState;
use winit::keyboard::KeyCode;

pub const START_POSITION: Vec3 = Vec3::new(0.0, 5.0, -14.0);
pub const START_YAW: f32 = std::f32::consts::PI;
pub const START_PITCH: f32 = -0.2;

/// Walk speed in world units per second.
pub const MOVE_SPEED: f32 = 8.0;
/// Radians of turn per pixel of drag.
pub const LOOK_SENSITIVITY: f32 = 0.003;
/// World units of dolly per wheel line.
pub const ZOOM_STEP: f32 = 1.5;
pub const MIN_HEIGHT: f32 = 2.0;
pub const MAX_HEIGHT: f32 = 15.0;
/// Looking down is more useful than looking up over a graveyard.
pub const MIN_PITCH_DEG: f32 = -72.0;
pub const MAX_PITCH_DEG: f32 = 30.0;

const FORWARD_KEYS: [KeyCode; 2] = [KeyCode::KeyW, KeyCode::ArrowUp];
const BACK_KEYS: [KeyCode; 2] = [KeyCode::KeyS, KeyCode::ArrowDown];
const LEFT_KEYS: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const RIGHT_KEYS: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];

#[derive(Resource, Debug, Clone)]
pub struct FirstPersonCamera {
    /// Private: always height-clamped in update(). Use position() to read.
    position: Vec3,
    /// Unbounded; wraps naturally through sin/cos.
    yaw: f32,
    /// Private: always clamped to [min_pitch, max_pitch]. Use pitch() to read.
    pitch: f32,
    /// Rebuilt from yaw/pitch at the end of every update().
    orientation: Quat,

    pub move_speed: f32,
    pub look_sensitivity: f32,
    pub zoom_step: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,

    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl FirstPersonCamera {
    pub fn new() -> Self {
        Self::looking(START_POSITION, START_YAW, START_PITCH)
    }

    /// Camera at `position` facing (yaw, pitch), with default tuning.
    pub fn looking(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            yaw,
            pitch,
            orientation: Quat::IDENTITY,
            move_speed: MOVE_SPEED,
            look_sensitivity: LOOK_SENSITIVITY,
            zoom_step: ZOOM_STEP,
            min_height: MIN_HEIGHT,
            max_height: MAX_HEIGHT,
            min_pitch: MIN_PITCH_DEG.to_radians(),
            max_pitch: MAX_PITCH_DEG.to_radians(),
            fov: 60.0_f32.to_radians(),
            near: 0.1,
            far: 800.0,
        };
        camera.position.y = camera.position.y.clamp(camera.min_height, camera.max_height);
        camera.pitch = camera.pitch.clamp(camera.min_pitch, camera.max_pitch);
        camera.orientation = camera.rebuild_orientation();
        camera
    }

    /// Flat forward vector from yaw only.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Flat right vector from yaw only.
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Apply one frame of input. Drains the drag and wheel accumulators.
    /// Call once per frame before anything reads the camera.
    pub fn update(&mut self, input: &mut InputState, dt: f32) {
        let forward = self.forward();
        let right = self.right();

        // Each held direction contributes its own step; opposite keys cancel.
        let step = self.move_speed * dt;
        let mut motion = Vec3::ZERO;
        if input.any_key_held(&FORWARD_KEYS) { motion += forward * step; }
        if input.any_key_held(&BACK_KEYS) { motion -= forward * step; }
        if input.any_key_held(&RIGHT_KEYS) { motion += right * step; }
        if input.any_key_held(&LEFT_KEYS) { motion -= right * step; }
        self.position += motion;

        let deltas = input.take_deltas();

        // Dolly: wheel away from the user (positive) walks forward.
        self.position += forward * deltas.scroll * self.zoom_step;
        self.position.y = self.position.y.clamp(self.min_height, self.max_height);

        self.look(deltas.drag.x, deltas.drag.y);
    }

    /// Turn by a drag delta in pixels and clamp pitch.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.look_sensitivity;
        self.pitch = (self.pitch - dy * self.look_sensitivity).clamp(self.min_pitch, self.max_pitch);
        self.orientation = self.rebuild_orientation();
    }

    // Yaw about world Y first, then pitch about the turned X axis.
    fn rebuild_orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Camera-to-world transform.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// Direction the eye looks along, including pitch.
    #[cfg(test)]
    pub fn look_direction(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.transform().inverse()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix ready to upload to the GPU.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn position(&self) -> Vec3 { self.position }
    pub fn yaw(&self) -> f32 { self.yaw }
    pub fn pitch(&self) -> f32 { self.pitch }
    #[cfg(test)]
    pub fn orientation(&self) -> Quat { self.orientation }
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self::new()
    }
}
