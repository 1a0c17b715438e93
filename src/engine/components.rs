// ECS components for the graveyard scene

use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};

/// Placement of an entity in world space
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// RGB color for rendering
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn scaled(self, k: f32) -> Self {
        Self::rgb(self.r * k, self.g * k, self.b * k)
    }
}

/// Drawn at full color, ignoring scene lighting and fog (stars, moon, motes).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Emissive;

/// Which shared mesh an entity is drawn with.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Headstone,
    Plaque,
    Tree,
    Mote,
    Star,
    Ground,
    Moon,
}

/// A headstone standing for one record. `index` points into the RecordSet.
#[derive(Component, Debug, Clone, Copy)]
pub struct Grave {
    pub index: usize,
}

/// Name plaque floating above a grave; only drawn near the camera.
#[derive(Component, Debug, Clone, Copy)]
pub struct DetailLabel {
    /// World position the proximity test measures from.
    pub anchor: Vec3,
    pub visible: bool,
}

/// Looping sine drift around a fixed anchor.
#[derive(Component, Debug, Clone, Copy)]
pub struct Drift {
    pub anchor: Vec3,
    pub phase: f32,
    /// Radians per second.
    pub speed: f32,
}

/// Slow rotation about world Y around the origin (starfield).
#[derive(Component, Debug, Clone, Copy)]
pub struct SkySpin {
    pub rest: Vec3,
    /// Radians per second.
    pub rate: f32,
}
