// Engine module - scene core for the graveyard walk
// Layout, reveal scheduling, camera and marker interaction live here; the
// window, GPU and overlay plumbing live in main.rs / render.rs.

pub mod camera;
pub mod components;
pub mod debug_overlay;
pub mod input;
pub mod interaction;
pub mod layout;
pub mod mesh;
pub mod records;
pub mod reveal;
pub mod rng;
pub mod scenery;
pub mod systems;

// Re-export commonly used items
pub use components::*;
