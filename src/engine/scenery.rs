// Ambient scenery: ground, moon, tree ring, drifting motes and the sky.
// Everything is spawned once at scene construction from fixed seeds.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use super::components::*;
use super::layout::{particle_field, starfield, tree_ring};

pub const GROUND_HALF_EXTENT: f32 = 140.0;
pub const MOON_POSITION: Vec3 = Vec3::new(-90.0, 120.0, 220.0);
pub const MOON_RADIUS: f32 = 12.0;
/// Radians per second the sky turns about Y.
pub const SKY_SPIN_RATE: f32 = 0.004;

const GROUND_COLOR: Color = Color::rgb(0.10, 0.14, 0.10);
const MOON_COLOR: Color = Color::rgb(0.95, 0.93, 0.80);
const TREE_COLOR: Color = Color::rgb(0.06, 0.12, 0.08);
const MOTE_COLOR: Color = Color::rgb(0.75, 0.95, 0.55);
const STAR_COLOR: Color = Color::rgb(0.90, 0.92, 1.0);

/// Spawn every scenery entity. Returns how many were created.
pub fn spawn_scenery(world: &mut World) -> usize {
    let mut count = 0;

    world.spawn((
        Transform::from_position(Vec3::new(0.0, 0.0, 30.0)),
        GROUND_COLOR,
        MeshKind::Ground,
    ));
    world.spawn((
        Transform::from_position(MOON_POSITION).with_scale(Vec3::splat(MOON_RADIUS)),
        MOON_COLOR,
        MeshKind::Moon,
        Emissive,
    ));
    count += 2;

    for tree in tree_ring() {
        world.spawn((
            Transform::from_position(tree.position)
                .with_rotation(Quat::from_rotation_y(tree.turn))
                .with_scale(Vec3::splat(tree.scale)),
            TREE_COLOR,
            MeshKind::Tree,
        ));
        count += 1;
    }

    for seed in particle_field() {
        world.spawn((
            Transform::from_position(seed.anchor + drift_offset(seed.phase, seed.speed, 0.0)),
            MOTE_COLOR,
            MeshKind::Mote,
            Emissive,
            Drift { anchor: seed.anchor, phase: seed.phase, speed: seed.speed },
        ));
        count += 1;
    }

    for star in starfield() {
        world.spawn((
            Transform::from_position(star.position),
            STAR_COLOR.scaled(star.brightness),
            MeshKind::Star,
            Emissive,
            SkySpin { rest: star.position, rate: SKY_SPIN_RATE },
        ));
        count += 1;
    }

    log::info!("spawned {count} scenery entities");
    count
}

/// Offset from a mote's anchor at `elapsed` seconds: a slow Lissajous loop.
pub fn drift_offset(phase: f32, speed: f32, elapsed: f32) -> Vec3 {
    let t = elapsed * speed + phase;
    Vec3::new(t.sin() * 0.8, (t * 1.7).sin() * 0.35, (t * 0.6).cos() * 0.8)
}

/// Star position after `elapsed` seconds of sky rotation.
pub fn sky_position(rest: Vec3, rate: f32, elapsed: f32) -> Vec3 {
    Quat::from_rotation_y(rate * elapsed) * rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::layout::{PARTICLE_COUNT, STAR_COUNT, TREE_COUNT};

    #[test]
    fn spawns_every_scenery_piece() {
        let mut world = World::new();
        let count = spawn_scenery(&mut world);
        assert_eq!(count, 2 + TREE_COUNT + PARTICLE_COUNT + STAR_COUNT);
        let drifting = world.query::<&Drift>().iter(&world).count();
        assert_eq!(drifting, PARTICLE_COUNT);
    }

    #[test]
    fn drift_loops_and_stays_close() {
        let (phase, speed) = (0.3, 0.5);
        let period = std::f32::consts::TAU / speed * 10.0;
        let a = drift_offset(phase, speed, 1.0);
        let b = drift_offset(phase, speed, 1.0 + period);
        assert!(a.abs_diff_eq(b, 1e-3));
        for i in 0..100 {
            assert!(drift_offset(phase, speed, i as f32 * 0.37).length() < 1.3);
        }
    }

    #[test]
    fn sky_spin_preserves_radius() {
        let rest = Vec3::new(100.0, 40.0, -20.0);
        let moved = sky_position(rest, SKY_SPIN_RATE, 500.0);
        assert!((moved.length() - rest.length()).abs() < 1e-2);
        assert!((moved.y - rest.y).abs() < 1e-3);
    }
}
