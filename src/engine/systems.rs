// Per-frame ECS systems and the schedule that orders them.
//
// Order inside one frame (chained, with command flushes in between):
//   camera → record sync → reveal → proximity → drift / sky
// Proximity always reads the camera pose computed this frame.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use std::f32::consts::PI;
use super::camera::FirstPersonCamera;
use super::components::*;
use super::input::InputState;
use super::interaction::detail_visible;
use super::layout::{grave_pose, layout_graves};
use super::records::RecordSet;
use super::reveal::{ListKey, RevealScheduler};
use super::scenery::{drift_offset, sky_position, spawn_scenery};

/// Plaque height above the grave base.
pub const PLAQUE_HEIGHT: f32 = 2.4;

const STONE_COLOR: Color = Color::rgb(0.52, 0.53, 0.56);
const PLAQUE_COLOR: Color = Color::rgb(0.95, 0.85, 0.55);

// ============================================================================
// RESOURCES
// ============================================================================

/// The one frame clock. Drives camera motion, reveal ticks and ambient loops.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FrameClock {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the scene was built.
    pub elapsed: f32,
}

impl FrameClock {
    pub fn advance(&mut self, dt: f32) {
        self.dt = dt;
        self.elapsed += dt;
    }
}

/// Layout of the current record list plus how many graves exist in the world.
/// Recomputed only when the list key changes.
#[derive(Resource, Debug, Default)]
pub struct GraveField {
    key: Option<ListKey>,
    positions: Vec<Vec3>,
    spawned: usize,
}

impl GraveField {
    #[cfg(test)]
    pub fn positions(&self) -> &[Vec3] { &self.positions }
    #[cfg(test)]
    pub fn spawned(&self) -> usize { self.spawned }
}

// ============================================================================
// SCENE SETUP
// ============================================================================

/// Build a world with all frame resources and the static scenery.
pub fn build_world(records: RecordSet) -> World {
    let mut world = World::new();
    world.insert_resource(FrameClock::default());
    world.insert_resource(InputState::new());
    world.insert_resource(FirstPersonCamera::new());
    world.insert_resource(RevealScheduler::new());
    world.insert_resource(GraveField::default());
    world.insert_resource(records);
    spawn_scenery(&mut world);
    world
}

pub fn frame_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            camera_system,
            sync_records_system,
            reveal_system,
            proximity_system,
            drift_system,
            sky_spin_system,
        )
            .chain(),
    );
    schedule
}

// ============================================================================
// SYSTEMS
// ============================================================================

pub fn camera_system(
    mut camera: ResMut<FirstPersonCamera>,
    mut input: ResMut<InputState>,
    clock: Res<FrameClock>,
) {
    camera.update(&mut input, clock.dt);
}

/// Detect a replaced record list: drop old graves, re-lay out, restart reveal.
pub fn sync_records_system(
    mut commands: Commands,
    records: Res<RecordSet>,
    mut field: ResMut<GraveField>,
    mut scheduler: ResMut<RevealScheduler>,
    existing: Query<Entity, Or<(With<Grave>, With<DetailLabel>)>>,
) {
    let key = records.key();
    if field.key == Some(key) {
        return;
    }

    let mut removed = 0;
    for entity in &existing {
        commands.entity(entity).despawn();
        removed += 1;
    }

    field.key = Some(key);
    field.positions = layout_graves(key.len);
    field.spawned = 0;
    scheduler.sync(key);

    log::info!(
        "record list generation {}: {} graves laid out, {} entities cleared",
        key.generation, key.len, removed
    );
}

/// Tick the scheduler and materialise graves up to its visible count.
pub fn reveal_system(
    mut commands: Commands,
    mut scheduler: ResMut<RevealScheduler>,
    mut field: ResMut<GraveField>,
) {
    let visible = scheduler.tick().min(field.positions.len());
    while field.spawned < visible {
        let index = field.spawned;
        spawn_grave(&mut commands, index, field.positions[index]);
        field.spawned += 1;
    }
}

fn spawn_grave(commands: &mut Commands, index: usize, base: Vec3) {
    let pose = grave_pose(index);
    // Headstones face -Z, toward the walk-in path.
    let rotation = Quat::from_rotation_y(PI + pose.turn) * Quat::from_rotation_x(pose.lean);

    commands.spawn((
        Transform::from_position(base).with_rotation(rotation),
        STONE_COLOR.scaled(pose.shade),
        MeshKind::Headstone,
        Grave { index },
    ));

    commands.spawn((
        Transform::from_position(base + Vec3::Y * PLAQUE_HEIGHT)
            .with_rotation(Quat::from_rotation_y(PI + pose.turn)),
        PLAQUE_COLOR,
        MeshKind::Plaque,
        Emissive,
        DetailLabel { anchor: base, visible: false },
    ));
}

pub fn proximity_system(
    camera: Res<FirstPersonCamera>,
    mut labels: Query<&mut DetailLabel>,
) {
    let eye = camera.position();
    for mut label in &mut labels {
        let visible = detail_visible(eye, label.anchor);
        if label.visible != visible {
            label.visible = visible;
        }
    }
}

pub fn drift_system(
    clock: Res<FrameClock>,
    mut motes: Query<(&mut Transform, &Drift)>,
) {
    for (mut transform, drift) in &mut motes {
        transform.position = drift.anchor + drift_offset(drift.phase, drift.speed, clock.elapsed);
    }
}

pub fn sky_spin_system(
    clock: Res<FrameClock>,
    mut stars: Query<(&mut Transform, &SkySpin)>,
) {
    for (mut transform, spin) in &mut stars {
        transform.position = sky_position(spin.rest, spin.rate, clock.elapsed);
    }
}

/// `(record index, base position)` of every grave currently in the world.
pub fn revealed_graves(world: &mut World) -> Vec<(usize, Vec3)> {
    world
        .query::<(&Grave, &Transform)>()
        .iter(world)
        .map(|(grave, transform)| (grave.index, transform.position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::records::Record;
    use winit::keyboard::KeyCode;

    fn records(n: u64) -> RecordSet {
        RecordSet::new((0..n as i64).map(Record::new).collect())
    }

    fn step(world: &mut World, schedule: &mut Schedule, dt: f32) {
        world.resource_mut::<FrameClock>().advance(dt);
        schedule.run(world);
    }

    fn grave_count(world: &mut World) -> usize {
        world.query::<&Grave>().iter(world).count()
    }

    #[test]
    fn graves_appear_in_batches() {
        let mut world = build_world(records(37));
        let mut schedule = frame_schedule();

        step(&mut world, &mut schedule, 1.0 / 60.0);
        assert_eq!(grave_count(&mut world), 30);

        for _ in 0..9 {
            step(&mut world, &mut schedule, 1.0 / 60.0);
        }
        assert_eq!(grave_count(&mut world), 37);
        assert_eq!(world.resource::<GraveField>().spawned(), 37);

        for _ in 0..20 {
            step(&mut world, &mut schedule, 1.0 / 60.0);
        }
        assert_eq!(grave_count(&mut world), 37);
        assert!(world.resource::<RevealScheduler>().is_complete());
    }

    #[test]
    fn reveal_phase_is_readable_from_the_world() {
        use crate::engine::reveal::RevealPhase;

        let mut world = build_world(records(37));
        let mut schedule = frame_schedule();
        step(&mut world, &mut schedule, 0.016);
        assert_eq!(world.resource::<RevealScheduler>().phase(), RevealPhase::Growing);

        for _ in 0..20 {
            step(&mut world, &mut schedule, 0.016);
        }
        assert_eq!(world.resource::<RevealScheduler>().phase(), RevealPhase::Complete);

        let labels: Vec<DetailLabel> = world.query::<&DetailLabel>().iter(&world).copied().collect();
        assert_eq!(labels.len(), 37);
    }

    #[test]
    fn replacing_records_restarts_reveal() {
        let mut world = build_world(records(100));
        let mut schedule = frame_schedule();
        for _ in 0..25 {
            step(&mut world, &mut schedule, 0.016);
        }
        assert_eq!(grave_count(&mut world), 46);

        world.resource_mut::<RecordSet>().replace((0..5i64).map(Record::new).collect());
        step(&mut world, &mut schedule, 0.016);

        assert_eq!(grave_count(&mut world), 5);
        let labels = world.query::<&DetailLabel>().iter(&world).count();
        assert_eq!(labels, 5);
        let mut indices: Vec<_> = revealed_graves(&mut world).into_iter().map(|(i, _)| i).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_record_list_spawns_no_graves() {
        let mut world = build_world(records(0));
        let mut schedule = frame_schedule();
        step(&mut world, &mut schedule, 0.016);
        assert_eq!(grave_count(&mut world), 0);
        assert!(world.resource::<RevealScheduler>().is_complete());
    }

    #[test]
    fn proximity_sees_this_frames_camera() {
        let mut world = build_world(records(1));
        let mut schedule = frame_schedule();
        step(&mut world, &mut schedule, 0.0);
        let base = world.resource::<GraveField>().positions()[0];

        // 23 units away at eye height 2, facing the grave.
        let back = (23.0_f32 * 23.0 - 4.0).sqrt();
        *world.resource_mut::<FirstPersonCamera>() =
            FirstPersonCamera::looking(base + Vec3::new(0.0, 2.0, -back), PI, 0.0);
        step(&mut world, &mut schedule, 0.0);
        let visible = |world: &mut World| world.query::<&DetailLabel>().single(world).visible;
        assert!(!visible(&mut world));

        // One frame of walking forward (2 units) crosses the 22-unit threshold.
        world.resource_mut::<InputState>().key_down(KeyCode::KeyW);
        step(&mut world, &mut schedule, 0.25);
        assert!(visible(&mut world));
    }

    #[test]
    fn motes_drift_with_the_clock() {
        let mut world = build_world(records(0));
        let mut schedule = frame_schedule();
        let before: Vec<Vec3> = world
            .query::<(&Transform, &Drift)>()
            .iter(&world)
            .map(|(t, _)| t.position)
            .collect();
        step(&mut world, &mut schedule, 1.0);
        let after: Vec<Vec3> = world
            .query::<(&Transform, &Drift)>()
            .iter(&world)
            .map(|(t, _)| t.position)
            .collect();
        assert_ne!(before, after);
    }
}
