// Deterministic procedural placement for graves and scenery.
//
// Grave grid:
//   columns = ceil(sqrt(count)), row-major from index.
//   x = (col - columns/2) * GRAVE_SPACING + jitter, z = row * GRAVE_SPACING + jitter, y = 0.
//   Jitter comes from one stream (GRAVE_JITTER_SEED) consumed in index order,
//   two draws per grave (x then z). Inserting records at the front therefore
//   shifts every later grave's jitter.
//
// Scenery (trees, particles, stars) uses its own fixed seed per concern and
// does not depend on the record count.

use glam::{UVec2, Vec3};
use std::f32::consts::TAU;
use super::rng::SeededRng;

// ============================================================================
// CONSTANTS
// ============================================================================

/// World units between neighbouring grid cells.
pub const GRAVE_SPACING: f32 = 3.2;
/// Max absolute jitter on X and Z. Keeps at least 2.0 units between graves.
pub const GRAVE_JITTER: f32 = 0.6;
pub const GRAVE_JITTER_SEED: i64 = 42;

/// Per-grave pose seeds are `GRAVE_POSE_SEED_BASE + index * GRAVE_POSE_SEED_STRIDE`.
pub const GRAVE_POSE_SEED_BASE: i64 = 1_000;
pub const GRAVE_POSE_SEED_STRIDE: i64 = 7_919;
/// Max forward/backward tilt of a headstone, radians.
pub const GRAVE_MAX_LEAN: f32 = 0.12;
/// Max rotation about Y away from facing the path, radians.
pub const GRAVE_MAX_TURN: f32 = 0.18;

pub const TREE_SEED: i64 = 7;
pub const TREE_COUNT: usize = 64;
pub const TREE_RING_CENTER: Vec3 = Vec3::new(0.0, 0.0, 24.0);
pub const TREE_RING_INNER: f32 = 42.0;
pub const TREE_RING_OUTER: f32 = 72.0;

pub const PARTICLE_SEED: i64 = 99;
pub const PARTICLE_COUNT: usize = 240;
pub const PARTICLE_MIN: Vec3 = Vec3::new(-40.0, 0.4, -16.0);
pub const PARTICLE_MAX: Vec3 = Vec3::new(40.0, 6.0, 70.0);

pub const STAR_SEED: i64 = 1_234;
pub const STAR_COUNT: usize = 900;
pub const STAR_RADIUS: f32 = 320.0;
/// Lowest star elevation as sin(angle). Stars sit on the cap above this.
pub const STAR_CAP_MIN_Y: f32 = 0.08;

// ============================================================================
// GRAVE GRID
// ============================================================================

/// Columns in the grid for `count` graves. Zero graves need zero columns.
pub fn grid_columns(count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (count as f64).sqrt().ceil() as usize
}

/// Grid cell (col, row) of a grave index for a given column count.
#[inline]
pub fn grid_cell(index: usize, columns: usize) -> UVec2 {
    UVec2::new((index % columns) as u32, (index / columns) as u32)
}

/// Ground positions for `count` graves, index-aligned with the record list.
pub fn layout_graves(count: usize) -> Vec<Vec3> {
    let columns = grid_columns(count);
    if columns == 0 {
        return Vec::new();
    }

    let half = columns as f32 / 2.0;
    let mut rng = SeededRng::new(GRAVE_JITTER_SEED);

    (0..count)
        .map(|i| {
            let cell = grid_cell(i, columns);
            let jx = rng.centered(GRAVE_JITTER);
            let jz = rng.centered(GRAVE_JITTER);
            Vec3::new(
                (cell.x as f32 - half) * GRAVE_SPACING + jx,
                0.0,
                cell.y as f32 * GRAVE_SPACING + jz,
            )
        })
        .collect()
}

/// Headstone orientation derived only from its index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravePose {
    /// Tilt about the local X axis, radians.
    pub lean: f32,
    /// Rotation about Y, radians.
    pub turn: f32,
    /// Stone brightness multiplier in [0.8, 1.2).
    pub shade: f32,
}

pub fn grave_pose(index: usize) -> GravePose {
    let seed = GRAVE_POSE_SEED_BASE + index as i64 * GRAVE_POSE_SEED_STRIDE;
    let mut rng = SeededRng::new(seed);
    GravePose {
        lean: rng.centered(GRAVE_MAX_LEAN),
        turn: rng.centered(GRAVE_MAX_TURN),
        shade: rng.range(0.8, 1.2),
    }
}

// ============================================================================
// SCENERY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeSpot {
    pub position: Vec3,
    pub scale: f32,
    pub turn: f32,
}

/// Trees scattered uniformly by angle and radius in an annulus around the grid.
pub fn tree_ring() -> Vec<TreeSpot> {
    let mut rng = SeededRng::new(TREE_SEED);
    (0..TREE_COUNT)
        .map(|_| {
            let angle = rng.next_f32() * TAU;
            let radius = rng.range(TREE_RING_INNER, TREE_RING_OUTER);
            let scale = rng.range(0.7, 1.5);
            let turn = rng.next_f32() * TAU;
            TreeSpot {
                position: TREE_RING_CENTER
                    + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius),
                scale,
                turn,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSeed {
    /// Rest position the particle drifts around.
    pub anchor: Vec3,
    /// Phase offset in radians so particles do not move in lockstep.
    pub phase: f32,
    /// Angular speed of the drift loop, radians per second.
    pub speed: f32,
}

/// Firefly-like motes filling a box over the graveyard.
pub fn particle_field() -> Vec<ParticleSeed> {
    let mut rng = SeededRng::new(PARTICLE_SEED);
    (0..PARTICLE_COUNT)
        .map(|_| ParticleSeed {
            anchor: Vec3::new(
                rng.range(PARTICLE_MIN.x, PARTICLE_MAX.x),
                rng.range(PARTICLE_MIN.y, PARTICLE_MAX.y),
                rng.range(PARTICLE_MIN.z, PARTICLE_MAX.z),
            ),
            phase: rng.next_f32() * TAU,
            speed: rng.range(0.2, 0.7),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    /// Brightness in [0.4, 1.0).
    pub brightness: f32,
}

/// Stars sampled uniformly over the spherical cap above STAR_CAP_MIN_Y.
///
/// Uniform in height on the unit sphere is uniform in area (Archimedes), so
/// y is drawn linearly and the ring radius follows from it.
pub fn starfield() -> Vec<Star> {
    let mut rng = SeededRng::new(STAR_SEED);
    (0..STAR_COUNT)
        .map(|_| {
            let y = rng.range(STAR_CAP_MIN_Y, 1.0);
            let theta = rng.next_f32() * TAU;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            Star {
                position: Vec3::new(ring * theta.cos(), y, ring * theta.sin()) * STAR_RADIUS,
                brightness: rng.range(0.4, 1.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn empty_list_lays_out_nothing() {
        assert_eq!(grid_columns(0), 0);
        assert!(layout_graves(0).is_empty());
    }

    #[test]
    fn one_position_per_record() {
        for n in [1usize, 2, 3, 4, 5, 9, 10, 37, 100, 101, 1000] {
            let positions = layout_graves(n);
            assert_eq!(positions.len(), n);
            assert_eq!(grid_columns(n), (n as f64).sqrt().ceil() as usize);
            assert!(positions.iter().all(|p| p.y == 0.0));
        }
    }

    #[test]
    fn cells_are_unique() {
        for n in [1usize, 7, 37, 64, 65, 500] {
            let columns = grid_columns(n);
            let cells: HashSet<_> = (0..n).map(|i| grid_cell(i, columns)).collect();
            assert_eq!(cells.len(), n);
        }
    }

    #[test]
    fn graves_stay_near_their_cell() {
        let n = 50;
        let columns = grid_columns(n);
        let half = columns as f32 / 2.0;
        for (i, p) in layout_graves(n).iter().enumerate() {
            let cell = grid_cell(i, columns);
            let cx = (cell.x as f32 - half) * GRAVE_SPACING;
            let cz = cell.y as f32 * GRAVE_SPACING;
            assert!((p.x - cx).abs() <= GRAVE_JITTER);
            assert!((p.z - cz).abs() <= GRAVE_JITTER);
        }
    }

    #[test]
    fn layout_is_reproducible() {
        assert_eq!(layout_graves(37), layout_graves(37));
        assert_eq!(tree_ring(), tree_ring());
        assert_eq!(particle_field(), particle_field());
        assert_eq!(starfield(), starfield());
    }

    #[test]
    fn jitter_prefix_survives_growth_with_same_columns() {
        // 26..=36 all use 6 columns; appending only adds positions.
        let small = layout_graves(26);
        let large = layout_graves(36);
        assert_eq!(&large[..26], &small[..]);
    }

    #[test]
    fn pose_depends_only_on_index() {
        assert_eq!(grave_pose(12), grave_pose(12));
        assert_ne!(grave_pose(12), grave_pose(13));
        let pose = grave_pose(3);
        assert!(pose.lean.abs() <= GRAVE_MAX_LEAN);
        assert!(pose.turn.abs() <= GRAVE_MAX_TURN);
    }

    #[test]
    fn trees_sit_in_the_annulus() {
        let trees = tree_ring();
        assert_eq!(trees.len(), TREE_COUNT);
        for t in trees {
            let r = (t.position - TREE_RING_CENTER).length();
            assert!(r >= TREE_RING_INNER - 1e-3 && r <= TREE_RING_OUTER + 1e-3);
            assert_eq!(t.position.y, 0.0);
        }
    }

    #[test]
    fn stars_sit_on_the_cap() {
        for s in starfield() {
            assert!((s.position.length() - STAR_RADIUS).abs() < 0.05);
            assert!(s.position.y >= STAR_CAP_MIN_Y * STAR_RADIUS - 0.05);
        }
    }

    #[test]
    fn particles_fill_their_box() {
        for p in particle_field() {
            assert!(p.anchor.cmpge(PARTICLE_MIN).all());
            assert!(p.anchor.cmplt(PARTICLE_MAX).all());
        }
    }
}
