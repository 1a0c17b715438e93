// Marker interaction: proximity-gated detail labels, ray picking, and
// hover/click translation into screen space for the overlay.
//
// The overlay and the cursor are outside the engine. They are reached only
// through the `InteractionSink` and `PointerPort` traits so the whole flow
// can run headless in tests.

use glam::{Mat4, Vec2, Vec3};
use super::records::{Record, RecordSet};

/// A grave's detail label is shown while the camera is closer than this.
pub const DETAIL_DISTANCE: f32 = 22.0;
/// Hover cards anchor this far above the grave's base.
pub const HOVER_LIFT: f32 = 1.6;
/// Axis-aligned pick box around a headstone, centred HEADSTONE_PICK_CENTER above its base.
pub const HEADSTONE_PICK_HALF: Vec3 = Vec3::new(0.7, 1.1, 0.35);
pub const HEADSTONE_PICK_CENTER: f32 = 1.0;

/// Single threshold, no hysteresis: a camera parked exactly on the boundary
/// may flicker.
#[inline]
pub fn detail_visible(camera: Vec3, marker: Vec3) -> bool {
    camera.distance(marker) < DETAIL_DISTANCE
}

// ============================================================================
// PORTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Default,
    Pointer,
}

/// Cursor style hint. The only process-wide state the engine touches.
pub trait PointerPort {
    fn set_pointer(&mut self, kind: PointerKind);
}

/// Receives hover and click reports for the UI overlay.
pub trait InteractionSink {
    /// `(Some(record), Some(px))` on enter, `(None, None)` on leave.
    fn hover(&mut self, record: Option<&Record>, at: Option<Vec2>);
    fn click(&mut self, record: &Record);
}

// ============================================================================
// PROJECTION + PICKING
// ============================================================================

/// Viewport in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width as f32, height: height as f32 }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }
}

/// World point -> pixel coordinates (origin top-left, y down).
pub fn world_to_pixels(point: Vec3, view_proj: Mat4, viewport: Viewport) -> Vec2 {
    let ndc = view_proj.project_point3(point);
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub dir: Vec3,
}

/// Ray from the eye through a pixel. `None` for a degenerate viewport.
pub fn pixel_ray(pixel: Vec2, view_proj: Mat4, viewport: Viewport) -> Option<Ray> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    let ndc_x = pixel.x / viewport.width * 2.0 - 1.0;
    let ndc_y = 1.0 - pixel.y / viewport.height * 2.0;
    let inv = view_proj.inverse();
    // wgpu clip depth runs 0 (near) .. 1 (far).
    let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
    let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
    let dir = (far - near).try_normalize()?;
    Some(Ray { origin: near, dir })
}

/// Slab test against an axis-aligned box. Returns the entry distance.
pub fn ray_box_hit(ray: Ray, center: Vec3, half: Vec3) -> Option<f32> {
    let min = center - half;
    let max = center + half;
    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.dir[axis];
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t1 = (min[axis] - o) * inv;
        let mut t2 = (max[axis] - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_max < t_min {
            return None;
        }
    }
    Some(t_min)
}

/// Closest headstone hit by `ray` among `(index, base_position)` candidates.
/// Equal distances go to the lower index.
pub fn pick_headstone(
    ray: Ray,
    candidates: impl IntoIterator<Item = (usize, Vec3)>,
) -> Option<(usize, Vec3)> {
    let lift = Vec3::Y * HEADSTONE_PICK_CENTER;
    candidates
        .into_iter()
        .filter_map(|(index, base)| {
            ray_box_hit(ray, base + lift, HEADSTONE_PICK_HALF).map(|t| (t, index, base))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, index, base)| (index, base))
}

// ============================================================================
// HOVER TRACKING
// ============================================================================

/// What a hover transition needs to know about the current frame.
pub struct HoverFrame<'a> {
    pub records: &'a RecordSet,
    pub view_proj: Mat4,
    pub viewport: Viewport,
}

/// At most one hovered grave. Emits enter/leave only on change.
#[derive(Debug, Default)]
pub struct HoverTracker {
    hovered: Option<usize>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Reconcile with this frame's pick result. `hit` is (record index, grave base).
    pub fn update(
        &mut self,
        hit: Option<(usize, Vec3)>,
        frame: &HoverFrame<'_>,
        sink: &mut dyn InteractionSink,
        pointer: &mut dyn PointerPort,
    ) {
        if hit.map(|(i, _)| i) == self.hovered {
            return;
        }
        self.pointer_leave(sink, pointer);
        if let Some((index, base)) = hit {
            self.pointer_enter(index, base, frame, sink, pointer);
        }
    }

    pub fn pointer_enter(
        &mut self,
        index: usize,
        base: Vec3,
        frame: &HoverFrame<'_>,
        sink: &mut dyn InteractionSink,
        pointer: &mut dyn PointerPort,
    ) {
        let Some(record) = frame.records.get(index) else {
            return;
        };
        self.hovered = Some(index);
        pointer.set_pointer(PointerKind::Pointer);
        let at = world_to_pixels(base + Vec3::Y * HOVER_LIFT, frame.view_proj, frame.viewport);
        sink.hover(Some(record), Some(at));
    }

    /// No-op when nothing is hovered.
    pub fn pointer_leave(&mut self, sink: &mut dyn InteractionSink, pointer: &mut dyn PointerPort) {
        if self.hovered.take().is_some() {
            pointer.set_pointer(PointerKind::Default);
            sink.hover(None, None);
        }
    }

    /// Report a click on the hovered grave, if any.
    pub fn click(&self, records: &RecordSet, sink: &mut dyn InteractionSink) {
        if let Some(record) = self.hovered.and_then(|i| records.get(i)) {
            sink.click(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::camera::FirstPersonCamera;

    #[derive(Default)]
    struct RecordingSink {
        hovers: Vec<(Option<i64>, Option<Vec2>)>,
        clicks: Vec<i64>,
    }

    impl InteractionSink for RecordingSink {
        fn hover(&mut self, record: Option<&Record>, at: Option<Vec2>) {
            self.hovers.push((record.map(|r| r.id), at));
        }
        fn click(&mut self, record: &Record) {
            self.clicks.push(record.id);
        }
    }

    #[derive(Default)]
    struct RecordingPointer(Vec<PointerKind>);

    impl PointerPort for RecordingPointer {
        fn set_pointer(&mut self, kind: PointerKind) {
            self.0.push(kind);
        }
    }

    fn records() -> RecordSet {
        RecordSet::new((0..4).map(|i| Record::new(100 + i)).collect())
    }

    #[test]
    fn detail_toggles_exactly_at_threshold() {
        let marker = Vec3::new(3.0, 0.0, 40.0);
        let along = Vec3::Z;
        assert!(!detail_visible(marker - along * 25.0, marker));
        assert!(detail_visible(marker - along * 10.0, marker));
        assert!(!detail_visible(marker - along * 22.0, marker));
        assert!(detail_visible(marker - along * 21.99, marker));
    }

    #[test]
    fn centre_pixel_projects_to_viewport_centre() {
        let cam = FirstPersonCamera::looking(Vec3::new(0.0, 5.0, 0.0), 0.0, 0.0);
        let viewport = Viewport::new(800, 600);
        let vp = cam.view_projection(viewport.aspect());
        let px = world_to_pixels(Vec3::new(0.0, 5.0, -10.0), vp, viewport);
        assert!(px.abs_diff_eq(Vec2::new(400.0, 300.0), 1e-2), "{px:?}");
    }

    #[test]
    fn centre_ray_picks_the_grave_ahead() {
        let cam = FirstPersonCamera::looking(Vec3::new(0.0, 2.0, 0.0), 0.0, 0.0);
        let viewport = Viewport::new(800, 600);
        let vp = cam.view_projection(viewport.aspect());
        let ray = pixel_ray(Vec2::new(400.0, 300.0), vp, viewport).unwrap();
        let graves = [(0, Vec3::new(5.0, 0.0, -8.0)), (1, Vec3::new(0.0, 0.0, -12.0)), (2, Vec3::new(0.0, 0.0, -6.0))];
        assert_eq!(pick_headstone(ray, graves), Some((2, Vec3::new(0.0, 0.0, -6.0))));
        assert_eq!(pick_headstone(ray, [(0, Vec3::new(5.0, 0.0, -8.0))]), None);
    }

    #[test]
    fn hover_then_leave_reports_enter_then_null() {
        let records = records();
        let frame = HoverFrame {
            records: &records,
            view_proj: FirstPersonCamera::new().view_projection(4.0 / 3.0),
            viewport: Viewport::new(800, 600),
        };
        let mut sink = RecordingSink::default();
        let mut pointer = RecordingPointer::default();
        let mut tracker = HoverTracker::new();

        let base = Vec3::new(0.0, 0.0, 10.0);
        tracker.update(Some((1, base)), &frame, &mut sink, &mut pointer);
        tracker.update(Some((1, base)), &frame, &mut sink, &mut pointer);
        tracker.update(None, &frame, &mut sink, &mut pointer);
        tracker.update(None, &frame, &mut sink, &mut pointer);

        assert_eq!(sink.hovers.len(), 2);
        assert_eq!(sink.hovers[0].0, Some(101));
        let expected = world_to_pixels(base + Vec3::Y * HOVER_LIFT, frame.view_proj, frame.viewport);
        assert_eq!(sink.hovers[0].1, Some(expected));
        assert_eq!(sink.hovers[1], (None, None));
        assert_eq!(pointer.0, vec![PointerKind::Pointer, PointerKind::Default]);
    }

    #[test]
    fn moving_between_graves_leaves_before_entering() {
        let records = records();
        let frame = HoverFrame {
            records: &records,
            view_proj: Mat4::IDENTITY,
            viewport: Viewport::new(100, 100),
        };
        let mut sink = RecordingSink::default();
        let mut pointer = RecordingPointer::default();
        let mut tracker = HoverTracker::new();

        tracker.update(Some((0, Vec3::ZERO)), &frame, &mut sink, &mut pointer);
        tracker.update(Some((3, Vec3::ZERO)), &frame, &mut sink, &mut pointer);

        let ids: Vec<_> = sink.hovers.iter().map(|h| h.0).collect();
        assert_eq!(ids, vec![Some(100), None, Some(103)]);
        assert_eq!(tracker.hovered(), Some(3));
        assert_eq!(pointer.0.last(), Some(&PointerKind::Pointer));
    }

    #[test]
    fn click_reports_hovered_record_only() {
        let records = records();
        let frame = HoverFrame {
            records: &records,
            view_proj: Mat4::IDENTITY,
            viewport: Viewport::new(100, 100),
        };
        let mut sink = RecordingSink::default();
        let mut pointer = RecordingPointer::default();
        let mut tracker = HoverTracker::new();

        tracker.click(&records, &mut sink);
        assert!(sink.clicks.is_empty());

        tracker.update(Some((2, Vec3::ZERO)), &frame, &mut sink, &mut pointer);
        tracker.click(&records, &mut sink);
        assert_eq!(sink.clicks, vec![102]);
    }

    #[test]
    fn resized_viewport_changes_projection() {
        let cam = FirstPersonCamera::new();
        let p = Vec3::new(1.0, 1.0, 5.0);
        let small = world_to_pixels(p, cam.view_projection(1.0), Viewport::new(400, 400));
        let large = world_to_pixels(p, cam.view_projection(1.0), Viewport::new(800, 800));
        assert!(large.abs_diff_eq(small * 2.0, 1e-2));
    }
}
