// Procedural meshes for the graveyard: headstones, plaques, trees, motes,
// stars, ground and moon.
//
// PolyMesh (n-gon faces, CCW from outside) → triangulate_flat / triangulate_smooth → RenderMesh → GPU

use glam::Vec3;
use std::f32::consts::{PI, TAU};

// ============================================================================
// GPU VERTEX
// ============================================================================

/// GPU-ready vertex with position and normal.
///   @location(0) position: vec3<f32>
///   @location(1) normal:   vec3<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal:   [f32; 3],
}

impl GpuVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

// ============================================================================
// POLY MESH
// ============================================================================

/// Polygon mesh built at startup. Faces use CCW winding viewed from outside.
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    pub positions: Vec<Vec3>,
    pub faces:     Vec<Vec<usize>>,
}

impl PolyMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, pos: Vec3) -> usize {
        let idx = self.positions.len();
        self.positions.push(pos);
        idx
    }

    pub fn add_face(&mut self, indices: Vec<usize>) {
        debug_assert!(indices.len() >= 3, "Face must have at least 3 vertices");
        self.faces.push(indices);
    }

    /// Merge another mesh into this one.
    pub fn append(&mut self, other: PolyMesh) {
        let base = self.positions.len();
        self.positions.extend(other.positions);
        self.faces.extend(
            other.faces.into_iter().map(|f| f.into_iter().map(|i| i + base).collect()),
        );
    }

    pub fn vertex_count(&self) -> usize { self.positions.len() }
}

// ============================================================================
// RENDER MESH
// ============================================================================

/// GPU-ready triangulated mesh.
pub struct RenderMesh {
    pub vertices: Vec<GpuVertex>,
    pub indices:  Vec<u32>,
}

impl RenderMesh {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn index_count(&self) -> usize { self.indices.len() }
}

/// Fan-triangulate each face with its own vertices and face normal.
/// Hard edges: right for stone blocks and faceted trees.
pub fn triangulate_flat(poly: &PolyMesh) -> RenderMesh {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for face in &poly.faces {
        let a = poly.positions[face[0]];
        let b = poly.positions[face[1]];
        let c = poly.positions[face[2]];
        let normal = (b - a).cross(c - a).normalize_or_zero().to_array();

        let base = vertices.len() as u32;
        vertices.extend(face.iter().map(|&i| GpuVertex {
            position: poly.positions[i].to_array(),
            normal,
        }));
        for i in 1..(face.len() as u32 - 1) {
            indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    RenderMesh { vertices, indices }
}

/// Shared vertices with area-weighted normals. Right for the moon.
pub fn triangulate_smooth(poly: &PolyMesh) -> RenderMesh {
    let mut normal_accum = vec![Vec3::ZERO; poly.vertex_count()];

    for face in &poly.faces {
        for i in 1..(face.len() - 1) {
            let a = poly.positions[face[0]];
            let b = poly.positions[face[i]];
            let c = poly.positions[face[i + 1]];
            // Unnormalised cross: magnitude is 2×area, so larger faces weigh more.
            let weighted = (b - a).cross(c - a);
            normal_accum[face[0]] += weighted;
            normal_accum[face[i]] += weighted;
            normal_accum[face[i + 1]] += weighted;
        }
    }

    let vertices = poly.positions.iter()
        .zip(&normal_accum)
        .map(|(p, n)| GpuVertex {
            position: p.to_array(),
            normal:   n.normalize_or_zero().to_array(),
        })
        .collect();

    let mut indices = Vec::new();
    for face in &poly.faces {
        for i in 1..(face.len() - 1) {
            indices.extend_from_slice(&[face[0] as u32, face[i] as u32, face[i + 1] as u32]);
        }
    }

    RenderMesh { vertices, indices }
}

// ============================================================================
// SHAPES
// ============================================================================

/// Axis-aligned box from `min` to `max`.
pub fn cuboid(min: Vec3, max: Vec3) -> PolyMesh {
    let mut mesh = PolyMesh::new();
    let v = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
    let (a, b) = (min, max);
    // Bottom ring then top ring, both CCW seen from above.
    let p = [
        v(a.x, a.y, b.z), v(b.x, a.y, b.z), v(b.x, a.y, a.z), v(a.x, a.y, a.z),
        v(a.x, b.y, b.z), v(b.x, b.y, b.z), v(b.x, b.y, a.z), v(a.x, b.y, a.z),
    ];
    for pos in p {
        mesh.add_vertex(pos);
    }
    mesh.add_face(vec![0, 1, 5, 4]); // front  (+Z)
    mesh.add_face(vec![2, 3, 7, 6]); // back   (-Z)
    mesh.add_face(vec![3, 0, 4, 7]); // left   (-X)
    mesh.add_face(vec![1, 2, 6, 5]); // right  (+X)
    mesh.add_face(vec![4, 5, 6, 7]); // top    (+Y)
    mesh.add_face(vec![3, 2, 1, 0]); // bottom (-Y)
    mesh
}

/// Upright slab with a peaked top, base at y = 0, facing +Z.
pub fn headstone() -> PolyMesh {
    let (hw, hd, shoulder, peak) = (0.55, 0.14, 1.45, 1.8);
    let mut mesh = PolyMesh::new();
    // Front outline (z = +hd) and back outline (z = -hd), CCW from the front.
    let outline = [
        (-hw, 0.0), (hw, 0.0), (hw, shoulder), (0.0, peak), (-hw, shoulder),
    ];
    for &(x, y) in &outline {
        mesh.add_vertex(Vec3::new(x, y, hd));
    }
    for &(x, y) in &outline {
        mesh.add_vertex(Vec3::new(x, y, -hd));
    }
    let n = outline.len();
    mesh.add_face((0..n).collect());
    mesh.add_face((0..n).rev().map(|i| i + n).collect());
    for i in 0..n {
        let j = (i + 1) % n;
        mesh.add_face(vec![j, i, i + n, j + n]);
    }
    mesh
}

/// Thin board floating above a headstone.
pub fn plaque() -> PolyMesh {
    cuboid(Vec3::new(-0.6, -0.12, -0.02), Vec3::new(0.6, 0.12, 0.02))
}

/// Open-based cone with its base ring at `base_y`.
fn cone(radius: f32, base_y: f32, height: f32, segments: usize) -> PolyMesh {
    let mut mesh = PolyMesh::new();
    let apex = mesh.add_vertex(Vec3::new(0.0, base_y + height, 0.0));
    let ring: Vec<usize> = (0..segments)
        .map(|i| {
            let a = i as f32 / segments as f32 * TAU;
            mesh.add_vertex(Vec3::new(a.cos() * radius, base_y, -a.sin() * radius))
        })
        .collect();
    for i in 0..segments {
        mesh.add_face(vec![ring[i], ring[(i + 1) % segments], apex]);
    }
    mesh.add_face(ring.iter().rev().copied().collect());
    mesh
}

/// Low-poly conifer: trunk plus two stacked cones, base at y = 0.
pub fn tree() -> PolyMesh {
    let mut mesh = cuboid(Vec3::new(-0.2, 0.0, -0.2), Vec3::new(0.2, 1.4, 0.2));
    mesh.append(cone(1.6, 1.2, 2.6, 7));
    mesh.append(cone(1.1, 2.8, 2.2, 7));
    mesh
}

/// Unit-radius octahedron for motes and stars.
pub fn octahedron(radius: f32) -> PolyMesh {
    let mut mesh = PolyMesh::new();
    let px = mesh.add_vertex(Vec3::X * radius);
    let nx = mesh.add_vertex(Vec3::NEG_X * radius);
    let py = mesh.add_vertex(Vec3::Y * radius);
    let ny = mesh.add_vertex(Vec3::NEG_Y * radius);
    let pz = mesh.add_vertex(Vec3::Z * radius);
    let nz = mesh.add_vertex(Vec3::NEG_Z * radius);
    for (a, b) in [(px, pz), (pz, nx), (nx, nz), (nz, px)] {
        mesh.add_face(vec![a, py, b]);
        mesh.add_face(vec![b, ny, a]);
    }
    mesh
}

/// Flat square on y = 0 facing up.
pub fn ground(half: f32) -> PolyMesh {
    let mut mesh = PolyMesh::new();
    mesh.add_vertex(Vec3::new(-half, 0.0, half));
    mesh.add_vertex(Vec3::new(half, 0.0, half));
    mesh.add_vertex(Vec3::new(half, 0.0, -half));
    mesh.add_vertex(Vec3::new(-half, 0.0, -half));
    mesh.add_face(vec![0, 1, 2, 3]);
    mesh
}

/// Latitude/longitude sphere. Poles are single vertices.
pub fn uv_sphere(radius: f32, rings: usize, segments: usize) -> PolyMesh {
    let mut mesh = PolyMesh::new();
    let top = mesh.add_vertex(Vec3::Y * radius);
    let mut rows: Vec<Vec<usize>> = Vec::with_capacity(rings - 1);
    for r in 1..rings {
        let polar = r as f32 / rings as f32 * PI;
        let (y, ring_r) = (polar.cos() * radius, polar.sin() * radius);
        rows.push(
            (0..segments)
                .map(|s| {
                    let a = s as f32 / segments as f32 * TAU;
                    mesh.add_vertex(Vec3::new(a.cos() * ring_r, y, -a.sin() * ring_r))
                })
                .collect(),
        );
    }
    let bottom = mesh.add_vertex(Vec3::NEG_Y * radius);

    let next = |s: usize| (s + 1) % segments;
    for s in 0..segments {
        mesh.add_face(vec![top, rows[0][s], rows[0][next(s)]]);
    }
    for pair in rows.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        for s in 0..segments {
            mesh.add_face(vec![upper[s], lower[s], lower[next(s)], upper[next(s)]]);
        }
    }
    let last = &rows[rows.len() - 1];
    for s in 0..segments {
        mesh.add_face(vec![last[next(s)], last[s], bottom]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every face normal points away from the mesh centroid.
    fn assert_outward(mesh: &PolyMesh) {
        let centroid = mesh.positions.iter().copied().sum::<Vec3>() / mesh.vertex_count() as f32;
        for face in &mesh.faces {
            let a = mesh.positions[face[0]];
            let b = mesh.positions[face[1]];
            let c = mesh.positions[face[2]];
            let n = (b - a).cross(c - a);
            let center = face.iter().map(|&i| mesh.positions[i]).sum::<Vec3>() / face.len() as f32;
            assert!(n.dot(center - centroid) > 0.0, "inward face {face:?}");
        }
    }

    #[test]
    fn convex_shapes_wind_outward() {
        assert_outward(&cuboid(Vec3::splat(-1.0), Vec3::splat(1.0)));
        assert_outward(&headstone());
        assert_outward(&octahedron(1.0));
        assert_outward(&uv_sphere(1.0, 8, 12));
    }

    #[test]
    fn ground_faces_up() {
        let render = triangulate_flat(&ground(10.0));
        assert!(render.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert_eq!(render.index_count(), 6);
    }

    #[test]
    fn flat_triangulation_counts() {
        // 6 quads → 24 vertices, 12 triangles.
        let render = triangulate_flat(&cuboid(Vec3::ZERO, Vec3::ONE));
        assert_eq!(render.vertices.len(), 24);
        assert_eq!(render.index_count(), 36);
    }

    #[test]
    fn smooth_sphere_normals_are_radial() {
        let render = triangulate_smooth(&uv_sphere(2.0, 10, 16));
        for v in &render.vertices {
            let p = Vec3::from_array(v.position).normalize();
            let n = Vec3::from_array(v.normal);
            assert!(p.dot(n) > 0.95);
        }
    }

    #[test]
    fn append_offsets_indices() {
        let mut a = octahedron(1.0);
        let before = a.vertex_count();
        a.append(octahedron(1.0));
        assert_eq!(a.vertex_count(), before * 2);
        assert!(a.faces.iter().all(|f| f.iter().all(|&i| i < a.vertex_count())));
    }
}
