use std::f32::consts::{PI, TAU};

use glam::Vec3;

use std::sync::Arc;

use crate::plot3d::gpu_types::{MeshInstance, MeshVertex};
use crate::plot3d::scene::{build_scene, EntryAnimation, Scene, SceneElement, SurfaceGrid, LABEL_COLOR};
use crate::processing::EncodedSeries;
use crate::state::ChartKind3D;

pub const SPHERE_SEGMENTS: usize = 16;
pub const SPHERE_RINGS: usize = 12;
/// Label markers are tiny; a coarse sphere is enough.
pub const LABEL_SEGMENTS: usize = 8;
pub const LABEL_RINGS: usize = 6;

/// Ground grid: 10 x 10 units split into 10 cells per side.
pub const GRID_SIZE: f32 = 10.0;
pub const GRID_DIVISIONS: usize = 10;

const WHITE: [f32; 4] = [1.0; 4];

/// Face normal plus two in-plane axes with `u x v = normal`.
const BOX_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

fn vertex(position: Vec3, normal: Vec3, color: [f32; 4]) -> MeshVertex {
    MeshVertex {
        position: [position.x, position.y, position.z, 1.0],
        normal: [normal.x, normal.y, normal.z, 0.0],
        color,
    }
}

fn instance(center: Vec3, scale: Vec3, color: [f32; 4]) -> MeshInstance {
    MeshInstance {
        center: [center.x, center.y, center.z, 1.0],
        scale: [scale.x, scale.y, scale.z, 0.0],
        color,
    }
}

/// One unit mesh drawn once per instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBatch {
    pub vertices: Vec<MeshVertex>,
    pub instances: Vec<MeshInstance>,
}

impl MeshBatch {
    pub fn byte_len(&self) -> usize {
        std::mem::size_of_val(self.vertices.as_slice()) + std::mem::size_of_val(self.instances.as_slice())
    }
}

/// Total upload size of a tessellated scene.
pub fn mesh_byte_len(batches: &[MeshBatch]) -> usize {
    batches.iter().map(MeshBatch::byte_len).sum()
}

/// Draw batches for the whole scene, label markers included.
///
/// Boxes and spheres share one unit mesh each, so the upload grows by one
/// instance record per element rather than by a full mesh.
pub fn tessellate(scene: &Scene) -> Vec<MeshBatch> {
    let mut boxes = MeshBatch::default();
    let mut spheres = MeshBatch::default();
    let mut surfaces = Vec::new();

    for element in &scene.elements {
        match element {
            SceneElement::Box { center, size, color } => {
                boxes.instances.push(instance(*center, *size, *color))
            }
            SceneElement::Sphere { center, radius, color } => {
                spheres.instances.push(instance(*center, Vec3::splat(*radius), *color))
            }
            SceneElement::Surface(grid) => {
                let mut vertices = Vec::new();
                push_surface(&mut vertices, grid);
                surfaces.push(MeshBatch {
                    vertices,
                    instances: vec![instance(Vec3::ZERO, Vec3::ONE, WHITE)],
                });
            }
        }
    }

    let labels = MeshBatch {
        vertices: Vec::new(),
        instances: scene
            .labels
            .iter()
            .map(|l| instance(l.position, Vec3::splat(l.radius), LABEL_COLOR))
            .collect(),
    };

    let mut batches = Vec::new();
    if !boxes.instances.is_empty() {
        push_box(&mut boxes.vertices, Vec3::ZERO, Vec3::ONE, WHITE);
        batches.push(boxes);
    }
    if !spheres.instances.is_empty() {
        push_sphere(&mut spheres.vertices, Vec3::ZERO, 1.0, WHITE, SPHERE_SEGMENTS, SPHERE_RINGS);
        batches.push(spheres);
    }
    batches.extend(surfaces);
    if !labels.instances.is_empty() {
        let mut labels = labels;
        push_sphere(&mut labels.vertices, Vec3::ZERO, 1.0, WHITE, LABEL_SEGMENTS, LABEL_RINGS);
        batches.push(labels);
    }
    batches
}

/// The last tessellated scene. Rebuilt only when the series, the kind or the
/// animation frame changes, so an idle chart re-uses its batches.
#[derive(Default)]
pub struct SceneCache {
    entry: Option<CachedScene>,
    builds: usize,
}

struct CachedScene {
    series: EncodedSeries,
    kind: ChartKind3D,
    animation: EntryAnimation,
    scene: Scene,
    batches: Arc<[MeshBatch]>,
}

impl SceneCache {
    pub fn get(
        &mut self,
        series: &EncodedSeries,
        kind: ChartKind3D,
        animation: EntryAnimation,
    ) -> (&Scene, Arc<[MeshBatch]>) {
        let entry = match self.entry.take() {
            Some(c) if c.kind == kind && c.animation == animation && c.series == *series => c,
            _ => {
                self.builds += 1;
                let scene = animation.apply(&build_scene(series, kind));
                let batches = tessellate(&scene).into();
                CachedScene { series: series.clone(), kind, animation, scene, batches }
            }
        };
        let entry = self.entry.insert(entry);
        (&entry.scene, Arc::clone(&entry.batches))
    }

    /// Number of times the scene has been rebuilt.
    pub fn builds(&self) -> usize {
        self.builds
    }
}

/// 12 triangles with flat normals.
pub fn push_box(out: &mut Vec<MeshVertex>, center: Vec3, size: Vec3, color: [f32; 4]) {
    let half = size * 0.5;
    for (n, u, v) in BOX_FACES {
        let corner = |a: f32, b: f32| center + half * (n + u * a + v * b);
        let quad = [corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)];
        for idx in [0, 1, 2, 0, 2, 3] {
            out.push(vertex(quad[idx], n, color));
        }
    }
}

/// UV sphere, two triangles per segment and ring.
pub fn push_sphere(
    out: &mut Vec<MeshVertex>,
    center: Vec3,
    radius: f32,
    color: [f32; 4],
    segments: usize,
    rings: usize,
) {
    let dir = |ring: usize, seg: usize| {
        let theta = PI * ring as f32 / rings as f32;
        let phi = TAU * seg as f32 / segments as f32;
        Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin())
    };
    for ring in 0..rings {
        for seg in 0..segments {
            let quad = [dir(ring, seg), dir(ring + 1, seg), dir(ring + 1, seg + 1), dir(ring, seg + 1)];
            for idx in [0, 1, 2, 0, 2, 3] {
                out.push(vertex(center + quad[idx] * radius, quad[idx], color));
            }
        }
    }
}

/// Two triangles per grid cell; vertex normals come from the neighbouring
/// heights so shading is smooth across cells.
pub fn push_surface(out: &mut Vec<MeshVertex>, grid: &SurfaceGrid) {
    let side = grid.side();
    let step = grid.size / grid.segments as f32;
    let height = |row: usize, col: usize| grid.heights[row * side + col];

    let normal = |row: usize, col: usize| {
        let (l, r) = (col.saturating_sub(1), (col + 1).min(side - 1));
        let (d, u) = (row.saturating_sub(1), (row + 1).min(side - 1));
        let dx = (height(row, r) - height(row, l)) / ((r - l) as f32 * step);
        let dz = (height(u, col) - height(d, col)) / ((u - d) as f32 * step);
        Vec3::new(-dx, 1.0, -dz).normalize()
    };

    for row in 0..grid.segments {
        for col in 0..grid.segments {
            let corners = [(row, col), (row + 1, col), (row + 1, col + 1), (row, col + 1)];
            for idx in [0, 1, 2, 0, 2, 3] {
                let (r, c) = corners[idx];
                out.push(vertex(grid.vertex(r, c), normal(r, c), grid.color));
            }
        }
    }
}

/// Line segments of the ground grid, as endpoint pairs.
pub fn grid_helper_segments() -> Vec<[f32; 4]> {
    let half = GRID_SIZE / 2.0;
    let step = GRID_SIZE / GRID_DIVISIONS as f32;
    let mut segments = Vec::with_capacity((GRID_DIVISIONS + 1) * 4);
    for i in 0..=GRID_DIVISIONS {
        let t = -half + i as f32 * step;
        segments.push([t, 0.0, -half, 1.0]);
        segments.push([t, 0.0, half, 1.0]);
        segments.push([-half, 0.0, t, 1.0]);
        segments.push([half, 0.0, t, 1.0]);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    const BLUE: [f32; 4] = [0.2, 0.5, 1.0, 1.0];

    fn pos(v: &MeshVertex) -> Vec3 {
        Vec3::new(v.position[0], v.position[1], v.position[2])
    }

    fn numbered_series(n: usize) -> EncodedSeries {
        EncodedSeries {
            labels: (0..n).map(|i| Some(CellValue::Text(format!("r{i}")))).collect(),
            values: (0..n).map(|i| Some(CellValue::Number(i as f64 + 1.0))).collect(),
        }
    }

    #[test]
    fn box_is_twelve_outward_triangles() {
        let mut out = Vec::new();
        push_box(&mut out, Vec3::new(1.0, 2.0, 0.0), Vec3::new(0.5, 4.0, 0.5), BLUE);
        assert_eq!(out.len(), 36);
        for tri in out.chunks(3) {
            let (a, b, c) = (pos(&tri[0]), pos(&tri[1]), pos(&tri[2]));
            let n = Vec3::from_slice(&tri[0].normal[..3]);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
        let top = out.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        assert_eq!(top, 4.0);
    }

    #[test]
    fn sphere_vertices_lie_on_the_radius() {
        let mut out = Vec::new();
        let center = Vec3::new(0.0, 1.0, -1.0);
        push_sphere(&mut out, center, 0.5, BLUE, SPHERE_SEGMENTS, SPHERE_RINGS);
        assert_eq!(out.len(), SPHERE_SEGMENTS * SPHERE_RINGS * 6);
        assert!(out.iter().all(|v| ((pos(v) - center).length() - 0.5).abs() < 1e-5));
    }

    #[test]
    fn flat_surface_points_up() {
        let series = EncodedSeries::default();
        let batches = tessellate(&build_scene(&series, ChartKind3D::Surface));
        assert_eq!(batches.len(), 1);
        let mesh = &batches[0].vertices;
        assert_eq!(mesh.len(), 20 * 20 * 6);
        assert_eq!(batches[0].instances, vec![instance(Vec3::ZERO, Vec3::ONE, WHITE)]);
        assert!(mesh.iter().all(|v| v.normal[..3] == [0.0, 1.0, 0.0]));
        let xs: Vec<f32> = mesh.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs.iter().copied().fold(f32::MAX, f32::min), -5.0);
        assert_eq!(xs.iter().copied().fold(f32::MIN, f32::max), 5.0);
    }

    #[test]
    fn columns_and_labels_are_instances_of_unit_meshes() {
        let series = numbered_series(2);
        let scene = build_scene(&series, ChartKind3D::Column);
        let batches = tessellate(&scene);
        assert_eq!(batches.len(), 2);

        let (boxes, labels) = (&batches[0], &batches[1]);
        assert_eq!(boxes.vertices.len(), 36);
        assert_eq!(boxes.instances.len(), 2);
        let SceneElement::Box { center, size, .. } = &scene.elements[1] else {
            panic!("column scene holds boxes");
        };
        assert_eq!(boxes.instances[1].center[..3], center.to_array());
        assert_eq!(boxes.instances[1].scale[..3], size.to_array());

        assert_eq!(labels.vertices.len(), LABEL_SEGMENTS * LABEL_RINGS * 6);
        assert_eq!(labels.instances.len(), 2);
        assert_eq!(labels.instances[0].color, LABEL_COLOR);
    }

    #[test]
    fn upload_grows_by_two_records_per_row() {
        let record = std::mem::size_of::<MeshInstance>();
        for kind in ChartKind3D::ALL {
            let small = mesh_byte_len(&tessellate(&build_scene(&numbered_series(1300), kind)));
            let large = mesh_byte_len(&tessellate(&build_scene(&numbered_series(1301), kind)));
            assert!(large - small <= 2 * record, "{kind:?}: {} bytes per row", large - small);
            assert!(small < 1 << 20, "{kind:?}: {small} bytes for 1300 rows");
        }
    }

    #[test]
    fn cache_rebuilds_only_on_change() {
        let series = numbered_series(3);
        let done = EntryAnimation::finished();
        let mut cache = SceneCache::default();

        let (_, first) = cache.get(&series, ChartKind3D::Scatter, done);
        let (_, again) = cache.get(&series, ChartKind3D::Scatter, done);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.builds(), 1);

        cache.get(&series, ChartKind3D::Column, done);
        cache.get(&numbered_series(4), ChartKind3D::Column, done);
        let (scene, _) = cache.get(&numbered_series(4), ChartKind3D::Column, EntryAnimation::at_frame(3));
        assert_eq!(scene.labels.len(), 4);
        assert_eq!(cache.builds(), 4);
    }

    #[test]
    fn grid_helper_has_eleven_lines_each_way() {
        assert_eq!(grid_helper_segments().len(), 11 * 4);
    }
}
