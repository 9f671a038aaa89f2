use glam::Vec3;

use crate::processing::EncodedSeries;
use crate::render::chart2d::point_style;
use crate::state::ChartKind3D;

/// Magnitude used for every element when the series has no positive maximum.
pub const FALLBACK_MAGNITUDE: f32 = 0.1;

/// Longest bar or column, in world units.
pub const BAR_EXTENT: f32 = 5.0;
pub const BAR_THICKNESS: f32 = 0.5;
pub const SCATTER_HEIGHT: f32 = 3.0;
pub const SCATTER_RADIUS_SCALE: f32 = 0.5;
pub const SCATTER_RADIUS_MIN: f32 = 0.1;

pub const SURFACE_SIZE: f32 = 10.0;
pub const SURFACE_SEGMENTS: usize = 20;
pub const SURFACE_HEIGHT_DIVISOR: f64 = 10.0;

pub const LABEL_RADIUS: f32 = 0.05;
pub const LABEL_Y: f32 = -0.5;

/// `#3b82f6`
pub const SURFACE_COLOR: [f32; 4] = [59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0, 1.0];
pub const LABEL_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone, PartialEq)]
pub enum SceneElement {
    Box { center: Vec3, size: Vec3, color: [f32; 4] },
    Sphere { center: Vec3, radius: f32, color: [f32; 4] },
    Surface(SurfaceGrid),
}

/// Height field over a square footprint in the XZ plane, centered on the
/// origin. `heights` is row-major with `segments + 1` vertices per side.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    pub size: f32,
    pub segments: usize,
    pub heights: Vec<f32>,
    pub color: [f32; 4],
}

impl SurfaceGrid {
    pub fn side(&self) -> usize {
        self.segments + 1
    }

    /// World position of vertex `(row, col)`. Rows advance along +Z.
    pub fn vertex(&self, row: usize, col: usize) -> Vec3 {
        let step = self.size / self.segments as f32;
        let half = self.size / 2.0;
        Vec3::new(
            col as f32 * step - half,
            self.heights[row * self.side() + col],
            row as f32 * step - half,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelMarker {
    pub position: Vec3,
    pub radius: f32,
    pub text: String,
}

/// Everything needed to draw one 3D chart, before tessellation.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub kind: ChartKind3D,
    pub elements: Vec<SceneElement>,
    pub labels: Vec<LabelMarker>,
}

/// Position along the category axis, centering `n` slots on the origin.
pub fn slot_position(i: usize, n: usize) -> f32 {
    i as f32 - n as f32 / 2.0 + 0.5
}

fn element_color(i: usize) -> [f32; 4] {
    let fill = point_style(i).fill;
    let [r, g, b] = fill.rgb;
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, fill.alpha]
}

/// Values normalized by the series maximum. Missing or non-numeric values
/// count as zero; `None` means the fallback magnitude applies everywhere.
fn normalized(series: &EncodedSeries) -> Option<Vec<f32>> {
    let values = series.numeric_values();
    let max = values.iter().flatten().copied().reduce(f64::max)?;
    if max == 0.0 || !max.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| (v.unwrap_or(0.0) / max) as f32).collect())
}

fn bar_length(ratio: Option<f32>) -> f32 {
    match ratio.map(|r| r * BAR_EXTENT) {
        Some(len) if len != 0.0 && len.is_finite() => len,
        _ => FALLBACK_MAGNITUDE,
    }
}

pub fn build_scene(series: &EncodedSeries, kind: ChartKind3D) -> Scene {
    let n = series.len();
    let ratios = normalized(series);
    let ratio = |i: usize| ratios.as_ref().map(|r| r[i]);

    let elements = match kind {
        ChartKind3D::Column => (0..n)
            .map(|i| {
                let h = bar_length(ratio(i));
                SceneElement::Box {
                    center: Vec3::new(slot_position(i, n), h / 2.0, 0.0),
                    size: Vec3::new(BAR_THICKNESS, h, BAR_THICKNESS),
                    color: element_color(i),
                }
            })
            .collect(),
        ChartKind3D::Bar => (0..n)
            .map(|i| {
                let w = bar_length(ratio(i));
                SceneElement::Box {
                    center: Vec3::new(w / 2.0, slot_position(i, n), 0.0),
                    size: Vec3::new(w, BAR_THICKNESS, BAR_THICKNESS),
                    color: element_color(i),
                }
            })
            .collect(),
        ChartKind3D::Scatter => (0..n)
            .map(|i| {
                let (radius, height) = match ratio(i) {
                    Some(r) => (r * SCATTER_RADIUS_SCALE + SCATTER_RADIUS_MIN, r * SCATTER_HEIGHT),
                    None => (FALLBACK_MAGNITUDE, FALLBACK_MAGNITUDE),
                };
                SceneElement::Sphere {
                    center: Vec3::new(slot_position(i, n), height, (i % 3) as f32 - 1.0),
                    radius,
                    color: element_color(i),
                }
            })
            .collect(),
        ChartKind3D::Surface => vec![SceneElement::Surface(surface_grid(series))],
    };

    let labels = series
        .label_texts()
        .into_iter()
        .enumerate()
        .map(|(i, text)| LabelMarker {
            position: Vec3::new(slot_position(i, n), LABEL_Y, 0.0),
            radius: LABEL_RADIUS,
            text,
        })
        .collect();

    Scene { kind, elements, labels }
}

/// Row `r` of the grid takes its height from value `r`; columns are flat.
fn surface_grid(series: &EncodedSeries) -> SurfaceGrid {
    let side = SURFACE_SEGMENTS + 1;
    let values = series.numeric_values();
    let heights = (0..side * side)
        .map(|k| {
            let row = k / side;
            values
                .get(row)
                .copied()
                .flatten()
                .map(|v| (v / SURFACE_HEIGHT_DIVISOR) as f32)
                .filter(|h| h.is_finite())
                .unwrap_or(0.0)
        })
        .collect();

    SurfaceGrid {
        size: SURFACE_SIZE,
        segments: SURFACE_SEGMENTS,
        heights,
        color: SURFACE_COLOR,
    }
}

/// Grow-in animation played after a chart is generated, counted in frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryAnimation {
    frame: u32,
}

pub const SCALE_STEP: f32 = 0.05;
pub const OPACITY_STEP: f32 = 0.02;

impl EntryAnimation {
    pub fn at_frame(frame: u32) -> Self {
        Self { frame }
    }

    pub fn finished() -> Self {
        Self::at_frame((1.0 / OPACITY_STEP).ceil() as u32)
    }

    pub fn scale(&self) -> f32 {
        (self.frame as f32 * SCALE_STEP).min(1.0)
    }

    pub fn opacity(&self) -> f32 {
        (self.frame as f32 * OPACITY_STEP).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.scale() >= 1.0 && self.opacity() >= 1.0
    }

    /// Advance one frame.
    pub fn step(self) -> Self {
        if self.is_finished() {
            self
        } else {
            Self { frame: self.frame + 1 }
        }
    }

    /// The scene as it looks at this point of the animation. Columns grow up
    /// from the ground, other boxes and spheres scale about their centers, and
    /// the surface fades in.
    pub fn apply(&self, scene: &Scene) -> Scene {
        let s = self.scale();
        let elements = scene
            .elements
            .iter()
            .map(|el| match el {
                SceneElement::Box { center, size, color } if scene.kind == ChartKind3D::Column => {
                    SceneElement::Box {
                        center: Vec3::new(center.x, center.y * s, center.z),
                        size: Vec3::new(size.x, size.y * s, size.z),
                        color: *color,
                    }
                }
                SceneElement::Box { center, size, color } => SceneElement::Box {
                    center: *center,
                    size: *size * s,
                    color: *color,
                },
                SceneElement::Sphere { center, radius, color } => SceneElement::Sphere {
                    center: *center,
                    radius: radius * s,
                    color: *color,
                },
                SceneElement::Surface(grid) => {
                    let mut grid = grid.clone();
                    grid.color[3] *= self.opacity();
                    SceneElement::Surface(grid)
                }
            })
            .collect();

        Scene {
            kind: scene.kind,
            elements,
            labels: scene.labels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    fn series(values: &[Option<f64>]) -> EncodedSeries {
        EncodedSeries {
            labels: (0..values.len()).map(|i| Some(CellValue::Number(i as f64 + 1.0))).collect(),
            values: values.iter().map(|v| v.map(CellValue::Number)).collect(),
        }
    }

    fn boxes(scene: &Scene) -> Vec<(Vec3, Vec3)> {
        scene
            .elements
            .iter()
            .filter_map(|e| match e {
                SceneElement::Box { center, size, .. } => Some((*center, *size)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn column_heights_scale_to_five() {
        let scene = build_scene(&series(&[Some(10.0), Some(20.0)]), ChartKind3D::Column);
        let b = boxes(&scene);
        assert_eq!(b[0].1, Vec3::new(0.5, 2.5, 0.5));
        assert_eq!(b[0].0, Vec3::new(-0.5, 1.25, 0.0));
        assert_eq!(b[1].1.y, 5.0);
        assert_eq!(b[1].0, Vec3::new(0.5, 2.5, 0.0));
    }

    #[test]
    fn zero_height_column_uses_fallback() {
        let scene = build_scene(&series(&[Some(0.0), Some(4.0)]), ChartKind3D::Column);
        assert_eq!(boxes(&scene)[0].1.y, FALLBACK_MAGNITUDE);
    }

    #[test]
    fn all_zero_values_never_produce_nan() {
        for kind in ChartKind3D::ALL {
            let scene = build_scene(&series(&[Some(0.0), Some(0.0), None]), kind);
            for el in &scene.elements {
                match el {
                    SceneElement::Box { center, size, .. } => {
                        assert!(center.is_finite() && size.is_finite());
                        assert!(size.x == FALLBACK_MAGNITUDE || size.y == FALLBACK_MAGNITUDE);
                    }
                    SceneElement::Sphere { center, radius, .. } => {
                        assert_eq!(*radius, FALLBACK_MAGNITUDE);
                        assert_eq!(center.y, FALLBACK_MAGNITUDE);
                    }
                    SceneElement::Surface(grid) => {
                        assert!(grid.heights.iter().all(|h| *h == 0.0));
                    }
                }
            }
        }
    }

    #[test]
    fn bar3d_lies_along_x() {
        let scene = build_scene(&series(&[Some(5.0), Some(10.0), Some(2.0)]), ChartKind3D::Bar);
        let b = boxes(&scene);
        assert_eq!(b[1].1, Vec3::new(5.0, 0.5, 0.5));
        assert_eq!(b[1].0, Vec3::new(2.5, 0.0, 0.0));
        assert_eq!(b[0].0.y, -1.0);
    }

    #[test]
    fn scatter_positions_and_sizes() {
        let scene = build_scene(&series(&[Some(2.0), Some(4.0), Some(1.0), Some(4.0)]), ChartKind3D::Scatter);
        let SceneElement::Sphere { center, radius, .. } = &scene.elements[1] else {
            panic!("expected sphere");
        };
        assert_eq!(*center, Vec3::new(-0.5, 3.0, 0.0));
        assert!((radius - 0.6).abs() < 1e-6);
        let SceneElement::Sphere { center, .. } = &scene.elements[3] else {
            panic!("expected sphere");
        };
        assert_eq!(center.z, -1.0);
    }

    #[test]
    fn surface_height_varies_by_row_only() {
        let scene = build_scene(&series(&[Some(10.0), Some(30.0)]), ChartKind3D::Surface);
        let SceneElement::Surface(grid) = &scene.elements[0] else {
            panic!("expected surface");
        };
        assert_eq!(grid.heights.len(), 21 * 21);
        assert!(grid.heights[..21].iter().all(|h| *h == 1.0));
        assert!(grid.heights[21..42].iter().all(|h| *h == 3.0));
        assert!(grid.heights[42..].iter().all(|h| *h == 0.0));
    }

    #[test]
    fn labels_sit_below_the_elements() {
        let scene = build_scene(&series(&[Some(1.0), Some(2.0)]), ChartKind3D::Column);
        assert_eq!(scene.labels.len(), 2);
        assert_eq!(scene.labels[0].position, Vec3::new(-0.5, -0.5, 0.0));
        assert_eq!(scene.labels[1].text, "2");
    }

    #[test]
    fn element_colors_follow_the_ramp() {
        let scene = build_scene(&series(&[Some(1.0), Some(1.0), Some(1.0)]), ChartKind3D::Column);
        let alphas: Vec<f32> = scene
            .elements
            .iter()
            .map(|e| match e {
                SceneElement::Box { color, .. } => color[3],
                _ => 0.0,
            })
            .collect();
        assert!((alphas[0] - 0.7).abs() < 1e-6);
        assert!((alphas[1] - 0.8).abs() < 1e-6);
        assert!((alphas[2] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn animation_reaches_full_size() {
        let mut anim = EntryAnimation::default();
        let mut frames = 0;
        while !anim.is_finished() {
            anim = anim.step();
            frames += 1;
        }
        // Opacity is the slower of the two ramps.
        assert_eq!(frames, 50);

        let scene = build_scene(&series(&[Some(4.0)]), ChartKind3D::Column);
        let half = EntryAnimation::at_frame(10).apply(&scene);
        let (center, size) = boxes(&half)[0];
        assert_eq!(size.y, 2.5);
        assert_eq!(center.y, 1.25);
    }
}
