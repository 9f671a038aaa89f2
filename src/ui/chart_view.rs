use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke};

use crate::plot3d::gpu_types::Line3DData;
use crate::plot3d::mesh::{grid_helper_segments, SceneCache};
use crate::plot3d::renderer::create_scene_paint_callback;
use crate::plot3d::{EntryAnimation, OrbitCamera};
use crate::render::{draw_chart, ChartCanvas, ChartPalette, ChartSpec};
use crate::state::{AppState, ChartMode};

const CHART_HEIGHT: f32 = 400.0;
const GRID_LINE_WIDTH: f32 = 1.0;

/// `ChartCanvas` backed by an egui painter.
pub struct PainterCanvas<'p> {
    painter: &'p egui::Painter,
}

impl<'p> PainterCanvas<'p> {
    pub fn new(painter: &'p egui::Painter) -> Self {
        Self { painter }
    }
}

impl ChartCanvas for PainterCanvas<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.painter.rect_filled(rect, 0.0, color);
    }

    fn line(&mut self, points: &[Pos2], width: f32, color: Color32) {
        if points.len() >= 2 {
            self.painter
                .add(egui::Shape::line(points.to_vec(), Stroke::new(width, color)));
        }
    }

    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Color32) {
        self.painter
            .circle(center, radius, fill, Stroke::new(1.0, stroke));
    }

    fn convex_polygon(&mut self, points: Vec<Pos2>, fill: Color32) {
        self.painter
            .add(egui::Shape::convex_polygon(points, fill, Stroke::NONE));
    }

    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32) {
        self.painter
            .text(pos, anchor, text, FontId::proportional(size), color);
    }
}

/// Draw the visible chart. Returns the screen rect it occupies, which is what
/// image export captures.
pub fn show_chart(
    ui: &mut egui::Ui,
    state: &AppState,
    camera: &mut OrbitCamera,
    scene_cache: &mut SceneCache,
    animation: EntryAnimation,
) -> Option<Rect> {
    let series = state.encoded_series()?;
    match state.chart.mode {
        ChartMode::TwoD => Some(show_chart_2d(ui, state, &series)),
        ChartMode::ThreeD => Some(show_chart_3d(ui, state, &series, camera, scene_cache, animation)),
    }
}

fn show_chart_2d(
    ui: &mut egui::Ui,
    state: &AppState,
    series: &crate::processing::EncodedSeries,
) -> Rect {
    let width = ui.available_width();
    let (rect, _response) = ui.allocate_exact_size(egui::vec2(width, CHART_HEIGHT), egui::Sense::hover());
    let painter = ui.painter_at(rect);

    let spec = ChartSpec::new(
        series,
        state.axes.x.as_deref().unwrap_or_default(),
        state.axes.y.as_deref().unwrap_or_default(),
    );
    let palette = ChartPalette::from_theme(state.theme);
    let mut canvas = PainterCanvas::new(&painter);
    draw_chart(&spec, state.chart.kind_2d, rect, &palette, &mut canvas);
    rect
}

fn show_chart_3d(
    ui: &mut egui::Ui,
    state: &AppState,
    series: &crate::processing::EncodedSeries,
    camera: &mut OrbitCamera,
    scene_cache: &mut SceneCache,
    animation: EntryAnimation,
) -> Rect {
    let width = ui.available_width();
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(width, CHART_HEIGHT), egui::Sense::click_and_drag());
    camera.handle_input(&response);

    let (scene, batches) = scene_cache.get(series, state.chart.kind_3d, animation);
    let grid = Line3DData {
        segments: grid_helper_segments(),
        color: state.theme.scene_grid_rgba(),
        line_width: GRID_LINE_WIDTH,
    };

    let bg = state.theme.plot_bg();
    let bg_color = [
        bg.r() as f32 / 255.0,
        bg.g() as f32 / 255.0,
        bg.b() as f32 / 255.0,
        1.0,
    ];

    let ppp = ui.ctx().pixels_per_point();
    let viewport_size = [(rect.width() * ppp) as u32, (rect.height() * ppp) as u32];
    let aspect = rect.width() / rect.height().max(1.0);

    let painter = ui.painter_at(rect);
    painter.add(create_scene_paint_callback(
        rect,
        batches,
        vec![grid],
        camera.uniforms(aspect),
        bg_color,
        viewport_size,
    ));

    // Category names float just below their marker spheres.
    let text_color = state.theme.text_color();
    for label in &scene.labels {
        if let Some(pos) = camera.project(label.position, rect) {
            if rect.contains(pos) {
                painter.text(
                    pos + egui::vec2(0.0, 4.0),
                    Align2::CENTER_TOP,
                    &label.text,
                    FontId::proportional(11.0),
                    text_color,
                );
            }
        }
    }

    painter.text(
        rect.left_bottom() + egui::vec2(8.0, -8.0),
        Align2::LEFT_BOTTOM,
        "Drag to rotate | Scroll to zoom | Right-drag to pan | Double-click to reset",
        FontId::proportional(11.0),
        text_color.gamma_multiply(0.7),
    );
    rect
}
