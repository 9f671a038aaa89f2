use std::f32::consts::{FRAC_PI_2, TAU};

use egui::{Align2, Color32, Pos2, Rect, Vec2};

use crate::processing::EncodedSeries;
use crate::state::{ChartKind2D, Theme};

/// Base series color (Tailwind blue-500).
pub const SERIES_RGB: [u8; 3] = [59, 130, 246];

/// Unmultiplied RGBA with a fractional alpha, the way chart colors are specified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartColor {
    pub rgb: [u8; 3],
    pub alpha: f32,
}

impl ChartColor {
    pub fn to_color32(self) -> Color32 {
        let [r, g, b] = self.rgb;
        Color32::from_rgba_unmultiplied(r, g, b, (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    pub fn to_css(self) -> String {
        let [r, g, b] = self.rgb;
        format!("rgba({r}, {g}, {b}, {})", (self.alpha * 10.0).round() / 10.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub fill: ChartColor,
    pub border: ChartColor,
}

/// Fill cycles through 0.7, 0.8, 0.9 opacity by index. Only the 0.7 step gets
/// an opaque border; the other steps reuse the fill.
pub fn point_style(index: usize) -> PointStyle {
    let step = index % 3;
    let fill = ChartColor {
        rgb: SERIES_RGB,
        alpha: 0.7 + step as f32 * 0.1,
    };
    let border = if step == 0 {
        ChartColor { alpha: 1.0, ..fill }
    } else {
        fill
    };
    PointStyle { fill, border }
}

pub fn series_styles(n: usize) -> Vec<PointStyle> {
    (0..n).map(point_style).collect()
}

pub fn chart_title(x: &str, y: &str) -> String {
    format!("{y} vs {x}")
}

/// What a 2D chart shows, independent of how it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub series_label: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub styles: Vec<PointStyle>,
}

impl ChartSpec {
    pub fn new(series: &EncodedSeries, x: &str, y: &str) -> Self {
        Self {
            title: chart_title(x, y),
            series_label: y.to_string(),
            labels: series.label_texts(),
            values: series.numeric_values(),
            styles: series_styles(series.len()),
        }
    }

    /// Value range for the Y axis, always including zero.
    pub fn value_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .values
            .iter()
            .flatten()
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
        if hi - lo < f64::EPSILON {
            (lo, lo + 1.0)
        } else {
            (lo, hi)
        }
    }
}

/// Colors that come from the theme rather than the series.
#[derive(Debug, Clone, Copy)]
pub struct ChartPalette {
    pub background: Color32,
    pub text: Color32,
    pub axis: Color32,
    pub grid: Color32,
}

impl ChartPalette {
    pub fn from_theme(theme: Theme) -> Self {
        Self {
            background: theme.plot_bg(),
            text: theme.text_color(),
            axis: theme.axis_color(),
            grid: theme.grid_color(),
        }
    }
}

/// Drawing primitives a 2D chart needs.
pub trait ChartCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color32);
    fn line(&mut self, points: &[Pos2], width: f32, color: Color32);
    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Color32);
    /// `points` must describe a convex polygon.
    fn convex_polygon(&mut self, points: Vec<Pos2>, fill: Color32);
    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32);
}

const Y_TICKS: usize = 5;
const TITLE_SIZE: f32 = 16.0;
const LABEL_SIZE: f32 = 11.0;
const HEADER_HEIGHT: f32 = 56.0;
const MIN_LABEL_SPACING: f32 = 60.0;

pub fn draw_chart(
    spec: &ChartSpec,
    kind: ChartKind2D,
    rect: Rect,
    palette: &ChartPalette,
    canvas: &mut dyn ChartCanvas,
) {
    canvas.fill_rect(rect, palette.background);
    canvas.text(
        Pos2::new(rect.center().x, rect.top() + 8.0),
        Align2::CENTER_TOP,
        &spec.title,
        TITLE_SIZE,
        palette.text,
    );
    draw_legend(spec, rect, palette, canvas);

    let body = Rect::from_min_max(Pos2::new(rect.left(), rect.top() + HEADER_HEIGHT), rect.max);
    match kind {
        ChartKind2D::Pie => draw_pie(spec, body, palette, canvas),
        _ => draw_cartesian(spec, kind, body, palette, canvas),
    }
}

fn draw_legend(spec: &ChartSpec, rect: Rect, palette: &ChartPalette, canvas: &mut dyn ChartCanvas) {
    let y = rect.top() + 38.0;
    let swatch = Rect::from_center_size(Pos2::new(rect.center().x - 30.0, y), Vec2::new(28.0, 10.0));
    let style = point_style(0);
    canvas.fill_rect(swatch, style.fill.to_color32());
    canvas.text(
        Pos2::new(swatch.right() + 6.0, y),
        Align2::LEFT_CENTER,
        &spec.series_label,
        LABEL_SIZE,
        palette.text,
    );
}

fn draw_cartesian(
    spec: &ChartSpec,
    kind: ChartKind2D,
    body: Rect,
    palette: &ChartPalette,
    canvas: &mut dyn ChartCanvas,
) {
    let plot = Rect::from_min_max(
        Pos2::new(body.left() + 56.0, body.top() + 4.0),
        Pos2::new(body.right() - 16.0, body.bottom() - 32.0),
    );
    if plot.width() <= 1.0 || plot.height() <= 1.0 {
        return;
    }

    let (lo, hi) = spec.value_range();
    let to_y = |v: f64| plot.bottom() - ((v - lo) / (hi - lo)) as f32 * plot.height();

    for i in 0..Y_TICKS {
        let v = lo + (hi - lo) * i as f64 / (Y_TICKS - 1) as f64;
        let y = to_y(v);
        canvas.line(&[Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)], 1.0, palette.grid);
        canvas.text(
            Pos2::new(plot.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            &format_tick_value(v),
            LABEL_SIZE,
            palette.text,
        );
    }
    canvas.line(&[plot.left_top(), plot.left_bottom(), plot.right_bottom()], 1.0, palette.axis);

    let n = spec.values.len();
    if n == 0 {
        return;
    }
    let slot = plot.width() / n as f32;
    let center_x = |i: usize| plot.left() + (i as f32 + 0.5) * slot;

    // Thin category labels so they do not overlap.
    let label_step = ((MIN_LABEL_SPACING / slot).ceil() as usize).max(1);
    for (i, label) in spec.labels.iter().enumerate().step_by(label_step) {
        canvas.text(
            Pos2::new(center_x(i), plot.bottom() + 6.0),
            Align2::CENTER_TOP,
            label,
            LABEL_SIZE,
            palette.text,
        );
    }

    match kind {
        ChartKind2D::Bar => {
            let half = (slot * 0.4).max(0.5);
            let base = to_y(0.0);
            for (i, v) in spec.values.iter().enumerate() {
                let Some(v) = v else { continue };
                let top = to_y(*v);
                let bar = Rect::from_min_max(
                    Pos2::new(center_x(i) - half, top.min(base)),
                    Pos2::new(center_x(i) + half, top.max(base)),
                );
                let style = spec.styles[i];
                canvas.fill_rect(bar, style.fill.to_color32());
                canvas.line(
                    &[bar.left_bottom(), bar.left_top(), bar.right_top(), bar.right_bottom()],
                    1.0,
                    style.border.to_color32(),
                );
            }
        }
        ChartKind2D::Line => {
            let stroke = point_style(0).border.to_color32();
            let mut run: Vec<Pos2> = Vec::new();
            for (i, v) in spec.values.iter().enumerate() {
                match v {
                    Some(v) => run.push(Pos2::new(center_x(i), to_y(*v))),
                    None => {
                        if run.len() > 1 {
                            canvas.line(&run, 2.0, stroke);
                        }
                        run.clear();
                    }
                }
            }
            if run.len() > 1 {
                canvas.line(&run, 2.0, stroke);
            }
            draw_markers(spec, 3.0, center_x, to_y, canvas);
        }
        ChartKind2D::Scatter => draw_markers(spec, 4.0, center_x, to_y, canvas),
        ChartKind2D::Pie => {}
    }
}

fn draw_markers(
    spec: &ChartSpec,
    radius: f32,
    center_x: impl Fn(usize) -> f32,
    to_y: impl Fn(f64) -> f32,
    canvas: &mut dyn ChartCanvas,
) {
    for (i, v) in spec.values.iter().enumerate() {
        let Some(v) = v else { continue };
        let style = spec.styles[i];
        canvas.circle(
            Pos2::new(center_x(i), to_y(*v)),
            radius,
            style.fill.to_color32(),
            style.border.to_color32(),
        );
    }
}

/// Widest arc drawn as one polygon; keeps each piece convex.
const MAX_WEDGE: f32 = FRAC_PI_2 / 2.0;

fn draw_pie(spec: &ChartSpec, body: Rect, palette: &ChartPalette, canvas: &mut dyn ChartCanvas) {
    let total: f64 = spec.values.iter().flatten().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return;
    }
    let center = body.center();
    let radius = (body.width().min(body.height()) / 2.0 - 24.0).max(4.0);

    let mut start = -FRAC_PI_2;
    for (i, v) in spec.values.iter().enumerate() {
        let Some(v) = v.filter(|v| *v > 0.0) else { continue };
        let sweep = (v / total) as f32 * TAU;
        let fill = spec.styles[i].fill.to_color32();

        let pieces = (sweep / MAX_WEDGE).ceil().max(1.0) as usize;
        let steps_per_piece = 8;
        for p in 0..pieces {
            let a0 = start + sweep * p as f32 / pieces as f32;
            let a1 = start + sweep * (p + 1) as f32 / pieces as f32;
            let mut points = Vec::with_capacity(steps_per_piece + 2);
            points.push(center);
            for s in 0..=steps_per_piece {
                let a = a0 + (a1 - a0) * s as f32 / steps_per_piece as f32;
                points.push(center + radius * Vec2::angled(a));
            }
            canvas.convex_polygon(points, fill);
        }
        canvas.line(&[center, center + radius * Vec2::angled(start)], 1.0, palette.background);

        if sweep > 0.15 {
            if let Some(label) = spec.labels.get(i) {
                let mid = start + sweep / 2.0;
                canvas.text(
                    center + (radius + 12.0) * Vec2::angled(mid),
                    Align2::CENTER_CENTER,
                    label,
                    LABEL_SIZE,
                    palette.text,
                );
            }
        }
        start += sweep;
    }
}

pub fn format_tick_value(val: f64) -> String {
    if val.abs() >= 1e6 || (val != 0.0 && val.abs() < 1e-3) {
        format!("{val:.2e}")
    } else if val == 0.0 {
        "0".to_string()
    } else {
        let s = format!("{val:.6}");
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        s.to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::CellValue;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        Rect(Rect, Color32),
        Line(Vec<Pos2>, Color32),
        Circle(Pos2, f32),
        Polygon(Vec<Pos2>),
        Text(String),
    }

    #[derive(Default)]
    pub struct RecordingCanvas {
        pub ops: Vec<Op>,
    }

    impl ChartCanvas for RecordingCanvas {
        fn fill_rect(&mut self, rect: Rect, color: Color32) {
            self.ops.push(Op::Rect(rect, color));
        }
        fn line(&mut self, points: &[Pos2], _width: f32, color: Color32) {
            self.ops.push(Op::Line(points.to_vec(), color));
        }
        fn circle(&mut self, center: Pos2, radius: f32, _fill: Color32, _stroke: Color32) {
            self.ops.push(Op::Circle(center, radius));
        }
        fn convex_polygon(&mut self, points: Vec<Pos2>, _fill: Color32) {
            self.ops.push(Op::Polygon(points));
        }
        fn text(&mut self, _pos: Pos2, _anchor: Align2, text: &str, _size: f32, _color: Color32) {
            self.ops.push(Op::Text(text.to_string()));
        }
    }

    fn spec(values: &[Option<f64>]) -> ChartSpec {
        let series = EncodedSeries {
            labels: (0..values.len()).map(|i| Some(CellValue::Text(format!("L{i}")))).collect(),
            values: values.iter().map(|v| v.map(CellValue::Number)).collect(),
        };
        ChartSpec::new(&series, "Month", "Sales")
    }

    fn render(spec: &ChartSpec, kind: ChartKind2D) -> Vec<Op> {
        let mut canvas = RecordingCanvas::default();
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 500.0));
        draw_chart(spec, kind, rect, &ChartPalette::from_theme(Theme::Light), &mut canvas);
        canvas.ops
    }

    #[test]
    fn color_ramp_cycles_every_three_points() {
        let css: Vec<String> = series_styles(4).iter().map(|s| s.fill.to_css()).collect();
        assert_eq!(
            css,
            vec![
                "rgba(59, 130, 246, 0.7)",
                "rgba(59, 130, 246, 0.8)",
                "rgba(59, 130, 246, 0.9)",
                "rgba(59, 130, 246, 0.7)",
            ]
        );
    }

    #[test]
    fn only_the_lightest_step_gets_an_opaque_border() {
        assert_eq!(point_style(0).border.alpha, 1.0);
        assert_eq!(point_style(1).border, point_style(1).fill);
        assert_eq!(point_style(2).border, point_style(2).fill);
        assert_eq!(point_style(3).border.alpha, 1.0);
    }

    #[test]
    fn title_puts_y_before_x() {
        assert_eq!(chart_title("Month", "Sales"), "Sales vs Month");
        assert!(render(&spec(&[Some(1.0)]), ChartKind2D::Bar).contains(&Op::Text("Sales vs Month".into())));
    }

    #[test]
    fn bar_chart_draws_one_bar_per_numeric_value() {
        let s = spec(&[Some(10.0), None, Some(20.0)]);
        let ops = render(&s, ChartKind2D::Bar);
        let bar_fills: Vec<_> = ops
            .iter()
            .filter(|op| matches!(op, Op::Rect(_, c) if *c == point_style(0).fill.to_color32() || *c == point_style(2).fill.to_color32()))
            .collect();
        // Legend swatch plus two bars.
        assert_eq!(bar_fills.len(), 3);
    }

    #[test]
    fn taller_value_gives_taller_bar() {
        let s = spec(&[Some(10.0), Some(20.0)]);
        let ops = render(&s, ChartKind2D::Bar);
        let heights: Vec<f32> = ops
            .iter()
            .filter_map(|op| match op {
                Op::Rect(r, _) if r.width() < 700.0 && r.height() > 10.0 => Some(r.height()),
                _ => None,
            })
            .collect();
        assert_eq!(heights.len(), 2);
        assert!((heights[1] - 2.0 * heights[0]).abs() < 1.0);
    }

    #[test]
    fn scatter_draws_markers_only_for_numbers() {
        let ops = render(&spec(&[Some(1.0), None, Some(3.0)]), ChartKind2D::Scatter);
        assert_eq!(ops.iter().filter(|op| matches!(op, Op::Circle(..))).count(), 2);
    }

    #[test]
    fn pie_skips_non_positive_slices() {
        let ops = render(&spec(&[Some(1.0), Some(0.0), Some(-2.0), Some(3.0)]), ChartKind2D::Pie);
        assert!(ops.iter().any(|op| matches!(op, Op::Polygon(_))));
        assert!(ops.contains(&Op::Text("L0".into())));
        assert!(!ops.contains(&Op::Text("L1".into())));
        assert!(!ops.contains(&Op::Text("L2".into())));
    }

    #[test]
    fn y_range_includes_zero() {
        assert_eq!(spec(&[Some(5.0), Some(10.0)]).value_range(), (0.0, 10.0));
        assert_eq!(spec(&[Some(-4.0), Some(2.0)]).value_range(), (-4.0, 2.0));
        assert_eq!(spec(&[None]).value_range(), (0.0, 1.0));
    }
}
