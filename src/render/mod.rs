pub mod chart2d;

pub use chart2d::{chart_title, draw_chart, ChartCanvas, ChartPalette, ChartSpec};
