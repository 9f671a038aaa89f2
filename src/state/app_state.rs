use std::sync::Arc;

use crate::data::Dataset;
use crate::error::ChartRequestError;
use crate::insights::InsightState;
use crate::processing::{encode, EncodedSeries};
use crate::state::chart_kind::{ChartKind2D, ChartKind3D, ChartMode, ChartSelection};
use crate::state::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn label(&self) -> &'static str {
        match self {
            Axis::X => "X-Axis",
            Axis::Y => "Y-Axis",
            Axis::Z => "Z-Axis",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisSelection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
}

impl AxisSelection {
    pub fn get(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::X => self.x.as_deref(),
            Axis::Y => self.y.as_deref(),
            Axis::Z => self.z.as_deref(),
        }
    }

    fn slot(&mut self, axis: Axis) -> &mut Option<String> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// Row count shown in the data preview table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimit {
    Rows(usize),
    All,
}

impl RowLimit {
    pub const CHOICES: [RowLimit; 6] = [
        RowLimit::Rows(5),
        RowLimit::Rows(10),
        RowLimit::Rows(20),
        RowLimit::Rows(50),
        RowLimit::Rows(100),
        RowLimit::All,
    ];

    pub fn visible(&self, total: usize) -> usize {
        match self {
            RowLimit::Rows(n) => (*n).min(total),
            RowLimit::All => total,
        }
    }

    pub fn label(&self) -> String {
        match self {
            RowLimit::Rows(n) => format!("{n} rows"),
            RowLimit::All => "All rows".to_string(),
        }
    }
}

impl Default for RowLimit {
    fn default() -> Self {
        RowLimit::Rows(5)
    }
}

/// Everything the UI renders from. Transitions consume the current value and
/// return its successor.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub dataset: Option<Arc<Dataset>>,
    pub axes: AxisSelection,
    pub chart: ChartSelection,
    pub chart_visible: bool,
    pub insights: InsightState,
    pub preview_rows: RowLimit,
    pub theme: Theme,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly loaded dataset. Axis choices survive; the chart is
    /// hidden until regenerated.
    pub fn with_dataset(self, dataset: Dataset) -> Self {
        Self {
            dataset: Some(Arc::new(dataset)),
            chart_visible: false,
            ..self
        }
    }

    pub fn with_mode(self, mode: ChartMode) -> Self {
        let chart_visible = self.chart_visible && self.chart.mode == mode;
        Self {
            chart: ChartSelection { mode, ..self.chart },
            chart_visible,
            ..self
        }
    }

    pub fn with_axis(mut self, axis: Axis, column: Option<String>) -> Self {
        *self.axes.slot(axis) = column;
        self
    }

    pub fn with_kind_2d(self, kind_2d: ChartKind2D) -> Self {
        Self {
            chart: ChartSelection { kind_2d, ..self.chart },
            ..self
        }
    }

    pub fn with_kind_3d(self, kind_3d: ChartKind3D) -> Self {
        Self {
            chart: ChartSelection { kind_3d, ..self.chart },
            ..self
        }
    }

    pub fn with_chart_visible(self, chart_visible: bool) -> Self {
        Self { chart_visible, ..self }
    }

    pub fn with_insights(self, insights: InsightState) -> Self {
        Self { insights, ..self }
    }

    pub fn with_preview_rows(self, preview_rows: RowLimit) -> Self {
        Self { preview_rows, ..self }
    }

    pub fn with_theme(self, theme: Theme) -> Self {
        Self { theme, ..self }
    }

    /// Whether a Generate Chart press may show the chart.
    pub fn validate_chart_request(&self) -> Result<(), ChartRequestError> {
        if self.dataset.is_none() {
            return Err(ChartRequestError::NoData);
        }
        match self.chart.mode {
            ChartMode::TwoD if self.axes.x.is_none() || self.axes.y.is_none() => {
                Err(ChartRequestError::MissingAxes2D)
            }
            ChartMode::ThreeD
                if self.axes.x.is_none() || self.axes.y.is_none() || self.axes.z.is_none() =>
            {
                Err(ChartRequestError::MissingAxes3D)
            }
            _ => Ok(()),
        }
    }

    /// Series for the current selection, recomputed on every call.
    pub fn encoded_series(&self) -> Option<EncodedSeries> {
        encode(self.dataset.as_deref(), self.axes.x.as_deref(), self.axes.y.as_deref())
    }

    pub fn chart_title(&self) -> String {
        crate::render::chart_title(
            self.axes.x.as_deref().unwrap_or_default(),
            self.axes.y.as_deref().unwrap_or_default(),
        )
    }
}
