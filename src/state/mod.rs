pub mod app_state;
pub mod chart_kind;
pub mod theme;

pub use app_state::{AppState, Axis, AxisSelection, RowLimit};
pub use chart_kind::{ChartKind2D, ChartKind3D, ChartMode, ChartSelection};
pub use theme::Theme;
