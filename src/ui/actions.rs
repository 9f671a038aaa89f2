use crate::export::ExportFormat;
use crate::state::{Axis, ChartKind2D, ChartKind3D, ChartMode, RowLimit};

/// Something the user asked for this frame. Panels collect these and the app
/// applies them after drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    OpenFile,
    SetMode(ChartMode),
    SetAxis(Axis, Option<String>),
    SetKind2D(ChartKind2D),
    SetKind3D(ChartKind3D),
    GenerateChart,
    Export(ExportFormat),
    CopyImage,
    ResetCamera,
    GenerateInsights,
    SetPreviewRows(RowLimit),
    ToggleTheme,
    DismissError,
}
