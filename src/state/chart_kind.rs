#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    TwoD,
    ThreeD,
}

impl ChartMode {
    pub fn label(&self) -> &'static str {
        match self {
            ChartMode::TwoD => "2D Charts",
            ChartMode::ThreeD => "3D Charts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind2D {
    #[default]
    Bar,
    Line,
    Pie,
    Scatter,
}

impl ChartKind2D {
    pub const ALL: [ChartKind2D; 4] = [Self::Bar, Self::Line, Self::Pie, Self::Scatter];

    /// Identifier used in prompts and export file names.
    pub fn key(&self) -> &'static str {
        match self {
            ChartKind2D::Bar => "bar",
            ChartKind2D::Line => "line",
            ChartKind2D::Pie => "pie",
            ChartKind2D::Scatter => "scatter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind2D::Bar => "Bar Chart",
            ChartKind2D::Line => "Line Chart",
            ChartKind2D::Pie => "Pie Chart",
            ChartKind2D::Scatter => "Scatter Plot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind3D {
    #[default]
    Column,
    Bar,
    Scatter,
    Surface,
}

impl ChartKind3D {
    pub const ALL: [ChartKind3D; 4] = [Self::Column, Self::Bar, Self::Scatter, Self::Surface];

    pub fn key(&self) -> &'static str {
        match self {
            ChartKind3D::Column => "column3d",
            ChartKind3D::Bar => "bar3d",
            ChartKind3D::Scatter => "scatter3d",
            ChartKind3D::Surface => "surface3d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind3D::Column => "3D Column",
            ChartKind3D::Bar => "3D Bar",
            ChartKind3D::Scatter => "3D Scatter",
            ChartKind3D::Surface => "3D Surface",
        }
    }
}

/// Active mode plus the remembered kind for each mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartSelection {
    pub mode: ChartMode,
    pub kind_2d: ChartKind2D,
    pub kind_3d: ChartKind3D,
}

impl ChartSelection {
    pub fn is_3d(&self) -> bool {
        self.mode == ChartMode::ThreeD
    }

    /// Key of the chart kind in the active mode.
    pub fn active_key(&self) -> &'static str {
        match self.mode {
            ChartMode::TwoD => self.kind_2d.key(),
            ChartMode::ThreeD => self.kind_3d.key(),
        }
    }
}
