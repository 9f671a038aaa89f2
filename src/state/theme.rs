use egui::{Color32, Visuals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    /// Background of the chart area, 2D and 3D alike.
    pub fn plot_bg(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(24, 24, 27),
            Theme::Light => Color32::from_rgb(255, 255, 255),
        }
    }

    pub fn grid_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgba_premultiplied(100, 100, 100, 60),
            Theme::Light => Color32::from_rgba_premultiplied(180, 180, 180, 80),
        }
    }

    pub fn axis_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(170),
            Theme::Light => Color32::from_gray(90),
        }
    }

    pub fn text_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(220),
            Theme::Light => Color32::from_gray(40),
        }
    }

    /// Grid helper lines in the 3D scene, as linear RGBA.
    pub fn scene_grid_rgba(&self) -> [f32; 4] {
        match self {
            Theme::Dark => [0.45, 0.45, 0.45, 1.0],
            Theme::Light => [0.53, 0.53, 0.53, 1.0],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}
