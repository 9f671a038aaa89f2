use eframe::egui;

use crate::export::ExportFormat;
use crate::state::{AppState, Axis, ChartKind2D, ChartKind3D, ChartMode};
use crate::ui::actions::UiAction;

pub(crate) fn toolbar_btn(ui: &mut egui::Ui, label: &str) -> egui::Response {
    ui.add(egui::Button::new(label).min_size(egui::vec2(0.0, 26.0)))
}

pub(crate) fn toolbar_toggle_btn(ui: &mut egui::Ui, label: &str, active: bool) -> egui::Response {
    let btn = if active {
        egui::Button::new(egui::RichText::new(label).strong())
            .fill(ui.visuals().selection.bg_fill)
            .min_size(egui::vec2(0.0, 26.0))
    } else {
        egui::Button::new(label).min_size(egui::vec2(0.0, 26.0))
    };
    ui.add(btn)
}

/// Mode tabs, axis pickers, chart type buttons and the chart/export buttons.
pub fn show_controls(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<UiAction>) {
    ui.horizontal(|ui| {
        for mode in [ChartMode::TwoD, ChartMode::ThreeD] {
            if toolbar_toggle_btn(ui, mode.label(), state.chart.mode == mode).clicked()
                && state.chart.mode != mode
            {
                actions.push(UiAction::SetMode(mode));
            }
        }
    });
    ui.add_space(6.0);

    let columns: &[String] = state.dataset.as_deref().map(|d| d.columns()).unwrap_or(&[]);
    let mut axes = vec![Axis::X, Axis::Y];
    if state.chart.is_3d() {
        axes.push(Axis::Z);
    }

    ui.add_enabled_ui(!columns.is_empty(), |ui| {
        ui.horizontal_wrapped(|ui| {
            for axis in axes {
                ui.label(axis.label());
                let current = state.axes.get(axis);
                egui::ComboBox::from_id_salt(("axis_select", axis.label()))
                    .selected_text(current.unwrap_or("Select column"))
                    .width(160.0)
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(current.is_none(), "Select column").clicked() {
                            actions.push(UiAction::SetAxis(axis, None));
                        }
                        for col in columns {
                            if ui.selectable_label(current == Some(col.as_str()), col).clicked() {
                                actions.push(UiAction::SetAxis(axis, Some(col.clone())));
                            }
                        }
                    });
                ui.add_space(8.0);
            }
        });
    });
    ui.add_space(6.0);

    ui.horizontal_wrapped(|ui| {
        match state.chart.mode {
            ChartMode::TwoD => {
                for kind in ChartKind2D::ALL {
                    if toolbar_toggle_btn(ui, kind.label(), state.chart.kind_2d == kind).clicked() {
                        actions.push(UiAction::SetKind2D(kind));
                    }
                }
            }
            ChartMode::ThreeD => {
                for kind in ChartKind3D::ALL {
                    if toolbar_toggle_btn(ui, kind.label(), state.chart.kind_3d == kind).clicked() {
                        actions.push(UiAction::SetKind3D(kind));
                    }
                }
            }
        }
    });
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        let generate = egui::Button::new(egui::RichText::new("Generate Chart").strong())
            .min_size(egui::vec2(140.0, 28.0));
        if ui.add(generate).clicked() {
            actions.push(UiAction::GenerateChart);
        }

        if state.chart_visible {
            ui.separator();
            if toolbar_btn(ui, "Download PNG").clicked() {
                actions.push(UiAction::Export(ExportFormat::Png));
            }
            if toolbar_btn(ui, "Download PDF").clicked() {
                actions.push(UiAction::Export(ExportFormat::Pdf));
            }
            if toolbar_btn(ui, "Copy Image").on_hover_text("Copy chart to clipboard").clicked() {
                actions.push(UiAction::CopyImage);
            }
            if state.chart.is_3d()
                && toolbar_btn(ui, "Reset View").on_hover_text("Return the camera to its start").clicked()
            {
                actions.push(UiAction::ResetCamera);
            }
        }
    });
}
