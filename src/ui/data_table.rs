use eframe::egui;
use egui_extras::{Column, TableBuilder};

use crate::data::Dataset;
use crate::state::RowLimit;
use crate::ui::actions::UiAction;

/// Preview of the first rows of the loaded sheet.
pub fn show_data_table(
    ui: &mut egui::Ui,
    dataset: &Dataset,
    limit: RowLimit,
    actions: &mut Vec<UiAction>,
) {
    let total = dataset.len();
    let visible = limit.visible(total);

    ui.horizontal(|ui| {
        ui.strong("Data Preview");
        ui.add_space(12.0);
        ui.label("Show:");
        egui::ComboBox::from_id_salt("preview_rows")
            .selected_text(limit.label())
            .show_ui(ui, |ui| {
                for choice in RowLimit::CHOICES {
                    if ui.selectable_label(choice == limit, choice.label()).clicked() && choice != limit {
                        actions.push(UiAction::SetPreviewRows(choice));
                    }
                }
            });
        ui.label(format!("Showing {visible} of {total} rows"));
    });
    ui.add_space(4.0);

    let columns = dataset.columns();
    if columns.is_empty() {
        ui.label("The sheet has no columns.");
        return;
    }

    egui::ScrollArea::horizontal()
        .id_salt("preview_table_scroll")
        .show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(100.0), columns.len())
                .min_scrolled_height(300.0)
                .header(20.0, |mut header| {
                    for name in columns {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, visible, |mut row| {
                        let record = &dataset.rows()[row.index()];
                        for name in columns {
                            row.col(|ui| {
                                let text = record.get(name).map(|v| v.display()).unwrap_or_default();
                                ui.label(text);
                            });
                        }
                    });
                });
        });
}
