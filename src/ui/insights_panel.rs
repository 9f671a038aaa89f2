use eframe::egui;
use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontId};

use crate::insights::InsightState;
use crate::ui::actions::UiAction;

/// A run of insight text, bold when it was wrapped in `**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub bold: bool,
}

/// Split a markdown line on `**` markers. An unmatched trailing marker is
/// kept as literal text.
pub fn markdown_spans(line: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find("**") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("**") else {
            break;
        };
        if open > 0 {
            spans.push(Span { text: &rest[..open], bold: false });
        }
        if close > 0 {
            spans.push(Span { text: &after[..close], bold: true });
        }
        rest = &after[close + 2..];
    }
    if !rest.is_empty() {
        spans.push(Span { text: rest, bold: false });
    }
    spans
}

fn insight_job(line: &str, color: Color32, strong: Color32) -> LayoutJob {
    let mut job = LayoutJob::default();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    for span in markdown_spans(line) {
        let format = TextFormat {
            font_id: FontId::proportional(14.0),
            color: if span.bold { strong } else { color },
            ..Default::default()
        };
        // Default fonts have no bold face; emphasis uses the strong color.
        job.append(span.text, 0.0, format);
    }
    job
}

pub fn show_insights(ui: &mut egui::Ui, insights: &InsightState, actions: &mut Vec<UiAction>) {
    ui.horizontal(|ui| {
        ui.strong("AI Insights");
        ui.add_space(12.0);
        let loading = insights.is_loading();
        let label = if loading { "Generating..." } else { "Generate Insights" };
        if ui
            .add_enabled(!loading, egui::Button::new(label).min_size(egui::vec2(0.0, 26.0)))
            .clicked()
        {
            actions.push(UiAction::GenerateInsights);
        }
        if loading {
            ui.spinner();
        }
    });
    ui.add_space(4.0);

    match insights {
        InsightState::Idle | InsightState::Loading => {}
        InsightState::Failure(err) => {
            ui.colored_label(Color32::from_rgb(255, 80, 80), err.to_string());
        }
        InsightState::Success(list) if list.is_empty() => {
            ui.label("No insights were returned.");
        }
        InsightState::Success(list) => {
            let color = ui.visuals().text_color();
            let strong = ui.visuals().strong_text_color();
            for line in list {
                ui.horizontal_wrapped(|ui| {
                    ui.label("\u{2022}");
                    ui.label(insight_job(line, color, strong));
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_runs_are_split_out() {
        let spans = markdown_spans("**Sales** rose in **Q3** overall");
        assert_eq!(
            spans,
            vec![
                Span { text: "Sales", bold: true },
                Span { text: " rose in ", bold: false },
                Span { text: "Q3", bold: true },
                Span { text: " overall", bold: false },
            ]
        );
    }

    #[test]
    fn unmatched_marker_stays_literal() {
        let spans = markdown_spans("growth of **10%");
        assert_eq!(spans, vec![Span { text: "growth of **10%", bold: false }]);
    }

    #[test]
    fn plain_text_is_one_span() {
        assert_eq!(markdown_spans("flat"), vec![Span { text: "flat", bold: false }]);
        assert!(markdown_spans("").is_empty());
    }
}
