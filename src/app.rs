use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::data::{loader, Dataset};
use crate::error::{ExportError, LoadError};
use crate::export::{self, CapturedFrame, ExportFormat, ExportRequest};
use crate::insights::{GeminiClient, InsightClient, InsightJob, InsightRequest, InsightState};
use crate::plot3d::mesh::SceneCache;
use crate::plot3d::renderer as plot3d_renderer;
use crate::plot3d::{EntryAnimation, OrbitCamera};
use crate::state::AppState;
use crate::ui::actions::UiAction;
use crate::ui::{chart_view, controls, data_table, insights_panel};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What to do when a screenshot arrives.
enum PendingScreenshot {
    SaveFile(ExportFormat),
    Clipboard,
}

/// Pending async file load result.
struct PendingLoad {
    file_name: String,
    result: Arc<Mutex<Option<Result<Dataset, LoadError>>>>,
}

/// The main SheetSight application.
pub struct SheetSightApp {
    pub state: AppState,
    pub camera: OrbitCamera,
    animation: EntryAnimation,
    scene_cache: SceneCache,
    /// Name of the file behind the current dataset.
    loaded_file: Option<String>,
    /// Screen rect of the chart drawn last frame, used to crop screenshots.
    chart_rect: Option<egui::Rect>,
    /// An error message shown in the footer until dismissed.
    pub error_message: Option<String>,
    client: Arc<dyn InsightClient>,
    pending_load: Option<PendingLoad>,
    insight_job: Option<InsightJob>,
    pending_screenshot: Option<PendingScreenshot>,
}

impl SheetSightApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let state = AppState::new();

        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(15.0));
        style.text_styles.insert(egui::TextStyle::Button, egui::FontId::proportional(14.5));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(22.0));
        style.text_styles.insert(egui::TextStyle::Small, egui::FontId::proportional(12.0));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.window_margin = egui::Margin::same(12);
        ctx.set_style(style);
        ctx.set_visuals(styled_visuals(&state));

        if let Some(render_state) = cc.wgpu_render_state.as_ref() {
            plot3d_renderer::init_3d_resources(render_state);
        } else {
            tracing::warn!("No wgpu render state; 3D charts will not be drawn");
        }

        Self {
            state,
            camera: OrbitCamera::default(),
            animation: EntryAnimation::finished(),
            scene_cache: SceneCache::default(),
            loaded_file: None,
            chart_rect: None,
            error_message: None,
            client: Arc::new(GeminiClient::new(config)),
            pending_load: None,
            insight_job: None,
            pending_screenshot: None,
        }
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Spreadsheets", &loader::SUPPORTED_EXTENSIONS)
            .pick_file()
        {
            self.load_file(&path);
        }
    }

    /// Decode a workbook on a worker thread so the UI stays responsive.
    fn load_file(&mut self, path: &Path) {
        if self.pending_load.is_some() {
            tracing::warn!("Ignoring {:?}: a file is already loading", path);
            return;
        }
        let path_buf: PathBuf = path.to_path_buf();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let result = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);

        std::thread::spawn(move || {
            let loaded = loader::load_file(&path_buf);
            *result_clone.lock().unwrap() = Some(loaded);
        });

        self.pending_load = Some(PendingLoad { file_name, result });
    }

    fn poll_load(&mut self) {
        let Some(pending) = &self.pending_load else {
            return;
        };
        let Some(result) = pending.result.lock().unwrap().take() else {
            return;
        };
        let file_name = pending.file_name.clone();
        self.pending_load = None;

        match result {
            Ok(dataset) => {
                tracing::info!(
                    "Loaded {} rows, {} columns from {}",
                    dataset.len(),
                    dataset.columns().len(),
                    file_name
                );
                if dataset.is_empty() {
                    tracing::warn!("{file_name} has no data rows below the header");
                }
                self.state = std::mem::take(&mut self.state).with_dataset(dataset);
                self.loaded_file = Some(file_name);
                self.chart_rect = None;
            }
            Err(e) => {
                tracing::error!("Failed to load {file_name}: {e}");
                self.error_message = Some(e.to_string());
            }
        }
    }

    fn poll_insights(&mut self) {
        let Some(job) = &self.insight_job else {
            return;
        };
        if let Some(outcome) = job.poll() {
            if let InsightState::Failure(e) = &outcome {
                tracing::error!("Insight request failed: {e}");
            }
            self.state = std::mem::take(&mut self.state).with_insights(outcome);
            self.insight_job = None;
        }
    }

    fn generate_chart(&mut self) {
        match self.state.validate_chart_request() {
            Ok(()) => {
                self.state = std::mem::take(&mut self.state).with_chart_visible(true);
                self.animation = EntryAnimation::default();
            }
            Err(e) => {
                tracing::warn!("Chart request rejected: {e}");
                self.error_message = Some(e.to_string());
            }
        }
    }

    fn generate_insights(&mut self) {
        if self.insight_job.is_some() {
            return;
        }
        let request = InsightRequest::from_state(&self.state);
        let next = match InsightJob::start(Arc::clone(&self.client), &request) {
            Ok(job) => {
                self.insight_job = Some(job);
                InsightState::Loading
            }
            Err(e) => InsightState::Failure(e),
        };
        self.state = std::mem::take(&mut self.state).with_insights(next);
    }

    /// Ask for a screenshot; the export finishes when it arrives next frame.
    fn request_capture(&mut self, ctx: &egui::Context, pending: PendingScreenshot) {
        let is_3d = self.state.chart.is_3d();
        let supported = match &pending {
            PendingScreenshot::SaveFile(format) => export::check_supported(*format, is_3d),
            PendingScreenshot::Clipboard if is_3d => Err(ExportError::ClipboardUnsupportedFor3D),
            PendingScreenshot::Clipboard => Ok(()),
        };
        let result = supported.and_then(|()| {
            if self.state.chart_visible && self.chart_rect.is_some() {
                Ok(())
            } else {
                Err(ExportError::NothingToExport)
            }
        });
        match result {
            Ok(()) => {
                self.pending_screenshot = Some(pending);
                ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
            }
            Err(e) => {
                tracing::warn!("Export rejected: {e}");
                self.error_message = Some(e.to_string());
            }
        }
    }

    fn finish_capture(&mut self, pending: PendingScreenshot, image: &egui::ColorImage, ppp: f32) {
        let Some(rect) = self.chart_rect else {
            self.error_message = Some(ExportError::NothingToExport.to_string());
            return;
        };
        let outcome = export::crop_screenshot(image, rect, ppp).and_then(|cropped| {
            let mut frame = CapturedFrame::new(cropped);
            let is_3d = self.state.chart.is_3d();
            match pending {
                PendingScreenshot::SaveFile(format) => {
                    let title = self.state.chart_title();
                    let request = ExportRequest {
                        is_3d,
                        chart_key: self.state.chart.active_key(),
                        title: &title,
                    };
                    let artifact = export::export_chart(format, request, &mut frame)?;
                    if let Some(path) = rfd::FileDialog::new()
                        .set_file_name(&artifact.file_name)
                        .add_filter(format.filter_name(), &[format.extension()])
                        .save_file()
                    {
                        std::fs::write(&path, &artifact.bytes)
                            .map_err(|e| ExportError::Write(format!("{path:?}: {e}")))?;
                        tracing::info!("Saved chart to {:?}", path);
                    }
                    Ok(())
                }
                PendingScreenshot::Clipboard => {
                    let img = export::clipboard_image(is_3d, &mut frame)?;
                    export::copy_to_clipboard(&img)?;
                    tracing::info!("Copied chart to clipboard");
                    Ok(())
                }
            }
        });
        if let Err(e) = outcome {
            tracing::error!("Export failed: {e}");
            self.error_message = Some(e.to_string());
        }
    }

    fn apply_action(&mut self, ctx: &egui::Context, action: UiAction) {
        let state = std::mem::take(&mut self.state);
        self.state = match action {
            UiAction::OpenFile => {
                self.state = state;
                self.open_file_dialog();
                return;
            }
            UiAction::SetMode(mode) => state.with_mode(mode),
            UiAction::SetAxis(axis, column) => state.with_axis(axis, column),
            UiAction::SetKind2D(kind) => state.with_kind_2d(kind),
            UiAction::SetKind3D(kind) => {
                self.animation = EntryAnimation::default();
                state.with_kind_3d(kind)
            }
            UiAction::SetPreviewRows(limit) => state.with_preview_rows(limit),
            UiAction::ToggleTheme => {
                let theme = state.theme.toggle();
                state.with_theme(theme)
            }
            UiAction::GenerateChart => {
                self.state = state;
                self.generate_chart();
                return;
            }
            UiAction::GenerateInsights => {
                self.state = state;
                self.generate_insights();
                return;
            }
            UiAction::Export(format) => {
                self.state = state;
                self.request_capture(ctx, PendingScreenshot::SaveFile(format));
                return;
            }
            UiAction::CopyImage => {
                self.state = state;
                self.request_capture(ctx, PendingScreenshot::Clipboard);
                return;
            }
            UiAction::ResetCamera => {
                self.camera.reset();
                state
            }
            UiAction::DismissError => {
                self.error_message = None;
                state
            }
        };
    }
}

fn styled_visuals(state: &AppState) -> egui::Visuals {
    let mut vis = state.theme.visuals();
    vis.window_corner_radius = egui::CornerRadius::same(8);
    vis.widgets.noninteractive.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.inactive.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.hovered.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.active.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.open.corner_radius = egui::CornerRadius::same(6);
    vis
}

impl eframe::App for SheetSightApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(styled_visuals(&self.state));

        // ------------------------------------------------------------------
        // 0. Handle screenshot events from previous frame
        // ------------------------------------------------------------------
        if self.pending_screenshot.is_some() {
            let mut screenshot_image: Option<Arc<egui::ColorImage>> = None;
            ctx.input(|i| {
                for event in &i.raw.events {
                    if let egui::Event::Screenshot { image, .. } = event {
                        screenshot_image = Some(image.clone());
                    }
                }
            });
            if let (Some(image), Some(pending)) = (screenshot_image, self.pending_screenshot.take()) {
                self.finish_capture(pending, &image, ctx.pixels_per_point());
            }
        }

        // ------------------------------------------------------------------
        // 1. Dropped files and background work
        // ------------------------------------------------------------------
        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .find(|p| loader::is_supported(p))
        });
        if let Some(path) = dropped {
            self.load_file(&path);
        }

        self.poll_load();
        self.poll_insights();

        // ------------------------------------------------------------------
        // 2. Panels (actions are collected and applied afterwards)
        // ------------------------------------------------------------------
        let mut actions: Vec<UiAction> = Vec::new();

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.visuals_mut().override_text_color = Some(ui.visuals().strong_text_color());
                    ui.heading("SheetSight");
                    ui.visuals_mut().override_text_color = None;

                    ui.separator();
                    if controls::toolbar_btn(ui, "Open Spreadsheet").clicked() {
                        actions.push(UiAction::OpenFile);
                    }
                    if let Some(name) = &self.loaded_file {
                        ui.label(egui::RichText::new(name).weak());
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button(format!("{} Mode", self.state.theme.toggle().label())).clicked() {
                            actions.push(UiAction::ToggleTheme);
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });

        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let summary = match &self.state.dataset {
                        Some(ds) => format!("{} rows, {} columns", ds.len(), ds.columns().len()),
                        None => "No data loaded".to_string(),
                    };
                    ui.label(egui::RichText::new(summary).weak());

                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(255, 80, 80), msg);
                        if ui.small_button("dismiss").clicked() {
                            actions.push(UiAction::DismissError);
                        }
                    }
                });
            });

        let mut chart_rect = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let Some(dataset) = self.state.dataset.clone() else {
                    ui.add_space(80.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Welcome to SheetSight");
                        ui.add_space(12.0);
                        ui.label(
                            egui::RichText::new(
                                "Click \"Open Spreadsheet\" above, or drag-and-drop an Excel file to get started.",
                            )
                            .weak(),
                        );
                    });
                    return;
                };

                data_table::show_data_table(ui, &dataset, self.state.preview_rows, &mut actions);
                ui.add_space(12.0);
                ui.separator();

                controls::show_controls(ui, &self.state, &mut actions);
                ui.add_space(12.0);

                if self.state.chart_visible {
                    chart_rect = chart_view::show_chart(
                        ui,
                        &self.state,
                        &mut self.camera,
                        &mut self.scene_cache,
                        self.animation,
                    );
                    ui.add_space(12.0);
                }

                ui.separator();
                insights_panel::show_insights(ui, &self.state.insights, &mut actions);
            });
        });
        self.chart_rect = chart_rect;

        // ------------------------------------------------------------------
        // 3. Apply collected actions
        // ------------------------------------------------------------------
        for action in actions {
            self.apply_action(ctx, action);
        }

        if self.state.chart_visible && self.state.chart.is_3d() && !self.animation.is_finished() {
            self.animation = self.animation.step();
            ctx.request_repaint();
        }

        if self.pending_load.is_some() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading file...");
                    });
                });
            ctx.request_repaint();
        }

        if self.insight_job.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
