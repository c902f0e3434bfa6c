//! Dashboard application entry point

use eframe::egui;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::annotate::Annotator;
use crate::api::ImageFile;
use crate::config::{self, AppConfig};
use crate::dashboard::components::{render_sidebar, SidebarInfo};
use crate::dashboard::dispatch::{ApiEvent, Dispatcher};
use crate::dashboard::state::{DashboardState, DashboardView, ExportStatus, HealthStatus, UiAction};
use crate::dashboard::theme;
use crate::dashboard::views::{render_batch_view, render_settings_view, render_viewer_view};
use crate::storage;

/// Extensions offered by the file pickers
const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "tiff", "webp"];

/// The main dashboard application
pub struct AnnotatorApp {
    /// Settings shared with the dispatcher
    config: Arc<RwLock<AppConfig>>,
    /// Dashboard-specific state
    state: DashboardState,
    /// Session, thresholds and controller state
    annotator: Annotator,
    dispatcher: Dispatcher,
    /// Whether theme has been applied
    theme_applied: bool,
}

impl AnnotatorApp {
    pub fn new(config: Arc<RwLock<AppConfig>>, dispatcher: Dispatcher) -> Self {
        let state = DashboardState::new(&config.read());
        Self {
            config,
            state,
            annotator: Annotator::new(),
            dispatcher,
            theme_applied: false,
        }
    }

    /// Upload `path` as soon as the first frame runs
    pub fn with_initial_image(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.state.push(UiAction::LoadImage(path));
        }
        self
    }

    /// Create eframe options for the dashboard window
    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1280.0, 820.0])
                .with_min_inner_size([900.0, 560.0])
                .with_drag_and_drop(true)
                .with_title("Rapid Annotator"),
            ..Default::default()
        }
    }

    /// Apply outcomes of finished service calls
    fn process_api_events(&mut self) {
        for event in self.dispatcher.drain() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Detected(outcome) => self.annotator.finish_upload(outcome),
            ApiEvent::Extracted(outcome) => self.annotator.finish_ocr(outcome),
            ApiEvent::Batched(outcome) => self.annotator.finish_batch(outcome),
            ApiEvent::Health(outcome) => {
                self.state.settings.health = match outcome {
                    Ok(report) => {
                        info!("Detection service is up on {}", report.config.device);
                        HealthStatus::Ready(report)
                    }
                    Err(e) => {
                        warn!("Health check failed: {}", e);
                        HealthStatus::Unreachable(e.to_string())
                    }
                };
            }
        }
    }

    /// Images dropped onto the window are uploaded like picked ones
    fn process_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        match (file.path, file.bytes) {
            (Some(path), _) => self.state.push(UiAction::LoadImage(path)),
            (None, Some(bytes)) => self.upload(ImageFile::new(file.name, bytes)),
            (None, None) => warn!("Dropped file {:?} has neither path nor contents", file.name),
        }
    }

    fn process_actions(&mut self) {
        for action in self.state.take_actions() {
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::PickImage => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("images", &IMAGE_EXTENSIONS)
                    .pick_file()
                {
                    self.load_image(&path);
                }
            }
            UiAction::LoadImage(path) => self.load_image(&path),
            UiAction::RerunDetection => {
                let prompt = self.state.viewer.prompt.clone();
                match self.annotator.rerun_detection(&prompt) {
                    Ok(request) => {
                        self.state.viewer.notice = None;
                        self.dispatcher.detect(request);
                    }
                    Err(e) => self.state.viewer.notice = Some(e.to_string()),
                }
            }
            UiAction::NewImage => {
                self.annotator.new_image();
                self.state.viewer.path_input.clear();
                self.state.viewer.notice = None;
                self.state.viewer.export_status = None;
            }
            UiAction::SetSensitivity { class_name, percent } => {
                self.annotator.set_sensitivity(&class_name, percent);
            }
            UiAction::ExtractText => match self.annotator.begin_ocr(self.state.viewer.ocr_model) {
                Ok(request) => {
                    self.state.viewer.notice = None;
                    self.dispatcher.extract_text(request);
                }
                Err(e) => self.state.viewer.notice = Some(e.to_string()),
            },
            UiAction::ExportPng => {
                self.state.viewer.export_status = Some(match self.export() {
                    Ok(path) => ExportStatus::Saved(path),
                    Err(e) => {
                        error!("Export failed: {:#}", e);
                        ExportStatus::Failed(format!("Export failed: {}", e))
                    }
                });
            }
            UiAction::Navigate(view) => {
                if view == DashboardView::Batch {
                    self.annotator.show_batch();
                }
                self.state.current_view = view;
            }
            UiAction::PickBatchFiles => {
                if let Some(files) = rfd::FileDialog::new()
                    .add_filter("images", &IMAGE_EXTENSIONS)
                    .pick_files()
                {
                    self.state.batch.files = files;
                    self.state.batch.notice = None;
                }
            }
            UiAction::RunBatch => self.run_batch(),
            UiAction::CheckHealth => {
                self.state.settings.health = HealthStatus::Checking;
                self.dispatcher.check_health();
            }
        }
    }

    fn load_image(&mut self, path: &Path) {
        match ImageFile::read(path) {
            Ok(file) => self.upload(file),
            Err(e) => {
                warn!("Could not read {:?}: {}", path, e);
                self.state.viewer.notice =
                    Some(format!("Could not read {}: {}", path.display(), e));
            }
        }
    }

    fn upload(&mut self, file: ImageFile) {
        let prompt = self.state.viewer.prompt.clone();
        match self.annotator.begin_upload(file, &prompt) {
            Ok(request) => {
                self.state.viewer.notice = None;
                self.state.viewer.export_status = None;
                self.dispatcher.detect(request);
            }
            Err(e) => self.state.viewer.notice = Some(e.to_string()),
        }
    }

    fn run_batch(&mut self) {
        let mut files = Vec::new();
        let mut skipped = Vec::new();
        for path in &self.state.batch.files {
            match ImageFile::read(path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!("Skipping {:?}: {}", path, e);
                    skipped.push(path.display().to_string());
                }
            }
        }

        self.state.batch.notice = match (files.is_empty(), skipped.len()) {
            (_, 0) => None,
            (true, _) => Some("None of the selected files could be read.".to_string()),
            (false, n) => Some(format!("Skipped {} unreadable file(s): {}", n, skipped.join(", "))),
        };

        let prompt = self.state.viewer.prompt.clone();
        match self.annotator.begin_batch(files, &prompt) {
            Ok(Some(request)) => self.dispatcher.batch_detect(request),
            Ok(None) => {}
            Err(e) => warn!("Batch not started: {}", e),
        }
    }

    fn export(&self) -> anyhow::Result<PathBuf> {
        let image = self
            .annotator
            .session
            .image
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no image selected"))?;
        let annotated = self
            .annotator
            .annotated_image()
            .ok_or_else(|| anyhow::anyhow!("no image selected"))?;

        let configured = self.config.read().export.directory.clone();
        let dir = match configured {
            Some(dir) => dir,
            None => storage::get_data_dir()?,
        };
        storage::export_annotated(&annotated, &image.file.name, &dir)
    }

    /// Views whose requests have not come back yet
    fn busy_views(&self) -> Vec<DashboardView> {
        let mut busy = Vec::new();
        if self.annotator.upload.in_flight || self.annotator.ocr.in_flight {
            busy.push(DashboardView::Viewer);
        }
        if self.annotator.batch.in_flight {
            busy.push(DashboardView::Batch);
        }
        busy
    }

    /// Persist settings edited in the settings view
    fn save_settings_if_changed(&mut self) {
        if !self.state.settings.has_unsaved_changes {
            return;
        }
        self.state.settings.has_unsaved_changes = false;

        let result = storage::config_path()
            .and_then(|path| config::save_config(&self.config.read(), &path).map(|_| path));
        match result {
            Ok(path) => info!("Saved configuration to {:?}", path),
            Err(e) => error!("Failed to save configuration: {}", e),
        }
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme once
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        self.process_api_events();
        self.process_dropped_files(ctx);

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .default_width(180.0)
            .show(ctx, |ui| {
                let busy = self.busy_views();
                let server = self.config.read().server.base_url.clone();
                let info = SidebarInfo {
                    current_view: self.state.current_view,
                    busy: &busy,
                    server: &server,
                };
                if let Some(view) = render_sidebar(ui, info) {
                    self.state.push(UiAction::Navigate(view));
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none().inner_margin(24.0).show(ui, |ui| {
                let DashboardState {
                    current_view,
                    viewer,
                    batch,
                    settings,
                    actions,
                } = &mut self.state;

                match current_view {
                    DashboardView::Viewer => {
                        render_viewer_view(ui, viewer, &self.annotator, actions);
                    }
                    DashboardView::Batch => {
                        render_batch_view(ui, batch, &mut viewer.prompt, &self.annotator, actions);
                    }
                    DashboardView::Settings => {
                        render_settings_view(ui, settings, &self.config, actions);
                    }
                }
            });
        });

        self.process_actions();
        self.save_settings_if_changed();

        // Keep spinners animated while anything is in flight
        if self.annotator.upload.in_flight
            || self.annotator.ocr.in_flight
            || self.annotator.batch.in_flight
        {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

/// Run the dashboard application
pub fn run_dashboard(
    config: Arc<RwLock<AppConfig>>,
    mut dispatcher: Dispatcher,
    initial_image: Option<PathBuf>,
) -> Result<(), eframe::Error> {
    eframe::run_native(
        "Rapid Annotator",
        AnnotatorApp::options(),
        Box::new(move |cc| {
            dispatcher.set_repaint_context(cc.egui_ctx.clone());
            let app = AnnotatorApp::new(config, dispatcher).with_initial_image(initial_image);
            Ok(Box::new(app))
        }),
    )
}
