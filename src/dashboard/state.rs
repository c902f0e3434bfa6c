//! Dashboard view state management

use std::path::PathBuf;

use crate::api::{HealthResponse, OcrModel};
use crate::config::AppConfig;

/// Current view in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardView {
    #[default]
    Viewer,
    Batch,
    Settings,
}

impl DashboardView {
    pub const ALL: [DashboardView; 3] = [
        DashboardView::Viewer,
        DashboardView::Batch,
        DashboardView::Settings,
    ];

    /// Get the display name for this view
    pub fn name(&self) -> &'static str {
        match self {
            DashboardView::Viewer => "Annotate",
            DashboardView::Batch => "Batch",
            DashboardView::Settings => "Settings",
        }
    }

    /// Get the icon character for this view
    pub fn icon(&self) -> &'static str {
        match self {
            DashboardView::Viewer => "A",
            DashboardView::Batch => "B",
            DashboardView::Settings => "S",
        }
    }
}

/// Something the user asked for. Views only record actions; the app applies
/// them after the frame is laid out.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Open the native file picker for a single image
    PickImage,
    /// Load an image from disk and run detection on it
    LoadImage(PathBuf),
    /// Re-submit the current image with the prompt bar contents
    RerunDetection,
    /// Drop the current image and its results
    NewImage,
    SetSensitivity { class_name: String, percent: u32 },
    ExtractText,
    ExportPng,
    /// Navigate to a view
    Navigate(DashboardView),
    /// Open the native file picker for batch images
    PickBatchFiles,
    RunBatch,
    CheckHealth,
}

/// Overall dashboard state
#[derive(Default)]
pub struct DashboardState {
    /// Current active view
    pub current_view: DashboardView,
    pub viewer: ViewerViewState,
    pub batch: BatchViewState,
    pub settings: SettingsViewState,
    /// Actions recorded during this frame
    pub actions: Vec<UiAction>,
}

impl DashboardState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            viewer: ViewerViewState {
                prompt: config.detection.default_prompt.clone(),
                ocr_model: config.ocr.model,
                ..Default::default()
            },
            settings: SettingsViewState {
                export_dir_input: config
                    .export
                    .directory
                    .as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn push(&mut self, action: UiAction) {
        self.actions.push(action);
    }

    pub fn take_actions(&mut self) -> Vec<UiAction> {
        std::mem::take(&mut self.actions)
    }
}

/// Annotation viewer state
#[derive(Default)]
pub struct ViewerViewState {
    /// Comma-separated class prompt
    pub prompt: String,
    /// Path typed into the upload card
    pub path_input: String,
    pub ocr_model: OcrModel,
    /// Precondition or IO problem to show above the image
    pub notice: Option<String>,
    /// Result of the last export
    pub export_status: Option<ExportStatus>,
    /// Source image texture and the image generation it was built from
    pub source_texture: Option<(u64, egui::TextureHandle)>,
    /// Overlay texture and the redraw revision it was built from
    pub overlay_texture: Option<(u64, egui::TextureHandle)>,
}

impl std::fmt::Debug for ViewerViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerViewState")
            .field("prompt", &self.prompt)
            .field("path_input", &self.path_input)
            .field("ocr_model", &self.ocr_model)
            .field("notice", &self.notice)
            .field("export_status", &self.export_status)
            .field("source_texture", &self.source_texture.as_ref().map(|(g, _)| g))
            .field("overlay_texture", &self.overlay_texture.as_ref().map(|(r, _)| r))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportStatus {
    Saved(PathBuf),
    Failed(String),
}

/// Batch view state
#[derive(Debug, Default)]
pub struct BatchViewState {
    /// Files chosen for the next run
    pub files: Vec<PathBuf>,
    /// Files of the last run that could not be read
    pub notice: Option<String>,
}

/// Settings view state
#[derive(Debug, Default)]
pub struct SettingsViewState {
    /// Unsaved changes flag
    pub has_unsaved_changes: bool,
    pub health: HealthStatus,
    /// Export directory exactly as typed
    pub export_dir_input: String,
}

/// Last answer of the health endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Checking,
    Ready(HealthResponse),
    Unreachable(String),
}
