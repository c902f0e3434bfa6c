//! Upload, OCR and batch controllers
//!
//! Every service round trip is split in two: `begin_*` checks preconditions,
//! raises the busy flag and builds the request; `finish_*` lowers the flag and
//! applies the outcome. A failed call never mutates the session.

use image::RgbaImage;
use tracing::{error, info, warn};

use super::canvas;
use super::render::{self, RenderStats, Scene};
use super::session::{SelectedImage, Session};
use super::threshold::ThresholdModel;
use super::AnnotateError;
use crate::api::{
    ApiError, BatchRequest, BatchResponse, BatchSummary, DetectRequest, DetectResponse,
    ExtractRequest, ExtractResponse, ImageFile, OcrModel,
};

const DETECT_CONNECT_FAILED: &str = "Failed to connect to backend.";
const OCR_FAILED: &str = "Failed to run OCR.";
const BATCH_CONNECT_FAILED: &str = "Error connecting to server.";

/// Detection request state
#[derive(Debug, Clone, Default)]
pub struct UploadStatus {
    /// Loading indicator shown, prompt controls disabled
    pub in_flight: bool,
    /// Last error to show to the user
    pub error: Option<String>,
}

/// Text extraction state
#[derive(Debug, Clone, Default)]
pub struct OcrStatus {
    pub in_flight: bool,
    /// Status line under the extract button
    pub message: String,
}

/// Content of the batch results grid
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BatchGrid {
    #[default]
    Empty,
    Processing(usize),
    Cards(Vec<BatchSummary>),
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct BatchStatus {
    pub in_flight: bool,
    pub grid: BatchGrid,
}

/// Sole owner of the annotation state
#[derive(Debug, Default)]
pub struct Annotator {
    pub session: Session,
    pub thresholds: ThresholdModel,
    pub upload: UploadStatus,
    pub ocr: OcrStatus,
    pub batch: BatchStatus,
    scene: Scene,
    stats: RenderStats,
    revision: u64,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current overlay scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Counts from the last redraw
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Incremented on every redraw
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Recompose the overlay from session and thresholds
    pub fn redraw(&mut self) {
        let (scene, stats) = render::render(&self.session, &self.thresholds);
        self.scene = scene;
        self.stats = stats;
        self.revision += 1;
    }

    /// Overlay raster at the natural size of the image
    pub fn overlay(&self) -> RgbaImage {
        canvas::rasterize(&self.scene)
    }

    /// Source image with the overlay drawn on top
    pub fn annotated_image(&self) -> Option<RgbaImage> {
        let image = self.session.image.as_ref()?;
        Some(canvas::composite(&image.pixels, &self.overlay()))
    }

    // --- Upload ---

    /// Select a new image and build its detection request
    pub fn begin_upload(
        &mut self,
        file: ImageFile,
        prompt: &str,
    ) -> Result<DetectRequest, AnnotateError> {
        if self.upload.in_flight {
            return Err(AnnotateError::Busy("detection"));
        }
        let selected = SelectedImage::decode(file)?;
        info!(
            "Selected {} ({}x{})",
            selected.file.name,
            selected.width(),
            selected.height()
        );

        self.session.select_image(selected);
        self.ocr.message.clear();
        self.redraw();
        self.begin_detection(prompt)
    }

    /// Re-submit the selected image with an edited prompt
    pub fn rerun_detection(&mut self, prompt: &str) -> Result<DetectRequest, AnnotateError> {
        if self.upload.in_flight {
            return Err(AnnotateError::Busy("detection"));
        }
        self.begin_detection(prompt)
    }

    fn begin_detection(&mut self, prompt: &str) -> Result<DetectRequest, AnnotateError> {
        let image = self.session.image.as_ref().ok_or(AnnotateError::NoImage)?;
        let request = DetectRequest {
            image: image.file.clone(),
            prompts: prompt.to_string(),
        };
        self.upload.in_flight = true;
        self.upload.error = None;
        Ok(request)
    }

    pub fn finish_upload(&mut self, outcome: Result<DetectResponse, ApiError>) {
        self.upload.in_flight = false;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                self.upload.error =
                    Some(describe_failure("Detection", &err, DETECT_CONNECT_FAILED));
                return;
            }
        };

        if let Some(t) = response.timings {
            info!(
                "Detection performance: sam3={:.4}s dbnet={:.4}s total={:.4}s",
                t.sam3, t.dbnet, t.total
            );
        }
        if let Some(dims) = response.image_dims {
            if (dims.width, dims.height) != self.session.natural_size() {
                warn!(
                    "Service saw {}x{} but the selected image is {:?}",
                    dims.width,
                    dims.height,
                    self.session.natural_size()
                );
            }
        }

        for group in &response.results {
            self.thresholds.seed(&group.class_name);
        }
        self.session.apply_detection(response);
        self.redraw();
    }

    // --- Slider panel ---

    /// Update one class's cutoff from its slider and redraw locally
    pub fn set_sensitivity(&mut self, class_name: &str, percent: u32) {
        self.thresholds.set_sensitivity(class_name, percent);
        self.redraw();
    }

    // --- OCR ---

    pub fn begin_ocr(&mut self, model: OcrModel) -> Result<ExtractRequest, AnnotateError> {
        if self.ocr.in_flight {
            return Err(AnnotateError::Busy("text extraction"));
        }
        let image = match &self.session.image {
            Some(image) if !self.session.text_regions.is_empty() => image,
            _ => return Err(AnnotateError::NoTextRegions),
        };

        let request = ExtractRequest {
            image: image.file.clone(),
            regions: serde_json::to_string(&self.session.text_regions)?,
            model,
        };
        self.ocr.in_flight = true;
        self.ocr.message = "Running OCR...".to_string();
        Ok(request)
    }

    pub fn finish_ocr(&mut self, outcome: Result<ExtractResponse, ApiError>) {
        self.ocr.in_flight = false;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                self.ocr.message = describe_failure("OCR", &err, OCR_FAILED);
                return;
            }
        };

        let count = response.extracted_text.len();
        self.ocr.message = match response.perf_stats {
            Some(stats) => {
                info!(
                    "OCR layer: preprocessing={:.4}s inference={:.4}s",
                    stats.preprocess, stats.inference
                );
                format!("Extracted in {:.2}s ({} regions)", stats.total(), count)
            }
            None => format!("Extracted text from {} regions.", count),
        };

        self.session.apply_ocr(response.extracted_text);
        self.redraw();
    }

    // --- Batch ---

    /// Entering the batch view starts from an empty grid
    pub fn show_batch(&mut self) {
        if !self.batch.in_flight {
            self.batch.grid = BatchGrid::Empty;
        }
    }

    /// Build a batch request; `None` when there is nothing to send
    pub fn begin_batch(
        &mut self,
        files: Vec<ImageFile>,
        prompt: &str,
    ) -> Result<Option<BatchRequest>, AnnotateError> {
        if self.batch.in_flight {
            return Err(AnnotateError::Busy("batch"));
        }
        if files.is_empty() {
            return Ok(None);
        }

        let request = BatchRequest {
            thresholds: self.thresholds.to_json()?,
            prompts: prompt.to_string(),
            files,
        };
        self.batch.in_flight = true;
        self.batch.grid = BatchGrid::Processing(request.files.len());
        Ok(Some(request))
    }

    pub fn finish_batch(&mut self, outcome: Result<BatchResponse, ApiError>) {
        self.batch.in_flight = false;
        self.batch.grid = match outcome {
            Ok(response) => {
                info!("Batch finished for {} files", response.batch_summary.len());
                BatchGrid::Cards(response.batch_summary)
            }
            Err(err) => BatchGrid::Error(describe_failure("Batch", &err, BATCH_CONNECT_FAILED)),
        };
    }

    // --- Reset ---

    /// Drop the current image and its results; thresholds are kept
    pub fn new_image(&mut self) {
        self.session.clear();
        self.upload.error = None;
        self.ocr.message.clear();
        self.redraw();
    }
}

/// User-facing text for a failed call. Backend bodies are shown raw.
fn describe_failure(operation: &str, err: &ApiError, connect_message: &str) -> String {
    match err.backend_body() {
        Some(raw) => {
            warn!("{} rejected by service: {}", operation, raw);
            format!("Error: {}", raw)
        }
        None => {
            error!("{} request failed: {}", operation, err);
            connect_message.to_string()
        }
    }
}
