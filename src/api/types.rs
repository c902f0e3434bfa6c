//! Wire types for the detection service
//!
//! Field names follow the service's JSON (`class`, `box`, `text_regions`...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Axis-aligned box in natural image pixels: `[x1, y1, x2, y2]`
pub type BoxCoords = [f32; 4];

/// A single detection inside a class group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bbox: BoxCoords,
    pub score: f32,
}

/// All detections the service returned for one prompt class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionGroup {
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// A detected text box, optionally enriched by an OCR pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    #[serde(rename = "box")]
    pub bbox: BoxCoords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl TextRegion {
    /// Recognized text, if any and non-empty
    pub fn label(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// Stage timings reported by `/api/detect`, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectTimings {
    pub sam3: f64,
    pub dbnet: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

/// Success body of `POST /api/detect`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectResponse {
    pub results: Vec<DetectionGroup>,
    #[serde(default)]
    pub text_regions: Vec<TextRegion>,
    #[serde(default)]
    pub timings: Option<DetectTimings>,
    #[serde(default)]
    pub image_dims: Option<ImageDims>,
}

/// OCR timings; the service sends `{}` when there was nothing to recognize
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct PerfStats {
    #[serde(default)]
    pub preprocess: f64,
    #[serde(default)]
    pub inference: f64,
}

impl PerfStats {
    pub fn total(&self) -> f64 {
        self.preprocess + self.inference
    }
}

/// Success body of `POST /api/extract-text`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractResponse {
    pub extracted_text: Vec<TextRegion>,
    #[serde(default)]
    pub perf_stats: Option<PerfStats>,
}

/// Per-file class counts from a batch run
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchSummary {
    pub filename: String,
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
}

/// Success body of `POST /api/batch-detect`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchResponse {
    pub batch_summary: Vec<BatchSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceStates {
    pub sam3: String,
    pub dbnet: String,
    pub ocr: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    pub device: String,
    pub lazy_load: bool,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthResponse {
    pub services: ServiceStates,
    pub config: ServerSettings,
}

/// Text recognizer the extraction endpoint should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrModel {
    #[default]
    Doctr,
    EasyOcr,
    Paddle,
}

impl OcrModel {
    pub const ALL: [OcrModel; 3] = [OcrModel::Doctr, OcrModel::EasyOcr, OcrModel::Paddle];

    /// Identifier sent in the `model` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrModel::Doctr => "doctr",
            OcrModel::EasyOcr => "easyocr",
            OcrModel::Paddle => "paddle",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OcrModel::Doctr => "docTR",
            OcrModel::EasyOcr => "EasyOCR",
            OcrModel::Paddle => "PaddleOCR",
        }
    }
}

/// An image file held in memory for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(name, bytes))
    }

    /// MIME type guessed from the file extension
    pub fn mime_type(&self) -> &'static str {
        image::ImageFormat::from_path(&self.name)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream")
    }
}

/// Form payload for `/api/detect`
#[derive(Debug, Clone)]
pub struct DetectRequest {
    pub image: ImageFile,
    pub prompts: String,
}

/// Form payload for `/api/extract-text`
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub image: ImageFile,
    /// JSON-encoded text regions
    pub regions: String,
    pub model: OcrModel,
}

/// Form payload for `/api/batch-detect`
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub files: Vec<ImageFile>,
    pub prompts: String,
    /// JSON-encoded class -> threshold map
    pub thresholds: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_response_from_service_json() {
        let body = r#"{
            "status": "success",
            "image_dims": {"width": 640, "height": 480},
            "results": [
                {"class": "cat", "count": 2, "detections": [
                    {"box": [10.5, 20.0, 110.0, 220.0], "score": 0.91},
                    {"box": [300, 40, 380, 90], "score": 0.3}
                ]}
            ],
            "text_regions": [{"box": [1, 2, 30, 12], "confidence": 0.88}],
            "timings": {"sam3": 0.52, "dbnet": 0.04, "total": 0.61}
        }"#;

        let parsed: DetectResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].class_name, "cat");
        assert_eq!(parsed.results[0].detections[1].bbox, [300.0, 40.0, 380.0, 90.0]);
        assert_eq!(parsed.text_regions[0].text, None);
        assert_eq!(parsed.image_dims, Some(ImageDims { width: 640, height: 480 }));
        assert!((parsed.timings.unwrap().total - 0.61).abs() < 1e-9);
    }

    #[test]
    fn test_detect_response_without_optional_fields() {
        let parsed: DetectResponse =
            serde_json::from_str(r#"{"status": "success", "results": []}"#).unwrap();
        assert!(parsed.text_regions.is_empty());
        assert!(parsed.timings.is_none());
    }

    #[test]
    fn test_raw_regions_serialize_without_text() {
        let region = TextRegion {
            bbox: [1.0, 2.0, 3.0, 4.0],
            text: None,
            confidence: None,
        };
        let json = serde_json::to_string(&[region]).unwrap();
        assert_eq!(json, r#"[{"box":[1.0,2.0,3.0,4.0]}]"#);
    }

    #[test]
    fn test_empty_perf_stats() {
        let parsed: ExtractResponse =
            serde_json::from_str(r#"{"status": "success", "extracted_text": [], "perf_stats": {}}"#)
                .unwrap();
        assert_eq!(parsed.perf_stats, Some(PerfStats::default()));
    }

    #[test]
    fn test_ocr_model_ids() {
        assert_eq!(OcrModel::default().as_str(), "doctr");
        assert_eq!(OcrModel::EasyOcr.as_str(), "easyocr");
        let parsed: OcrModel = serde_json::from_str("\"paddle\"").unwrap();
        assert_eq!(parsed, OcrModel::Paddle);
    }

    #[test]
    fn test_image_file_mime() {
        assert_eq!(ImageFile::new("a.png", vec![0u8]).mime_type(), "image/png");
        assert_eq!(ImageFile::new("a.JPG", vec![0u8]).mime_type(), "image/jpeg");
        assert_eq!(
            ImageFile::new("blob", vec![0u8]).mime_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_text_region_label_skips_empty() {
        let mut region = TextRegion {
            bbox: [0.0; 4],
            text: Some(String::new()),
            confidence: Some(0.1),
        };
        assert_eq!(region.label(), None);
        region.text = Some("EXIT".to_string());
        assert_eq!(region.label(), Some("EXIT"));
    }
}
