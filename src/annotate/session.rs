//! Session state for the image currently on screen

use image::RgbaImage;
use std::sync::Arc;

use crate::api::{DetectResponse, DetectTimings, DetectionGroup, ImageFile, TextRegion};

/// The selected image together with its decoded pixels
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub file: ImageFile,
    pub pixels: Arc<RgbaImage>,
}

impl SelectedImage {
    /// Decode the file to learn its natural size
    pub fn decode(file: ImageFile) -> Result<Self, image::ImageError> {
        let pixels = image::load_from_memory(&file.bytes)?.to_rgba8();
        Ok(Self {
            file,
            pixels: Arc::new(pixels),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Everything the renderer reads. Written only by [`crate::annotate::Annotator`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub image: Option<SelectedImage>,
    pub groups: Vec<DetectionGroup>,
    pub text_regions: Vec<TextRegion>,
    pub ocr_results: Vec<TextRegion>,
    pub timings: Option<DetectTimings>,
    /// Bumped whenever the selected image changes
    pub image_generation: u64,
    /// Bumped whenever the detection set is replaced
    pub detection_generation: u64,
}

impl Session {
    /// Natural pixel size of the selected image, `(0, 0)` without one
    pub fn natural_size(&self) -> (u32, u32) {
        self.image
            .as_ref()
            .map(|i| (i.width(), i.height()))
            .unwrap_or((0, 0))
    }

    /// Make `image` current. Results of the previous image no longer apply.
    pub fn select_image(&mut self, image: SelectedImage) {
        self.clear();
        self.image = Some(image);
    }

    /// Replace detection groups and text regions wholesale. Previous OCR output
    /// belonged to the old regions and is dropped.
    pub fn apply_detection(&mut self, response: DetectResponse) {
        self.groups = response.results;
        self.text_regions = response.text_regions;
        self.ocr_results.clear();
        self.timings = response.timings;
        self.detection_generation += 1;
    }

    pub fn apply_ocr(&mut self, results: Vec<TextRegion>) {
        self.ocr_results = results;
    }

    /// Forget the image and its results
    pub fn clear(&mut self) {
        self.image = None;
        self.groups.clear();
        self.text_regions.clear();
        self.ocr_results.clear();
        self.timings = None;
        self.image_generation += 1;
        self.detection_generation += 1;
    }

    /// OCR results win over raw regions; nothing is drawn when both are empty
    pub fn text_layer(&self) -> &[TextRegion] {
        if self.ocr_results.is_empty() {
            &self.text_regions
        } else {
            &self.ocr_results
        }
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.class_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Detection;

    fn region(text: Option<&str>) -> TextRegion {
        TextRegion {
            bbox: [0.0, 0.0, 10.0, 10.0],
            text: text.map(str::to_string),
            confidence: None,
        }
    }

    #[test]
    fn test_text_layer_prefers_ocr() {
        let mut session = Session::default();
        assert!(session.text_layer().is_empty());

        session.text_regions = vec![region(None), region(None)];
        assert_eq!(session.text_layer().len(), 2);

        session.apply_ocr(vec![region(Some("HELLO"))]);
        let regions = session.text_layer();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].text.as_deref(), Some("HELLO"));
    }

    #[test]
    fn test_apply_detection_drops_stale_ocr() {
        let mut session = Session::default();
        session.apply_ocr(vec![region(Some("OLD"))]);

        session.apply_detection(DetectResponse {
            results: vec![DetectionGroup {
                class_name: "cat".to_string(),
                detections: vec![Detection {
                    bbox: [0.0; 4],
                    score: 0.7,
                }],
            }],
            text_regions: vec![region(None)],
            timings: None,
            image_dims: None,
        });

        assert!(session.ocr_results.is_empty());
        assert_eq!(session.groups.len(), 1);
        assert_eq!(session.detection_generation, 1);
    }

    #[test]
    fn test_decode_reports_natural_size() {
        let img = RgbaImage::new(7, 3);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let selected = SelectedImage::decode(ImageFile::new("tiny.png", bytes)).unwrap();
        let mut session = Session::default();
        session.text_regions = vec![region(None)];
        session.select_image(selected);
        assert_eq!(session.natural_size(), (7, 3));
        assert!(session.text_regions.is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(SelectedImage::decode(ImageFile::new("x.png", vec![1u8, 2, 3])).is_err());
    }
}
