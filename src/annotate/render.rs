//! Overlay composition
//!
//! [`render`] turns the session and thresholds into a [`Scene`] of boxes and
//! labels in natural image pixels, plus the detection counts shown in the
//! slider panel. It is pure: equal inputs give equal output.

use image::Rgba;

use super::palette::{self, CLASS_FILL_ALPHA, TEXT_FILL_ALPHA, TEXT_HIGHLIGHT};
use super::session::Session;
use super::threshold::ThresholdModel;
use crate::api::BoxCoords;

/// Minimum label height in pixels
const MIN_LABEL_PX: f32 = 12.0;
/// Gap between a label's baseline and the top of its box
const LABEL_GAP_PX: f32 = 5.0;

/// Stroke width for an image of the given natural width
pub fn stroke_width(natural_width: u32) -> u32 {
    (natural_width / 300).max(2)
}

/// Text drawn above a box
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: f32,
    /// Baseline; glyphs extend upward from here
    pub baseline: f32,
    pub size_px: f32,
}

/// A stroked and tinted rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub bbox: BoxCoords,
    pub stroke: Rgba<u8>,
    pub fill: Rgba<u8>,
    pub label: Option<Label>,
}

/// Everything to draw on the overlay, in drawing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub stroke_width: u32,
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCount {
    pub class_name: String,
    pub count: usize,
}

/// Detections that passed their class threshold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub total: usize,
    /// One entry per detection group, in group order
    pub per_class: Vec<ClassCount>,
}

impl RenderStats {
    pub fn count_for(&self, class_name: &str) -> usize {
        self.per_class
            .iter()
            .find(|c| c.class_name == class_name)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Compose the full overlay for the current state
pub fn render(session: &Session, thresholds: &ThresholdModel) -> (Scene, RenderStats) {
    let (width, height) = session.natural_size();
    let mut scene = Scene {
        width,
        height,
        stroke_width: stroke_width(width),
        shapes: Vec::new(),
    };
    let mut stats = RenderStats::default();

    for (idx, group) in session.groups.iter().enumerate() {
        let color = palette::class_color(idx);
        let threshold = thresholds.threshold(&group.class_name);

        let mut count = 0;
        for det in group.detections.iter().filter(|d| d.score >= threshold) {
            scene.shapes.push(Shape {
                bbox: det.bbox,
                stroke: color,
                fill: palette::with_alpha(color, CLASS_FILL_ALPHA),
                label: None,
            });
            count += 1;
        }

        stats.total += count;
        stats.per_class.push(ClassCount {
            class_name: group.class_name.clone(),
            count,
        });
    }

    for region in session.text_layer() {
        let [x1, y1, _, y2] = region.bbox;
        let label = region.label().map(|text| Label {
            text: text.to_string(),
            x: x1,
            baseline: y1 - LABEL_GAP_PX,
            size_px: MIN_LABEL_PX.max((y2 - y1) / 2.0),
        });
        scene.shapes.push(Shape {
            bbox: region.bbox,
            stroke: TEXT_HIGHLIGHT,
            fill: palette::with_alpha(TEXT_HIGHLIGHT, TEXT_FILL_ALPHA),
            label,
        });
    }

    (scene, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Detection, DetectionGroup, TextRegion};

    fn group(name: &str, scores: &[f32]) -> DetectionGroup {
        DetectionGroup {
            class_name: name.to_string(),
            detections: scores
                .iter()
                .enumerate()
                .map(|(i, s)| Detection {
                    bbox: [i as f32 * 10.0, 0.0, i as f32 * 10.0 + 8.0, 8.0],
                    score: *s,
                })
                .collect(),
        }
    }

    fn seeded(session: &Session) -> ThresholdModel {
        let mut thresholds = ThresholdModel::new();
        for name in session.class_names() {
            thresholds.seed(name);
        }
        thresholds
    }

    #[test]
    fn test_cat_scenario_counts_one() {
        let session = Session {
            groups: vec![group("cat", &[0.9, 0.3])],
            ..Default::default()
        };
        let (scene, stats) = render(&session, &seeded(&session));
        assert_eq!(stats.count_for("cat"), 1);
        assert_eq!(stats.total, 1);
        assert_eq!(scene.shapes.len(), 1);
    }

    #[test]
    fn test_score_equal_to_threshold_is_drawn() {
        let session = Session {
            groups: vec![group("cat", &[0.5, 0.49])],
            ..Default::default()
        };
        let (_, stats) = render(&session, &seeded(&session));
        assert_eq!(stats.count_for("cat"), 1);
    }

    #[test]
    fn test_render_is_idempotent() {
        let session = Session {
            groups: vec![group("cat", &[0.9, 0.6]), group("dog", &[0.2])],
            text_regions: vec![TextRegion {
                bbox: [1.0, 20.0, 30.0, 40.0],
                text: None,
                confidence: None,
            }],
            ..Default::default()
        };
        let thresholds = seeded(&session);
        assert_eq!(render(&session, &thresholds), render(&session, &thresholds));
    }

    #[test]
    fn test_threshold_change_is_isolated_per_class() {
        let session = Session {
            groups: vec![group("cat", &[0.9, 0.3]), group("dog", &[0.6, 0.4])],
            ..Default::default()
        };
        let mut thresholds = seeded(&session);
        let (_, before) = render(&session, &thresholds);

        thresholds.set_sensitivity("cat", 80);
        let (scene, after) = render(&session, &thresholds);

        assert_eq!(after.count_for("cat"), 2);
        assert_eq!(after.count_for("dog"), before.count_for("dog"));
        let dog_color = palette::class_color(1);
        assert_eq!(scene.shapes.iter().filter(|s| s.stroke == dog_color).count(), 1);
    }

    #[test]
    fn test_palette_repeats_after_six_classes() {
        let session = Session {
            groups: (0..7).map(|i| group(&format!("c{i}"), &[0.9])).collect(),
            ..Default::default()
        };
        let (scene, _) = render(&session, &seeded(&session));
        assert_eq!(scene.shapes[6].stroke, scene.shapes[0].stroke);
    }

    #[test]
    fn test_raw_regions_have_no_label() {
        let session = Session {
            text_regions: vec![TextRegion {
                bbox: [0.0, 10.0, 50.0, 30.0],
                text: None,
                confidence: Some(0.9),
            }],
            ..Default::default()
        };
        let (scene, stats) = render(&session, &ThresholdModel::new());
        assert_eq!(stats.total, 0);
        assert_eq!(scene.shapes.len(), 1);
        assert_eq!(scene.shapes[0].stroke, TEXT_HIGHLIGHT);
        assert!(scene.shapes[0].label.is_none());
    }

    #[test]
    fn test_ocr_results_replace_raw_regions() {
        let raw = TextRegion {
            bbox: [0.0, 10.0, 50.0, 30.0],
            text: None,
            confidence: None,
        };
        let session = Session {
            text_regions: vec![raw.clone(), raw],
            ocr_results: vec![TextRegion {
                bbox: [0.0, 100.0, 50.0, 160.0],
                text: Some("EXIT".to_string()),
                confidence: Some(0.97),
            }],
            ..Default::default()
        };
        let (scene, _) = render(&session, &ThresholdModel::new());
        assert_eq!(scene.shapes.len(), 1);

        let label = scene.shapes[0].label.as_ref().unwrap();
        assert_eq!(label.text, "EXIT");
        assert_eq!(label.baseline, 95.0);
        assert_eq!(label.size_px, 30.0);
    }

    #[test]
    fn test_small_boxes_use_minimum_label_size() {
        let session = Session {
            ocr_results: vec![TextRegion {
                bbox: [0.0, 10.0, 50.0, 14.0],
                text: Some("a".to_string()),
                confidence: None,
            }],
            ..Default::default()
        };
        let (scene, _) = render(&session, &ThresholdModel::new());
        assert_eq!(scene.shapes[0].label.as_ref().unwrap().size_px, MIN_LABEL_PX);
    }

    #[test]
    fn test_stroke_width_scales_with_image() {
        assert_eq!(stroke_width(0), 2);
        assert_eq!(stroke_width(640), 2);
        assert_eq!(stroke_width(1200), 4);
    }
}
