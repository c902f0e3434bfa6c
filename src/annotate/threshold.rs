//! Per-class confidence cutoffs and the "sensitivity" view of them
//!
//! Sensitivity is the inverse of the cutoff: `threshold = 1 - sensitivity / 100`.
//! A higher sensitivity admits more, lower-confidence detections.

use serde::Serialize;
use std::collections::BTreeMap;

/// Cutoff assigned to a class the first time it is seen
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Convert a sensitivity percentage to a cutoff. Boundary values are not clamped.
pub fn threshold_from_sensitivity(percent: f32) -> f32 {
    1.0 - percent / 100.0
}

/// Convert a cutoff to a sensitivity percentage
pub fn sensitivity_from_threshold(threshold: f32) -> f32 {
    (1.0 - threshold) * 100.0
}

/// Class name -> cutoff in [0, 1]. Entries are never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdModel {
    cutoffs: BTreeMap<String, f32>,
}

impl ThresholdModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the default cutoff for an unseen class. Returns true if it was new.
    pub fn seed(&mut self, class_name: &str) -> bool {
        if self.cutoffs.contains_key(class_name) {
            return false;
        }
        self.cutoffs.insert(class_name.to_string(), DEFAULT_THRESHOLD);
        true
    }

    /// Stored cutoff for a class, or the default. A stored 0.0 is kept as is.
    pub fn threshold(&self, class_name: &str) -> f32 {
        self.cutoffs
            .get(class_name)
            .copied()
            .unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn set_threshold(&mut self, class_name: &str, threshold: f32) {
        self.cutoffs.insert(class_name.to_string(), threshold);
    }

    /// Store `1 - percent / 100` for this class only
    pub fn set_sensitivity(&mut self, class_name: &str, percent: u32) {
        self.set_threshold(class_name, threshold_from_sensitivity(percent as f32));
    }

    /// Sensitivity shown on the slider, rounded to a whole percent
    pub fn sensitivity(&self, class_name: &str) -> u32 {
        sensitivity_from_threshold(self.threshold(class_name))
            .round()
            .max(0.0) as u32
    }

    pub fn len(&self) -> usize {
        self.cutoffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cutoffs.is_empty()
    }

    /// JSON object `{class: cutoff}` as expected by the batch endpoint
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_for_unknown_class() {
        let model = ThresholdModel::new();
        assert!((model.threshold("cat") - 0.5).abs() < f32::EPSILON);
        assert!(model.is_empty());
    }

    #[test]
    fn test_sensitivity_inverse_over_full_range() {
        for p in 0..=100u32 {
            let t = threshold_from_sensitivity(p as f32);
            assert!((t - (1.0 - p as f32 / 100.0)).abs() < 1e-6);
            assert_eq!(sensitivity_from_threshold(t).round() as u32, p);
        }
    }

    #[test]
    fn test_slider_to_eighty_stores_point_two() {
        let mut model = ThresholdModel::new();
        model.seed("cat");
        model.set_sensitivity("cat", 80);
        assert!((model.threshold("cat") - 0.20).abs() < 1e-6);
        assert_eq!(model.sensitivity("cat"), 80);
    }

    #[test]
    fn test_boundaries_are_not_clamped() {
        let mut model = ThresholdModel::new();
        model.set_sensitivity("cat", 100);
        model.set_sensitivity("dog", 0);
        assert_eq!(model.threshold("cat"), 0.0);
        assert_eq!(model.threshold("dog"), 1.0);
        assert_eq!(model.sensitivity("cat"), 100);
    }

    #[test]
    fn test_seed_never_overwrites() {
        let mut model = ThresholdModel::new();
        assert!(model.seed("cat"));
        model.set_sensitivity("cat", 90);
        assert!(!model.seed("cat"));
        assert!((model.threshold("cat") - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_set_sensitivity_touches_one_class() {
        let mut model = ThresholdModel::new();
        model.seed("cat");
        model.seed("dog");
        model.set_sensitivity("cat", 10);
        assert!((model.threshold("dog") - 0.5).abs() < f32::EPSILON);
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_to_json_is_plain_object() {
        let mut model = ThresholdModel::new();
        model.seed("cat");
        model.set_threshold("dog", 0.25);
        assert_eq!(model.to_json().unwrap(), r#"{"cat":0.5,"dog":0.25}"#);
    }
}
