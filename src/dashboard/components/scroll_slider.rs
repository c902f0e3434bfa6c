//! Scroll-enabled slider component
//!
//! An integer slider that can also be adjusted with the mouse wheel when hovered.

use egui::{Response, Slider, Ui};
use std::ops::RangeInclusive;

/// Add a scroll-enabled integer slider and return the response.
///
/// Each wheel notch moves the value by `scroll_step`. The response is marked
/// changed for wheel adjustments as well as drags.
pub fn add_scroll_slider(
    ui: &mut Ui,
    value: &mut u32,
    range: RangeInclusive<u32>,
    scroll_step: u32,
    suffix: &str,
) -> Response {
    let (min, max) = (*range.start(), *range.end());
    let mut response = ui.add(Slider::new(value, range).step_by(1.0).suffix(suffix));

    if response.hovered() {
        let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
        if scroll_delta != 0.0 {
            let before = *value;
            // Scroll up (positive delta) increases value, scroll down decreases
            *value = if scroll_delta > 0.0 {
                value.saturating_add(scroll_step).min(max)
            } else {
                value.saturating_sub(scroll_step).max(min)
            };
            if *value != before {
                response.mark_changed();
                ui.ctx().request_repaint();
            }
        }
    }

    response
}
