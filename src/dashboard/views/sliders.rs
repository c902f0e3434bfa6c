//! Per-class sensitivity sliders

use egui::RichText;

use crate::annotate::{palette, Annotator};
use crate::dashboard::components::add_scroll_slider;
use crate::dashboard::state::UiAction;
use crate::dashboard::theme::{card_frame, color_with_alpha, overlay_color, ThemeColors};

/// One row per detection group. Widget ids are salted with the detection
/// generation so every new result set gets freshly built rows.
pub fn render_slider_panel(ui: &mut egui::Ui, annotator: &Annotator, actions: &mut Vec<UiAction>) {
    let session = &annotator.session;
    let stats = annotator.stats();

    card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.heading(RichText::new("Classes").size(16.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(format!("Total: {}", stats.total))
                        .color(ThemeColors::TEXT_SECONDARY)
                );
            });
        });

        if session.groups.is_empty() {
            ui.add_space(6.0);
            ui.label(
                RichText::new("No detections yet")
                    .size(12.0)
                    .color(ThemeColors::TEXT_MUTED)
            );
            return;
        }

        for (idx, group) in session.groups.iter().enumerate() {
            ui.push_id((session.detection_generation, idx), |ui| {
                ui.add_space(8.0);
                ui.separator();

                let color = overlay_color(palette::class_color(idx));
                let mut percent = annotator.thresholds.sensitivity(&group.class_name);

                ui.horizontal(|ui| {
                    ui.label(RichText::new(&group.class_name).color(color).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        count_badge(ui, stats.count_for(&group.class_name), color);
                    });
                });
                ui.label(
                    RichText::new(format!("Sensitivity: {}%", percent))
                        .size(12.0)
                        .color(ThemeColors::TEXT_SECONDARY)
                );

                if add_scroll_slider(ui, &mut percent, 0..=100, 1, "%").changed() {
                    actions.push(UiAction::SetSensitivity {
                        class_name: group.class_name.clone(),
                        percent,
                    });
                }
            });
        }
    });
}

fn count_badge(ui: &mut egui::Ui, count: usize, color: egui::Color32) {
    egui::Frame::none()
        .fill(color_with_alpha(color, 60))
        .rounding(egui::Rounding::same(10.0))
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(RichText::new(count.to_string()).size(12.0).color(ThemeColors::TEXT_PRIMARY));
        });
}
