//! Batch view - per-file class counts for many images

use egui::RichText;

use crate::annotate::{Annotator, BatchGrid};
use crate::dashboard::state::{BatchViewState, DashboardView, UiAction};
use crate::dashboard::theme::{card_frame, ThemeColors};

const CARD_WIDTH: f32 = 220.0;

/// Render the batch view
pub fn render_batch_view(
    ui: &mut egui::Ui,
    view_state: &BatchViewState,
    prompt: &mut String,
    annotator: &Annotator,
    actions: &mut Vec<UiAction>,
) {
    ui.horizontal(|ui| {
        if ui.button("< Back").clicked() {
            actions.push(UiAction::Navigate(DashboardView::Viewer));
        }
        ui.add_space(8.0);
        ui.heading(RichText::new("Batch").size(24.0).strong());
    });
    ui.add_space(8.0);
    ui.label(
        RichText::new("Count detections per file using the current class thresholds")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY)
    );
    ui.add_space(16.0);

    let running = annotator.batch.in_flight;

    card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label("Prompt:");
            ui.add_enabled(
                !running,
                egui::TextEdit::singleline(prompt)
                    .hint_text("cat, dog, person")
                    .desired_width(360.0),
            );
        });
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.add_enabled(!running, egui::Button::new("Choose images...")).clicked() {
                actions.push(UiAction::PickBatchFiles);
            }
            ui.label(
                RichText::new(format!("{} selected", view_state.files.len()))
                    .color(ThemeColors::TEXT_MUTED)
            );

            let can_run = !running && !view_state.files.is_empty();
            if ui.add_enabled(can_run, egui::Button::new("Run batch")).clicked() {
                actions.push(UiAction::RunBatch);
            }
        });
    });

    if let Some(notice) = &view_state.notice {
        ui.add_space(8.0);
        ui.label(RichText::new(notice).color(ThemeColors::ACCENT_WARNING));
    }

    ui.add_space(16.0);

    egui::ScrollArea::vertical().id_salt("batch_grid").show(ui, |ui| match &annotator.batch.grid {
        BatchGrid::Empty => {
            ui.label(
                RichText::new("Choose images and run a batch to see counts")
                    .color(ThemeColors::TEXT_MUTED)
            );
        }
        BatchGrid::Processing(count) => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("Processing {} images...", count));
            });
        }
        BatchGrid::Error(message) => {
            ui.label(RichText::new(message).color(ThemeColors::ACCENT_ERROR));
        }
        BatchGrid::Cards(cards) => {
            ui.horizontal_wrapped(|ui| {
                for (idx, summary) in cards.iter().enumerate() {
                    card_frame().show(ui, |ui| {
                        ui.set_width(CARD_WIDTH);
                        ui.label(RichText::new(&summary.filename).strong());
                        ui.add_space(6.0);
                        if summary.counts.is_empty() {
                            ui.label(RichText::new("No detections").color(ThemeColors::TEXT_MUTED));
                            return;
                        }
                        egui::Grid::new(("batch_counts", idx)).striped(true).show(ui, |ui| {
                            for (class_name, count) in &summary.counts {
                                ui.label(class_name);
                                ui.label(count.to_string());
                                ui.end_row();
                            }
                        });
                    });
                }
            });
        }
    });
}
