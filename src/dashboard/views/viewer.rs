//! Viewer - upload, prompt bar, annotated image and OCR panel

use egui::{Color32, RichText};
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::annotate::Annotator;
use crate::api::OcrModel;
use crate::dashboard::components::{CardStatus, StatusCard};
use crate::dashboard::state::{ExportStatus, UiAction, ViewerViewState};
use crate::dashboard::theme::{card_frame, ThemeColors};
use crate::dashboard::views::sliders::render_slider_panel;

/// Width reserved for the slider and OCR column
const SIDE_COLUMN_WIDTH: f32 = 300.0;

/// Render the viewer
pub fn render_viewer_view(
    ui: &mut egui::Ui,
    view_state: &mut ViewerViewState,
    annotator: &Annotator,
    actions: &mut Vec<UiAction>,
) {
    ui.heading(RichText::new("Annotate").size(24.0).strong());
    ui.add_space(8.0);
    ui.label(
        RichText::new("Detect classes from a text prompt and tune per-class sensitivity")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY)
    );
    ui.add_space(16.0);

    if annotator.session.image.is_none() {
        render_upload_card(ui, view_state, annotator, actions);
        ui.add_space(12.0);
    }

    render_prompt_bar(ui, view_state, annotator, actions);
    render_messages(ui, view_state, annotator);
    ui.add_space(12.0);

    if annotator.session.image.is_none() {
        return;
    }

    if let Some(timings) = annotator.session.timings {
        ui.horizontal(|ui| {
            StatusCard::new("SAM3", format!("{:.3}s", timings.sam3), CardStatus::Active).show(ui);
            ui.add_space(8.0);
            StatusCard::new("DBNet", format!("{:.3}s", timings.dbnet), CardStatus::Active).show(ui);
            ui.add_space(8.0);
            StatusCard::new("Total", format!("{:.3}s", timings.total), CardStatus::Active).show(ui);
        });
        ui.add_space(12.0);
    }

    ui.horizontal_top(|ui| {
        let image_width = (ui.available_width() - SIDE_COLUMN_WIDTH - 16.0).max(200.0);
        ui.vertical(|ui| {
            ui.set_width(image_width);
            render_annotated_image(ui, view_state, annotator);
        });

        ui.add_space(16.0);

        ui.vertical(|ui| {
            ui.set_width(SIDE_COLUMN_WIDTH);
            egui::ScrollArea::vertical()
                .id_salt("viewer_side_column")
                .show(ui, |ui| {
                    render_slider_panel(ui, annotator, actions);
                    ui.add_space(12.0);
                    render_ocr_panel(ui, view_state, annotator, actions);
                    ui.add_space(12.0);
                    render_export_card(ui, view_state, actions);
                });
        });
    });
}

fn render_upload_card(
    ui: &mut egui::Ui,
    view_state: &mut ViewerViewState,
    annotator: &Annotator,
    actions: &mut Vec<UiAction>,
) {
    card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.add_enabled_ui(!annotator.upload.in_flight, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add(egui::Button::new("Select image...").min_size(egui::vec2(140.0, 32.0)))
                    .clicked()
                {
                    actions.push(UiAction::PickImage);
                }

                ui.add_space(12.0);
                ui.label("or path:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut view_state.path_input)
                        .hint_text("/path/to/image.jpg")
                        .desired_width(320.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let path = view_state.path_input.trim();
                if (ui.button("Load").clicked() || submitted) && !path.is_empty() {
                    actions.push(UiAction::LoadImage(path.into()));
                }
            });
        });
        ui.add_space(6.0);
        ui.label(
            RichText::new("You can also drop an image file onto the window")
                .size(12.0)
                .color(ThemeColors::TEXT_MUTED)
        );
    });
}

fn render_prompt_bar(
    ui: &mut egui::Ui,
    view_state: &mut ViewerViewState,
    annotator: &Annotator,
    actions: &mut Vec<UiAction>,
) {
    let busy = annotator.upload.in_flight;

    ui.horizontal(|ui| {
        ui.label("Prompt:");
        let response = ui.add_enabled(
            !busy,
            egui::TextEdit::singleline(&mut view_state.prompt)
                .hint_text("cat, dog, person")
                .desired_width(360.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        let clicked = ui
            .add_enabled(!busy, egui::Button::new("Update prompts"))
            .clicked();
        if clicked || (submitted && !busy) {
            actions.push(UiAction::RerunDetection);
        }

        if annotator.session.image.is_some() && ui.button("New Image").clicked() {
            actions.push(UiAction::NewImage);
        }

        if busy {
            ui.add_space(8.0);
            ui.spinner();
            ui.label(RichText::new("Detecting...").color(ThemeColors::TEXT_SECONDARY));
        }
    });
}

fn render_messages(ui: &mut egui::Ui, view_state: &ViewerViewState, annotator: &Annotator) {
    if let Some(notice) = &view_state.notice {
        ui.add_space(6.0);
        ui.label(RichText::new(notice).color(ThemeColors::ACCENT_WARNING));
    }
    if let Some(error) = &annotator.upload.error {
        ui.add_space(6.0);
        ui.label(RichText::new(error).color(ThemeColors::ACCENT_ERROR));
    }
}

/// Source image with the overlay painted into the same rectangle
fn render_annotated_image(
    ui: &mut egui::Ui,
    view_state: &mut ViewerViewState,
    annotator: &Annotator,
) {
    let Some(image) = annotator.session.image.as_ref() else {
        return;
    };
    let max_side = ui.ctx().input(|i| i.max_texture_side);

    let generation = annotator.session.image_generation;
    if view_state.source_texture.as_ref().map(|(g, _)| *g) != Some(generation) {
        let color_image = texture_image(&image.pixels, max_side);
        let texture =
            ui.ctx()
                .load_texture("viewer_source", color_image, egui::TextureOptions::LINEAR);
        view_state.source_texture = Some((generation, texture));
    }

    let revision = annotator.revision();
    if view_state.overlay_texture.as_ref().map(|(r, _)| *r) != Some(revision) {
        let color_image = texture_image(&annotator.overlay(), max_side);
        match view_state.overlay_texture.as_mut() {
            Some((stored, texture)) if texture.size() == color_image.size => {
                texture.set(color_image, egui::TextureOptions::LINEAR);
                *stored = revision;
            }
            _ => {
                let texture = ui.ctx().load_texture(
                    "viewer_overlay",
                    color_image,
                    egui::TextureOptions::LINEAR,
                );
                view_state.overlay_texture = Some((revision, texture));
            }
        }
    }

    let Some((_, source)) = view_state.source_texture.as_ref() else {
        return;
    };
    let natural = egui::vec2(image.width() as f32, image.height() as f32);
    let max_height = (ui.available_height() - 8.0).max(240.0);
    let scale = (ui.available_width() / natural.x)
        .min(max_height / natural.y)
        .min(1.0);
    let (rect, _) = ui.allocate_exact_size(natural * scale, egui::Sense::hover());

    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    ui.painter().image(source.id(), rect, uv, Color32::WHITE);
    if let Some((_, overlay)) = view_state.overlay_texture.as_ref() {
        ui.painter().image(overlay.id(), rect, uv, Color32::WHITE);
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(format!("{} ({}x{})", image.file.name, image.width(), image.height()))
            .size(12.0)
            .color(ThemeColors::TEXT_MUTED)
    );
}

/// Texture pixels no larger than `max_side` on either axis.
/// Only the on-screen copy shrinks; the overlay raster keeps its natural size.
fn texture_image(pixels: &RgbaImage, max_side: usize) -> egui::ColorImage {
    let (width, height) = pixels.dimensions();
    let max_side = max_side.max(1);
    let longest = width.max(height) as usize;
    if longest <= max_side {
        return egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            pixels.as_raw(),
        );
    }

    let factor = max_side as f64 / longest as f64;
    let fit = |side: u32| ((side as f64 * factor).floor() as u32).clamp(1, max_side as u32);
    let scaled = imageops::resize(pixels, fit(width), fit(height), FilterType::Triangle);
    egui::ColorImage::from_rgba_unmultiplied(
        [scaled.width() as usize, scaled.height() as usize],
        scaled.as_raw(),
    )
}

fn render_ocr_panel(
    ui: &mut egui::Ui,
    view_state: &mut ViewerViewState,
    annotator: &Annotator,
    actions: &mut Vec<UiAction>,
) {
    let extracting = annotator.ocr.in_flight;

    card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.heading(RichText::new("Text Extraction").size(16.0));
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label("Model:");
            egui::ComboBox::from_id_salt("ocr_model")
                .selected_text(view_state.ocr_model.display_name())
                .show_ui(ui, |ui| {
                    for model in OcrModel::ALL {
                        ui.selectable_value(&mut view_state.ocr_model, model, model.display_name());
                    }
                });
        });

        ui.add_space(6.0);
        let label = if extracting { "Extracting..." } else { "Extract Text" };
        if ui.add_enabled(!extracting, egui::Button::new(label)).clicked() {
            actions.push(UiAction::ExtractText);
        }

        if !annotator.ocr.message.is_empty() {
            ui.add_space(6.0);
            ui.label(
                RichText::new(&annotator.ocr.message)
                    .size(12.0)
                    .color(ThemeColors::TEXT_SECONDARY)
            );
        }

        if extracting || annotator.session.ocr_results.is_empty() {
            return;
        }

        ui.add_space(8.0);
        ui.separator();
        egui::Grid::new("ocr_results").striped(true).show(ui, |ui| {
            for region in &annotator.session.ocr_results {
                ui.label(region.text.as_deref().unwrap_or(""));
                let confidence = region
                    .confidence
                    .map(|c| format!("{}%", (c * 100.0).round()))
                    .unwrap_or_default();
                ui.label(RichText::new(confidence).color(ThemeColors::TEXT_MUTED));
                ui.end_row();
            }
        });
    });
}

fn render_export_card(
    ui: &mut egui::Ui,
    view_state: &ViewerViewState,
    actions: &mut Vec<UiAction>,
) {
    card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        if ui.button("Export PNG").clicked() {
            actions.push(UiAction::ExportPng);
        }
        match &view_state.export_status {
            Some(ExportStatus::Saved(path)) => {
                ui.label(
                    RichText::new(format!("Saved {}", path.display()))
                        .size(12.0)
                        .color(ThemeColors::ACCENT_SUCCESS)
                );
            }
            Some(ExportStatus::Failed(reason)) => {
                ui.label(RichText::new(reason).size(12.0).color(ThemeColors::ACCENT_ERROR));
            }
            None => {}
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_images_upload_unscaled() {
        let pixels = RgbaImage::new(300, 100);
        assert_eq!(texture_image(&pixels, 2048).size, [300, 100]);
    }

    #[test]
    fn test_large_images_fit_the_texture_limit() {
        let pixels = RgbaImage::from_pixel(1200, 900, image::Rgba([200, 10, 10, 255]));
        let color_image = texture_image(&pixels, 512);
        assert_eq!(color_image.size, [512, 384]);
        let corner = color_image.pixels[0];
        assert!((corner.r() as i32 - 200).abs() <= 1);
        assert_eq!(corner.a(), 255);
        // Natural-size source untouched
        assert_eq!(pixels.dimensions(), (1200, 900));
    }

    #[test]
    fn test_extreme_aspect_keeps_one_pixel() {
        let pixels = RgbaImage::new(4000, 2);
        assert_eq!(texture_image(&pixels, 1000).size, [1000, 1]);
    }
}
