//! Settings view - Application configuration

use egui::RichText;
use parking_lot::RwLock;
use std::cell::Cell;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::OcrModel;
use crate::config::AppConfig;
use crate::dashboard::components::{CardStatus, StatusCard};
use crate::dashboard::state::{HealthStatus, SettingsViewState, UiAction};
use crate::dashboard::theme::{card_frame, ThemeColors};

/// Render the settings view
pub fn render_settings_view(
    ui: &mut egui::Ui,
    view_state: &mut SettingsViewState,
    config: &Arc<RwLock<AppConfig>>,
    actions: &mut Vec<UiAction>,
) {
    ui.heading(RichText::new("Settings").size(24.0).strong());
    ui.add_space(8.0);
    ui.label(
        RichText::new("Detection service connection and defaults")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY)
    );

    ui.add_space(24.0);

    // Track changes using Cell to avoid borrow issues
    let changed = Cell::new(false);

    egui::ScrollArea::vertical().show(ui, |ui| {
        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading(RichText::new("Server").size(16.0));
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                ui.label("Base URL:");
                ui.add_space(8.0);
                let mut state = config.write();
                let edit =
                    egui::TextEdit::singleline(&mut state.server.base_url).desired_width(320.0);
                if ui.add(edit).changed()
                {
                    changed.set(true);
                }
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let checking = view_state.health == HealthStatus::Checking;
                if ui.add_enabled(!checking, egui::Button::new("Check server")).clicked() {
                    actions.push(UiAction::CheckHealth);
                }
                if checking {
                    ui.spinner();
                }
            });

            ui.add_space(8.0);
            render_health(ui, &view_state.health);
        });

        ui.add_space(16.0);

        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading(RichText::new("Defaults").size(16.0));
            ui.add_space(12.0);

            let mut state = config.write();

            ui.horizontal(|ui| {
                ui.label("Default prompt:");
                ui.add_space(8.0);
                if ui
                    .add(
                        egui::TextEdit::singleline(&mut state.detection.default_prompt)
                            .hint_text("cat, dog, person")
                            .desired_width(320.0),
                    )
                    .changed()
                {
                    changed.set(true);
                }
            });

            ui.horizontal(|ui| {
                ui.label("OCR model:");
                ui.add_space(8.0);
                egui::ComboBox::from_id_salt("settings_ocr_model")
                    .selected_text(state.ocr.model.display_name())
                    .show_ui(ui, |ui| {
                        for model in OcrModel::ALL {
                            if ui
                                .selectable_value(&mut state.ocr.model, model, model.display_name())
                                .changed()
                            {
                                changed.set(true);
                            }
                        }
                    });
            });
        });

        ui.add_space(16.0);

        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading(RichText::new("Export").size(16.0));
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                ui.label("Directory:");
                ui.add_space(8.0);
                let edited = ui
                    .add(
                        egui::TextEdit::singleline(&mut view_state.export_dir_input)
                            .hint_text("application data directory")
                            .desired_width(320.0),
                    )
                    .changed();
                if edited {
                    apply_export_dir(&view_state.export_dir_input, &mut config.write());
                    changed.set(true);
                }

                if ui.button("Browse...").clicked() {
                    if let Some(folder) = rfd::FileDialog::new().pick_folder() {
                        view_state.export_dir_input = folder.display().to_string();
                        config.write().export.directory = Some(folder);
                        changed.set(true);
                    }
                }
            });
        });

        ui.add_space(24.0);

        ui.horizontal(|ui| {
            if ui
                .add(egui::Button::new("Reset to Defaults").min_size(egui::vec2(120.0, 36.0)))
                .clicked()
            {
                *config.write() = AppConfig::default();
                view_state.export_dir_input.clear();
                changed.set(true);
            }

            ui.add_space(16.0);

            ui.label(
                RichText::new("Settings are saved automatically")
                    .size(12.0)
                    .color(ThemeColors::TEXT_MUTED)
            );
        });
    });

    // Apply changes - triggers auto-save in the dashboard app
    if changed.get() {
        view_state.has_unsaved_changes = true;
    }
}

fn render_health(ui: &mut egui::Ui, health: &HealthStatus) {
    match health {
        HealthStatus::Unknown | HealthStatus::Checking => {}
        HealthStatus::Unreachable(reason) => {
            StatusCard::new("Server", reason.clone(), CardStatus::Error).show(ui);
        }
        HealthStatus::Ready(report) => {
            ui.horizontal_wrapped(|ui| {
                for (name, state) in [
                    ("SAM3", &report.services.sam3),
                    ("DBNet", &report.services.dbnet),
                    ("OCR", &report.services.ocr),
                ] {
                    let status = CardStatus::from_service_state(state);
                    StatusCard::new(name, state.clone(), status).show(ui);
                    ui.add_space(8.0);
                }
            });
            ui.add_space(6.0);
            let lazy = if report.config.lazy_load { "lazy loading" } else { "preloaded" };
            ui.label(
                RichText::new(format!("Device: {} ({})", report.config.device, lazy))
                    .size(12.0)
                    .color(ThemeColors::TEXT_MUTED)
            );
        }
    }
}

/// Store the typed directory in the config. The edit buffer keeps the raw text.
fn apply_export_dir(input: &str, config: &mut AppConfig) {
    let trimmed = input.trim();
    config.export.directory = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
}
