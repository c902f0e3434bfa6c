//! Small cards showing one labelled value with a status dot

use egui::{Color32, RichText, Vec2};
use crate::dashboard::theme::{card_frame, ThemeColors};

/// A card displaying one value
pub struct StatusCard {
    pub title: String,
    pub value: String,
    pub status: CardStatus,
}

/// Status types for cards
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardStatus {
    Active,
    Inactive,
    Warning,
    Error,
}

impl CardStatus {
    pub fn color(&self) -> Color32 {
        match self {
            CardStatus::Active => ThemeColors::ACCENT_SUCCESS,
            CardStatus::Inactive => ThemeColors::TEXT_SECONDARY,
            CardStatus::Warning => ThemeColors::ACCENT_WARNING,
            CardStatus::Error => ThemeColors::ACCENT_ERROR,
        }
    }

    /// Map a service state reported by the health endpoint
    pub fn from_service_state(state: &str) -> Self {
        match state {
            "initialized" => CardStatus::Active,
            "pending" => CardStatus::Warning,
            _ => CardStatus::Inactive,
        }
    }
}

impl StatusCard {
    pub fn new(title: impl Into<String>, value: impl Into<String>, status: CardStatus) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            status,
        }
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        card_frame().show(ui, |ui| {
            ui.set_min_width(140.0);

            ui.horizontal(|ui| {
                // Status indicator dot
                let dot_center = ui.cursor().left_top() + Vec2::new(6.0, 10.0);
                ui.painter().circle_filled(dot_center, 4.0, self.status.color());
                ui.add_space(16.0);

                ui.vertical(|ui| {
                    ui.label(
                        RichText::new(&self.title)
                            .size(12.0)
                            .color(ThemeColors::TEXT_MUTED)
                    );
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(&self.value)
                            .size(18.0)
                            .color(ThemeColors::TEXT_PRIMARY)
                            .strong()
                    );
                });
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_state_mapping() {
        assert_eq!(CardStatus::from_service_state("initialized"), CardStatus::Active);
        assert_eq!(CardStatus::from_service_state("pending"), CardStatus::Warning);
        assert_eq!(CardStatus::from_service_state("something else"), CardStatus::Inactive);
    }
}
