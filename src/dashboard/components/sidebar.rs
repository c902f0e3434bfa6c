//! Sidebar navigation component

use egui::{Color32, RichText, Rounding, Sense, Vec2};
use crate::dashboard::state::DashboardView;
use crate::dashboard::theme::{ThemeColors, color_with_alpha};

/// What the sidebar needs to know about the running app
#[derive(Debug, Clone, Copy)]
pub struct SidebarInfo<'a> {
    pub current_view: DashboardView,
    /// Views with a request still waiting for the server
    pub busy: &'a [DashboardView],
    /// Base URL of the detection service
    pub server: &'a str,
}

/// Render the sidebar navigation. Returns the view the user clicked, if any.
pub fn render_sidebar(ui: &mut egui::Ui, info: SidebarInfo<'_>) -> Option<DashboardView> {
    let mut clicked = None;

    ui.vertical(|ui| {
        ui.add_space(16.0);
        ui.horizontal(|ui| {
            ui.add_space(12.0);
            ui.label(
                RichText::new("Rapid Annotator")
                    .size(16.0)
                    .color(ThemeColors::ACCENT_PRIMARY)
                    .strong()
            );
        });

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(12.0);

        for view in DashboardView::ALL {
            let busy = info.busy.contains(&view);
            let response = nav_button(ui, view, info.current_view == view, busy);
            if response.clicked() {
                clicked = Some(view);
            }
            if busy {
                response.on_hover_text("Waiting for the server");
            }
            ui.add_space(4.0);
        }

        if !info.busy.is_empty() {
            // Keep the activity dot pulsing
            ui.ctx().request_repaint();
        }

        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                ui.add_space(12.0);
                ui.label(
                    RichText::new(info.server)
                        .size(10.0)
                        .color(ThemeColors::TEXT_MUTED)
                );
            });
            ui.add_space(8.0);
            ui.separator();
        });
    });

    clicked
}

/// One navigation entry. A pulsing dot on the right marks a view with work in flight.
fn nav_button(
    ui: &mut egui::Ui,
    view: DashboardView,
    selected: bool,
    busy: bool,
) -> egui::Response {
    let size = Vec2::new(ui.available_width() - 16.0, 34.0);
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());
    if !ui.is_rect_visible(rect) {
        return response;
    }

    let painter = ui.painter();
    let body = rect.shrink2(Vec2::new(8.0, 0.0));
    let (fill, text_color) = match (selected, response.hovered()) {
        (true, _) => (
            color_with_alpha(ThemeColors::ACCENT_PRIMARY, 51),
            ThemeColors::ACCENT_PRIMARY,
        ),
        (false, true) => (ThemeColors::BG_HOVER, ThemeColors::TEXT_PRIMARY),
        (false, false) => (Color32::TRANSPARENT, ThemeColors::TEXT_SECONDARY),
    };
    painter.rect_filled(body, Rounding::same(6.0), fill);

    painter.text(
        body.left_center() + Vec2::new(12.0, 0.0),
        egui::Align2::LEFT_CENTER,
        format!("{}  {}", view.icon(), view.name()),
        egui::FontId::proportional(14.0),
        text_color,
    );

    if busy {
        let phase = ui.input(|i| i.time) as f32 * 4.0;
        let alpha = (150.0 + 105.0 * phase.sin()) as u8;
        painter.circle_filled(
            body.right_center() - Vec2::new(12.0, 0.0),
            4.0,
            color_with_alpha(ThemeColors::ACCENT_WARNING, alpha),
        );
    }

    response
}
