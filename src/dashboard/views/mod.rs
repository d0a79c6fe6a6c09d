use eframe::egui;

use crate::dashboard::state::{AppState, AppView};
use crate::dashboard::theme::{colors, styles};

pub mod auth_view;
pub mod driver_view;
pub mod passenger_view;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_panel")
        .frame(styles::top_bar_frame())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(colors::TEXT_LIGHT, egui::RichText::new("🚕 RideDash").size(18.0).strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(16.0);
                    if state.current_view != AppView::Auth {
                        if ui.button("Sign out").clicked() {
                            state.logout();
                            return;
                        }
                        if let Some(identity) = state.identity() {
                            ui.colored_label(
                                colors::TEXT_SECONDARY,
                                format!("{} ({})", identity.name, identity.role),
                            );
                        }
                    }
                });
            });
        });
}

pub fn render_main_panel(ctx: &egui::Context, state: &mut AppState) {
    let frame = egui::Frame::default()
        .fill(colors::BG_DARK)
        .inner_margin(egui::Margin::same(16));

    egui::CentralPanel::default()
        .frame(frame)
        .show(ctx, |ui| match state.current_view {
            AppView::Auth => auth_view::render(ui, state),
            AppView::Passenger => passenger_view::render(ui, state),
            AppView::Driver => driver_view::render(ui, state),
        });
}

/// Red error line, used by every view.
pub(crate) fn error_label(ui: &mut egui::Ui, message: &str) {
    ui.label(egui::RichText::new(message).color(colors::ERROR));
}
