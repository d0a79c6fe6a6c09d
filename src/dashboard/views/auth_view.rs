use eframe::egui;

use crate::dashboard::state::AppState;
use crate::dashboard::theme::colors;
use crate::shared::user::Role;

const INPUT_WIDTH: f32 = 280.0;
const LABEL_WIDTH: f32 = 90.0;

fn text_row(ui: &mut egui::Ui, offset: f32, label: &str, value: &mut String, password: bool) {
    ui.horizontal(|ui| {
        ui.add_space(offset);
        ui.add_sized(
            [LABEL_WIDTH, 24.0],
            egui::Label::new(egui::RichText::new(label).color(colors::TEXT_SECONDARY)),
        );
        ui.add_sized(
            [INPUT_WIDTH, 28.0],
            egui::TextEdit::singleline(value)
                .password(password)
                .text_color(colors::TEXT_LIGHT),
        );
    });
    ui.add_space(8.0);
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let available_rect = ui.available_rect_before_wrap();
    ui.painter().rect_filled(available_rect, 0.0, colors::BG_DARK);

    ui.scope_builder(egui::UiBuilder::new().max_rect(available_rect), |ui| {
        ui.vertical_centered(|ui| {
            let total_height = if state.is_signup_mode { 520.0 } else { 340.0 };
            let top_space = (available_rect.height() - total_height).max(0.0) / 2.0;
            ui.add_space(top_space);

            ui.label(egui::RichText::new("🚕 RideDash").size(32.0).strong().color(colors::TEXT_LIGHT));
            ui.add_space(20.0);

            ui.label(
                egui::RichText::new(if state.is_signup_mode { "Create an Account" } else { "Sign In" })
                    .size(24.0)
                    .color(colors::TEXT_LIGHT),
            );
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                ui.add_space((available_rect.width() - 220.0) / 2.0);
                for role in [Role::Passenger, Role::Driver] {
                    let label = match role {
                        Role::Passenger => "Passenger",
                        Role::Driver => "Driver",
                    };
                    ui.selectable_value(&mut state.selected_role, role, label);
                }
            });
            ui.add_space(16.0);

            if let Some(ref error) = state.auth_error {
                ui.label(egui::RichText::new(error).color(colors::ERROR));
                ui.add_space(10.0);
            }

            let offset = (available_rect.width() - INPUT_WIDTH - LABEL_WIDTH - 20.0) / 2.0;
            text_row(ui, offset, "Username:", &mut state.username_input, false);
            if state.is_signup_mode {
                text_row(ui, offset, "Email:", &mut state.email_input, false);
                text_row(ui, offset, "First name:", &mut state.firstname_input, false);
                text_row(ui, offset, "Last name:", &mut state.lastname_input, false);
            }
            text_row(ui, offset, "Password:", &mut state.password_input, true);
            if state.is_signup_mode {
                text_row(ui, offset, "Confirm:", &mut state.confirm_password_input, true);
            }

            ui.add_space(20.0);

            ui.horizontal(|ui| {
                let button_width = 140.0;
                ui.add_space((available_rect.width() - button_width * 2.0 - 10.0) / 2.0);

                let submit = egui::Button::new(
                    egui::RichText::new(if state.is_signup_mode { "Sign Up" } else { "Sign In" })
                        .color(colors::TEXT_LIGHT),
                )
                .fill(colors::ACCENT);
                if ui
                    .add_enabled_ui(!state.auth_loading, |ui| ui.add_sized([button_width, 32.0], submit))
                    .inner
                    .clicked()
                {
                    if state.is_signup_mode {
                        state.handle_signup();
                    } else {
                        state.handle_login();
                    }
                }

                ui.add_space(10.0);

                if ui
                    .add_sized(
                        [button_width, 32.0],
                        egui::Button::new(
                            egui::RichText::new(if state.is_signup_mode {
                                "Back to Sign In"
                            } else {
                                "Create Account"
                            })
                            .color(colors::TEXT_SECONDARY),
                        ),
                    )
                    .clicked()
                {
                    state.toggle_auth_mode();
                }
            });

            if state.auth_loading {
                ui.add_space(15.0);
                ui.horizontal(|ui| {
                    ui.add_space((available_rect.width() - 100.0) / 2.0);
                    ui.label(egui::RichText::new("Loading...").color(colors::TEXT_LIGHT));
                    ui.spinner();
                });
            }
        });
    });
}
