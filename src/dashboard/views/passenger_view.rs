use eframe::egui;

use super::error_label;
use crate::client::booking::{BookingField, BookingStatus, RideBookingWorkflow};
use crate::client::history::RideHistoryWorkflow;
use crate::client::location::{coordinates_to_pixel, MapViewport};
use crate::client::requests::ListState;
use crate::dashboard::state::{AppState, PassengerTab};
use crate::dashboard::theme::{colors, styles};
use crate::shared::estimate::format_timestamp;

const MAP_HEIGHT: f32 = 260.0;

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut state.passenger_tab, PassengerTab::BookRide, "Book a Ride");
        if ui
            .selectable_label(state.passenger_tab == PassengerTab::MyRides, "My Rides")
            .clicked()
        {
            state.show_my_rides();
        }
    });
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| match state.passenger_tab {
        PassengerTab::BookRide => {
            if let Some(booking) = state.booking.as_mut() {
                render_booking(ui, booking);
            }
        }
        PassengerTab::MyRides => {
            if let Some(history) = state.history.as_mut() {
                render_history(ui, history);
            }
        }
    });
}

fn render_booking(ui: &mut egui::Ui, booking: &mut RideBookingWorkflow) {
    styles::card_frame().show(ui, |ui| {
        ui.label(egui::RichText::new("Book Your Ride").size(20.0).strong().color(colors::TEXT_LIGHT));
        ui.label(egui::RichText::new("Where would you like to go today?").color(colors::TEXT_SECONDARY));
        ui.add_space(8.0);

        match booking.status().clone() {
            BookingStatus::Succeeded(ride) => {
                ui.label(egui::RichText::new("Ride booked! A driver is on the way.").color(colors::SUCCESS));
                ui.label(format!("From: {}", ride.pickup_location.address));
                ui.label(format!("To: {}", ride.destination.address));
                if let Some(driver) = ride.driver.as_deref() {
                    ui.label(format!("Driver: {}", driver));
                }
                if ui.button("Book another ride").clicked() {
                    booking.reset();
                    booking.mount();
                }
                return;
            }
            BookingStatus::Failed(message) => {
                error_label(ui, &format!("Booking failed: {}", message));
                if ui.button("Try again").clicked() {
                    booking.reset();
                    booking.mount();
                }
                return;
            }
            _ => {}
        }

        if let Some(error) = booking.location_error() {
            error_label(ui, error);
            ui.add_space(4.0);
        }

        render_field(ui, booking, BookingField::Pickup);
        ui.add_space(8.0);
        render_field(ui, booking, BookingField::Destination);
        ui.add_space(8.0);

        if booking.map_pick().is_some() {
            render_map_pick(ui, booking);
            ui.add_space(8.0);
        }

        ui.horizontal(|ui| {
            ui.colored_label(colors::TEXT_SECONDARY, format!("Estimated fare: {}", booking.fare_text()));
            ui.add_space(16.0);
            ui.colored_label(colors::TEXT_SECONDARY, format!("Estimated time: {}", booking.time_text()));
        });
        ui.add_space(8.0);

        if let Some(error) = booking.form_error() {
            error_label(ui, error);
        }

        let submitting = *booking.status() == BookingStatus::Submitting;
        ui.horizontal(|ui| {
            let button = egui::Button::new(egui::RichText::new("Find a Driver").color(colors::TEXT_LIGHT))
                .fill(colors::ACCENT);
            if ui
                .add_enabled(*booking.status() == BookingStatus::AwaitingInput, button)
                .clicked()
            {
                // Rejections are shown through form_error.
                let _ = booking.submit();
            }
            if submitting {
                ui.spinner();
                ui.label("Finding a driver...");
            }
        });
    });
}

fn render_field(ui: &mut egui::Ui, booking: &mut RideBookingWorkflow, field: BookingField) {
    let (label, hint) = match field {
        BookingField::Pickup => ("Pickup", "Enter pickup location"),
        BookingField::Destination => ("Destination", "Enter destination"),
    };
    let editable = booking.is_editable();

    ui.label(egui::RichText::new(label).color(colors::TEXT_LIGHT));
    ui.horizontal(|ui| {
        let mut text = booking.field(field).text().to_string();
        let response = ui.add_enabled(
            editable,
            egui::TextEdit::singleline(&mut text).hint_text(hint).desired_width(320.0),
        );
        if response.changed() {
            booking.set_text(field, text);
        }

        if field == BookingField::Pickup {
            if *booking.status() == BookingStatus::LocatingPickup {
                ui.spinner();
            } else if ui
                .add_enabled(editable, egui::Button::new("📍"))
                .on_hover_text("Use my current location")
                .clicked()
            {
                booking.request_current_location();
            }
        }
        if ui
            .add_enabled(editable, egui::Button::new("🗺"))
            .on_hover_text("Choose on map")
            .clicked()
        {
            let _ = booking.enter_map_pick(field);
        }
        if ui.add_enabled(editable, egui::Button::new("✕")).clicked() {
            booking.clear_field(field);
        }
        if booking.field(field).is_searching() {
            ui.spinner();
        }
    });

    if let Some(resolved) = booking.field(field).resolved() {
        ui.colored_label(
            colors::TEXT_SECONDARY,
            format!("{:.4}, {:.4}", resolved.latitude, resolved.longitude),
        );
    }

    if booking.field(field).suggestions_visible() {
        let mut chosen = None;
        let mut dismissed = false;
        styles::card_frame().show(ui, |ui| {
            for (index, option) in booking.field(field).suggestions().iter().enumerate() {
                if ui.selectable_label(false, &option.name).clicked() {
                    chosen = Some(index);
                }
            }
            if ui.small_button("Close").clicked() {
                dismissed = true;
            }
        });
        if let Some(index) = chosen {
            booking.select_suggestion(field, index);
        } else if dismissed {
            booking.dismiss_suggestions(field);
        }
    }
}

fn render_map_pick(ui: &mut egui::Ui, booking: &mut RideBookingWorkflow) {
    let Some(pick) = booking.map_pick().cloned() else {
        return;
    };
    let target = match pick.target {
        BookingField::Pickup => "pickup",
        BookingField::Destination => "destination",
    };
    ui.label(format!("Click the map to choose the {} point", target));

    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(egui::vec2(width, MAP_HEIGHT), egui::Sense::click());
    let rect = response.rect;
    painter.rect_filled(rect, 6.0, colors::MAP_BG);
    let grid = egui::Stroke::new(1.0, colors::MAP_GRID);
    let mut x = rect.left();
    while x < rect.right() {
        painter.line_segment([egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())], grid);
        x += 40.0;
    }
    let mut y = rect.top();
    while y < rect.bottom() {
        painter.line_segment([egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)], grid);
        y += 40.0;
    }

    let viewport = MapViewport::new(rect.width() as f64, rect.height() as f64);
    let (pin_x, pin_y) = coordinates_to_pixel(viewport, pick.pin);
    let pin = rect.min + egui::vec2(pin_x as f32, pin_y as f32);
    if rect.contains(pin) {
        painter.circle_filled(pin, 7.0, colors::MAP_PIN);
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let local = pos - rect.min;
            let _ = booking.pick_on_map(viewport, local.x as f64, local.y as f64);
        }
    }

    match pick.address.as_deref() {
        Some(address) => ui.colored_label(colors::TEXT_LIGHT, address),
        None => ui.colored_label(colors::TEXT_SECONDARY, "Looking up address..."),
    };
    ui.horizontal(|ui| {
        if ui
            .add_enabled(pick.address.is_some(), egui::Button::new("Confirm location"))
            .clicked()
        {
            let _ = booking.confirm_map_pick();
        }
        if ui.button("Cancel").clicked() {
            booking.cancel_map_pick();
        }
    });
}

fn render_history(ui: &mut egui::Ui, history: &mut RideHistoryWorkflow) {
    match history.state().clone() {
        ListState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading your rides...");
            });
            return;
        }
        ListState::LoadError(message) => {
            error_label(ui, &message);
            if ui.button("Try again").clicked() {
                history.load();
            }
            return;
        }
        ListState::Loaded => {}
    }

    if let Some(error) = history.action_error() {
        error_label(ui, error);
    }
    if history.rides().is_empty() {
        ui.colored_label(colors::TEXT_SECONDARY, "You have not booked any rides yet.");
        return;
    }

    let mut cancel = None;
    for ride in history.rides() {
        styles::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(&ride.destination.address).strong().color(colors::TEXT_LIGHT));
            ui.colored_label(colors::TEXT_SECONDARY, format!("From {}", ride.pickup_location.address));
            if let Some(status) = ride.status.as_ref() {
                ui.colored_label(colors::TEXT_SECONDARY, format!("Status: {}", status));
            }
            if let Some(created_at) = ride.created_at.as_deref() {
                ui.colored_label(colors::TEXT_SECONDARY, format_timestamp(created_at));
            }
            if let Some(id) = ride.id.as_deref() {
                if history.is_cancelling(id) {
                    ui.spinner();
                } else if ui
                    .add_enabled(history.can_cancel(id), egui::Button::new("Cancel ride"))
                    .clicked()
                {
                    cancel = Some(id.to_string());
                }
            }
        });
        ui.add_space(6.0);
    }
    if let Some(id) = cancel {
        history.cancel(&id);
    }
}
