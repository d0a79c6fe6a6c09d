use eframe::egui;

use super::error_label;
use crate::client::navigation::directions_url;
use crate::client::requests::{format_distance, trip_km, ListState, RideRequestWorkflow};
use crate::dashboard::state::AppState;
use crate::dashboard::theme::{colors, styles};
use crate::shared::estimate::format_fare;
use crate::shared::location::Coordinates;
use crate::shared::ride::RideRequestStatus;

enum DriverAction {
    Navigate(Coordinates),
    StopNavigation,
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Ride Requests").size(20.0).strong().color(colors::TEXT_LIGHT));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(requests) = state.requests.as_mut() {
                if ui.button("⟳ Refresh").clicked() {
                    requests.refresh();
                }
            }
        });
    });
    ui.separator();

    if state.navigation.is_some() {
        render_navigation(ui, state, &mut action);
        ui.add_space(8.0);
    }

    if let Some(requests) = state.requests.as_mut() {
        egui::ScrollArea::vertical().show(ui, |ui| {
            render_list(ui, requests, &mut action);
        });
        render_detail(ui.ctx(), requests);
    }

    match action {
        Some(DriverAction::Navigate(pickup)) => state.start_navigation(pickup),
        Some(DriverAction::StopNavigation) => state.stop_navigation(),
        None => {}
    }
}

fn render_list(ui: &mut egui::Ui, requests: &mut RideRequestWorkflow, action: &mut Option<DriverAction>) {
    match requests.state().clone() {
        ListState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading ride requests...");
            });
            return;
        }
        ListState::LoadError(message) => {
            error_label(ui, &message);
            if ui.button("Try again").clicked() {
                requests.refresh();
            }
            return;
        }
        ListState::Loaded => {}
    }

    if let Some(error) = requests.respond_error() {
        error_label(ui, error);
        ui.add_space(4.0);
    }
    if requests.requests().is_empty() {
        ui.colored_label(colors::TEXT_SECONDARY, "No ride requests available at the moment.");
        ui.colored_label(colors::TEXT_SECONDARY, "Check back later or refresh.");
        return;
    }

    let mut selected = None;
    for request in requests.requests() {
        let frame = if requests.selected().is_some_and(|s| s.id == request.id) {
            styles::selected_card_frame()
        } else {
            styles::card_frame()
        };
        frame.show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(request.passenger_name.as_deref().unwrap_or("Passenger"))
                        .strong()
                        .color(colors::TEXT_LIGHT),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.colored_label(status_color(&request.status), request.status.label());
                });
            });
            ui.colored_label(colors::TEXT_SECONDARY, format!("From: {}", request.pickup_location.address));
            ui.colored_label(colors::TEXT_SECONDARY, format!("To: {}", request.destination.address));
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} from you",
                    format_distance(request.distance_to_pickup.as_ref())
                ));
                ui.add_space(12.0);
                ui.label(format_fare(trip_km(request)));
            });
            ui.horizontal(|ui| {
                if ui.button("View details").clicked() {
                    selected = Some(request.id.clone());
                }
                if request.status == RideRequestStatus::Accepted && ui.button("Navigate").clicked() {
                    *action = Some(DriverAction::Navigate(request.pickup_location.coordinates()));
                }
            });
        });
        ui.add_space(6.0);
    }
    if let Some(id) = selected {
        requests.select(&id);
    }
}

fn render_detail(ctx: &egui::Context, requests: &mut RideRequestWorkflow) {
    let Some(detail) = requests.detail() else {
        return;
    };

    let mut open = true;
    let mut accept = false;
    let mut decline = false;
    egui::Window::new("Ride Request")
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(&detail.passenger_name).size(18.0).strong());
            ui.colored_label(status_color(&detail.status), detail.status.label());
            ui.colored_label(colors::TEXT_SECONDARY, &detail.created_at);
            ui.separator();
            ui.label(format!("Pickup: {}", detail.pickup.address));
            ui.label(format!("Destination: {}", detail.destination.address));
            ui.label(format!("Distance to pickup: {}", detail.distance_to_pickup));
            ui.label(format!("Trip distance: {}", detail.trip_distance));
            ui.separator();
            ui.label(format!("Estimated fare: {}", detail.fare));
            ui.label(format!("Estimated time: {}", detail.estimated_time));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let accept_button = egui::Button::new(egui::RichText::new("Accept").color(colors::TEXT_LIGHT))
                    .fill(colors::SUCCESS);
                if ui.add_enabled(detail.can_respond, accept_button).clicked() {
                    accept = true;
                }
                if ui.add_enabled(detail.can_respond, egui::Button::new("Decline")).clicked() {
                    decline = true;
                }
                if requests.is_responding() {
                    ui.spinner();
                }
            });
        });

    let refused = if accept {
        requests.accept(&detail.id).err()
    } else if decline {
        requests.decline(&detail.id).err()
    } else {
        None
    };
    if let Some(e) = refused {
        tracing::debug!(request = %detail.id, error = %e, "ride request response refused");
    }
    if !open {
        requests.close_detail();
    }
}

fn render_navigation(ui: &mut egui::Ui, state: &AppState, action: &mut Option<DriverAction>) {
    let Some(tracker) = state.navigation.as_ref() else {
        return;
    };
    let snapshot = tracker.snapshot();

    styles::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Navigation").strong().color(colors::TEXT_LIGHT));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Close").clicked() {
                    *action = Some(DriverAction::StopNavigation);
                }
            });
        });

        if let Some(error) = snapshot.error.as_deref() {
            error_label(ui, error);
        }
        match (snapshot.driver_location, snapshot.distance_to_pickup_km) {
            (Some(position), Some(km)) => {
                ui.label(format!("{:.1} km to pickup", km));
                if state.config.app().has_maps_key() {
                    ui.hyperlink_to("Open directions", directions_url(position, tracker.pickup()));
                }
            }
            _ => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Getting your location...");
                });
            }
        }
    });
}

fn status_color(status: &RideRequestStatus) -> egui::Color32 {
    match status {
        RideRequestStatus::Pending => colors::WARNING,
        RideRequestStatus::Accepted | RideRequestStatus::Completed => colors::SUCCESS,
        RideRequestStatus::Rejected | RideRequestStatus::Cancelled => colors::ERROR,
        RideRequestStatus::Unknown(_) => colors::TEXT_SECONDARY,
    }
}
