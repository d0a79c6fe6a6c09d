//! Ride booking workflow tests

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use ridedash::client::booking::{DESTINATION_REQUIRED_MESSAGE, LOCATION_ERROR_MESSAGE, PICKUP_REQUIRED_MESSAGE};
use ridedash::client::location::DEFAULT_MAP_ORIGIN;
use ridedash::client::{
    BookingError, BookingField, BookingStatus, MapViewport, RideBookingWorkflow,
    SampleLocationProvider, SessionStore,
};
use ridedash::shared::error::{ApiError, LocationError};
use ridedash::shared::location::Coordinates;

use crate::common::{
    passenger_identity, pinned_address, signed_in, ApiCall, MockRideApi, ScriptedLocations,
};
use crate::{assert_approx_eq, assert_contains};

const SEARCH_DELAY: Duration = Duration::from_millis(300);
const DEVICE: Coordinates = Coordinates::new(40.7580, -73.9855);

fn workflow(
    api: Arc<MockRideApi>,
    locations: Arc<ScriptedLocations>,
    session: SessionStore,
) -> RideBookingWorkflow {
    RideBookingWorkflow::new(api, locations, session, SEARCH_DELAY)
}

/// Mounted workflow with the pickup resolved from the device.
async fn located(api: Arc<MockRideApi>, locations: Arc<ScriptedLocations>) -> RideBookingWorkflow {
    let mut booking = workflow(api, locations, signed_in(passenger_identity()));
    booking.mount();
    assert!(booking.process_next().await);
    booking
}

#[tokio::test(start_paused = true)]
async fn test_book_ride_end_to_end() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(
        SampleLocationProvider::for_position(Some(DEVICE)).with_seed(7),
    );
    let mut booking = RideBookingWorkflow::new(
        api.clone(),
        locations,
        signed_in(passenger_identity()),
        SEARCH_DELAY,
    );

    booking.mount();
    assert_eq!(booking.status(), &BookingStatus::LocatingPickup);
    assert!(booking.process_next().await);
    assert_eq!(booking.status(), &BookingStatus::AwaitingInput);
    let pickup = booking.field(BookingField::Pickup);
    assert_contains!(pickup.text(), "Business District");
    assert!(pickup.resolved().is_some());

    booking.set_text(BookingField::Destination, "airp");
    assert!(booking.field(BookingField::Destination).is_searching());
    // Nothing arrives before the quiet period ends
    let early = tokio::time::timeout(Duration::from_millis(299), booking.process_next()).await;
    assert!(early.is_err());
    assert!(booking.process_next().await);

    let destination = booking.field(BookingField::Destination);
    let names: Vec<_> = destination.suggestions().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Airport Terminal"]);
    assert!(destination.suggestions_visible());

    assert!(booking.select_suggestion(BookingField::Destination, 0));
    let destination = booking.field(BookingField::Destination);
    assert_eq!(destination.text(), "Airport Terminal");
    assert!(!destination.suggestions_visible());

    let km = booking.trip_distance_km().unwrap();
    assert_approx_eq!(km, 21.8, 1e-9);
    assert_eq!(booking.fare_text(), "$37.70");
    assert_eq!(booking.time_text(), "49 min");

    booking.submit().unwrap();
    assert_eq!(booking.status(), &BookingStatus::Submitting);
    assert!(!booking.is_editable());
    assert!(booking.process_next().await);

    let ride = assert_matches!(booking.status(), BookingStatus::Succeeded(ride) => ride.clone());
    assert_eq!(ride.id.as_deref(), Some("77"));
    assert_eq!(api.count(|c| matches!(c, ApiCall::FindDriver(_))), 1);
    let sent = assert_matches!(&api.calls()[0], ApiCall::FindDriver(ride) => ride.clone());
    assert_eq!(sent.passenger, "5");
    assert_eq!(sent.destination.address, "Airport Terminal");
    assert_contains!(sent.pickup_location.address, "Business District");
}

#[tokio::test(start_paused = true)]
async fn test_location_failure_allows_manual_entry() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::failing(LocationError::PermissionDenied));
    let booking = located(api, locations).await;

    assert_eq!(booking.status(), &BookingStatus::AwaitingInput);
    assert_eq!(booking.location_error(), Some(LOCATION_ERROR_MESSAGE));
    assert!(booking.field(BookingField::Pickup).resolved().is_none());
    assert!(booking.is_editable());
}

#[tokio::test(start_paused = true)]
async fn test_only_latest_search_is_applied() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = located(api, locations.clone()).await;

    booking.set_text(BookingField::Destination, "Ce");
    tokio::time::sleep(Duration::from_millis(200)).await;
    booking.set_text(BookingField::Destination, "Central P");
    assert!(booking.process_next().await);

    // The first query never ran
    assert_eq!(locations.searches(), vec!["Central P".to_string()]);
    let names: Vec<_> = booking
        .field(BookingField::Destination)
        .suggestions()
        .iter()
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(names, vec!["Central Park".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_short_query_hides_suggestions() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = located(api, locations.clone()).await;

    booking.set_text(BookingField::Destination, "Cen");
    assert!(booking.process_next().await);
    assert!(booking.field(BookingField::Destination).suggestions_visible());

    booking.set_text(BookingField::Destination, "C");
    let field = booking.field(BookingField::Destination);
    assert!(!field.suggestions_visible());
    assert!(field.suggestions().is_empty());
    assert!(!field.is_searching());

    tokio::time::sleep(SEARCH_DELAY * 2).await;
    assert_eq!(booking.poll(), 0);
    assert_eq!(locations.searches().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_editing_resolved_text_clears_resolution() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = located(api.clone(), locations).await;
    assert!(booking.field(BookingField::Pickup).resolved().is_some());

    booking.set_text(BookingField::Pickup, "somewhere else");

    assert!(booking.field(BookingField::Pickup).resolved().is_none());
    assert!(booking.trip_distance_km().is_none());
    assert_eq!(booking.fare_text(), "Calculating...");
    assert_eq!(booking.time_text(), "15 min");
}

#[tokio::test(start_paused = true)]
async fn test_unresolved_pickup_is_rejected_locally() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::failing(LocationError::Timeout));
    let mut booking = located(api.clone(), locations).await;

    booking.set_text(BookingField::Pickup, "Somewhere I typed");
    let result = booking.submit();

    assert_matches!(result, Err(BookingError::Validation(e)) if e.field == "pickup_location");
    assert_eq!(booking.form_error(), Some(PICKUP_REQUIRED_MESSAGE));
    assert_eq!(booking.status(), &BookingStatus::AwaitingInput);
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unresolved_destination_is_rejected_locally() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = located(api.clone(), locations).await;

    let result = booking.submit();

    assert_matches!(result, Err(BookingError::Validation(_)));
    assert_eq!(booking.form_error(), Some(DESTINATION_REQUIRED_MESSAGE));
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_submit_requires_identity() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = workflow(api.clone(), locations, SessionStore::in_memory());
    booking.mount();
    booking.process_next().await;
    booking.set_text(BookingField::Destination, "Central");
    booking.process_next().await;
    booking.select_suggestion(BookingField::Destination, 0);

    assert_eq!(booking.submit(), Err(BookingError::NotSignedIn));
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_submit_before_location_resolves_is_refused() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = workflow(api.clone(), locations, signed_in(passenger_identity()));

    assert_eq!(booking.submit(), Err(BookingError::NotAwaitingInput));
    booking.mount();
    assert_eq!(booking.submit(), Err(BookingError::NotAwaitingInput));
}

#[tokio::test(start_paused = true)]
async fn test_failed_match_surfaces_message() {
    let api = Arc::new(MockRideApi::new().fail_find_driver(ApiError::status(400, "No drivers available")));
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = located(api.clone(), locations).await;
    booking.set_text(BookingField::Destination, "Central Park");
    booking.process_next().await;
    booking.select_suggestion(BookingField::Destination, 0);

    booking.submit().unwrap();
    booking.process_next().await;

    assert_eq!(
        booking.status(),
        &BookingStatus::Failed("No drivers available".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_map_pick_commits_on_confirm() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = located(api, locations).await;

    booking.enter_map_pick(BookingField::Destination).unwrap();
    let pick = booking.map_pick().unwrap();
    assert_eq!(pick.pin, DEFAULT_MAP_ORIGIN);
    assert_eq!(booking.confirm_map_pick(), Err(BookingError::PinUnresolved));

    let viewport = MapViewport::new(400.0, 300.0);
    booking.pick_on_map(viewport, 300.0, 100.0).unwrap();
    let pin = booking.map_pick().unwrap().pin;
    assert_approx_eq!(pin.latitude, DEFAULT_MAP_ORIGIN.latitude + 0.05, 1e-9);
    assert_approx_eq!(pin.longitude, DEFAULT_MAP_ORIGIN.longitude + 0.1, 1e-9);

    // The origin lookup and the click lookup both report back; only the
    // latest one counts
    booking.process_next().await;
    booking.process_next().await;
    assert_eq!(booking.map_pick().unwrap().address, Some(pinned_address(pin)));
    // Nothing is committed until confirmed
    assert!(booking.field(BookingField::Destination).resolved().is_none());

    booking.confirm_map_pick().unwrap();
    assert!(booking.map_pick().is_none());
    let destination = booking.field(BookingField::Destination).resolved().unwrap();
    assert_eq!(destination.coordinates(), pin);
    assert_eq!(destination.address, pinned_address(pin));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_map_pick_leaves_field() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = located(api, locations).await;
    let before = booking.field(BookingField::Pickup).resolved().cloned();

    booking.enter_map_pick(BookingField::Pickup).unwrap();
    // Seeded from the resolved pickup, so no lookup is needed
    assert_eq!(booking.map_pick().unwrap().pin, DEVICE);
    booking.place_pin(Coordinates::new(40.70, -74.01)).unwrap();
    booking.process_next().await;
    booking.cancel_map_pick();

    assert!(booking.map_pick().is_none());
    assert_eq!(booking.field(BookingField::Pickup).resolved().cloned(), before);
    assert_eq!(booking.place_pin(DEVICE), Err(BookingError::NoMapPick));
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_in_flight_results() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(ScriptedLocations::fixed(DEVICE));
    let mut booking = located(api.clone(), locations.clone()).await;
    booking.set_text(BookingField::Destination, "Central Park");
    booking.process_next().await;
    booking.select_suggestion(BookingField::Destination, 0);
    booking.submit().unwrap();

    booking.reset();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(booking.poll(), 0);
    assert_eq!(booking.status(), &BookingStatus::Idle);
    assert_eq!(booking.field(BookingField::Destination).text(), "");

    booking.mount();
    booking.process_next().await;
    assert_eq!(booking.status(), &BookingStatus::AwaitingInput);
    assert_eq!(locations.position_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_request_current_location_relocates() {
    let api = Arc::new(MockRideApi::new());
    let second = Coordinates::new(40.6413, -73.7781);
    let locations = Arc::new(ScriptedLocations::new(vec![
        Err(LocationError::PositionUnavailable),
        Ok(second),
    ]));
    let mut booking = located(api, locations).await;
    assert!(booking.location_error().is_some());

    booking.request_current_location();
    assert_eq!(booking.status(), &BookingStatus::LocatingPickup);
    assert!(booking.location_error().is_none());
    booking.process_next().await;

    let pickup = booking.field(BookingField::Pickup).resolved().unwrap();
    assert_eq!(pickup.coordinates(), second);
}

#[tokio::test(start_paused = true)]
async fn test_airport_search_sets_destination_coordinates() {
    let api = Arc::new(MockRideApi::new());
    let locations = Arc::new(
        SampleLocationProvider::for_position(Some(Coordinates::new(40.0, -74.0))).with_seed(1),
    );
    let mut booking = RideBookingWorkflow::new(
        api.clone(),
        locations,
        signed_in(passenger_identity()),
        SEARCH_DELAY,
    );
    booking.mount();
    booking.process_next().await;
    assert_contains!(booking.field(BookingField::Pickup).text(), ", NY");

    booking.set_text(BookingField::Destination, "Airport");
    booking.process_next().await;
    booking.select_suggestion(BookingField::Destination, 0);

    let destination = booking.field(BookingField::Destination).resolved().unwrap();
    assert_eq!(destination.coordinates(), Coordinates::new(40.6413, -73.7781));

    booking.submit().unwrap();
    booking.process_next().await;
    let sent = assert_matches!(&api.calls()[..], [ApiCall::FindDriver(ride)] => ride.clone());
    assert_eq!(sent.pickup_location.coordinates(), Coordinates::new(40.0, -74.0));
    assert_eq!(sent.destination.address, "Airport Terminal");
}
