//! Ride Booking Workflow
//!
//! Passenger-side state machine:
//!
//! ```text
//! Idle -> LocatingPickup -> AwaitingInput -> Submitting -> Succeeded | Failed
//! ```
//!
//! Pickup and destination are resolved through device location, debounced
//! search or a map pin. Effects run as spawned tasks that post
//! [`BookingEvent`]s back to the workflow; only the workflow applies them,
//! either from [`RideBookingWorkflow::poll`] (once per UI frame) or
//! [`RideBookingWorkflow::process_next`].

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::client::api::RideApi;
use crate::client::debounce::Debouncer;
use crate::client::location::{pixel_to_coordinates, LocationProvider, MapViewport, DEFAULT_MAP_ORIGIN, MIN_QUERY_LEN};
use crate::client::session::SessionStore;
use crate::shared::error::{ApiError, LocationError, ValidationError};
use crate::shared::estimate::{displayed_km, format_fare, format_minutes, trip_minutes};
use crate::shared::location::{format_location_for_api, haversine_km, Coordinates, Location, LocationData, LocationOption};
use crate::shared::ride::RideData;

pub const LOCATION_ERROR_MESSAGE: &str =
    "Unable to access your location. Please enable location services or enter your location manually.";
pub const PICKUP_REQUIRED_MESSAGE: &str = "Please provide a pickup location";
pub const DESTINATION_REQUIRED_MESSAGE: &str =
    "Please choose a destination from the suggestions or the map";

#[derive(Debug, Clone, PartialEq)]
pub enum BookingStatus {
    Idle,
    LocatingPickup,
    AwaitingInput,
    Submitting,
    /// Holds the matched ride
    Succeeded(RideData),
    /// Holds the user-facing error
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingField {
    Pickup,
    Destination,
}

/// Local rejections; none of these reach the network.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("sign in to book a ride")]
    NotSignedIn,

    #[error("the booking form is not accepting input")]
    NotAwaitingInput,

    #[error("no map selection in progress")]
    NoMapPick,

    #[error("the selected point has no address yet")]
    PinUnresolved,
}

/// Text input with its resolution and search state.
#[derive(Debug)]
pub struct LocationField {
    text: String,
    resolved: Option<Location>,
    suggestions: Vec<LocationOption>,
    suggestions_visible: bool,
    search: Debouncer,
}

impl LocationField {
    fn new(search_delay: Duration) -> Self {
        Self {
            text: String::new(),
            resolved: None,
            suggestions: Vec::new(),
            suggestions_visible: false,
            search: Debouncer::new(search_delay),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn resolved(&self) -> Option<&Location> {
        self.resolved.as_ref()
    }

    pub fn suggestions(&self) -> &[LocationOption] {
        &self.suggestions
    }

    pub fn suggestions_visible(&self) -> bool {
        self.suggestions_visible && !self.suggestions.is_empty()
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_pending()
    }

    fn resolve(&mut self, location: Location) {
        self.text = location.address.clone();
        self.resolved = Some(location);
        self.hide_suggestions();
    }

    fn hide_suggestions(&mut self) {
        self.search.cancel();
        self.suggestions.clear();
        self.suggestions_visible = false;
    }
}

/// In-progress map selection for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPick {
    pub target: BookingField,
    pub pin: Coordinates,
    /// Reverse-geocoded address of `pin`, once known
    pub address: Option<String>,
    generation: u64,
}

#[derive(Debug)]
pub enum BookingEvent {
    Located(Result<(Coordinates, String), LocationError>),
    Suggestions {
        field: BookingField,
        generation: u64,
        results: Vec<LocationOption>,
    },
    PinResolved {
        generation: u64,
        address: String,
    },
    Submitted(Result<RideData, ApiError>),
}

pub struct RideBookingWorkflow {
    api: Arc<dyn RideApi>,
    locations: Arc<dyn LocationProvider>,
    session: SessionStore,
    search_delay: Duration,
    status: BookingStatus,
    pickup: LocationField,
    destination: LocationField,
    map_pick: Option<MapPick>,
    pin_generation: u64,
    location_error: Option<String>,
    form_error: Option<String>,
    events_tx: mpsc::UnboundedSender<BookingEvent>,
    events_rx: mpsc::UnboundedReceiver<BookingEvent>,
}

impl RideBookingWorkflow {
    pub fn new(
        api: Arc<dyn RideApi>,
        locations: Arc<dyn LocationProvider>,
        session: SessionStore,
        search_delay: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            locations,
            session,
            search_delay,
            status: BookingStatus::Idle,
            pickup: LocationField::new(search_delay),
            destination: LocationField::new(search_delay),
            map_pick: None,
            pin_generation: 0,
            location_error: None,
            form_error: None,
            events_tx,
            events_rx,
        }
    }

    pub fn status(&self) -> &BookingStatus {
        &self.status
    }

    pub fn field(&self, field: BookingField) -> &LocationField {
        match field {
            BookingField::Pickup => &self.pickup,
            BookingField::Destination => &self.destination,
        }
    }

    pub fn map_pick(&self) -> Option<&MapPick> {
        self.map_pick.as_ref()
    }

    pub fn location_error(&self) -> Option<&str> {
        self.location_error.as_deref()
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.status, BookingStatus::LocatingPickup | BookingStatus::AwaitingInput)
    }

    /// Start the workflow by locating the device. Only valid from `Idle`.
    pub fn mount(&mut self) {
        if self.status == BookingStatus::Idle {
            self.locate();
        }
    }

    /// Explicit re-request of the device location.
    pub fn request_current_location(&mut self) {
        if self.status == BookingStatus::AwaitingInput {
            self.locate();
        }
    }

    fn locate(&mut self) {
        tracing::debug!("locating pickup");
        self.status = BookingStatus::LocatingPickup;
        self.location_error = None;

        let locations = self.locations.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match locations.current_location().await {
                Ok(coordinates) => {
                    let address = locations.address_from_coordinates(coordinates).await;
                    Ok((coordinates, address))
                }
                Err(e) => Err(e),
            };
            let _ = tx.send(BookingEvent::Located(result));
        });
    }

    /// Update a field's text. Text that no longer matches the resolved
    /// address clears the resolution; a debounced search runs for queries of
    /// two or more characters.
    pub fn set_text(&mut self, target: BookingField, text: impl Into<String>) {
        if !self.is_editable() {
            return;
        }
        let text = text.into();
        let locations = self.locations.clone();
        let tx = self.events_tx.clone();
        let field = self.field_mut(target);
        if field.text == text {
            return;
        }
        field.text = text;
        if field.resolved.as_ref().is_some_and(|r| r.address != field.text) {
            field.resolved = None;
        }

        let query = field.text.trim().to_string();
        if query.chars().count() < MIN_QUERY_LEN {
            field.hide_suggestions();
            return;
        }
        field.search.schedule(move |generation| async move {
            let results = locations.search_locations(&query).await;
            let _ = tx.send(BookingEvent::Suggestions {
                field: target,
                generation,
                results,
            });
        });
        self.form_error = None;
    }

    /// Resolve a field to the suggestion at `index`.
    pub fn select_suggestion(&mut self, target: BookingField, index: usize) -> bool {
        let field = self.field_mut(target);
        match field.suggestions.get(index).cloned() {
            Some(option) => {
                field.resolve(option.to_location());
                self.form_error = None;
                true
            }
            None => false,
        }
    }

    pub fn dismiss_suggestions(&mut self, target: BookingField) {
        self.field_mut(target).suggestions_visible = false;
    }

    pub fn clear_field(&mut self, target: BookingField) {
        let field = self.field_mut(target);
        field.text.clear();
        field.resolved = None;
        field.hide_suggestions();
    }

    /// Enter map-pick mode for one field. The pin starts at the field's
    /// resolved position, or the map origin.
    pub fn enter_map_pick(&mut self, target: BookingField) -> Result<(), BookingError> {
        if !self.is_editable() {
            return Err(BookingError::NotAwaitingInput);
        }
        let (pin, address) = match self.field(target).resolved() {
            Some(location) => (location.coordinates(), Some(location.address.clone())),
            None => (DEFAULT_MAP_ORIGIN, None),
        };
        self.pin_generation += 1;
        self.map_pick = Some(MapPick {
            target,
            pin,
            address,
            generation: self.pin_generation,
        });
        if self.map_pick.as_ref().is_some_and(|p| p.address.is_none()) {
            self.resolve_pin(pin);
        }
        Ok(())
    }

    /// Move the pin and reverse-geocode its new position.
    pub fn place_pin(&mut self, coordinates: Coordinates) -> Result<(), BookingError> {
        let pick = self.map_pick.as_mut().ok_or(BookingError::NoMapPick)?;
        pick.pin = coordinates;
        pick.address = None;
        self.pin_generation += 1;
        pick.generation = self.pin_generation;
        self.resolve_pin(coordinates);
        Ok(())
    }

    /// Place the pin from a click on the map canvas.
    pub fn pick_on_map(&mut self, viewport: MapViewport, x: f64, y: f64) -> Result<(), BookingError> {
        self.place_pin(pixel_to_coordinates(viewport, x, y))
    }

    fn resolve_pin(&self, coordinates: Coordinates) {
        let generation = self.pin_generation;
        let locations = self.locations.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let address = locations.address_from_coordinates(coordinates).await;
            let _ = tx.send(BookingEvent::PinResolved { generation, address });
        });
    }

    /// Commit the pin into its field and leave map-pick mode.
    pub fn confirm_map_pick(&mut self) -> Result<(), BookingError> {
        let pick = self.map_pick.as_ref().ok_or(BookingError::NoMapPick)?;
        let address = pick.address.clone().ok_or(BookingError::PinUnresolved)?;
        let location = Location::new(address, pick.pin);
        let target = pick.target;
        self.field_mut(target).resolve(location);
        self.map_pick = None;
        self.form_error = None;
        Ok(())
    }

    /// Leave map-pick mode without touching the field.
    pub fn cancel_map_pick(&mut self) {
        self.map_pick = None;
    }

    /// Validate and submit a match request. Rejections are local; on
    /// acceptance exactly one `find_driver` call is made.
    pub fn submit(&mut self) -> Result<(), BookingError> {
        if self.status != BookingStatus::AwaitingInput {
            return Err(BookingError::NotAwaitingInput);
        }
        let ride = match self.build_ride() {
            Ok(ride) => ride,
            Err(e) => {
                self.form_error = Some(e.to_string());
                return Err(e);
            }
        };

        tracing::debug!(passenger = %ride.passenger, "submitting ride");
        self.status = BookingStatus::Submitting;
        self.form_error = None;
        self.map_pick = None;

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.find_driver(&ride).await;
            let _ = tx.send(BookingEvent::Submitted(result));
        });
        Ok(())
    }

    fn build_ride(&self) -> Result<RideData, BookingError> {
        let pickup = self
            .pickup
            .resolved
            .clone()
            .filter(Location::is_resolved)
            .ok_or_else(|| ValidationError::new("pickup_location", PICKUP_REQUIRED_MESSAGE))?;
        let destination = self
            .destination
            .resolved
            .clone()
            .filter(Location::is_resolved)
            .ok_or_else(|| ValidationError::new("destination", DESTINATION_REQUIRED_MESSAGE))?;
        let identity = self.session.identity().ok_or(BookingError::NotSignedIn)?;

        Ok(RideData::new(
            identity.id,
            format_location_for_api(&LocationData::from(pickup)),
            format_location_for_api(&LocationData::from(destination)),
        ))
    }

    /// Back to `Idle`; call [`mount`](Self::mount) to start again. Results of
    /// effects started before the reset are discarded.
    pub fn reset(&mut self) {
        tracing::debug!("booking reset");
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.events_tx = events_tx;
        self.events_rx = events_rx;
        self.status = BookingStatus::Idle;
        self.pickup = LocationField::new(self.search_delay);
        self.destination = LocationField::new(self.search_delay);
        self.map_pick = None;
        self.location_error = None;
        self.form_error = None;
    }

    /// Haversine distance between the resolved endpoints, rounded as shown.
    pub fn trip_distance_km(&self) -> Option<f64> {
        let pickup = self.pickup.resolved.as_ref()?;
        let destination = self.destination.resolved.as_ref()?;
        Some(displayed_km(haversine_km(
            pickup.coordinates(),
            destination.coordinates(),
        )))
    }

    pub fn fare_text(&self) -> String {
        format_fare(self.trip_distance_km())
    }

    pub fn time_text(&self) -> String {
        format_minutes(trip_minutes(self.trip_distance_km()))
    }

    /// Apply every queued event without blocking. Returns how many were
    /// applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for and apply the next event.
    pub async fn process_next(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, event: BookingEvent) {
        match event {
            BookingEvent::Located(result) => {
                if self.status != BookingStatus::LocatingPickup {
                    return;
                }
                match result {
                    Ok((coordinates, address)) => {
                        self.pickup.resolve(Location::new(address, coordinates));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "pickup location unavailable");
                        self.location_error = Some(LOCATION_ERROR_MESSAGE.to_string());
                    }
                }
                self.status = BookingStatus::AwaitingInput;
            }
            BookingEvent::Suggestions {
                field: target,
                generation,
                results,
            } => {
                let field = self.field_mut(target);
                if !field.search.is_current(generation) {
                    tracing::debug!(generation, "dropping stale suggestions");
                    return;
                }
                field.suggestions_visible = !results.is_empty();
                field.suggestions = results;
            }
            BookingEvent::PinResolved { generation, address } => {
                if let Some(pick) = self.map_pick.as_mut() {
                    if pick.generation == generation {
                        pick.address = Some(address);
                    }
                }
            }
            BookingEvent::Submitted(result) => {
                if self.status != BookingStatus::Submitting {
                    return;
                }
                self.status = match result {
                    Ok(ride) => {
                        tracing::info!(ride = ?ride.id, "ride matched");
                        BookingStatus::Succeeded(ride)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "ride booking failed");
                        BookingStatus::Failed(e.user_message())
                    }
                };
            }
        }
    }

    fn field_mut(&mut self, field: BookingField) -> &mut LocationField {
        match field {
            BookingField::Pickup => &mut self.pickup,
            BookingField::Destination => &mut self.destination,
        }
    }
}
