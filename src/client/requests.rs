//! Ride Request Workflow
//!
//! Driver-side list of ride requests. The list is fetched on mount and on
//! explicit refresh. Selecting a request opens its detail, where a PENDING
//! request can be accepted or declined. A successful response updates the
//! local entry without re-fetching; a failed one leaves the entry PENDING and
//! keeps the error in [`RideRequestWorkflow::respond_error`].

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::client::api::RideApi;
use crate::shared::error::ApiError;
use crate::shared::estimate::{
    displayed_km, format_fare, format_km, format_minutes, format_timestamp, trip_minutes, DISTANCE_PENDING,
};
use crate::shared::location::Location;
use crate::shared::ride::{Distance, RespondDecision, RideRequest, RideRequestStatus};

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load ride requests. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Loaded,
    LoadError(String),
}

/// Why a respond action was refused locally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RespondError {
    #[error("ride request {0} not found")]
    NotFound(String),

    #[error("ride request is already {0}")]
    NotPending(RideRequestStatus),

    #[error("another response is still being sent")]
    InFlight,
}

/// Display-ready projection of the selected request.
#[derive(Debug, Clone, PartialEq)]
pub struct RideRequestDetail {
    pub id: String,
    pub passenger_name: String,
    pub pickup: Location,
    pub destination: Location,
    pub status: RideRequestStatus,
    pub created_at: String,
    pub distance_to_pickup: String,
    pub trip_distance: String,
    pub fare: String,
    pub estimated_time: String,
    pub can_respond: bool,
}

#[derive(Debug)]
pub enum RequestEvent {
    Loaded {
        generation: u64,
        result: Result<Vec<RideRequest>, ApiError>,
    },
    Responded {
        id: String,
        decision: RespondDecision,
        result: Result<RideRequest, ApiError>,
    },
}

/// `"2.5 km"`, or a placeholder when the distance is unknown.
pub fn format_distance(distance: Option<&Distance>) -> String {
    match distance.and_then(Distance::kilometers) {
        Some(km) => format!("{} km", format_km(km)),
        None => DISTANCE_PENDING.to_string(),
    }
}

/// Trip length in km as displayed, used for the estimates.
pub fn trip_km(request: &RideRequest) -> Option<f64> {
    request
        .trip_distance
        .as_ref()
        .and_then(Distance::kilometers)
        .map(displayed_km)
}

pub struct RideRequestWorkflow {
    api: Arc<dyn RideApi>,
    state: ListState,
    requests: Vec<RideRequest>,
    selected: Option<String>,
    responding: Option<String>,
    respond_error: Option<String>,
    load_generation: u64,
    events_tx: mpsc::UnboundedSender<RequestEvent>,
    events_rx: mpsc::UnboundedReceiver<RequestEvent>,
}

impl RideRequestWorkflow {
    pub fn new(api: Arc<dyn RideApi>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            state: ListState::Loading,
            requests: Vec::new(),
            selected: None,
            responding: None,
            respond_error: None,
            load_generation: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn mount(&mut self) {
        self.refresh();
    }

    /// Fetch the list again. Also the retry affordance after a load error.
    pub fn refresh(&mut self) {
        tracing::debug!("fetching ride requests");
        self.state = ListState::Loading;
        self.load_generation += 1;
        let generation = self.load_generation;
        let api = self.api.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.ride_requests().await;
            let _ = tx.send(RequestEvent::Loaded { generation, result });
        });
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn requests(&self) -> &[RideRequest] {
        &self.requests
    }

    pub fn request(&self, id: &str) -> Option<&RideRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn selected(&self) -> Option<&RideRequest> {
        self.selected.as_deref().and_then(|id| self.request(id))
    }

    pub fn respond_error(&self) -> Option<&str> {
        self.respond_error.as_deref()
    }

    pub fn is_responding(&self) -> bool {
        self.responding.is_some()
    }

    pub fn select(&mut self, id: &str) -> bool {
        if self.request(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_string());
        self.respond_error = None;
        true
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    /// Accept/decline are enabled only for PENDING requests with no response
    /// in flight.
    pub fn controls_enabled(&self, id: &str) -> bool {
        self.responding.is_none() && self.request(id).is_some_and(|r| r.status.is_pending())
    }

    pub fn detail(&self) -> Option<RideRequestDetail> {
        let request = self.selected()?;
        let km = trip_km(request);
        Some(RideRequestDetail {
            id: request.id.clone(),
            passenger_name: request
                .passenger_name
                .clone()
                .unwrap_or_else(|| "Passenger".to_string()),
            pickup: request.pickup_location.clone(),
            destination: request.destination.clone(),
            status: request.status.clone(),
            created_at: format_timestamp(&request.created_at),
            distance_to_pickup: format_distance(request.distance_to_pickup.as_ref()),
            trip_distance: format_distance(request.trip_distance.as_ref()),
            fare: format_fare(km),
            estimated_time: format_minutes(trip_minutes(km)),
            can_respond: self.controls_enabled(&request.id),
        })
    }

    pub fn accept(&mut self, id: &str) -> Result<(), RespondError> {
        self.respond(id, RespondDecision::Accepted)
    }

    pub fn decline(&mut self, id: &str) -> Result<(), RespondError> {
        self.respond(id, RespondDecision::Rejected)
    }

    fn respond(&mut self, id: &str, decision: RespondDecision) -> Result<(), RespondError> {
        if self.responding.is_some() {
            return Err(RespondError::InFlight);
        }
        let request = self
            .request(id)
            .ok_or_else(|| RespondError::NotFound(id.to_string()))?;
        if !request.status.is_pending() {
            return Err(RespondError::NotPending(request.status.clone()));
        }

        tracing::debug!(request = %id, %decision, "responding to ride request");
        self.responding = Some(id.to_string());
        self.respond_error = None;

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = api.respond_to_ride_request(&id, decision).await;
            let _ = tx.send(RequestEvent::Responded { id, decision, result });
        });
        Ok(())
    }

    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    pub async fn process_next(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, event: RequestEvent) {
        match event {
            RequestEvent::Loaded { generation, result } => {
                if generation != self.load_generation {
                    return;
                }
                match result {
                    Ok(requests) => {
                        tracing::debug!(count = requests.len(), "ride requests loaded");
                        self.requests = requests;
                        self.state = ListState::Loaded;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to load ride requests");
                        self.requests.clear();
                        self.state = ListState::LoadError(LOAD_ERROR_MESSAGE.to_string());
                    }
                }
                if self.selected().is_none() {
                    self.selected = None;
                }
            }
            RequestEvent::Responded { id, decision, result } => {
                self.responding = None;
                self.selected = None;
                match result {
                    Ok(_) => {
                        if let Some(request) = self.requests.iter_mut().find(|r| r.id == id) {
                            request.status = decision.resulting_status();
                        }
                    }
                    Err(e) => {
                        tracing::error!(request = %id, %decision, error = %e, "respond failed");
                        let verb = match decision {
                            RespondDecision::Accepted => "accept",
                            RespondDecision::Rejected => "decline",
                        };
                        self.respond_error =
                            Some(format!("Could not {} the ride request: {}", verb, e.user_message()));
                    }
                }
            }
        }
    }
}
