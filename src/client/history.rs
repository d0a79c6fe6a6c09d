//! Ride History Workflow
//!
//! The passenger's "My Rides" list, loaded for the signed-in identity, with
//! cancellation of rides that have not finished.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::api::RideApi;
use crate::client::requests::ListState;
use crate::client::session::SessionStore;
use crate::shared::error::ApiError;
use crate::shared::ride::RideData;

pub const HISTORY_ERROR_MESSAGE: &str = "Failed to load your rides. Please try again.";

#[derive(Debug)]
pub enum HistoryEvent {
    Loaded {
        generation: u64,
        result: Result<Vec<RideData>, ApiError>,
    },
    Cancelled {
        id: String,
        result: Result<RideData, ApiError>,
    },
}

pub struct RideHistoryWorkflow {
    api: Arc<dyn RideApi>,
    session: SessionStore,
    state: ListState,
    rides: Vec<RideData>,
    cancelling: Option<String>,
    action_error: Option<String>,
    load_generation: u64,
    events_tx: mpsc::UnboundedSender<HistoryEvent>,
    events_rx: mpsc::UnboundedReceiver<HistoryEvent>,
}

impl RideHistoryWorkflow {
    pub fn new(api: Arc<dyn RideApi>, session: SessionStore) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            session,
            state: ListState::Loading,
            rides: Vec::new(),
            cancelling: None,
            action_error: None,
            load_generation: 0,
            events_tx,
            events_rx,
        }
    }

    /// Load the signed-in passenger's rides.
    pub fn load(&mut self) {
        self.load_generation += 1;
        let Some(identity) = self.session.identity() else {
            self.rides.clear();
            self.state = ListState::LoadError(HISTORY_ERROR_MESSAGE.to_string());
            return;
        };

        self.state = ListState::Loading;
        let generation = self.load_generation;
        let api = self.api.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.ride_history(&identity.id).await;
            let _ = tx.send(HistoryEvent::Loaded { generation, result });
        });
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn rides(&self) -> &[RideData] {
        &self.rides
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn is_cancelling(&self, id: &str) -> bool {
        self.cancelling.as_deref() == Some(id)
    }

    pub fn can_cancel(&self, id: &str) -> bool {
        self.cancelling.is_none()
            && self
                .rides
                .iter()
                .any(|r| r.id.as_deref() == Some(id) && r.is_cancellable())
    }

    /// Cancel a ride that is neither completed nor cancelled. Returns false
    /// when the ride cannot be cancelled.
    pub fn cancel(&mut self, id: &str) -> bool {
        if !self.can_cancel(id) {
            return false;
        }
        tracing::debug!(ride = %id, "cancelling ride");
        self.cancelling = Some(id.to_string());
        self.action_error = None;

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = api.cancel_ride(&id).await;
            let _ = tx.send(HistoryEvent::Cancelled { id, result });
        });
        true
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

    fn apply(&mut self, event: HistoryEvent) {
        match event {
            HistoryEvent::Loaded { generation, result } => {
                if generation != self.load_generation {
                    return;
                }
                match result {
                    Ok(rides) => {
                        self.rides = rides;
                        self.state = ListState::Loaded;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to load ride history");
                        self.rides.clear();
                        self.state = ListState::LoadError(HISTORY_ERROR_MESSAGE.to_string());
                    }
                }
            }
            HistoryEvent::Cancelled { id, result } => {
                self.cancelling = None;
                match result {
                    Ok(ride) => {
                        if let Some(entry) = self.rides.iter_mut().find(|r| r.id.as_deref() == Some(id.as_str())) {
                            *entry = ride;
                        }
                    }
                    Err(e) => {
                        tracing::error!(ride = %id, error = %e, "cancel failed");
                        self.action_error = Some(format!("Could not cancel the ride: {}", e.user_message()));
                    }
                }
            }
        }
    }
}
