//! Navigation Tracker
//!
//! Periodic refresh of the driver's position while the navigation view is
//! open. The tracker owns one task; dropping the tracker or calling
//! [`NavigationTracker::stop`] aborts it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::location::LocationProvider;
use crate::shared::location::{haversine_km, Coordinates};

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/";

/// Shortest refresh period the tracker accepts.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Latest state published by the tracker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationSnapshot {
    pub driver_location: Option<Coordinates>,
    pub distance_to_pickup_km: Option<f64>,
    pub error: Option<String>,
    /// Completed refresh attempts, successful or not
    pub refreshes: u64,
}

#[derive(Debug)]
pub struct NavigationTracker {
    pickup: Coordinates,
    snapshot: watch::Receiver<NavigationSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl NavigationTracker {
    /// Refresh immediately, then every `interval`, raised to
    /// [`MIN_REFRESH_INTERVAL`] if shorter.
    pub fn start(provider: Arc<dyn LocationProvider>, pickup: Coordinates, interval: Duration) -> Self {
        if interval < MIN_REFRESH_INTERVAL {
            tracing::warn!(?interval, "navigation refresh interval too short; clamping");
        }
        let interval = interval.max(MIN_REFRESH_INTERVAL);
        let (tx, snapshot) = watch::channel(NavigationSnapshot::default());
        tracing::debug!(?interval, "navigation tracking started");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let fix = provider.current_location().await;
                tx.send_modify(|snapshot| {
                    snapshot.refreshes += 1;
                    match fix {
                        Ok(position) => {
                            snapshot.driver_location = Some(position);
                            snapshot.distance_to_pickup_km = Some(haversine_km(position, pickup));
                            snapshot.error = None;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "navigation location refresh failed");
                            snapshot.error = Some(e.user_message().to_string());
                        }
                    }
                });
            }
        });

        Self {
            pickup,
            snapshot,
            task: Some(task),
        }
    }

    pub fn pickup(&self) -> Coordinates {
        self.pickup
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NavigationSnapshot> {
        self.snapshot.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            tracing::debug!("navigation tracking stopped");
            task.abort();
        }
    }
}

impl Drop for NavigationTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Driving directions link between two points.
pub fn directions_url(origin: Coordinates, destination: Coordinates) -> String {
    format!(
        "{}?api=1&origin={},{}&destination={},{}&travelmode=driving",
        DIRECTIONS_BASE_URL, origin.latitude, origin.longitude, destination.latitude, destination.longitude
    )
}
