//! RideDash - Main Library
//!
//! RideDash is the client side of a ride-hailing dashboard. Passengers book
//! rides and follow their history; drivers review incoming ride requests and
//! accept or decline them. All matching and ride lifecycle logic lives in a
//! remote REST service; this crate wraps it with typed clients and
//! client-side workflows.
//!
//! # Module Structure
//!
//! - **`shared`** - Platform-agnostic types
//!   - Ride and ride request wire types, statuses, users and roles
//!   - Error taxonomy and configuration
//!   - Fare and trip-time estimates
//!
//! - **`client`** - Backend and device access
//!   - HTTP client for the rides API
//!   - Auth session store
//!   - Location provider over a sample corpus
//!   - Booking, ride request and history workflows, navigation tracking
//!
//! - **`dashboard`** - Native desktop app (egui/eframe)
//!   - Sign-in / sign-up view
//!   - Role-gated passenger and driver dashboards
//!
//! # Feature Flags
//!
//! - **`gui`** (default) - builds the `dashboard` module and the `ridedash`
//!   binary. Disable it for headless use of the client library.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ridedash::client::{Config, RideApiClient, RideRequestWorkflow, SessionStore};
//!
//! # async fn load_requests() {
//! let config = Config::new();
//! let session = SessionStore::in_memory();
//! let api = Arc::new(RideApiClient::new(config, session));
//!
//! let mut requests = RideRequestWorkflow::new(api);
//! requests.mount();
//! requests.process_next().await;
//! # }
//! ```
//!
//! # Concurrency
//!
//! Workflows are owned by a single caller and never lock. Their effects run
//! as tokio tasks which report back over a channel. The session store is the
//! only shared state; it is cloned into every client and workflow that needs
//! it and notifies subscribers through a `watch` channel.

/// Shared types and data structures
pub mod shared;

/// API client, session and workflows
pub mod client;

/// egui native desktop app
#[cfg(feature = "gui")]
pub mod dashboard;
