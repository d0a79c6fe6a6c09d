//! Shared Module
//!
//! Platform-agnostic types used by the client library and the dashboard:
//! wire types for the rides backend, the error taxonomy, configuration and
//! the fare/time estimate formulas.

/// Error taxonomy
pub mod error;

/// Application configuration
pub mod config;

/// Coordinates, locations and search suggestions
pub mod location;

/// Rides, ride requests and their statuses
pub mod ride;

/// Users, roles and auth payloads
pub mod user;

/// Fare and trip-time estimates
pub mod estimate;

pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::{ApiError, ClientError, LocationError, StorageError, ValidationError};
pub use location::{format_location_for_api, haversine_km, Coordinates, Location, LocationData, LocationOption};
pub use ride::{Distance, RespondDecision, RideData, RideRequest, RideRequestStatus, RideStatus};
pub use user::{LoginRequest, LoginResponse, ProfileUpdate, RegisterRequest, Role, SessionIdentity, UserProfile};
