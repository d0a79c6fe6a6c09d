//! Client Module
//!
//! Everything the dashboard needs to talk to the rides backend and the device:
//!
//! - **`config`** - layered configuration (defaults, TOML file, environment)
//! - **`session`** - auth session store, persisted to a JSON file
//! - **`api`** - typed HTTP client for rides and auth endpoints
//! - **`location`** - device geolocation, reverse geocoding and search
//! - **`debounce`** - cancellable delayed effects with generations
//! - **`booking`** - passenger ride booking workflow
//! - **`requests`** - driver ride request workflow
//! - **`history`** - passenger ride history
//! - **`navigation`** - periodic driver location refresh
//! - **`auth`** - sign-in and sign-up flows
//!
//! Workflows own their state and receive effect results over a channel; the
//! UI calls `poll()` once per frame to fold those results in.

pub mod api;
pub mod auth;
pub mod booking;
pub mod config;
pub mod debounce;
pub mod history;
pub mod location;
pub mod navigation;
pub mod requests;
pub mod session;

pub use api::{AuthApi, RideApi, RideApiClient};
pub use auth::{AuthError, AuthService, SignInForm, SignUpForm};
pub use booking::{BookingError, BookingField, BookingStatus, RideBookingWorkflow};
pub use config::Config;
pub use debounce::Debouncer;
pub use history::RideHistoryWorkflow;
pub use location::{
    FixedGeolocator, Geolocator, LocationProvider, MapViewport, PositionOptions,
    SampleLocationProvider, UnsupportedGeolocator,
};
pub use navigation::{directions_url, NavigationSnapshot, NavigationTracker};
pub use requests::{ListState, RespondError, RideRequestDetail, RideRequestWorkflow};
pub use session::{FileSessionStorage, MemorySessionStorage, Session, SessionStorage, SessionStore};
