//! Location Provider
//!
//! Device geolocation, reverse geocoding and place search. Geocoding and
//! search run over a fixed sample corpus; device geolocation is delegated to a
//! [`Geolocator`] so the desktop build can run with a configured position or
//! none at all.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::shared::error::LocationError;
use crate::shared::location::{haversine_km, Coordinates, LocationOption};

pub use crate::shared::location::format_location_for_api;

/// Centre of the map canvas and seed for a fresh map pin.
pub const DEFAULT_MAP_ORIGIN: Coordinates = Coordinates::new(40.7128, -74.0060);

/// Degrees per pixel on the map canvas.
const DEGREES_PER_PIXEL: f64 = 1.0 / 1000.0;

/// Minimum query length before the corpus is searched.
pub const MIN_QUERY_LEN: usize = 2;

const SAMPLE_LOCATIONS: [(&str, f64, f64); 8] = [
    ("Downtown City Center", 40.7128, -74.0060),
    ("Central Park", 40.7812, -73.9665),
    ("Airport Terminal", 40.6413, -73.7781),
    ("Shopping Mall", 40.7516, -73.9755),
    ("University Campus", 40.7291, -73.9965),
    ("Business District", 40.7587, -73.9787),
    ("Residential Area", 40.7282, -73.7949),
    ("Tech Park", 40.7427, -74.0059),
];

const STREET_NUMBERS: [u32; 8] = [123, 456, 789, 101, 202, 303, 404, 505];
const STREET_NAMES: [&str; 8] = [
    "Main St",
    "Oak Ave",
    "Maple Rd",
    "Broadway",
    "Park Ave",
    "5th Ave",
    "Washington Blvd",
    "Lincoln St",
];
const CITIES: [&str; 6] = [
    "New York",
    "Brooklyn",
    "Queens",
    "Manhattan",
    "Bronx",
    "Staten Island",
];

/// Hints passed to the device geolocator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be returned; zero forces a fresh one
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Source of device position fixes.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn position(&self, options: PositionOptions) -> Result<Coordinates, LocationError>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: Coordinates,
}

impl FixedGeolocator {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn position(&self, _options: PositionOptions) -> Result<Coordinates, LocationError> {
        Ok(self.position)
    }
}

/// No position source; callers fall back to manual input.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocator;

#[async_trait]
impl Geolocator for UnsupportedGeolocator {
    async fn position(&self, _options: PositionOptions) -> Result<Coordinates, LocationError> {
        Err(LocationError::GeolocationUnavailable)
    }
}

/// Location capabilities used by the workflows.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Coordinates, LocationError>;

    /// Best-effort human readable address; never fails.
    async fn address_from_coordinates(&self, coordinates: Coordinates) -> String;

    /// Suggestions matching `query`, empty for queries under two characters.
    async fn search_locations(&self, query: &str) -> Vec<LocationOption>;
}

/// Provider backed by the built-in sample corpus.
pub struct SampleLocationProvider {
    geolocator: Arc<dyn Geolocator>,
    options: PositionOptions,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for SampleLocationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleLocationProvider")
            .field("options", &self.options)
            .finish()
    }
}

impl SampleLocationProvider {
    pub fn new(geolocator: Arc<dyn Geolocator>) -> Self {
        Self {
            geolocator,
            options: PositionOptions::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Provider for a configured device position, or none.
    pub fn for_position(position: Option<Coordinates>) -> Self {
        match position {
            Some(position) => Self::new(Arc::new(FixedGeolocator::new(position))),
            None => Self::new(Arc::new(UnsupportedGeolocator)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Deterministic address synthesis.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn options(&self) -> PositionOptions {
        self.options
    }

    /// Name of the corpus entry nearest to `coordinates`.
    pub fn nearest_place(coordinates: Coordinates) -> &'static str {
        let mut best = SAMPLE_LOCATIONS[0];
        let mut best_distance = f64::INFINITY;
        for entry in SAMPLE_LOCATIONS {
            let distance = haversine_km(coordinates, Coordinates::new(entry.1, entry.2));
            if distance < best_distance {
                best = entry;
                best_distance = distance;
            }
        }
        best.0
    }

    fn synthesize_address(&self, area: &str) -> String {
        let (number, street, city) = match self.rng.lock() {
            Ok(mut rng) => (
                STREET_NUMBERS[rng.gen_range(0..STREET_NUMBERS.len())],
                STREET_NAMES[rng.gen_range(0..STREET_NAMES.len())],
                CITIES[rng.gen_range(0..CITIES.len())],
            ),
            Err(_) => (STREET_NUMBERS[0], STREET_NAMES[0], CITIES[0]),
        };
        format!("{} {}, {}, {}, NY", number, street, area, city)
    }
}

#[async_trait]
impl LocationProvider for SampleLocationProvider {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        let fix = tokio::time::timeout(self.options.timeout, self.geolocator.position(self.options))
            .await
            .unwrap_or(Err(LocationError::Timeout));
        match fix {
            Ok(coordinates) => {
                tracing::debug!(lat = coordinates.latitude, lng = coordinates.longitude, "device location");
                Ok(coordinates)
            }
            Err(e) => {
                tracing::warn!(error = %e, "device location unavailable");
                Err(e)
            }
        }
    }

    async fn address_from_coordinates(&self, coordinates: Coordinates) -> String {
        self.synthesize_address(Self::nearest_place(coordinates))
    }

    async fn search_locations(&self, query: &str) -> Vec<LocationOption> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        SAMPLE_LOCATIONS
            .iter()
            .filter(|(name, _, _)| name.to_lowercase().contains(&needle))
            .map(|(name, lat, lng)| LocationOption {
                name: name.to_string(),
                coordinates: Coordinates::new(*lat, *lng),
            })
            .collect()
    }
}

/// Pixel size of the map canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub width: f64,
    pub height: f64,
}

impl MapViewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Convert a click on the map canvas to coordinates around
/// [`DEFAULT_MAP_ORIGIN`]. North is up.
pub fn pixel_to_coordinates(viewport: MapViewport, x: f64, y: f64) -> Coordinates {
    let dx = x - viewport.width / 2.0;
    let dy = y - viewport.height / 2.0;
    Coordinates::new(
        DEFAULT_MAP_ORIGIN.latitude - dy * DEGREES_PER_PIXEL,
        DEFAULT_MAP_ORIGIN.longitude + dx * DEGREES_PER_PIXEL,
    )
}

/// Inverse of [`pixel_to_coordinates`], used to draw the pin.
pub fn coordinates_to_pixel(viewport: MapViewport, coordinates: Coordinates) -> (f64, f64) {
    (
        viewport.width / 2.0 + (coordinates.longitude - DEFAULT_MAP_ORIGIN.longitude) / DEGREES_PER_PIXEL,
        viewport.height / 2.0 - (coordinates.latitude - DEFAULT_MAP_ORIGIN.latitude) / DEGREES_PER_PIXEL,
    )
}
