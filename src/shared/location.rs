//! Location types
//!
//! Coordinates are WGS84 degrees. No range validation is performed beyond the
//! values being finite numbers.

use serde::{Deserialize, Serialize};

/// Mean earth radius used by [`haversine_km`]
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A resolved endpoint as the backend expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(address: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            address: address.into(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Resolved means the address is known and the coordinates are usable.
    pub fn is_resolved(&self) -> bool {
        !self.address.trim().is_empty() && self.coordinates().is_finite()
    }
}

/// Coordinates that may not have an address yet.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationData {
    pub coordinates: Coordinates,
    pub address: Option<String>,
}

impl LocationData {
    pub fn new(coordinates: Coordinates, address: Option<String>) -> Self {
        Self {
            coordinates,
            address,
        }
    }
}

impl From<Location> for LocationData {
    fn from(location: Location) -> Self {
        let coordinates = location.coordinates();
        Self {
            coordinates,
            address: Some(location.address),
        }
    }
}

/// One search suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationOption {
    pub name: String,
    pub coordinates: Coordinates,
}

impl LocationOption {
    pub fn to_location(&self) -> Location {
        Location::new(self.name.clone(), self.coordinates)
    }
}

/// Project location data into the backend's shape, synthesizing the address
/// from the coordinates (4 decimals) when none is present.
pub fn format_location_for_api(location: &LocationData) -> Location {
    let address = match location.address.as_deref() {
        Some(address) if !address.is_empty() => address.to_string(),
        _ => format!(
            "{:.4}, {:.4}",
            location.coordinates.latitude, location.coordinates.longitude
        ),
    };
    Location::new(address, location.coordinates)
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
