//! Ride and ride-request types
//!
//! The backend is inconsistent about status casing (`PENDING` on ride
//! requests, `pending` on rides, `ACCEPTED` next to `completed`). Every status
//! is parsed into a canonical enum so that comparisons never depend on case;
//! serialization writes the spelling the backend expects for each type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::location::Location;

/// Lifecycle of a ride request as observed by the driver client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideRequestStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
    /// Anything the backend sends that is not a known status
    Unknown(String),
}

impl RideRequestStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "ACCEPTED" => Self::Accepted,
            "REJECTED" => Self::Rejected,
            "COMPLETED" => Self::Completed,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown(raw) => raw,
        }
    }

    /// Only pending requests accept a driver response.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// Capitalized label for display ("Pending", "Accepted", ...).
    pub fn label(&self) -> String {
        let lower = self.as_str().to_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for RideRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RideRequestStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RideRequestStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// The two answers a driver can give to a ride request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RespondDecision {
    Accepted,
    Rejected,
}

impl RespondDecision {
    /// Status the request moves to when the response succeeds.
    pub fn resulting_status(self) -> RideRequestStatus {
        match self {
            Self::Accepted => RideRequestStatus::Accepted,
            Self::Rejected => RideRequestStatus::Rejected,
        }
    }
}

impl fmt::Display for RespondDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resulting_status().as_str())
    }
}

/// Status of a booked ride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl RideStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Spelling the rides endpoint uses for each status.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "ACCEPTED",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for RideStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for RideStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A distance as the backend reports it, e.g. `{"value": 2450, "unit": "m"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    "m".to_string()
}

impl Distance {
    pub fn meters(value: f64) -> Self {
        Self {
            value,
            unit: default_unit(),
        }
    }

    /// Kilometres, or `None` when the value is unusable.
    pub fn kilometers(&self) -> Option<f64> {
        if !self.value.is_finite() {
            return None;
        }
        match self.unit.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Some(self.value),
            _ => Some(self.value / 1000.0),
        }
    }
}

/// A pending match awaiting a driver's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub passenger_name: Option<String>,
    #[serde(default, deserialize_with = "optional_opaque_id")]
    pub passenger_id: Option<String>,
    pub pickup_location: Location,
    pub destination: Location,
    pub status: RideRequestStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub distance_to_pickup: Option<Distance>,
    #[serde(default)]
    pub trip_distance: Option<Distance>,
    /// Minutes, when the backend supplies its own estimate
    #[serde(default)]
    pub estimated_time: Option<u32>,
    /// Kilometres, when the backend supplies its own estimate
    #[serde(default)]
    pub distance: Option<f64>,
}

/// A ride as booked by a passenger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideData {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_opaque_id"
    )]
    pub id: Option<String>,
    #[serde(deserialize_with = "opaque_id")]
    pub passenger: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_opaque_id"
    )]
    pub passenger_id: Option<String>,
    pub pickup_location: Location,
    pub destination: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RideStatus>,
    #[serde(
        default,
        alias = "driver_id",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_opaque_id"
    )]
    pub driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl RideData {
    /// A new, not yet submitted ride.
    pub fn new(passenger: impl Into<String>, pickup_location: Location, destination: Location) -> Self {
        let passenger = passenger.into();
        Self {
            id: None,
            passenger_id: Some(passenger.clone()),
            passenger,
            pickup_location,
            destination,
            status: None,
            driver: None,
            created_at: None,
            completed_at: None,
        }
    }

    pub fn is_cancellable(&self) -> bool {
        self.id.is_some() && !self.status.as_ref().is_some_and(RideStatus::is_finished)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

/// Ids are opaque; the backend sends them as numbers or strings.
fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
