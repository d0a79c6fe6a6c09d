//! Fare and trip-time estimates
//!
//! Both estimates are linear in the trip distance:
//! fare = $5 + $1.50/km (2 decimals), time = 5 min + 2 min/km (rounded).

use chrono::{DateTime, Local};

pub const BASE_FARE: f64 = 5.0;
pub const RATE_PER_KM: f64 = 1.5;
pub const BASE_DRIVE_MINUTES: f64 = 5.0;
pub const MINUTES_PER_KM: f64 = 2.0;
/// Shown when no trip distance is known
pub const DEFAULT_TRIP_MINUTES: u32 = 15;

pub const FARE_PENDING: &str = "Calculating...";
pub const DISTANCE_PENDING: &str = "Distance unavailable";

/// Estimated fare in dollars, rounded to cents.
pub fn fare_estimate(trip_km: f64) -> f64 {
    round_to(BASE_FARE + RATE_PER_KM * trip_km.max(0.0), 2)
}

/// Estimated trip duration in whole minutes.
pub fn time_estimate_minutes(trip_km: f64) -> u32 {
    (BASE_DRIVE_MINUTES + MINUTES_PER_KM * trip_km.max(0.0)).round() as u32
}

/// `"$X.XX"` or the pending placeholder.
pub fn format_fare(trip_km: Option<f64>) -> String {
    match trip_km {
        Some(km) => format!("${:.2}", fare_estimate(km)),
        None => FARE_PENDING.to_string(),
    }
}

pub fn trip_minutes(trip_km: Option<f64>) -> u32 {
    trip_km.map(time_estimate_minutes).unwrap_or(DEFAULT_TRIP_MINUTES)
}

/// `"25 min"` below an hour, `"1h 5m"` above.
pub fn format_minutes(minutes: u32) -> String {
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Kilometres with one decimal, e.g. `"2.5"`.
pub fn format_km(km: f64) -> String {
    format!("{:.1}", km)
}

/// Round a distance the way it is displayed, so estimates agree with the
/// number the user sees.
pub fn displayed_km(km: f64) -> f64 {
    round_to(km, 1)
}

/// Render an RFC 3339 timestamp in local time, or return it unchanged.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
