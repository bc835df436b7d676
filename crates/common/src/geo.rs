//! Pure geographic math: great-circle distance and ETA estimation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Coordinates;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed travel speed when no live speed is reported, approximating
/// urban traffic.
pub const DEFAULT_SPEED_KMH: f64 = 30.0;

/// Great-circle (Haversine) distance between two points, in kilometres,
/// rounded to 2 decimal places.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    round2(EARTH_RADIUS_KM * c)
}

/// An estimated time of arrival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eta {
    /// Distance remaining, in kilometres.
    pub distance_km: f64,
    /// Total estimated minutes until arrival, including the safety buffer.
    pub eta_minutes: u32,
    /// Estimated arrival timestamp.
    pub arrival_at: DateTime<Utc>,
}

/// Estimates arrival from remaining distance and an optional live speed.
///
/// Uses `speed_kmh` when present and positive, otherwise
/// [`DEFAULT_SPEED_KMH`]. A safety buffer of 20% of the travel time,
/// clamped to [2, 5] minutes, is added before rounding up to the next
/// whole minute.
pub fn eta(distance_km: f64, speed_kmh: Option<f64>) -> Eta {
    let speed = match speed_kmh {
        Some(s) if s > 0.0 => s,
        _ => DEFAULT_SPEED_KMH,
    };

    let travel_minutes = distance_km / speed * 60.0;
    let buffer_minutes = (travel_minutes * 0.2).clamp(2.0, 5.0);
    let total_minutes = (travel_minutes + buffer_minutes).ceil() as u32;

    Eta {
        distance_km,
        eta_minutes: total_minutes,
        arrival_at: Utc::now() + Duration::minutes(total_minutes as i64),
    }
}

/// Straight-line route stub: no routing provider is standardized, so the
/// polyline is just the two endpoints.
pub fn route_polyline(from: Coordinates, to: Coordinates) -> Vec<Coordinates> {
    vec![from, to]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
