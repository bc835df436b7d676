//! Shared building blocks for the ride matching core.
//!
//! This crate provides:
//! - Typed identifiers and geographic value types
//! - Money as integer minor units
//! - Pure geo math (Haversine distance, ETA estimation)
//! - Fare calculation
//! - The push/broadcast channel seam used to notify users and riders

pub mod fare;
pub mod geo;
pub mod money;
pub mod push;
pub mod types;

pub use fare::{FareConfig, FareQuote};
pub use geo::{DEFAULT_SPEED_KMH, Eta, distance_km, eta, route_polyline};
pub use money::Money;
pub use push::{InMemoryPublisher, Publisher, Topic};
pub use types::{Coordinates, Location, RideId, RiderId, UserId, VehicleType};
