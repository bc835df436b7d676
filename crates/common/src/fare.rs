//! Fare calculation: distance in, fare breakdown out.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Fare configuration constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareConfig {
    /// Flat base fare charged on every ride.
    pub base: Money,
    /// Rate per kilometre.
    pub per_km: Money,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            base: Money::from_major(500),
            per_km: Money::from_major(150),
        }
    }
}

impl FareConfig {
    /// Quotes the fare for a trip of the given distance.
    pub fn quote(&self, distance_km: f64) -> FareQuote {
        FareQuote {
            base: self.base,
            per_km: self.per_km,
            total: self.base + self.per_km.scale_by_km(distance_km),
        }
    }
}

/// A quoted fare for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareQuote {
    pub base: Money,
    pub per_km: Money,
    pub total: Money,
}
