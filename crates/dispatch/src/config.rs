use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How candidates are ordered before the offer fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Nearest rider first.
    #[default]
    Distance,
    /// Highest-rated rider first.
    Rating,
    /// Weighted blend of rating and distance.
    Balanced,
}

/// Dispatch tunables.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Initial search radius around the pickup point.
    pub radius_km: f64,
    /// How long an offer stays open before the ride is auto-cancelled.
    pub offer_timeout: Duration,
    /// Candidate ordering.
    pub ranking: RankingMode,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            radius_km: 5.0,
            offer_timeout: Duration::from_secs(30),
            ranking: RankingMode::Distance,
        }
    }
}
