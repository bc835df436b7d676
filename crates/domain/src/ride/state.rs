//! Ride state machine.

use serde::{Deserialize, Serialize};

/// The state of a ride in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Accepted ──► Arrived ──► InProgress ──► Completed
///    │            │           │             │
///    └────────────┴───────────┴─────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RideStatus {
    /// Ride requested, no rider assigned yet.
    #[default]
    Pending,

    /// A rider accepted and is heading to the pickup point.
    Accepted,

    /// The rider is waiting at the pickup point.
    Arrived,

    /// The passenger is on board, heading to the dropoff.
    InProgress,

    /// The ride finished normally (terminal state).
    Completed,

    /// The ride was cancelled (terminal state).
    Cancelled,
}

impl RideStatus {
    /// Returns true if a rider can accept the ride in this state.
    pub fn can_accept(&self) -> bool {
        matches!(self, RideStatus::Pending)
    }

    /// Returns true if the rider can mark arrival at pickup in this state.
    pub fn can_mark_arrived(&self) -> bool {
        matches!(self, RideStatus::Accepted)
    }

    /// Returns true if the trip can start in this state.
    pub fn can_start(&self) -> bool {
        matches!(self, RideStatus::Arrived)
    }

    /// Returns true if the trip can be completed in this state.
    pub fn can_complete(&self) -> bool {
        matches!(self, RideStatus::InProgress)
    }

    /// Returns true if the ride can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this is a terminal state (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// Returns true while a rider is actively serving the ride.
    pub fn is_in_service(&self) -> bool {
        matches!(
            self,
            RideStatus::Accepted | RideStatus::Arrived | RideStatus::InProgress
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Pending => "Pending",
            RideStatus::Accepted => "Accepted",
            RideStatus::Arrived => "Arrived",
            RideStatus::InProgress => "InProgress",
            RideStatus::Completed => "Completed",
            RideStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
