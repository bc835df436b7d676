//! The Rider entity: a driver who can be offered and accept rides.

use chrono::{DateTime, Duration, Utc};
use common::{Coordinates, Money, RiderId, UserId, VehicleType};
use serde::{Deserialize, Serialize};

/// How long a reported position stays fresh enough for dispatch, in minutes.
pub const POSITION_FRESHNESS_MINUTES: i64 = 5;

/// Platform approval state of a rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Suspended,
}

/// Last reported position of a rider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPing {
    pub lat: f64,
    pub lng: f64,
    pub recorded_at: DateTime<Utc>,
}

impl GeoPing {
    /// Creates a ping stamped with the current time.
    pub fn now(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            recorded_at: Utc::now(),
        }
    }

    /// Returns the coordinate pair of this ping.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    /// Returns true if the ping is recent enough for dispatch decisions.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.recorded_at <= Duration::minutes(POSITION_FRESHNESS_MINUTES)
    }
}

/// Cumulative totals for a rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RiderStats {
    pub total_rides: u32,
    pub completed_rides: u32,
    pub cancelled_rides: u32,
    pub earnings: Money,
}

/// A driver entity, linked 1:1 to a user identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rider {
    pub id: RiderId,
    pub user_id: UserId,
    pub vehicle_type: VehicleType,
    pub approval: ApprovalStatus,
    /// Whether the rider is accepting new offers.
    pub is_available: bool,
    /// Whether the rider's app is foregrounded/connected.
    pub is_online: bool,
    pub position: Option<GeoPing>,
    pub rating: f64,
    pub stats: RiderStats,
}

impl Rider {
    /// Creates a new rider pending approval, offline and unavailable.
    pub fn new(user_id: UserId, vehicle_type: VehicleType) -> Self {
        Self {
            id: RiderId::new(),
            user_id,
            vehicle_type,
            approval: ApprovalStatus::Pending,
            is_available: false,
            is_online: false,
            position: None,
            rating: 5.0,
            stats: RiderStats::default(),
        }
    }

    /// Returns true if the rider may receive dispatch offers: approved,
    /// available, online, with a fresh known position.
    pub fn can_receive_offers(&self, now: DateTime<Utc>) -> bool {
        self.approval == ApprovalStatus::Approved
            && self.is_available
            && self.is_online
            && self.position.is_some_and(|p| p.is_fresh(now))
    }

    /// Returns true if the rider may accept a ride right now.
    ///
    /// Position freshness is not required here: the rider has already seen
    /// the offer and is reacting to it.
    pub fn can_accept_ride(&self) -> bool {
        self.approval == ApprovalStatus::Approved && self.is_available && self.is_online
    }

    // Side effects driven by ride transitions.

    pub(crate) fn mark_busy(&mut self) {
        self.is_available = false;
    }

    pub(crate) fn mark_free(&mut self) {
        self.is_available = true;
    }

    pub(crate) fn record_completion(&mut self, fare: Money) {
        self.stats.total_rides += 1;
        self.stats.completed_rides += 1;
        self.stats.earnings += fare;
        self.is_available = true;
    }

    pub(crate) fn record_cancellation(&mut self) {
        self.stats.total_rides += 1;
        self.stats.cancelled_rides += 1;
        self.is_available = true;
    }
}
