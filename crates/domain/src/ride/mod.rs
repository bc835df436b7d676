//! The Ride aggregate and related types.

mod state;

pub use state::RideStatus;

use chrono::{DateTime, Utc};
use common::{FareQuote, Location, Money, RideId, RiderId, UserId, VehicleType};
use serde::{Deserialize, Serialize};

/// How the requester intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Wallet,
}

/// Settlement state of the ride's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

/// Payment details attached to a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
}

/// Full fare breakdown for a ride.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base: Money,
    pub per_km: Money,
    pub total: Money,
    pub discount: Money,
    /// Amount actually charged: total minus discount.
    pub final_amount: Money,
}

impl From<FareQuote> for FareBreakdown {
    fn from(quote: FareQuote) -> Self {
        Self {
            base: quote.base,
            per_km: quote.per_km,
            total: quote.total,
            discount: Money::zero(),
            final_amount: quote.total,
        }
    }
}

/// Who cancelled a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum CancelledBy {
    Requester(UserId),
    Rider(RiderId),
    /// Automatic cancellation, e.g. offer expiry.
    System,
}

/// One transportation request, from creation to a terminal state.
///
/// Rides are never deleted; terminal rides are retained for history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    pub requester_id: UserId,
    /// Assigned rider; `None` until accepted.
    pub rider_id: Option<RiderId>,
    pub vehicle_type: VehicleType,
    pub pickup: Location,
    pub dropoff: Location,
    /// Trip distance pickup→dropoff, in kilometres.
    pub distance_km: f64,
    /// Estimated trip duration in minutes.
    pub duration_estimate_min: u32,
    pub fare: FareBreakdown,
    pub status: RideStatus,
    pub payment: PaymentInfo,
    pub notes: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<CancelledBy>,
    pub cancellation_reason: Option<String>,
}

impl Ride {
    /// Creates a freshly requested ride in `Pending` state with a
    /// cash/pending payment default.
    #[allow(clippy::too_many_arguments)]
    pub fn request(
        requester_id: UserId,
        vehicle_type: VehicleType,
        pickup: Location,
        dropoff: Location,
        distance_km: f64,
        duration_estimate_min: u32,
        fare: FareBreakdown,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: RideId::new(),
            requester_id,
            rider_id: None,
            vehicle_type,
            pickup,
            dropoff,
            distance_km,
            duration_estimate_min,
            fare,
            status: RideStatus::Pending,
            payment: PaymentInfo::default(),
            notes,
            requested_at: Utc::now(),
            accepted_at: None,
            arrived_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
        }
    }

    /// Returns true if the ride is assigned to the given rider.
    pub fn assigned_to(&self, rider_id: RiderId) -> bool {
        self.rider_id == Some(rider_id)
    }

    /// Returns true if the actor participates in this ride.
    pub fn is_participant(&self, actor: &CancelledBy) -> bool {
        match actor {
            CancelledBy::Requester(id) => self.requester_id == *id,
            CancelledBy::Rider(id) => self.assigned_to(*id),
            CancelledBy::System => true,
        }
    }

    // State-mutating helpers applied inside the store's conditional update;
    // the status precondition is enforced by the compare-and-set.

    pub(crate) fn record_acceptance(&mut self, rider_id: RiderId, at: DateTime<Utc>) {
        self.status = RideStatus::Accepted;
        self.rider_id = Some(rider_id);
        self.accepted_at = Some(at);
    }

    pub(crate) fn record_arrival(&mut self, at: DateTime<Utc>) {
        self.status = RideStatus::Arrived;
        self.arrived_at = Some(at);
    }

    pub(crate) fn record_start(&mut self, at: DateTime<Utc>) {
        self.status = RideStatus::InProgress;
        self.started_at = Some(at);
    }

    pub(crate) fn record_completion(&mut self, at: DateTime<Utc>) {
        self.status = RideStatus::Completed;
        self.completed_at = Some(at);
        if self.payment.method == PaymentMethod::Cash {
            self.payment.status = PaymentStatus::Paid;
        }
    }

    pub(crate) fn record_cancellation(
        &mut self,
        actor: CancelledBy,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.status = RideStatus::Cancelled;
        self.cancelled_at = Some(at);
        self.cancelled_by = Some(actor);
        self.cancellation_reason = reason;
    }
}
