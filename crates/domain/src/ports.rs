//! Storage ports.
//!
//! The core treats persistence as a transactional store with CRUD plus one
//! atomic conditional-update primitive, [`RideRepository::update_ride_if`].
//! That primitive is the only serialization point for the accept race: the
//! store compares the ride's current status against the expected one and
//! applies the mutation only on a match, all under a single write lock (or
//! the equivalent transactional guarantee of a real backend).

use async_trait::async_trait;
use common::{RideId, RiderId, UserId};
use thiserror::Error;

use crate::ride::{Ride, RideStatus};
use crate::rider::Rider;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The ride does not exist.
    #[error("Ride not found: {0}")]
    RideNotFound(RideId),

    /// The rider does not exist.
    #[error("Rider not found: {0}")]
    RiderNotFound(RiderId),

    /// A conditional update found the ride in a different status than
    /// expected. This is the expected outcome for the loser of a race.
    #[error("Status conflict on ride {ride_id}: expected {expected}, found {actual}")]
    StatusConflict {
        ride_id: RideId,
        expected: RideStatus,
        actual: RideStatus,
    },

    /// A conditional rider update found the rider's availability flipped
    /// the other way. Expected outcome for the loser of a claim race.
    #[error("Availability conflict on rider {rider_id}")]
    AvailabilityConflict { rider_id: RiderId },

    /// A guarded insert found the requester already holding a live ride.
    #[error("Requester {requester_id} already has active ride {active_ride_id}")]
    ActiveRideConflict {
        requester_id: UserId,
        active_ride_id: RideId,
    },

    /// An entity with this id already exists.
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Persistence port for rides.
#[async_trait]
pub trait RideRepository: Send + Sync {
    /// Inserts a new ride. Fails with `DuplicateId` if the id is taken.
    async fn insert_ride(&self, ride: Ride) -> Result<()>;

    /// Inserts a new ride only if its requester holds no live ride.
    ///
    /// The active-ride scan and the insert happen in one exclusive
    /// section, so two racing requests by the same requester cannot both
    /// land. Fails with `ActiveRideConflict` naming the blocking ride.
    async fn insert_ride_if_no_active(&self, ride: Ride) -> Result<()>;

    /// Looks up a ride by id.
    async fn ride(&self, id: RideId) -> Result<Option<Ride>>;

    /// Atomically mutates a ride if its current status matches `expected`.
    ///
    /// The check and the mutation happen under the same exclusive section;
    /// concurrent callers observe either the old or the new state, never an
    /// interleaving. Fails with `StatusConflict` on a mismatch and the ride
    /// is left untouched. Returns the updated ride.
    async fn update_ride_if<F>(&self, id: RideId, expected: RideStatus, apply: F) -> Result<Ride>
    where
        F: FnOnce(&mut Ride) + Send;

    /// Finds the ride a rider is currently serving (non-terminal,
    /// assigned to the rider), if any.
    async fn active_ride_for_rider(&self, rider_id: RiderId) -> Result<Option<Ride>>;

    /// Finds the requester's live ride (any non-terminal status), if any.
    async fn active_ride_for_requester(&self, requester_id: UserId) -> Result<Option<Ride>>;
}

/// Persistence port for riders.
#[async_trait]
pub trait RiderRepository: Send + Sync {
    /// Inserts a new rider. Fails with `DuplicateId` if the id is taken.
    async fn insert_rider(&self, rider: Rider) -> Result<()>;

    /// Looks up a rider by id.
    async fn rider(&self, id: RiderId) -> Result<Option<Rider>>;

    /// Mutates a rider record, last-write-wins. Returns the updated rider.
    async fn update_rider<F>(&self, id: RiderId, apply: F) -> Result<Rider>
    where
        F: FnOnce(&mut Rider) + Send;

    /// Atomically mutates a rider if `is_available` currently equals
    /// `expected_available`; fails with `AvailabilityConflict` otherwise.
    ///
    /// This is the claim primitive: flipping availability off through it
    /// guarantees a rider can hold at most one ride at a time even under
    /// concurrent accepts of different rides.
    async fn update_rider_if<F>(
        &self,
        id: RiderId,
        expected_available: bool,
        apply: F,
    ) -> Result<Rider>
    where
        F: FnOnce(&mut Rider) + Send;

    /// Returns all riders. Candidate filtering is a linear scan over this
    /// at the scale this core targets.
    async fn riders(&self) -> Result<Vec<Rider>>;
}
