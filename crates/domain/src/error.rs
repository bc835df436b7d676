//! Domain error types.

use common::{RideId, RiderId, UserId};
use thiserror::Error;

use crate::ports::RepositoryError;
use crate::ride::RideStatus;

/// Errors that can occur during ride lifecycle and directory operations.
///
/// `InvalidState` on accept is an expected, non-exceptional outcome of the
/// accept race ("ride already taken") and should be handled as such by
/// callers, not treated as a system fault.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The ride does not exist.
    #[error("Ride not found: {0}")]
    RideNotFound(RideId),

    /// The rider does not exist.
    #[error("Rider not found: {0}")]
    RiderNotFound(RiderId),

    /// A transition was attempted from the wrong status.
    #[error("Invalid state: cannot {action} a ride in {current} state")]
    InvalidState {
        current: RideStatus,
        action: &'static str,
    },

    /// The rider is not approved, available and online.
    #[error("Rider unavailable: {0}")]
    RiderUnavailable(RiderId),

    /// The actor is not a participant of the ride.
    #[error("Unauthorized: actor is not a participant of ride {ride_id}")]
    Unauthorized { ride_id: RideId },

    /// The requester already has a live ride.
    #[error("Requester {requester_id} already has an active ride {ride_id}")]
    ActiveRideExists {
        requester_id: UserId,
        ride_id: RideId,
    },

    /// An error surfaced by the underlying store.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl DomainError {
    /// Maps a conditional-update conflict to the lifecycle-level
    /// `InvalidState`, leaving other repository errors untouched.
    pub(crate) fn from_conflict(err: RepositoryError, action: &'static str) -> Self {
        match err {
            RepositoryError::StatusConflict { actual, .. } => DomainError::InvalidState {
                current: actual,
                action,
            },
            RepositoryError::RideNotFound(id) => DomainError::RideNotFound(id),
            other => DomainError::Repository(other),
        }
    }
}
