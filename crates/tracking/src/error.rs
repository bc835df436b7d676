use common::RideId;
use domain::{DomainError, RepositoryError};
use thiserror::Error;

/// Errors surfaced by the tracking service.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("ride {0} not found")]
    RideNotFound(RideId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
