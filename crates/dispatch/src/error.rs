use common::VehicleType;
use domain::DomainError;
use thiserror::Error;

/// Errors surfaced by the dispatch engine.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No eligible rider was found, even after expanding the radius.
    #[error("no {vehicle_type} candidates within {radius_km} km")]
    NoCandidates {
        vehicle_type: VehicleType,
        radius_km: f64,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}
