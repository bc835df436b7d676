//! Domain layer for the ride matching core.
//!
//! This crate provides:
//! - The Ride aggregate and its lifecycle state machine
//! - The Rider entity with availability, approval and cumulative stats
//! - Storage ports with the atomic conditional-update primitive
//! - `RideLifecycle`, the service owning every state transition
//! - `RiderDirectory`, the query/mutation surface over riders

pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod ports;
pub mod ride;
pub mod rider;

pub use directory::{Candidate, RiderDirectory};
pub use error::DomainError;
pub use lifecycle::{CreatedRide, RideLifecycle, RideRequest};
pub use ports::{RepositoryError, RideRepository, RiderRepository};
pub use ride::{
    CancelledBy, FareBreakdown, PaymentInfo, PaymentMethod, PaymentStatus, Ride, RideStatus,
};
pub use rider::{ApprovalStatus, GeoPing, Rider, RiderStats};
