//! Live tracking for rides in service: position ingestion, proximity
//! milestones, arrival geofencing and the read-side tracking view.

pub mod error;
pub mod milestones;
pub mod service;

pub use error::TrackingError;
pub use milestones::{Milestone, MilestoneTracker, Target};
pub use service::{IngestOutcome, PositionReport, TrackingService, TrackingSnapshot, TrackingView};
