//! Dispatch engine: candidate search, ranked offer fan-out, timed offer
//! expiry and first-accept-wins resolution.

pub mod config;
pub mod engine;
pub mod error;
pub mod ranking;

pub use config::{DispatchConfig, RankingMode};
pub use engine::{DispatchEngine, OfferBroadcast};
pub use error::DispatchError;
