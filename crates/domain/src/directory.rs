//! Query and mutation surface over the rider population.

use chrono::Utc;
use common::{Coordinates, RiderId, VehicleType, distance_km};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ports::{RepositoryError, RiderRepository};
use crate::rider::{GeoPing, Rider};

/// A rider considered for an offer, with the distance from the pickup
/// point at discovery time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub rider_id: RiderId,
    pub distance_km: f64,
    pub rating: f64,
}

/// Query surface over the rider aggregate.
#[derive(Clone)]
pub struct RiderDirectory<S> {
    store: S,
}

impl<S: RiderRepository> RiderDirectory<S> {
    /// Creates a new directory over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a rider.
    pub async fn register(&self, rider: Rider) -> Result<(), DomainError> {
        self.store.insert_rider(rider).await?;
        Ok(())
    }

    /// Looks up a rider.
    pub async fn get(&self, rider_id: RiderId) -> Result<Rider, DomainError> {
        self.store
            .rider(rider_id)
            .await?
            .ok_or(DomainError::RiderNotFound(rider_id))
    }

    /// Finds dispatch candidates within `radius_km` of `origin`: matching
    /// vehicle type, approved, available, online, fresh position. The
    /// result is sorted by ascending distance; discovery order is the
    /// stable tie-break downstream ranking relies on.
    ///
    /// Linear scan; no spatial index at this scale.
    #[tracing::instrument(skip(self))]
    pub async fn find_candidates(
        &self,
        vehicle_type: VehicleType,
        origin: Coordinates,
        radius_km: f64,
    ) -> Result<Vec<Candidate>, DomainError> {
        let now = Utc::now();
        let mut candidates: Vec<Candidate> = self
            .store
            .riders()
            .await?
            .into_iter()
            .filter(|r| r.vehicle_type == vehicle_type && r.can_receive_offers(now))
            .filter_map(|r| {
                let position = r.position?;
                let distance = distance_km(origin, position.coordinates());
                (distance <= radius_km).then_some(Candidate {
                    rider_id: r.id,
                    distance_km: distance,
                    rating: r.rating,
                })
            })
            .collect();

        candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(candidates)
    }

    /// Toggles whether the rider accepts new offers.
    #[tracing::instrument(skip(self))]
    pub async fn set_availability(
        &self,
        rider_id: RiderId,
        available: bool,
    ) -> Result<Rider, DomainError> {
        self.update(rider_id, |r| r.is_available = available).await
    }

    /// Toggles the rider's online flag.
    #[tracing::instrument(skip(self))]
    pub async fn set_online(&self, rider_id: RiderId, online: bool) -> Result<Rider, DomainError> {
        self.update(rider_id, |r| r.is_online = online).await
    }

    /// Records the rider's latest position, last-write-wins.
    pub async fn update_position(
        &self,
        rider_id: RiderId,
        lat: f64,
        lng: f64,
    ) -> Result<Rider, DomainError> {
        self.update(rider_id, move |r| r.position = Some(GeoPing::now(lat, lng)))
            .await
    }

    async fn update<F>(&self, rider_id: RiderId, apply: F) -> Result<Rider, DomainError>
    where
        F: FnOnce(&mut Rider) + Send,
    {
        self.store
            .update_rider(rider_id, apply)
            .await
            .map_err(|e| match e {
                RepositoryError::RiderNotFound(id) => DomainError::RiderNotFound(id),
                other => DomainError::Repository(other),
            })
    }
}
