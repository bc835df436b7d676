use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{RideId, RiderId, UserId};
use domain::ports::{RepositoryError, Result, RideRepository, RiderRepository};
use domain::{Ride, RideStatus, Rider};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    rides: HashMap<RideId, Ride>,
    riders: HashMap<RiderId, Rider>,
}

/// In-memory store implementation.
///
/// Both maps live behind one `RwLock`; holding the write lock across the
/// check and the mutation is what makes the conditional operations
/// (`update_ride_if`, `update_rider_if`, `insert_ride_if_no_active`)
/// atomic against competing writers.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of rides stored.
    pub async fn ride_count(&self) -> usize {
        self.inner.read().await.rides.len()
    }

    /// Returns the total number of riders stored.
    pub async fn rider_count(&self) -> usize {
        self.inner.read().await.riders.len()
    }

    /// Clears all rides and riders.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.rides.clear();
        inner.riders.clear();
    }
}

#[async_trait]
impl RideRepository for InMemoryStore {
    async fn insert_ride(&self, ride: Ride) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.rides.contains_key(&ride.id) {
            return Err(RepositoryError::DuplicateId(ride.id.to_string()));
        }
        inner.rides.insert(ride.id, ride);
        Ok(())
    }

    async fn insert_ride_if_no_active(&self, ride: Ride) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.rides.contains_key(&ride.id) {
            return Err(RepositoryError::DuplicateId(ride.id.to_string()));
        }
        if let Some(active) = inner
            .rides
            .values()
            .find(|r| r.requester_id == ride.requester_id && !r.status.is_terminal())
        {
            return Err(RepositoryError::ActiveRideConflict {
                requester_id: ride.requester_id,
                active_ride_id: active.id,
            });
        }
        inner.rides.insert(ride.id, ride);
        Ok(())
    }

    async fn ride(&self, id: RideId) -> Result<Option<Ride>> {
        Ok(self.inner.read().await.rides.get(&id).cloned())
    }

    async fn update_ride_if<F>(&self, id: RideId, expected: RideStatus, apply: F) -> Result<Ride>
    where
        F: FnOnce(&mut Ride) + Send,
    {
        let mut inner = self.inner.write().await;
        let ride = inner
            .rides
            .get_mut(&id)
            .ok_or(RepositoryError::RideNotFound(id))?;

        if ride.status != expected {
            return Err(RepositoryError::StatusConflict {
                ride_id: id,
                expected,
                actual: ride.status,
            });
        }

        apply(ride);
        Ok(ride.clone())
    }

    async fn active_ride_for_rider(&self, rider_id: RiderId) -> Result<Option<Ride>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rides
            .values()
            .find(|r| r.rider_id == Some(rider_id) && !r.status.is_terminal())
            .cloned())
    }

    async fn active_ride_for_requester(&self, requester_id: UserId) -> Result<Option<Ride>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rides
            .values()
            .find(|r| r.requester_id == requester_id && !r.status.is_terminal())
            .cloned())
    }
}

#[async_trait]
impl RiderRepository for InMemoryStore {
    async fn insert_rider(&self, rider: Rider) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.riders.contains_key(&rider.id) {
            return Err(RepositoryError::DuplicateId(rider.id.to_string()));
        }
        inner.riders.insert(rider.id, rider);
        Ok(())
    }

    async fn rider(&self, id: RiderId) -> Result<Option<Rider>> {
        Ok(self.inner.read().await.riders.get(&id).cloned())
    }

    async fn update_rider<F>(&self, id: RiderId, apply: F) -> Result<Rider>
    where
        F: FnOnce(&mut Rider) + Send,
    {
        let mut inner = self.inner.write().await;
        let rider = inner
            .riders
            .get_mut(&id)
            .ok_or(RepositoryError::RiderNotFound(id))?;
        apply(rider);
        Ok(rider.clone())
    }

    async fn update_rider_if<F>(
        &self,
        id: RiderId,
        expected_available: bool,
        apply: F,
    ) -> Result<Rider>
    where
        F: FnOnce(&mut Rider) + Send,
    {
        let mut inner = self.inner.write().await;
        let rider = inner
            .riders
            .get_mut(&id)
            .ok_or(RepositoryError::RiderNotFound(id))?;

        if rider.is_available != expected_available {
            return Err(RepositoryError::AvailabilityConflict { rider_id: id });
        }

        apply(rider);
        Ok(rider.clone())
    }

    async fn riders(&self) -> Result<Vec<Rider>> {
        Ok(self.inner.read().await.riders.values().cloned().collect())
    }
}
