//! Ride lifecycle service: owns every state transition and its side
//! effects on the rider aggregate.

use chrono::Utc;
use common::{FareConfig, Location, RideId, RiderId, UserId, VehicleType, distance_km, eta};

use crate::directory::{Candidate, RiderDirectory};
use crate::error::DomainError;
use crate::ports::{RepositoryError, RideRepository, RiderRepository};
use crate::ride::{CancelledBy, Ride, RideStatus};

/// A new ride request.
#[derive(Debug, Clone)]
pub struct RideRequest {
    pub requester_id: UserId,
    pub vehicle_type: VehicleType,
    pub pickup: Location,
    pub dropoff: Location,
    pub notes: Option<String>,
}

/// Result of creating a ride: the persisted ride plus an unfiltered
/// snapshot of riders that could serve it, for the caller's convenience.
#[derive(Debug, Clone)]
pub struct CreatedRide {
    pub ride: Ride,
    pub nearby_riders: Vec<Candidate>,
}

/// Service for driving rides through their lifecycle.
///
/// Generic over the store; the concurrency-sensitive operations (the
/// requester guard in `create`, the claim and assignment in `accept`) are
/// serialized by the store's conditional primitives, not by any lock held
/// here.
#[derive(Clone)]
pub struct RideLifecycle<S> {
    store: S,
    directory: RiderDirectory<S>,
    fare_config: FareConfig,
}

impl<S> RideLifecycle<S>
where
    S: RideRepository + RiderRepository + Clone,
{
    /// Creates a new lifecycle service with default fare configuration.
    pub fn new(store: S) -> Self {
        Self::with_fare_config(store, FareConfig::default())
    }

    /// Creates a new lifecycle service with explicit fare configuration.
    pub fn with_fare_config(store: S, fare_config: FareConfig) -> Self {
        let directory = RiderDirectory::new(store.clone());
        Self {
            store,
            directory,
            fare_config,
        }
    }

    /// Loads a ride by id.
    pub async fn get_ride(&self, ride_id: RideId) -> Result<Ride, DomainError> {
        self.store
            .ride(ride_id)
            .await?
            .ok_or(DomainError::RideNotFound(ride_id))
    }

    /// Creates a ride in `Pending` state.
    ///
    /// Rejects requesters that already have a live ride; the check and the
    /// insert are one exclusive store operation, so concurrent requests by
    /// the same requester cannot both land. Distance, duration estimate and
    /// fare are computed up front from the pickup/dropoff pair.
    #[tracing::instrument(skip(self, request), fields(requester_id = %request.requester_id))]
    pub async fn create(&self, request: RideRequest) -> Result<CreatedRide, DomainError> {
        let trip_km = distance_km(
            request.pickup.coordinates(),
            request.dropoff.coordinates(),
        );
        let duration_estimate_min = eta(trip_km, None).eta_minutes;
        let fare = self.fare_config.quote(trip_km).into();

        let ride = Ride::request(
            request.requester_id,
            request.vehicle_type,
            request.pickup.clone(),
            request.dropoff,
            trip_km,
            duration_estimate_min,
            fare,
            request.notes,
        );
        self.store
            .insert_ride_if_no_active(ride.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::ActiveRideConflict {
                    requester_id,
                    active_ride_id,
                } => DomainError::ActiveRideExists {
                    requester_id,
                    ride_id: active_ride_id,
                },
                other => DomainError::Repository(other),
            })?;

        let nearby_riders = self
            .directory
            .find_candidates(
                request.vehicle_type,
                request.pickup.coordinates(),
                f64::INFINITY,
            )
            .await?;

        metrics::counter!("rides_created_total").increment(1);
        tracing::info!(ride_id = %ride.id, distance_km = trip_km, "ride created");

        Ok(CreatedRide { ride, nearby_riders })
    }

    /// Accepts a pending ride on behalf of a rider.
    ///
    /// Two conditional updates, in claim order: the rider's availability is
    /// flipped off first, then the ride is assigned. A rider racing itself
    /// on two pending rides loses the availability claim on one of them; a
    /// rider losing the ride race gets its claim rolled back. Of two racing
    /// riders on one ride exactly one succeeds and the other observes
    /// `InvalidState`.
    #[tracing::instrument(skip(self))]
    pub async fn accept(&self, ride_id: RideId, rider_id: RiderId) -> Result<Ride, DomainError> {
        let rider = self.directory.get(rider_id).await?;
        if !rider.can_accept_ride() {
            return Err(DomainError::RiderUnavailable(rider_id));
        }

        self.store
            .update_rider_if(rider_id, true, |r| r.mark_busy())
            .await
            .map_err(|e| match e {
                RepositoryError::AvailabilityConflict { rider_id } => {
                    DomainError::RiderUnavailable(rider_id)
                }
                RepositoryError::RiderNotFound(id) => DomainError::RiderNotFound(id),
                other => DomainError::Repository(other),
            })?;

        let now = Utc::now();
        let ride = match self
            .store
            .update_ride_if(ride_id, RideStatus::Pending, move |ride| {
                ride.record_acceptance(rider_id, now);
            })
            .await
        {
            Ok(ride) => ride,
            Err(e) => {
                // Lost the ride race after winning the claim; release it.
                self.store
                    .update_rider(rider_id, |r| r.mark_free())
                    .await?;
                return Err(DomainError::from_conflict(e, "accept"));
            }
        };

        metrics::counter!("rides_accepted_total").increment(1);
        tracing::info!(%ride_id, %rider_id, "ride accepted");
        Ok(ride)
    }

    /// Marks the assigned rider as arrived at the pickup point.
    #[tracing::instrument(skip(self))]
    pub async fn mark_arrived(
        &self,
        ride_id: RideId,
        rider_id: RiderId,
    ) -> Result<Ride, DomainError> {
        self.assigned_transition(ride_id, rider_id, RideStatus::Accepted, "mark arrived", |r| {
            r.record_arrival(Utc::now())
        })
        .await
    }

    /// Starts the trip.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self, ride_id: RideId, rider_id: RiderId) -> Result<Ride, DomainError> {
        self.assigned_transition(ride_id, rider_id, RideStatus::Arrived, "start", |r| {
            r.record_start(Utc::now())
        })
        .await
    }

    /// Completes the trip: settles cash payment, credits the rider's
    /// earnings and counters, and restores their availability.
    #[tracing::instrument(skip(self))]
    pub async fn complete(&self, ride_id: RideId, rider_id: RiderId) -> Result<Ride, DomainError> {
        let ride = self
            .assigned_transition(ride_id, rider_id, RideStatus::InProgress, "complete", |r| {
                r.record_completion(Utc::now())
            })
            .await?;

        let fare = ride.fare.final_amount;
        self.store
            .update_rider(rider_id, move |r| r.record_completion(fare))
            .await?;

        metrics::counter!("rides_completed_total").increment(1);
        tracing::info!(%ride_id, %rider_id, fare = %fare, "ride completed");
        Ok(ride)
    }

    /// Cancels a ride from any non-terminal state.
    ///
    /// Any participant may cancel; the system actor is used for timeouts.
    /// If a rider was already assigned, their counters are updated and
    /// their availability restored.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(
        &self,
        ride_id: RideId,
        actor: CancelledBy,
        reason: Option<String>,
    ) -> Result<Ride, DomainError> {
        let current = self.get_ride(ride_id).await?;

        if current.status.is_terminal() {
            return Err(DomainError::InvalidState {
                current: current.status,
                action: "cancel",
            });
        }
        if !current.is_participant(&actor) {
            return Err(DomainError::Unauthorized { ride_id });
        }

        // CAS against the status just read: if the ride moved on in the
        // meantime (e.g. the expiry timer racing an accept), the caller
        // gets InvalidState instead of a stale cancellation.
        let now = Utc::now();
        let ride = self
            .store
            .update_ride_if(ride_id, current.status, move |ride| {
                ride.record_cancellation(actor, reason, now);
            })
            .await
            .map_err(|e| DomainError::from_conflict(e, "cancel"))?;

        if let Some(rider_id) = ride.rider_id {
            self.store
                .update_rider(rider_id, |r| r.record_cancellation())
                .await?;
        }

        metrics::counter!("rides_cancelled_total").increment(1);
        tracing::info!(%ride_id, "ride cancelled");
        Ok(ride)
    }

    /// Shared read-validate-update path for rider-driven transitions.
    async fn assigned_transition<F>(
        &self,
        ride_id: RideId,
        rider_id: RiderId,
        expected: RideStatus,
        action: &'static str,
        apply: F,
    ) -> Result<Ride, DomainError>
    where
        F: FnOnce(&mut Ride) + Send,
    {
        let current = self.get_ride(ride_id).await?;

        if current.status != expected {
            return Err(DomainError::InvalidState {
                current: current.status,
                action,
            });
        }
        if !current.assigned_to(rider_id) {
            return Err(DomainError::Unauthorized { ride_id });
        }

        self.store
            .update_ride_if(ride_id, expected, apply)
            .await
            .map_err(|e| DomainError::from_conflict(e, action))
    }
}
