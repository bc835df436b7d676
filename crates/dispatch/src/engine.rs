//! Offer broadcast and resolution.
//!
//! `dispatch` searches for candidates, fans the offer out concurrently and
//! arms a single expiry timer per ride. The timer re-reads the ride before
//! acting, so an accept landing at the same instant always wins: the
//! cancellation goes through the same conditional update as every other
//! transition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common::{Publisher, RideId, RiderId, Topic};
use domain::{
    Candidate, CancelledBy, DomainError, Ride, RideLifecycle, RideRepository, RideStatus,
    RiderDirectory, RiderRepository,
};
use futures_util::future::join_all;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::ranking::rank;

/// What went out after a dispatch round.
#[derive(Debug, Clone)]
pub struct OfferBroadcast {
    pub ride_id: RideId,
    /// Riders notified, in ranked order.
    pub notified: Vec<RiderId>,
    /// Closest candidate to the pickup, independent of ranking mode.
    pub nearest: Option<Candidate>,
    /// Radius the candidates were found within.
    pub radius_km: f64,
}

struct ActiveOffer {
    candidates: Vec<RiderId>,
    expiry: JoinHandle<()>,
}

/// Matches pending rides to riders.
///
/// One open offer per ride; re-dispatching supersedes the previous offer
/// and its timer. The offer registry is in-process and volatile, the same
/// trust boundary as the store it sits next to.
pub struct DispatchEngine<S, P> {
    lifecycle: RideLifecycle<S>,
    directory: RiderDirectory<S>,
    publisher: P,
    config: DispatchConfig,
    offers: Arc<Mutex<HashMap<RideId, ActiveOffer>>>,
}

impl<S, P> DispatchEngine<S, P>
where
    S: RideRepository + RiderRepository + Clone + Send + Sync + 'static,
    P: Publisher + Clone + 'static,
{
    /// Creates an engine with default configuration.
    pub fn new(store: S, publisher: P) -> Self {
        Self::with_config(store, publisher, DispatchConfig::default())
    }

    /// Creates an engine with explicit configuration.
    pub fn with_config(store: S, publisher: P, config: DispatchConfig) -> Self {
        Self {
            lifecycle: RideLifecycle::new(store.clone()),
            directory: RiderDirectory::new(store),
            publisher,
            config,
            offers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of offers currently open.
    pub fn open_offer_count(&self) -> usize {
        self.offers.lock().unwrap().len()
    }

    /// Broadcasts a pending ride to eligible riders.
    ///
    /// Searches at the configured radius, then once more at double the
    /// radius if nothing was found. The expiry timer is armed either way:
    /// a ride with zero candidates stays pending for the offer window, so
    /// a rider coming online can still be matched by a re-dispatch.
    #[tracing::instrument(skip(self))]
    pub async fn dispatch(&self, ride_id: RideId) -> Result<OfferBroadcast, DispatchError> {
        let ride = self.lifecycle.get_ride(ride_id).await?;
        if ride.status != RideStatus::Pending {
            return Err(DomainError::InvalidState {
                current: ride.status,
                action: "dispatch",
            }
            .into());
        }

        let pickup = ride.pickup.coordinates();
        let mut radius_km = self.config.radius_km;
        let mut candidates = self
            .directory
            .find_candidates(ride.vehicle_type, pickup, radius_km)
            .await?;
        if candidates.is_empty() {
            radius_km *= 2.0;
            candidates = self
                .directory
                .find_candidates(ride.vehicle_type, pickup, radius_km)
                .await?;
        }

        // Discovery order is ascending distance, so the nearest comes first.
        let nearest = candidates.first().copied();
        let ranked = rank(candidates, self.config.ranking);
        let notified: Vec<RiderId> = ranked.iter().map(|c| c.rider_id).collect();
        self.register_offer(ride_id, notified.clone());

        if ranked.is_empty() {
            tracing::warn!(%ride_id, radius_km, "no candidates, ride left pending");
            metrics::counter!("dispatch_empty_total").increment(1);
            return Err(DispatchError::NoCandidates {
                vehicle_type: ride.vehicle_type,
                radius_km,
            });
        }

        let expires_in_secs = self.config.offer_timeout.as_secs();
        let broadcasts = ranked.iter().map(|candidate| {
            self.publisher.publish(
                Topic::rider(candidate.rider_id),
                json!({
                    "event": "ride_offer",
                    "ride_id": ride.id,
                    "requester_id": ride.requester_id,
                    "vehicle_type": ride.vehicle_type,
                    "pickup": ride.pickup,
                    "dropoff": ride.dropoff,
                    "trip_km": ride.distance_km,
                    "fare": ride.fare.final_amount,
                    "distance_km": candidate.distance_km,
                    "expires_in_secs": expires_in_secs,
                }),
            )
        });
        join_all(broadcasts).await;

        metrics::counter!("dispatch_offers_total").increment(notified.len() as u64);
        tracing::info!(%ride_id, notified = notified.len(), radius_km, "offer broadcast");

        Ok(OfferBroadcast {
            ride_id,
            notified,
            nearest,
            radius_km,
        })
    }

    /// Resolves an open offer in favor of one rider.
    ///
    /// First accept wins; the loser of a race surfaces `InvalidState` from
    /// the underlying conditional update. On success the expiry timer is
    /// disarmed, losing candidates get a retraction and the requester is
    /// told who is coming.
    #[tracing::instrument(skip(self))]
    pub async fn accept_offer(
        &self,
        ride_id: RideId,
        rider_id: RiderId,
    ) -> Result<Ride, DispatchError> {
        let ride = self.lifecycle.accept(ride_id, rider_id).await?;

        let offer = self.offers.lock().unwrap().remove(&ride_id);
        if let Some(offer) = offer {
            offer.expiry.abort();
            let withdrawals = offer
                .candidates
                .iter()
                .filter(|c| **c != rider_id)
                .map(|loser| {
                    self.publisher.publish(
                        Topic::rider(*loser),
                        json!({ "event": "offer_withdrawn", "ride_id": ride_id }),
                    )
                });
            join_all(withdrawals).await;
        }

        self.publisher
            .publish(
                Topic::user(ride.requester_id),
                json!({
                    "event": "ride_accepted",
                    "ride_id": ride_id,
                    "rider_id": rider_id,
                }),
            )
            .await;

        tracing::info!(%ride_id, %rider_id, "offer accepted");
        Ok(ride)
    }

    /// Records a rider turning an offer down.
    ///
    /// Advisory only: the offer stays open for everyone else and the timer
    /// keeps running.
    pub fn decline(&self, ride_id: RideId, rider_id: RiderId) {
        metrics::counter!("dispatch_declines_total").increment(1);
        tracing::info!(%ride_id, %rider_id, "offer declined");
    }

    fn register_offer(&self, ride_id: RideId, candidates: Vec<RiderId>) {
        let expiry = self.schedule_expiry(ride_id);
        let previous = self.offers.lock().unwrap().insert(
            ride_id,
            ActiveOffer {
                candidates,
                expiry,
            },
        );
        // A re-dispatch supersedes the old offer and its timer.
        if let Some(previous) = previous {
            previous.expiry.abort();
        }
    }

    fn schedule_expiry(&self, ride_id: RideId) -> JoinHandle<()> {
        let lifecycle = self.lifecycle.clone();
        let publisher = self.publisher.clone();
        let offers = Arc::clone(&self.offers);
        let timeout = self.config.offer_timeout;

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            // Re-read at fire time, and only then touch the registry: an
            // accept landing in this window still needs the offer entry to
            // retract the losing candidates.
            let ride = match lifecycle.get_ride(ride_id).await {
                Ok(ride) => ride,
                Err(e) => {
                    offers.lock().unwrap().remove(&ride_id);
                    tracing::warn!(%ride_id, error = %e, "expiry lookup failed");
                    return;
                }
            };
            if ride.status != RideStatus::Pending {
                // In-service rides keep their entry for accept_offer to
                // consume; terminal rides have no one left to claim it.
                if ride.status.is_terminal() {
                    offers.lock().unwrap().remove(&ride_id);
                }
                return;
            }

            match lifecycle
                .cancel(
                    ride_id,
                    CancelledBy::System,
                    Some("no riders available".to_string()),
                )
                .await
            {
                Ok(cancelled) => {
                    offers.lock().unwrap().remove(&ride_id);
                    metrics::counter!("dispatch_offers_expired_total").increment(1);
                    tracing::info!(%ride_id, "offer expired, ride cancelled");
                    publisher
                        .publish(
                            Topic::user(cancelled.requester_id),
                            json!({
                                "event": "ride_cancelled",
                                "ride_id": ride_id,
                                "reason": "no riders available",
                            }),
                        )
                        .await;
                }
                // Lost the race to an accept between the read and the
                // conditional update; the entry stays for accept_offer.
                Err(DomainError::InvalidState { .. }) => {}
                Err(e) => {
                    offers.lock().unwrap().remove(&ride_id);
                    tracing::warn!(%ride_id, error = %e, "expiry cancel failed");
                }
            }
        })
    }
}
