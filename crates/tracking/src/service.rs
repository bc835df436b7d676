//! Live tracking: position ingestion, proximity events and the read-side
//! tracking view.
//!
//! Tracking never mutates ride state. Arrival inside the geofence is a
//! notification; the assigned rider still confirms arrival and trip start
//! through the lifecycle service.

use common::{
    Coordinates, DEFAULT_SPEED_KMH, Eta, Publisher, RideId, RiderId, Topic, distance_km, eta,
    route_polyline,
};
use domain::{Ride, RideRepository, RideStatus, RiderDirectory, RiderRepository};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::TrackingError;
use crate::milestones::{GEOFENCE_KM, Milestone, MilestoneTracker, Target};

/// A raw position report from a rider's device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionReport {
    pub lat: f64,
    pub lng: f64,
    pub speed_kmh: Option<f64>,
    pub heading_deg: Option<f64>,
    pub accuracy_m: Option<f64>,
}

impl PositionReport {
    /// A bare coordinate report with no device telemetry.
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            speed_kmh: None,
            heading_deg: None,
            accuracy_m: None,
        }
    }
}

/// Point-in-time view of a rider en route to a target.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingSnapshot {
    pub ride_id: RideId,
    pub rider_id: RiderId,
    pub position: Coordinates,
    pub target: Target,
    pub distance_km: f64,
    pub eta: Eta,
    pub route: Vec<Coordinates>,
}

/// What a tracking query sees for a ride.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrackingView {
    /// No rider assigned yet.
    Unassigned,
    /// The ride is in a state with nothing to track.
    NotTrackable { status: RideStatus },
    /// The assigned rider has not reported a position yet.
    NoPosition,
    /// Live snapshot.
    Live(TrackingSnapshot),
}

/// Outcome of a position ingest.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// Position stored; the rider has no live ride.
    Idle,
    /// Position stored and tracking events evaluated.
    Tracked(TrackingSnapshot),
}

/// Ingests rider positions and emits proximity events.
pub struct TrackingService<S, P> {
    store: S,
    directory: RiderDirectory<S>,
    publisher: P,
    milestones: MilestoneTracker,
}

impl<S, P> TrackingService<S, P>
where
    S: RideRepository + RiderRepository + Clone,
    P: Publisher,
{
    pub fn new(store: S, publisher: P) -> Self {
        Self {
            directory: RiderDirectory::new(store.clone()),
            store,
            publisher,
            milestones: MilestoneTracker::new(),
        }
    }

    /// Ingests a rider position report.
    ///
    /// The position is stored unconditionally, last-write-wins. If the
    /// rider is on a live ride, the requester gets a location update and
    /// any newly-crossed proximity milestones; inside the arrival geofence
    /// both parties are notified, once per leg.
    #[tracing::instrument(skip(self, report), fields(lat = report.lat, lng = report.lng))]
    pub async fn ingest_location(
        &self,
        rider_id: RiderId,
        report: PositionReport,
    ) -> Result<IngestOutcome, TrackingError> {
        self.directory
            .update_position(rider_id, report.lat, report.lng)
            .await?;
        metrics::counter!("tracking_pings_total").increment(1);

        let Some(ride) = self.store.active_ride_for_rider(rider_id).await? else {
            return Ok(IngestOutcome::Idle);
        };
        let Some(target) = Target::for_status(ride.status) else {
            return Ok(IngestOutcome::Idle);
        };

        let position = Coordinates::new(report.lat, report.lng);
        let snapshot = build_snapshot(&ride, rider_id, position, target, report.speed_kmh);

        let requester = Topic::user(ride.requester_id);
        self.publisher
            .publish(
                requester.clone(),
                json!({
                    "event": "location_update",
                    "ride_id": ride.id,
                    "rider_id": rider_id,
                    "position": position,
                    "heading_deg": report.heading_deg,
                    "target": target,
                    "distance_km": snapshot.distance_km,
                    "eta_minutes": snapshot.eta.eta_minutes,
                }),
            )
            .await;

        let speed = report
            .speed_kmh
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_SPEED_KMH);
        let travel_min = snapshot.distance_km / speed * 60.0;
        for milestone in self
            .milestones
            .due(ride.id, target, snapshot.distance_km, travel_min)
        {
            let (kind, threshold) = match milestone {
                Milestone::DistanceKm(t) => ("distance_km", t),
                Milestone::TimeMin(t) => ("time_min", t),
            };
            metrics::counter!("tracking_milestones_total").increment(1);
            tracing::debug!(ride_id = %ride.id, kind, threshold, "proximity milestone");
            self.publisher
                .publish(
                    requester.clone(),
                    json!({
                        "event": "proximity_milestone",
                        "ride_id": ride.id,
                        "kind": kind,
                        "threshold": threshold,
                        "target": target,
                        "distance_km": snapshot.distance_km,
                        "eta_minutes": snapshot.eta.eta_minutes,
                    }),
                )
                .await;
        }

        if snapshot.distance_km <= GEOFENCE_KM {
            self.emit_arrival(&ride, rider_id, target).await;
        }

        Ok(IngestOutcome::Tracked(snapshot))
    }

    /// Returns the tracking view for a ride.
    pub async fn get_tracking(&self, ride_id: RideId) -> Result<TrackingView, TrackingError> {
        let ride = self
            .store
            .ride(ride_id)
            .await?
            .ok_or(TrackingError::RideNotFound(ride_id))?;

        let Some(rider_id) = ride.rider_id else {
            return Ok(TrackingView::Unassigned);
        };
        let Some(target) = Target::for_status(ride.status) else {
            return Ok(TrackingView::NotTrackable {
                status: ride.status,
            });
        };

        let rider = self.directory.get(rider_id).await?;
        let Some(ping) = rider.position else {
            return Ok(TrackingView::NoPosition);
        };

        let snapshot = build_snapshot(&ride, rider_id, ping.coordinates(), target, None);
        Ok(TrackingView::Live(snapshot))
    }

    /// Drops milestone bookkeeping for a ride, to be called once a
    /// consumer observes it terminal.
    pub fn forget(&self, ride_id: RideId) {
        self.milestones.forget(ride_id);
    }

    async fn emit_arrival(&self, ride: &Ride, rider_id: RiderId, target: Target) {
        // Only the legs that still have a confirmation ahead of them get
        // an arrival event; a rider idling at the pickup after confirming
        // arrival stays quiet.
        let event = match ride.status {
            RideStatus::Accepted => "arrived_at_pickup",
            RideStatus::InProgress => "arrived_at_dropoff",
            _ => return,
        };
        if !self.milestones.arrival_due(ride.id, target) {
            return;
        }

        metrics::counter!("tracking_arrivals_total").increment(1);
        tracing::info!(ride_id = %ride.id, %rider_id, event, "geofence entered");

        let payload = json!({ "event": event, "ride_id": ride.id, "rider_id": rider_id });
        self.publisher
            .publish(Topic::user(ride.requester_id), payload.clone())
            .await;
        self.publisher
            .publish(Topic::rider(rider_id), payload)
            .await;
    }
}

fn build_snapshot(
    ride: &Ride,
    rider_id: RiderId,
    position: Coordinates,
    target: Target,
    speed_kmh: Option<f64>,
) -> TrackingSnapshot {
    let goal = match target {
        Target::Pickup => ride.pickup.coordinates(),
        Target::Dropoff => ride.dropoff.coordinates(),
    };
    let distance = distance_km(position, goal);
    TrackingSnapshot {
        ride_id: ride.id,
        rider_id,
        position,
        target,
        distance_km: distance,
        eta: eta(distance, speed_kmh),
        route: route_polyline(position, goal),
    }
}
