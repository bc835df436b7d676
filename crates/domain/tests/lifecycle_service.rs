//! Lifecycle service tests over the in-memory store.
//!
//! These live as integration tests because `store` depends on `domain`;
//! a dev-dependency cycle keeps them out of the lib's unit test build.

use common::{Location, RideId, RiderId, UserId, VehicleType};
use domain::rider::{ApprovalStatus, GeoPing, Rider};
use domain::{
    CancelledBy, DomainError, RideLifecycle, RideRequest, RideStatus, RiderDirectory,
};
use store::InMemoryStore;

fn lagos_request(requester_id: UserId) -> RideRequest {
    RideRequest {
        requester_id,
        vehicle_type: VehicleType::Car,
        pickup: Location::new(6.5244, 3.3792, "Yaba, Lagos"),
        dropoff: Location::new(6.4281, 3.4219, "Victoria Island, Lagos"),
        notes: None,
    }
}

async fn seed_approved_rider(store: &InMemoryStore, lat: f64, lng: f64) -> RiderId {
    let mut rider = Rider::new(UserId::new(), VehicleType::Car);
    rider.approval = ApprovalStatus::Approved;
    rider.is_available = true;
    rider.is_online = true;
    rider.position = Some(GeoPing::now(lat, lng));
    let id = rider.id;
    use domain::ports::RiderRepository;
    store.insert_rider(rider).await.unwrap();
    id
}

#[tokio::test]
async fn test_create_computes_distance_and_fare() {
    let lifecycle = RideLifecycle::new(InMemoryStore::new());
    let created = lifecycle.create(lagos_request(UserId::new())).await.unwrap();

    assert_eq!(created.ride.status, RideStatus::Pending);
    assert!(created.ride.distance_km > 5.0);
    assert!(created.ride.fare.total > created.ride.fare.base);
    assert!(created.ride.duration_estimate_min > 0);
}

#[tokio::test]
async fn test_create_rejects_second_live_ride() {
    let lifecycle = RideLifecycle::new(InMemoryStore::new());
    let requester = UserId::new();

    lifecycle.create(lagos_request(requester)).await.unwrap();
    let result = lifecycle.create(lagos_request(requester)).await;

    assert!(matches!(result, Err(DomainError::ActiveRideExists { .. })));
}

#[tokio::test]
async fn test_create_returns_candidate_snapshot() {
    let store = InMemoryStore::new();
    seed_approved_rider(&store, 6.53, 3.38).await;
    let lifecycle = RideLifecycle::new(store);

    let created = lifecycle.create(lagos_request(UserId::new())).await.unwrap();
    assert_eq!(created.nearby_riders.len(), 1);
}

#[tokio::test]
async fn test_accept_flips_rider_availability() {
    let store = InMemoryStore::new();
    let rider_id = seed_approved_rider(&store, 6.53, 3.38).await;
    let lifecycle = RideLifecycle::new(store.clone());

    let created = lifecycle.create(lagos_request(UserId::new())).await.unwrap();
    let ride = lifecycle.accept(created.ride.id, rider_id).await.unwrap();

    assert_eq!(ride.status, RideStatus::Accepted);
    assert_eq!(ride.rider_id, Some(rider_id));
    assert!(ride.accepted_at.is_some());

    use domain::ports::RiderRepository;
    let rider = store.rider(rider_id).await.unwrap().unwrap();
    assert!(!rider.is_available);
}

#[tokio::test]
async fn test_accept_unavailable_rider_fails() {
    let store = InMemoryStore::new();
    let rider_id = seed_approved_rider(&store, 6.53, 3.38).await;
    let lifecycle = RideLifecycle::new(store.clone());
    let directory = RiderDirectory::new(store);
    directory.set_availability(rider_id, false).await.unwrap();

    let created = lifecycle.create(lagos_request(UserId::new())).await.unwrap();
    let result = lifecycle.accept(created.ride.id, rider_id).await;

    assert!(matches!(result, Err(DomainError::RiderUnavailable(_))));
}

#[tokio::test]
async fn test_accept_missing_ride_fails() {
    let store = InMemoryStore::new();
    let rider_id = seed_approved_rider(&store, 6.53, 3.38).await;
    let lifecycle = RideLifecycle::new(store);

    let result = lifecycle.accept(RideId::new(), rider_id).await;
    assert!(matches!(result, Err(DomainError::RideNotFound(_))));
}

#[tokio::test]
async fn test_transition_from_wrong_state_fails_and_leaves_ride_unchanged() {
    let store = InMemoryStore::new();
    let rider_id = seed_approved_rider(&store, 6.53, 3.38).await;
    let lifecycle = RideLifecycle::new(store);

    let created = lifecycle.create(lagos_request(UserId::new())).await.unwrap();

    // Completing a pending ride must fail.
    let result = lifecycle.complete(created.ride.id, rider_id).await;
    assert!(matches!(result, Err(DomainError::InvalidState { .. })));

    let ride = lifecycle.get_ride(created.ride.id).await.unwrap();
    assert_eq!(ride.status, RideStatus::Pending);
    assert!(ride.completed_at.is_none());
}

#[tokio::test]
async fn test_wrong_rider_is_unauthorized() {
    let store = InMemoryStore::new();
    let rider_id = seed_approved_rider(&store, 6.53, 3.38).await;
    let other = seed_approved_rider(&store, 6.54, 3.39).await;
    let lifecycle = RideLifecycle::new(store);

    let created = lifecycle.create(lagos_request(UserId::new())).await.unwrap();
    lifecycle.accept(created.ride.id, rider_id).await.unwrap();

    let result = lifecycle.mark_arrived(created.ride.id, other).await;
    assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
}

#[tokio::test]
async fn test_cancel_by_stranger_is_unauthorized() {
    let lifecycle = RideLifecycle::new(InMemoryStore::new());
    let created = lifecycle.create(lagos_request(UserId::new())).await.unwrap();

    let result = lifecycle
        .cancel(
            created.ride.id,
            CancelledBy::Requester(UserId::new()),
            None,
        )
        .await;
    assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
}

#[tokio::test]
async fn test_cancel_terminal_ride_fails() {
    let lifecycle = RideLifecycle::new(InMemoryStore::new());
    let created = lifecycle.create(lagos_request(UserId::new())).await.unwrap();

    lifecycle
        .cancel(created.ride.id, CancelledBy::System, None)
        .await
        .unwrap();
    let result = lifecycle
        .cancel(created.ride.id, CancelledBy::System, None)
        .await;
    assert!(matches!(result, Err(DomainError::InvalidState { .. })));
}

#[tokio::test]
async fn test_cancel_with_assigned_rider_restores_availability() {
    let store = InMemoryStore::new();
    let rider_id = seed_approved_rider(&store, 6.53, 3.38).await;
    let lifecycle = RideLifecycle::new(store.clone());

    let created = lifecycle.create(lagos_request(UserId::new())).await.unwrap();
    lifecycle.accept(created.ride.id, rider_id).await.unwrap();

    let ride = lifecycle
        .cancel(
            created.ride.id,
            CancelledBy::Rider(rider_id),
            Some("breakdown".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(ride.status, RideStatus::Cancelled);
    assert_eq!(ride.cancelled_by, Some(CancelledBy::Rider(rider_id)));

    use domain::ports::RiderRepository;
    let rider = store.rider(rider_id).await.unwrap().unwrap();
    assert!(rider.is_available);
    assert_eq!(rider.stats.cancelled_rides, 1);
    assert_eq!(rider.stats.total_rides, 1);
}
