//! Rider directory tests over the in-memory store.
//!
//! These live as integration tests because `store` depends on `domain`;
//! a dev-dependency cycle keeps them out of the lib's unit test build.

use common::{Coordinates, RiderId, UserId, VehicleType};
use domain::rider::{ApprovalStatus, GeoPing, Rider};
use domain::{DomainError, RiderDirectory};
use store::InMemoryStore;

async fn seed_rider(
    directory: &RiderDirectory<InMemoryStore>,
    vehicle_type: VehicleType,
    lat: f64,
    lng: f64,
    rating: f64,
) -> RiderId {
    let mut rider = Rider::new(UserId::new(), vehicle_type);
    rider.approval = ApprovalStatus::Approved;
    rider.is_available = true;
    rider.is_online = true;
    rider.position = Some(GeoPing::now(lat, lng));
    rider.rating = rating;
    let id = rider.id;
    directory.register(rider).await.unwrap();
    id
}

#[tokio::test]
async fn test_find_candidates_filters_and_sorts_by_distance() {
    let directory = RiderDirectory::new(InMemoryStore::new());
    let origin = Coordinates::new(6.5244, 3.3792);

    let near = seed_rider(&directory, VehicleType::Car, 6.5250, 3.3800, 4.5).await;
    let nearer = seed_rider(&directory, VehicleType::Car, 6.5245, 3.3793, 4.0).await;
    // Wrong vehicle type, excluded.
    seed_rider(&directory, VehicleType::Bike, 6.5244, 3.3792, 5.0).await;
    // Far outside the radius, excluded.
    seed_rider(&directory, VehicleType::Car, 7.5, 4.5, 5.0).await;

    let candidates = directory
        .find_candidates(VehicleType::Car, origin, 5.0)
        .await
        .unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].rider_id, nearer);
    assert_eq!(candidates[1].rider_id, near);
    assert!(candidates[0].distance_km <= candidates[1].distance_km);
}

#[tokio::test]
async fn test_find_candidates_excludes_unavailable_and_offline() {
    let directory = RiderDirectory::new(InMemoryStore::new());
    let origin = Coordinates::new(6.5244, 3.3792);

    let busy = seed_rider(&directory, VehicleType::Car, 6.5245, 3.3793, 4.0).await;
    directory.set_availability(busy, false).await.unwrap();

    let offline = seed_rider(&directory, VehicleType::Car, 6.5246, 3.3794, 4.0).await;
    directory.set_online(offline, false).await.unwrap();

    let candidates = directory
        .find_candidates(VehicleType::Car, origin, 5.0)
        .await
        .unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn test_update_position_refreshes_ping() {
    let directory = RiderDirectory::new(InMemoryStore::new());
    let id = seed_rider(&directory, VehicleType::Car, 6.5, 3.3, 4.0).await;

    let updated = directory.update_position(id, 6.6, 3.4).await.unwrap();
    let ping = updated.position.unwrap();
    assert_eq!(ping.lat, 6.6);
    assert_eq!(ping.lng, 3.4);
}

#[tokio::test]
async fn test_unknown_rider_is_not_found() {
    let directory = RiderDirectory::new(InMemoryStore::new());
    let result = directory.set_online(RiderId::new(), true).await;
    assert!(matches!(result, Err(DomainError::RiderNotFound(_))));
}
