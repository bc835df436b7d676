//! One-shot proximity milestone bookkeeping.
//!
//! Milestones fire when a measurement first lands inside the half-open
//! window `(threshold - epsilon, threshold]`. A rider jumping straight past
//! a window (GPS gap, very fast leg) skips that milestone instead of firing
//! it late. Fired milestones are keyed per ride and leg, so the approach to
//! the pickup and the approach to the dropoff each get a full set.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use common::RideId;
use domain::RideStatus;
use serde::{Deserialize, Serialize};

/// Distance thresholds, in kilometers.
pub const DISTANCE_MILESTONES_KM: [f64; 4] = [5.0, 2.0, 1.0, 0.5];
/// ETA thresholds, in minutes of unbuffered travel time.
pub const TIME_MILESTONES_MIN: [f64; 3] = [5.0, 2.0, 1.0];
/// Window width below a distance threshold.
pub const DISTANCE_EPSILON_KM: f64 = 0.1;
/// Window width below a time threshold.
pub const TIME_EPSILON_MIN: f64 = 0.5;
/// Arrival geofence radius, in kilometers.
pub const GEOFENCE_KM: f64 = 0.1;

/// Which end of the trip the rider is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Pickup,
    Dropoff,
}

impl Target {
    /// The leg being tracked for a ride in the given status, if any.
    pub fn for_status(status: RideStatus) -> Option<Self> {
        match status {
            RideStatus::Accepted | RideStatus::Arrived => Some(Target::Pickup),
            RideStatus::InProgress => Some(Target::Dropoff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Pickup => "pickup",
            Target::Dropoff => "dropoff",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A milestone that became due on the latest ping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Milestone {
    /// Crossed a distance threshold, in kilometers.
    DistanceKm(f64),
    /// Crossed a travel-time threshold, in minutes.
    TimeMin(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Fired {
    Distance(usize),
    Time(usize),
    Arrival,
}

fn in_window(value: f64, threshold: f64, epsilon: f64) -> bool {
    value > threshold - epsilon && value <= threshold
}

/// Tracks which milestones have already fired, per ride and leg.
#[derive(Debug, Default)]
pub struct MilestoneTracker {
    fired: Mutex<HashMap<(RideId, Target), HashSet<Fired>>>,
}

impl MilestoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the milestones newly due for this measurement and marks
    /// them fired. The windows are disjoint, so at most one distance and
    /// one time milestone come back per ping.
    pub fn due(
        &self,
        ride_id: RideId,
        target: Target,
        distance_km: f64,
        travel_min: f64,
    ) -> Vec<Milestone> {
        let mut fired = self.fired.lock().unwrap();
        let seen = fired.entry((ride_id, target)).or_default();
        let mut due = Vec::new();

        for (i, &threshold) in DISTANCE_MILESTONES_KM.iter().enumerate() {
            if in_window(distance_km, threshold, DISTANCE_EPSILON_KM)
                && seen.insert(Fired::Distance(i))
            {
                due.push(Milestone::DistanceKm(threshold));
            }
        }
        for (i, &threshold) in TIME_MILESTONES_MIN.iter().enumerate() {
            if in_window(travel_min, threshold, TIME_EPSILON_MIN) && seen.insert(Fired::Time(i)) {
                due.push(Milestone::TimeMin(threshold));
            }
        }
        due
    }

    /// One-shot arrival check for a leg: true the first time, false after.
    pub fn arrival_due(&self, ride_id: RideId, target: Target) -> bool {
        let mut fired = self.fired.lock().unwrap();
        fired
            .entry((ride_id, target))
            .or_default()
            .insert(Fired::Arrival)
    }

    /// Drops all bookkeeping for a ride.
    pub fn forget(&self, ride_id: RideId) {
        self.fired
            .lock()
            .unwrap()
            .retain(|(id, _), _| *id != ride_id);
    }

    /// Number of rides with any recorded milestone state.
    pub fn tracked_ride_count(&self) -> usize {
        let fired = self.fired.lock().unwrap();
        fired
            .keys()
            .map(|(id, _)| *id)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_follows_ride_status() {
        assert_eq!(Target::for_status(RideStatus::Accepted), Some(Target::Pickup));
        assert_eq!(Target::for_status(RideStatus::Arrived), Some(Target::Pickup));
        assert_eq!(
            Target::for_status(RideStatus::InProgress),
            Some(Target::Dropoff)
        );
        assert_eq!(Target::for_status(RideStatus::Pending), None);
        assert_eq!(Target::for_status(RideStatus::Completed), None);
        assert_eq!(Target::for_status(RideStatus::Cancelled), None);
    }

    #[test]
    fn test_milestone_fires_inside_window_only() {
        let tracker = MilestoneTracker::new();
        let ride = RideId::new();

        // 5.05 km is above the 5 km threshold, nothing fires.
        assert!(tracker.due(ride, Target::Pickup, 5.05, 20.0).is_empty());
        // 4.95 km is inside (4.9, 5.0], the 5 km milestone fires.
        assert_eq!(
            tracker.due(ride, Target::Pickup, 4.95, 20.0),
            vec![Milestone::DistanceKm(5.0)]
        );
    }

    #[test]
    fn test_milestone_fires_once() {
        let tracker = MilestoneTracker::new();
        let ride = RideId::new();

        assert_eq!(tracker.due(ride, Target::Pickup, 4.95, 20.0).len(), 1);
        assert!(tracker.due(ride, Target::Pickup, 4.92, 20.0).is_empty());
    }

    #[test]
    fn test_skipped_window_never_fires() {
        let tracker = MilestoneTracker::new();
        let ride = RideId::new();

        // Jump from far outside straight past the 5 km window.
        assert!(tracker.due(ride, Target::Pickup, 8.0, 30.0).is_empty());
        let due = tracker.due(ride, Target::Pickup, 1.95, 6.0);
        assert_eq!(due, vec![Milestone::DistanceKm(2.0)]);
    }

    #[test]
    fn test_time_milestone_window() {
        let tracker = MilestoneTracker::new();
        let ride = RideId::new();

        // 5.4 min is outside (4.5, 5.0].
        assert!(tracker.due(ride, Target::Dropoff, 9.0, 5.4).is_empty());
        assert_eq!(
            tracker.due(ride, Target::Dropoff, 9.0, 4.8),
            vec![Milestone::TimeMin(5.0)]
        );
    }

    #[test]
    fn test_distance_and_time_can_fire_together() {
        let tracker = MilestoneTracker::new();
        let ride = RideId::new();

        let due = tracker.due(ride, Target::Pickup, 0.45, 0.9);
        assert!(due.contains(&Milestone::DistanceKm(0.5)));
        assert!(due.contains(&Milestone::TimeMin(1.0)));
    }

    #[test]
    fn test_legs_are_tracked_independently() {
        let tracker = MilestoneTracker::new();
        let ride = RideId::new();

        assert_eq!(tracker.due(ride, Target::Pickup, 1.95, 10.0).len(), 1);
        // Same threshold on the dropoff leg fires again.
        assert_eq!(tracker.due(ride, Target::Dropoff, 1.95, 10.0).len(), 1);
    }

    #[test]
    fn test_arrival_is_one_shot_per_leg() {
        let tracker = MilestoneTracker::new();
        let ride = RideId::new();

        assert!(tracker.arrival_due(ride, Target::Pickup));
        assert!(!tracker.arrival_due(ride, Target::Pickup));
        assert!(tracker.arrival_due(ride, Target::Dropoff));
    }

    #[test]
    fn test_forget_clears_ride_state() {
        let tracker = MilestoneTracker::new();
        let ride = RideId::new();

        assert!(tracker.arrival_due(ride, Target::Pickup));
        tracker.forget(ride);
        assert_eq!(tracker.tracked_ride_count(), 0);
        // After forgetting, the same milestone may fire again.
        assert!(tracker.arrival_due(ride, Target::Pickup));
    }
}
