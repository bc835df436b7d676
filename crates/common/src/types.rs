use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a ride.
    ///
    /// Wraps a UUID to provide type safety and prevent mixing up
    /// ride IDs with other UUID-based identifiers.
    RideId
}

uuid_id! {
    /// Unique identifier for a rider (driver).
    RiderId
}

uuid_id! {
    /// Unique identifier for a user (ride requester).
    UserId
}

/// Vehicle class a rider operates and a requester can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    /// Standard car.
    Car,
    /// Motorcycle (okada).
    Bike,
    /// Tricycle (keke).
    Tricycle,
}

impl VehicleType {
    /// Returns the vehicle type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Bike => "bike",
            VehicleType::Tricycle => "tricycle",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Creates a new coordinate pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A named place: coordinates plus a human-readable address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl Location {
    /// Creates a new location.
    pub fn new(lat: f64, lng: f64, address: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            address: address.into(),
        }
    }

    /// Returns the coordinate pair of this location.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ride_id_new_creates_unique_ids() {
        let id1 = RideId::new();
        let id2 = RideId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_ride_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = RideId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn test_id_serialization_roundtrip() {
        let id = RiderId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RiderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_vehicle_type_serializes_snake_case() {
        let json = serde_json::to_string(&VehicleType::Tricycle).unwrap();
        assert_eq!(json, "\"tricycle\"");
    }

    #[test]
    fn test_location_coordinates() {
        let loc = Location::new(6.5244, 3.3792, "Ikeja, Lagos");
        let coords = loc.coordinates();
        assert_eq!(coords.lat, 6.5244);
        assert_eq!(coords.lng, 3.3792);
    }
}
