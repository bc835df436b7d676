//! Push/broadcast channel seam.
//!
//! Delivery is best-effort and fire-and-forget: publishing never fails and
//! no acknowledgment is awaited. The real transport is an external
//! collaborator; this crate only names the logical topics.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{RiderId, UserId};

/// A named per-entity notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Private channel of a ride requester.
    User(UserId),
    /// Private channel of a rider.
    Rider(RiderId),
}

impl Topic {
    /// Channel for a requester.
    pub fn user(id: UserId) -> Self {
        Topic::User(id)
    }

    /// Channel for a rider.
    pub fn rider(id: RiderId) -> Self {
        Topic::Rider(id)
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::User(id) => write!(f, "user:{id}"),
            Topic::Rider(id) => write!(f, "rider:{id}"),
        }
    }
}

/// Capability to publish a payload to a topic.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes a payload to a topic. Best-effort; never blocks on
    /// delivery or acknowledgment.
    async fn publish(&self, topic: Topic, payload: serde_json::Value);
}

/// In-memory publisher that records every message, for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    messages: Arc<RwLock<Vec<(Topic, serde_json::Value)>>>,
}

impl InMemoryPublisher {
    /// Creates a new empty publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded messages.
    pub fn messages(&self) -> Vec<(Topic, serde_json::Value)> {
        self.messages.read().unwrap().clone()
    }

    /// Returns the payloads published to a topic.
    pub fn messages_for(&self, topic: &Topic) -> Vec<serde_json::Value> {
        self.messages
            .read()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Counts messages on a topic whose `event` field matches.
    pub fn count_events(&self, topic: &Topic, event: &str) -> usize {
        self.messages_for(topic)
            .iter()
            .filter(|p| p.get("event").and_then(|e| e.as_str()) == Some(event))
            .count()
    }

    /// Returns the total number of recorded messages.
    pub fn message_count(&self) -> usize {
        self.messages.read().unwrap().len()
    }

    /// Clears all recorded messages.
    pub fn clear(&self) {
        self.messages.write().unwrap().clear();
    }
}

#[async_trait]
impl Publisher for InMemoryPublisher {
    async fn publish(&self, topic: Topic, payload: serde_json::Value) {
        self.messages.write().unwrap().push((topic, payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic_display() {
        let user = UserId::new();
        let rider = RiderId::new();
        assert_eq!(Topic::user(user).to_string(), format!("user:{user}"));
        assert_eq!(Topic::rider(rider).to_string(), format!("rider:{rider}"));
    }

    #[tokio::test]
    async fn test_publish_records_message() {
        let publisher = InMemoryPublisher::new();
        let topic = Topic::user(UserId::new());

        publisher
            .publish(topic.clone(), json!({"event": "ride_accepted"}))
            .await;

        assert_eq!(publisher.message_count(), 1);
        assert_eq!(publisher.messages_for(&topic).len(), 1);
        assert_eq!(publisher.count_events(&topic, "ride_accepted"), 1);
    }

    #[tokio::test]
    async fn test_messages_filtered_by_topic() {
        let publisher = InMemoryPublisher::new();
        let a = Topic::rider(RiderId::new());
        let b = Topic::rider(RiderId::new());

        publisher.publish(a.clone(), json!({"event": "ride_offer"})).await;
        publisher.publish(b.clone(), json!({"event": "ride_offer"})).await;
        publisher.publish(a.clone(), json!({"event": "offer_withdrawn"})).await;

        assert_eq!(publisher.messages_for(&a).len(), 2);
        assert_eq!(publisher.messages_for(&b).len(), 1);
        assert_eq!(publisher.count_events(&a, "offer_withdrawn"), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let publisher = InMemoryPublisher::new();
        publisher
            .publish(Topic::user(UserId::new()), json!({}))
            .await;
        publisher.clear();
        assert_eq!(publisher.message_count(), 0);
    }
}
