//! Touchpoint event storage.

use async_trait::async_trait;
use campaign_core::error::{CampaignError, CampaignResult};
use campaign_core::types::{NewTouchpointEvent, TouchpointEvent};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Append-only storage for touchpoint events.
///
/// Implementations rely on their own per-call atomicity; callers add no
/// locking or transactions on top.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist one event. The store assigns `id` and `created_at`.
    async fn create_event(&self, input: NewTouchpointEvent) -> CampaignResult<TouchpointEvent>;

    /// All events for a campaign, ascending by `occurred_at`. Ties keep
    /// insertion order.
    async fn find_events_for_campaign(
        &self,
        campaign_id: &str,
    ) -> CampaignResult<Vec<TouchpointEvent>>;
}

/// In-process event store keyed by campaign.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: DashMap<String, Vec<TouchpointEvent>>,
    fail_on_write: AtomicBool,
    fail_on_read: AtomicBool,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail with a storage error.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent reads fail with a storage error.
    pub fn set_fail_on_read(&self, fail: bool) {
        self.fail_on_read.store(fail, Ordering::SeqCst);
    }

    /// Total events across all campaigns.
    pub fn event_count(&self) -> usize {
        self.events.iter().map(|e| e.value().len()).sum()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create_event(&self, input: NewTouchpointEvent) -> CampaignResult<TouchpointEvent> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(CampaignError::Storage(format!(
                "write rejected for campaign {}",
                input.campaign_id
            )));
        }

        let event = input.into_event(Utc::now());
        self.events
            .entry(event.campaign_id.clone())
            .or_default()
            .push(event.clone());

        debug!(
            campaign_id = %event.campaign_id,
            event_id = %event.id,
            "Touchpoint stored"
        );
        Ok(event)
    }

    async fn find_events_for_campaign(
        &self,
        campaign_id: &str,
    ) -> CampaignResult<Vec<TouchpointEvent>> {
        if self.fail_on_read.load(Ordering::SeqCst) {
            return Err(CampaignError::Storage(format!(
                "read rejected for campaign {campaign_id}"
            )));
        }

        let mut events = self
            .events
            .get(campaign_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        // sort_by_key is stable, so equal timestamps stay in insertion order.
        events.sort_by_key(|e| e.occurred_at);
        Ok(events)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use campaign_core::types::{EventType, TouchpointType};
    use chrono::Duration;

    fn input(campaign: &str, platform: &str, offset_hours: i64) -> NewTouchpointEvent {
        NewTouchpointEvent::new(
            campaign,
            EventType::View,
            TouchpointType::Organic,
            platform,
            Utc::now() + Duration::hours(offset_hours),
        )
    }

    #[tokio::test]
    async fn test_events_come_back_ordered_by_occurrence() {
        let store = InMemoryEventStore::new();
        store.create_event(input("camp_1", "late", 2)).await.unwrap();
        store.create_event(input("camp_1", "early", -5)).await.unwrap();
        store.create_event(input("camp_1", "middle", 0)).await.unwrap();

        let events = store.find_events_for_campaign("camp_1").await.unwrap();
        let platforms: Vec<_> = events.iter().map(|e| e.platform.as_str()).collect();
        assert_eq!(platforms, vec!["early", "middle", "late"]);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let store = InMemoryEventStore::new();
        let at = Utc::now();
        for platform in ["first", "second", "third"] {
            let mut e = input("camp_1", platform, 0);
            e.occurred_at = at;
            store.create_event(e).await.unwrap();
        }

        let events = store.find_events_for_campaign("camp_1").await.unwrap();
        let platforms: Vec<_> = events.iter().map(|e| e.platform.as_str()).collect();
        assert_eq!(platforms, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_campaigns_are_isolated() {
        let store = InMemoryEventStore::new();
        store.create_event(input("camp_1", "x", 0)).await.unwrap();
        store.create_event(input("camp_2", "y", 0)).await.unwrap();

        assert_eq!(store.find_events_for_campaign("camp_1").await.unwrap().len(), 1);
        assert!(store.find_events_for_campaign("missing").await.unwrap().is_empty());
        assert_eq!(store.event_count(), 2);
    }

    #[tokio::test]
    async fn test_assigns_unique_ids() {
        let store = InMemoryEventStore::new();
        let a = store.create_event(input("camp_1", "x", 0)).await.unwrap();
        let b = store.create_event(input("camp_1", "x", 0)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = InMemoryEventStore::new();
        store.set_fail_on_write(true);
        let err = store.create_event(input("camp_1", "x", 0)).await.unwrap_err();
        assert!(matches!(err, CampaignError::Storage(_)));
        assert_eq!(store.event_count(), 0);

        store.set_fail_on_read(true);
        assert!(store.find_events_for_campaign("camp_1").await.is_err());
    }
}
