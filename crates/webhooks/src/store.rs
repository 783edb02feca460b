//! Storage boundary for webhook events and compliance records.
//!
//! Durable persistence is an external collaborator; these traits define the
//! contract it must satisfy. [`MemoryStore`] is the in-process
//! implementation used in tests and single-node deployments.

use async_trait::async_trait;
use thiserror::Error;
use tidemark_core::{
    CanonicalWebhookEvent, ComplianceRecord, ComplianceStatus, WebhookEventStatus,
};
use tokio::sync::RwLock;

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given ID.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend failure.
    #[error("Store error: {0}")]
    Backend(String),
}

/// Persistence contract for normalized webhook events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a freshly normalized event.
    async fn insert_event(&self, event: CanonicalWebhookEvent) -> Result<(), StoreError>;

    /// Record the outcome of processing an event.
    async fn update_event_status(
        &self,
        event_id: &str,
        status: WebhookEventStatus,
        error: Option<String>,
    ) -> Result<(), StoreError>;

    /// Fetch one event by ID.
    async fn get_event(&self, event_id: &str)
    -> Result<Option<CanonicalWebhookEvent>, StoreError>;
}

/// Persistence contract for compliance audit records.
///
/// Records must survive regardless of processing outcome - the regulatory
/// response deadline applies either way.
#[async_trait]
pub trait ComplianceStore: Send + Sync {
    /// Persist an audit record for a compliance request.
    async fn insert_record(&self, record: ComplianceRecord) -> Result<(), StoreError>;

    /// Record the handling outcome.
    async fn update_record_status(
        &self,
        record_id: &str,
        status: ComplianceStatus,
        error: Option<String>,
    ) -> Result<(), StoreError>;

    /// All records, in arrival order.
    async fn list_records(&self) -> Result<Vec<ComplianceRecord>, StoreError>;
}

/// In-memory store for tests and single-node deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<Vec<CanonicalWebhookEvent>>,
    records: RwLock<Vec<ComplianceRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events, in arrival order.
    pub async fn events(&self) -> Vec<CanonicalWebhookEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: CanonicalWebhookEvent) -> Result<(), StoreError> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn update_event_status(
        &self,
        event_id: &str,
        status: WebhookEventStatus,
        error: Option<String>,
    ) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| StoreError::NotFound(event_id.to_string()))?;
        event.status = status;
        event.error = error;
        Ok(())
    }

    async fn get_event(
        &self,
        event_id: &str,
    ) -> Result<Option<CanonicalWebhookEvent>, StoreError> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .find(|e| e.id == event_id)
            .cloned())
    }
}

#[async_trait]
impl ComplianceStore for MemoryStore {
    async fn insert_record(&self, record: ComplianceRecord) -> Result<(), StoreError> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn update_record_status(
        &self,
        record_id: &str,
        status: ComplianceStatus,
        error: Option<String>,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| StoreError::NotFound(record_id.to_string()))?;
        record.status = status;
        record.error = error;
        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<ComplianceRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tidemark_core::{Platform, WebhookTopic};

    use super::*;

    fn event(id: &str) -> CanonicalWebhookEvent {
        CanonicalWebhookEvent {
            id: id.to_string(),
            platform: Platform::Woocommerce,
            topic: WebhookTopic::OrderCreated,
            resource_id: Some("727".to_string()),
            resource_type: Some("order".to_string()),
            payload: serde_json::json!({"id": 727}),
            status: WebhookEventStatus::Pending,
            error: None,
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_event_round_trip() {
        let store = MemoryStore::new();
        store.insert_event(event("ev-1")).await.expect("insert");

        store
            .update_event_status(
                "ev-1",
                WebhookEventStatus::Failed,
                Some("downstream unavailable".to_string()),
            )
            .await
            .expect("update");

        let stored = store.get_event("ev-1").await.expect("get").expect("exists");
        assert_eq!(stored.status, WebhookEventStatus::Failed);
        assert_eq!(stored.error.as_deref(), Some("downstream unavailable"));
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_event_status("ev-404", WebhookEventStatus::Processed, None)
            .await
            .expect_err("missing event");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_compliance_records_survive_in_order() {
        let store = MemoryStore::new();
        for id in ["cr-1", "cr-2"] {
            store
                .insert_record(ComplianceRecord {
                    id: id.to_string(),
                    platform: Platform::Bigcommerce,
                    topic: WebhookTopic::CustomerDataRequest,
                    shop_domain: Some("store-abc123".to_string()),
                    customer_id: Some("42".to_string()),
                    customer_email: None,
                    received_at: Utc::now(),
                    status: ComplianceStatus::Pending,
                    error: None,
                })
                .await
                .expect("insert");
        }

        let records = store.list_records().await.expect("list");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "cr-1");
    }
}
