//! Shared application state for the webhook service.

use std::sync::Arc;

use crate::config::WebhooksConfig;
use crate::processor::{EventProcessor, NoopProcessor};
use crate::store::{ComplianceStore, EventStore, MemoryStore};

/// Application state shared across handlers.
///
/// Handlers themselves are stateless; everything here is either immutable
/// configuration or the durable store boundary.
#[derive(Clone)]
pub struct AppState {
    config: Arc<WebhooksConfig>,
    events: Arc<dyn EventStore>,
    compliance: Arc<dyn ComplianceStore>,
    processor: Arc<dyn EventProcessor>,
}

impl AppState {
    /// Build state with the in-memory store and no-op processor.
    #[must_use]
    pub fn new(config: WebhooksConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config: Arc::new(config),
            events: store.clone(),
            compliance: store,
            processor: Arc::new(NoopProcessor),
        }
    }

    /// Build state over explicit store and processor implementations.
    #[must_use]
    pub fn with_backends(
        config: WebhooksConfig,
        events: Arc<dyn EventStore>,
        compliance: Arc<dyn ComplianceStore>,
        processor: Arc<dyn EventProcessor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            events,
            compliance,
            processor,
        }
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &WebhooksConfig {
        &self.config
    }

    /// Event store boundary.
    #[must_use]
    pub fn events(&self) -> &Arc<dyn EventStore> {
        &self.events
    }

    /// Compliance store boundary.
    #[must_use]
    pub fn compliance(&self) -> &Arc<dyn ComplianceStore> {
        &self.compliance
    }

    /// Downstream event processor.
    #[must_use]
    pub fn processor(&self) -> &Arc<dyn EventProcessor> {
        &self.processor
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
