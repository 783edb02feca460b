//! Downstream processing hook for verified events.
//!
//! Processing happens after the event is persisted; its failure is recorded
//! on the stored event and never changes the HTTP acknowledgement.

use async_trait::async_trait;
use thiserror::Error;
use tidemark_core::CanonicalWebhookEvent;

/// Error from downstream event processing.
#[derive(Debug, Error)]
#[error("Processing failed: {0}")]
pub struct ProcessingError(pub String);

/// Downstream consumer of verified, normalized events.
#[async_trait]
pub trait EventProcessor: Send + Sync {
    /// Handle one event. Failures are recorded, not propagated to the
    /// platform.
    async fn process(&self, event: &CanonicalWebhookEvent) -> Result<(), ProcessingError>;
}

/// Processor that accepts every event without side effects.
///
/// Deployments that only ingest-and-store run with this; sync pipelines
/// swap in their own implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProcessor;

#[async_trait]
impl EventProcessor for NoopProcessor {
    async fn process(&self, _event: &CanonicalWebhookEvent) -> Result<(), ProcessingError> {
        Ok(())
    }
}
