//! Inbound webhook endpoint.
//!
//! `POST /webhooks/{platform}` is the only write surface; axum's method
//! routing answers 405 for anything else on the path. Verification runs
//! against the raw, unparsed body - nothing is deserialized until the
//! signature checks out.

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::post,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use tidemark_adapters::signature::verify_hmac_base64;
use tidemark_core::{ComplianceStatus, Platform, WebhookEventStatus};
use tracing::{error, info, instrument, warn};

use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::normalize::{build_compliance_record, build_event, signature_header};
use crate::state::AppState;

/// Acknowledgement body returned for every verified delivery.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// Human-readable outcome.
    pub message: String,
    /// Correlation ID for support requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Build the webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/{platform}", post(receive))
}

/// POST /webhooks/{platform} - receive one platform notification.
#[instrument(skip(state, headers, body), fields(platform = %platform, request_id))]
async fn receive(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let platform: Platform = platform
        .parse()
        .map_err(|_| ApiError::UnknownPlatform(platform))?;

    // ---------------------------------------------------------------------
    // Authenticate before parsing anything
    // ---------------------------------------------------------------------

    let Some(secret) = state.config().secret_for(platform) else {
        warn!(%platform, "Delivery for platform without a configured secret");
        return Err(ApiError::Unauthorized(format!(
            "no webhook secret configured for {platform}"
        )));
    };

    let Some(signature) = headers
        .get(signature_header(platform))
        .and_then(|v| v.to_str().ok())
    else {
        // Missing header rejects without attempting verification
        return Err(ApiError::Unauthorized("missing signature header".to_string()));
    };

    verify_hmac_base64(secret.expose_secret().as_bytes(), &body, signature)
        .map_err(|_| ApiError::Unauthorized("invalid signature".to_string()))?;

    // ---------------------------------------------------------------------
    // Verified: everything below acknowledges with 200
    // ---------------------------------------------------------------------

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(parse_error) => {
            // Authenticated but malformed; acknowledge so the platform does
            // not enter its retry/backoff storm
            warn!(%platform, %parse_error, "Verified delivery with unparseable body");
            return Ok(Json(WebhookAck {
                message: "acknowledged".to_string(),
                request_id: Some(request_id),
            }));
        }
    };

    let event = build_event(platform, &headers, payload);
    let event_id = event.id.clone();
    info!(%platform, topic = ?event.topic, event_id = %event_id, "Webhook event received");

    if let Err(store_error) = state.events().insert_event(event.clone()).await {
        // The platform will redeliver; this is the one post-verification
        // failure that cannot be recorded anywhere
        error!(%store_error, "Failed to persist webhook event");
        return Err(ApiError::Internal(store_error.to_string()));
    }

    // Compliance topics get their audit record before processing is even
    // attempted - the regulatory deadline applies regardless of outcome
    let compliance_record_id = if event.topic.is_compliance() {
        let record = build_compliance_record(&event);
        let record_id = record.id.clone();
        match state.compliance().insert_record(record).await {
            Ok(()) => Some(record_id),
            Err(store_error) => {
                error!(%store_error, "Failed to persist compliance record");
                None
            }
        }
    } else {
        None
    };

    // Downstream processing: failures are recorded on the event, never
    // surfaced to the platform
    match state.processor().process(&event).await {
        Ok(()) => {
            let _ = state
                .events()
                .update_event_status(&event_id, WebhookEventStatus::Processed, None)
                .await;
            if let Some(record_id) = compliance_record_id {
                let _ = state
                    .compliance()
                    .update_record_status(&record_id, ComplianceStatus::Completed, None)
                    .await;
            }
        }
        Err(processing_error) => {
            error!(%processing_error, event_id = %event_id, "Webhook processing failed");
            let _ = state
                .events()
                .update_event_status(
                    &event_id,
                    WebhookEventStatus::Failed,
                    Some(processing_error.to_string()),
                )
                .await;
            if let Some(record_id) = compliance_record_id {
                let _ = state
                    .compliance()
                    .update_record_status(
                        &record_id,
                        ComplianceStatus::Failed,
                        Some(processing_error.to_string()),
                    )
                    .await;
            }
        }
    }

    Ok(Json(WebhookAck {
        message: "received".to_string(),
        request_id: Some(request_id),
    }))
}
