//! GitHub webhook intake
//!
//! The signature check and stream routing happen here, before anything
//! reaches the scan core. Supported event types are published to their
//! stream; everything else is accepted and ignored.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, error, info, warn};

use leakwatch_core::domain::{EventKind, StreamEvent};

use crate::presentation::controllers::ApiState;
use crate::presentation::models::WebhookAccepted;

/// POST /api/v1/webhooks/github - receive a GitHub webhook event
pub async fn github_webhook(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAccepted>, StatusCode> {
    let signature = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok());

    if !verify_github_signature(state.webhook_secret.as_deref(), &body, signature) {
        warn!("Invalid GitHub webhook signature");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let event_name = headers
        .get("x-github-event")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();

    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| StatusCode::BAD_REQUEST)?;

    let repository = payload
        .pointer("/repository/full_name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let sender = payload
        .pointer("/sender/login")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    info!(
        event_type = %event_name,
        repository = %repository,
        "Received GitHub webhook"
    );

    if let Some(kind) = EventKind::from_header(&event_name) {
        let event = StreamEvent::new(kind, repository, sender, payload);
        state
            .stream
            .publish(kind.stream_key(), &event)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to publish event to stream");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;

        info!(event_type = %event_name, stream = kind.stream_key(), "Published event to stream");
    } else {
        debug!(event_type = %event_name, "Ignored unsupported event type");
    }

    Ok(Json(WebhookAccepted {
        status: "accepted",
        event: event_name,
    }))
}

/// Verify the `X-Hub-Signature-256` header over the raw request body.
///
/// An unconfigured secret skips verification with a warning; a configured
/// secret with a missing or mismatched signature rejects the request.
pub fn verify_github_signature(
    secret: Option<&str>,
    payload: &[u8],
    signature: Option<&str>,
) -> bool {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        warn!("GitHub webhook secret not configured, skipping verification");
        return true;
    };

    let Some(signature) = signature else {
        return false;
    };
    let Some(hex_digest) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
