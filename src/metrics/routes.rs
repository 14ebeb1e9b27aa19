//! Metrics intake route handlers

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::metrics::models::{intake_timestamp, parse_track_request};
use crate::server::AppState;

/// POST /api/gf-track
///
/// Accepts a single tracking event or a batch of up to 100. The response is
/// decided before delivery: a 204 means the payload was accepted, not that
/// it reached the downstream sink.
pub async fn track(State(state): State<AppState>, body: Bytes) -> Response {
    // Kill-switch: accept without even parsing the payload
    if !state.config.metrics.enabled {
        return StatusCode::NO_CONTENT.into_response();
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid JSON" })),
            )
                .into_response();
        }
    };

    let events = match parse_track_request(&payload) {
        Ok(events) => events,
        Err(issues) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid event payload", "details": issues })),
            )
                .into_response();
        }
    };

    let timestamp = intake_timestamp();
    let processed: Vec<_> = events
        .into_iter()
        .map(|event| event.processed(timestamp.clone()))
        .collect();

    state.sink.deliver(&processed).await;

    StatusCode::NO_CONTENT.into_response()
}

/// OPTIONS /api/gf-track (non-preflight; preflight is answered by the CORS
/// layer before it reaches the router)
pub async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            ("access-control-allow-methods", "POST, OPTIONS"),
            ("access-control-allow-headers", "Content-Type"),
        ],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MetricsConfig, RunMode, ServerConfig};
    use crate::ledger::reader::LedgerStore;
    use crate::metrics::sink::sink_from_config;
    use std::sync::Arc;

    fn state(metrics: MetricsConfig) -> AppState {
        let config = ServerConfig {
            metrics,
            ..ServerConfig::default()
        };
        AppState {
            store: LedgerStore::new("."),
            sink: sink_from_config(&config.metrics),
            config: Arc::new(config),
        }
    }

    fn enabled_without_webhook() -> MetricsConfig {
        MetricsConfig {
            enabled: true,
            webhook_url: None,
            webhook_secret: None,
            mode: RunMode::Production,
        }
    }

    #[tokio::test]
    async fn test_disabled_accepts_anything_without_parsing() {
        let state = state(MetricsConfig::default());
        let response = track(State(state), Bytes::from_static(b"{not json")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let state = state(enabled_without_webhook());
        let response = track(State(state), Bytes::from_static(b"{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_event_accepted_with_noop_sink() {
        let state = state(enabled_without_webhook());
        assert_eq!(state.sink.name(), "noop");
        let body = br#"{"type": "page_view", "clientId": "c", "pageId": "p"}"#;
        let response = track(State(state), Bytes::from_static(body)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_schema_failure_returns_details() {
        let state = state(enabled_without_webhook());
        let body = br#"{"type": "page_view", "clientId": "c"}"#;
        let response = track(State(state), Bytes::from_static(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["error"], "Invalid event payload");
        assert!(payload["details"].as_array().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let state = state(enabled_without_webhook());
        let response = track(State(state), Bytes::from_static(br#"{"events": []}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preflight_advertises_cors() {
        let response = preflight().await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get("access-control-allow-methods").unwrap(),
            "POST, OPTIONS"
        );
    }
}
