//! Event delivery strategies
//!
//! Intake is fire-and-forget: by the time a sink runs, the 204 response is
//! already decided, so sinks log failures and never return them.

use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info, warn};

use crate::config::{MetricsConfig, RunMode};
use crate::metrics::models::ProcessedEvent;

/// Destination for accepted metrics events
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver a batch of events, best effort.
    async fn deliver(&self, events: &[ProcessedEvent]);

    /// Strategy name, for startup logging and diagnostics
    fn name(&self) -> &'static str;
}

/// Drops events silently (production without a webhook)
pub struct NoopSink;

#[async_trait]
impl EventSink for NoopSink {
    async fn deliver(&self, _events: &[ProcessedEvent]) {}

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Logs each event locally (development without a webhook)
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    async fn deliver(&self, events: &[ProcessedEvent]) {
        for event in events {
            match serde_json::to_string(event) {
                Ok(json) => info!("metrics event: {}", json),
                Err(e) => warn!("failed to serialize metrics event: {}", e),
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Forwards batches to a configured webhook URL
pub struct WebhookSink {
    url: String,
    secret: Option<String>,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: String, secret: Option<String>) -> Self {
        Self {
            url,
            secret,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EventSink for WebhookSink {
    async fn deliver(&self, events: &[ProcessedEvent]) {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "events": events }));
        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        match request.send().await {
            Ok(response) if !response.status().is_success() => {
                error!("metrics webhook returned {}", response.status());
            }
            Ok(_) => {}
            Err(e) => {
                error!("metrics webhook error: {}", e);
            }
        }
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

/// Pick the delivery strategy for the current configuration:
/// webhook when a URL is set, local logging in development, no-op otherwise.
pub fn sink_from_config(config: &MetricsConfig) -> Arc<dyn EventSink> {
    if let Some(url) = &config.webhook_url {
        Arc::new(WebhookSink::new(url.clone(), config.webhook_secret.clone()))
    } else if config.mode == RunMode::Development {
        Arc::new(LogSink)
    } else {
        Arc::new(NoopSink)
    }
}
