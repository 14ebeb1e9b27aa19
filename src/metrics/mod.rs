//! Metrics intake - event schema and delivery sinks

pub mod models;
pub mod routes;
pub mod sink;

pub use models::{parse_track_request, ClientEvent, ProcessedEvent, MAX_BATCH_SIZE};
pub use sink::{sink_from_config, EventSink, LogSink, NoopSink, WebhookSink};
