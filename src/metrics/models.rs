//! Metrics event schema (v1)
//!
//! Privacy-first tracking events from client landing pages: no PII, no
//! cookies, anonymous aggregate-friendly data.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Maximum number of events accepted in one batch
pub const MAX_BATCH_SIZE: usize = 100;

/// Event types supported in v1
pub const EVENT_TYPES: [&str; 3] = ["page_view", "cta_click", "conversion"];

/// A validated client event, before the server timestamp is attached
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "pageId")]
    pub page_id: String,
    #[serde(rename = "blockId", skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(rename = "variantId", skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    /// Flat map of JSON scalars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl ClientEvent {
    /// Attach the server-side intake timestamp.
    pub fn processed(self, timestamp: String) -> ProcessedEvent {
        ProcessedEvent {
            event: self,
            timestamp,
        }
    }
}

/// A client event stamped with the server-side intake time
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedEvent {
    #[serde(flatten)]
    pub event: ClientEvent,
    /// RFC 3339 UTC timestamp assigned at intake
    pub timestamp: String,
}

/// Server timestamp format shared by all events of one request
pub fn intake_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse and validate an intake payload: a single event, or a batch
/// `{"events": [...]}` of 1 to 100 events.
///
/// Returns all validation issues at once so the caller can surface them in
/// the 400 response body.
pub fn parse_track_request(body: &Value) -> Result<Vec<ClientEvent>, Vec<String>> {
    let raw_events: Vec<&Value> = match body.get("events") {
        Some(Value::Array(events)) => {
            if events.is_empty() {
                return Err(vec!["events must contain at least 1 event".to_string()]);
            }
            if events.len() > MAX_BATCH_SIZE {
                return Err(vec![format!(
                    "events must contain at most {MAX_BATCH_SIZE} events"
                )]);
            }
            events.iter().collect()
        }
        Some(_) => return Err(vec!["events must be an array".to_string()]),
        None => vec![body],
    };

    let mut events = Vec::with_capacity(raw_events.len());
    let mut issues = Vec::new();
    for (index, raw) in raw_events.into_iter().enumerate() {
        match parse_event(raw) {
            Ok(event) => events.push(event),
            Err(errors) => {
                issues.extend(errors.into_iter().map(|e| format!("event {index}: {e}")));
            }
        }
    }

    if issues.is_empty() {
        Ok(events)
    } else {
        Err(issues)
    }
}

fn parse_event(raw: &Value) -> Result<ClientEvent, Vec<String>> {
    let Some(obj) = raw.as_object() else {
        return Err(vec!["event must be an object".to_string()]);
    };

    let mut errors = Vec::new();

    let event_type = match obj.get("type").and_then(Value::as_str) {
        Some(t) if EVENT_TYPES.contains(&t) => Some(t.to_string()),
        Some(t) => {
            errors.push(format!("unknown event type '{t}'"));
            None
        }
        None => {
            errors.push("type is required".to_string());
            None
        }
    };

    let client_id = required_string(obj, "clientId", &mut errors);
    let page_id = required_string(obj, "pageId", &mut errors);
    let block_id = optional_string(obj, "blockId", &mut errors);
    let variant_id = optional_string(obj, "variantId", &mut errors);

    let metadata = match obj.get("metadata") {
        None => None,
        Some(Value::Object(map)) => {
            for (key, value) in map {
                if !matches!(
                    value,
                    Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null
                ) {
                    errors.push(format!(
                        "metadata.{key} must be a string, number, boolean, or null"
                    ));
                }
            }
            Some(map.clone())
        }
        Some(_) => {
            errors.push("metadata must be an object".to_string());
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // Required fields are present whenever no errors were recorded
    Ok(ClientEvent {
        event_type: event_type.unwrap_or_default(),
        client_id: client_id.unwrap_or_default(),
        page_id: page_id.unwrap_or_default(),
        block_id,
        variant_id,
        metadata,
    })
}

fn required_string(
    obj: &Map<String, Value>,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            errors.push(format!("{key} is required"));
            None
        }
        Some(_) => {
            errors.push(format!("{key} must be a string"));
            None
        }
        None => {
            errors.push(format!("{key} is required"));
            None
        }
    }
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match obj.get(key) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(format!("{key} must be a string"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_event_accepted() {
        let body = json!({"type": "page_view", "clientId": "c", "pageId": "p"});
        let events = parse_track_request(&body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "page_view");
        assert_eq!(events[0].client_id, "c");
        assert!(events[0].metadata.is_none());
    }

    #[test]
    fn test_batch_accepted() {
        let body = json!({"events": [
            {"type": "cta_click", "clientId": "c", "pageId": "p", "blockId": "hero"},
            {"type": "conversion", "clientId": "c", "pageId": "p", "variantId": "b"}
        ]});
        let events = parse_track_request(&body).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].block_id.as_deref(), Some("hero"));
        assert_eq!(events[1].variant_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let body = json!({"events": []});
        let issues = parse_track_request(&body).unwrap_err();
        assert_eq!(issues, vec!["events must contain at least 1 event"]);
    }

    #[test]
    fn test_oversized_batch_rejected() {
        let event = json!({"type": "page_view", "clientId": "c", "pageId": "p"});
        let body = json!({"events": vec![event; 101]});
        let issues = parse_track_request(&body).unwrap_err();
        assert_eq!(issues, vec!["events must contain at most 100 events"]);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let body = json!({"type": "scroll", "clientId": "c", "pageId": "p"});
        let issues = parse_track_request(&body).unwrap_err();
        assert_eq!(issues, vec!["event 0: unknown event type 'scroll'"]);
    }

    #[test]
    fn test_missing_and_empty_required_fields() {
        let body = json!({"type": "page_view", "clientId": "", "pageId": "p"});
        let issues = parse_track_request(&body).unwrap_err();
        assert_eq!(issues, vec!["event 0: clientId is required"]);

        let body = json!({"type": "page_view", "pageId": "p"});
        let issues = parse_track_request(&body).unwrap_err();
        assert_eq!(issues, vec!["event 0: clientId is required"]);
    }

    #[test]
    fn test_metadata_must_be_flat_scalars() {
        let body = json!({
            "type": "page_view", "clientId": "c", "pageId": "p",
            "metadata": {"ok": 1, "also_ok": null, "nested": {"no": true}}
        });
        let issues = parse_track_request(&body).unwrap_err();
        assert_eq!(
            issues,
            vec!["event 0: metadata.nested must be a string, number, boolean, or null"]
        );

        let body = json!({
            "type": "page_view", "clientId": "c", "pageId": "p",
            "metadata": {"path": "/pricing", "scrolled": true, "depth": 0.8, "ref": null}
        });
        assert!(parse_track_request(&body).is_ok());
    }

    #[test]
    fn test_batch_issues_carry_event_index() {
        let body = json!({"events": [
            {"type": "page_view", "clientId": "c", "pageId": "p"},
            {"type": "page_view", "clientId": "c"}
        ]});
        let issues = parse_track_request(&body).unwrap_err();
        assert_eq!(issues, vec!["event 1: pageId is required"]);
    }

    #[test]
    fn test_processed_event_serializes_flat() {
        let body = json!({"type": "conversion", "clientId": "c", "pageId": "p"});
        let event = parse_track_request(&body).unwrap().remove(0);
        let processed = event.processed("2024-01-01T00:00:00.000Z".to_string());

        let value = serde_json::to_value(&processed).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "conversion",
                "clientId": "c",
                "pageId": "p",
                "timestamp": "2024-01-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn test_intake_timestamp_is_rfc3339_utc() {
        let ts = intake_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
