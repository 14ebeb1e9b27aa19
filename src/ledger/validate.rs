//! Request parameter and entry shape validation

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Month parameter rejection, surfaced to the caller as a 400
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthError {
    #[error("Invalid month format. Expected YYYY-MM")]
    Format,
    #[error("Invalid month parameter")]
    Traversal,
    #[error("Invalid month. Must be between 01-12")]
    Range,
}

/// Current UTC month as a `YYYY-MM` key
pub fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

/// Validate a month query parameter, defaulting to the current UTC month.
///
/// The month doubles as a file-name component, so anything that is not
/// exactly `YYYY-MM` with a month of 01-12 is rejected before any file
/// access.
pub fn validate_month(month: Option<&str>) -> Result<String, MonthError> {
    let Some(month) = month else {
        return Ok(current_month());
    };

    let bytes = month.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[..4].iter().all(|b| b.is_ascii_digit())
        && bytes[4] == b'-'
        && bytes[5..].iter().all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(MonthError::Format);
    }

    // Traversal sequences cannot pass the format check, but the month is
    // used to build paths so keep the guard independent of it.
    if month.contains("..") || month.contains('/') || month.contains('\\') {
        return Err(MonthError::Traversal);
    }

    let month_num: u32 = month[5..].parse().map_err(|_| MonthError::Format)?;
    if !(1..=12).contains(&month_num) {
        return Err(MonthError::Range);
    }

    Ok(month.to_string())
}

/// One shape-validation failure found while aggregating
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// Entry collection the issue was found in (`time`, `revenue`, ...)
    pub category: &'static str,
    /// Index of the entry within its collection
    pub index: usize,
    pub message: String,
}

/// Collected shape-validation failures for one summary computation.
///
/// Validation is non-fatal: invalid entries still flow into the aggregate.
/// The report makes that visible to callers instead of burying it in logs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn check(
        &mut self,
        category: &'static str,
        entries: &[Value],
        validator: fn(&Value) -> Result<(), String>,
    ) {
        for (index, entry) in entries.iter().enumerate() {
            if let Err(message) = validator(entry) {
                self.issues.push(ValidationIssue {
                    category,
                    index,
                    message,
                });
            }
        }
    }
}

pub fn validate_time_entry(entry: &Value) -> Result<(), String> {
    let obj = as_object(entry)?;
    require_string(obj, "timestamp")?;
    require_string(obj, "activity")?;
    nullable_string(obj, "client_id")?;
    require_number(obj, "duration_seconds")?;
    optional_number(obj, "time_saved_seconds")?;
    optional_object(obj, "metadata")?;
    Ok(())
}

pub fn validate_revenue_entry(entry: &Value) -> Result<(), String> {
    let obj = as_object(entry)?;
    require_string(obj, "timestamp")?;
    nullable_string(obj, "client_id")?;
    require_string(obj, "type")?;
    require_number(obj, "amount_usd")?;
    optional_string(obj, "package")?;
    Ok(())
}

pub fn validate_api_cost_entry(entry: &Value) -> Result<(), String> {
    let obj = as_object(entry)?;
    require_string(obj, "timestamp")?;
    require_string(obj, "provider")?;
    require_string(obj, "model")?;
    require_string(obj, "activity")?;
    nullable_string(obj, "client_id")?;
    require_number(obj, "input_tokens")?;
    require_number(obj, "output_tokens")?;
    require_number(obj, "cost_usd")?;
    optional_object(obj, "metadata")?;
    Ok(())
}

pub fn validate_hosting_cost_entry(entry: &Value) -> Result<(), String> {
    let obj = as_object(entry)?;
    require_string(obj, "timestamp")?;
    require_string(obj, "client_id")?;
    require_number(obj, "cost_usd")?;
    if obj.get("type").and_then(Value::as_str) != Some("hosting") {
        return Err("type must be 'hosting'".to_string());
    }
    Ok(())
}

fn as_object(entry: &Value) -> Result<&Map<String, Value>, String> {
    entry
        .as_object()
        .ok_or_else(|| "entry must be an object".to_string())
}

fn require_string(obj: &Map<String, Value>, key: &str) -> Result<(), String> {
    match obj.get(key) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(format!("{key} must be a string")),
    }
}

fn require_number(obj: &Map<String, Value>, key: &str) -> Result<(), String> {
    match obj.get(key) {
        Some(Value::Number(_)) => Ok(()),
        _ => Err(format!("{key} must be a number")),
    }
}

fn optional_string(obj: &Map<String, Value>, key: &str) -> Result<(), String> {
    match obj.get(key) {
        None | Some(Value::String(_)) => Ok(()),
        _ => Err(format!("{key} must be a string")),
    }
}

fn nullable_string(obj: &Map<String, Value>, key: &str) -> Result<(), String> {
    match obj.get(key) {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        _ => Err(format!("{key} must be a string or null")),
    }
}

fn optional_number(obj: &Map<String, Value>, key: &str) -> Result<(), String> {
    match obj.get(key) {
        None | Some(Value::Number(_)) => Ok(()),
        _ => Err(format!("{key} must be a number")),
    }
}

fn optional_object(obj: &Map<String, Value>, key: &str) -> Result<(), String> {
    match obj.get(key) {
        None | Some(Value::Object(_)) => Ok(()),
        _ => Err(format!("{key} must be an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_months_pass_through() {
        assert_eq!(validate_month(Some("2024-01")).unwrap(), "2024-01");
        assert_eq!(validate_month(Some("1999-12")).unwrap(), "1999-12");
    }

    #[test]
    fn test_missing_month_defaults_to_current() {
        let month = validate_month(None).unwrap();
        assert_eq!(month, current_month());
        assert_eq!(month.len(), 7);
    }

    #[test]
    fn test_malformed_months_rejected() {
        assert_eq!(validate_month(Some("2024-1")), Err(MonthError::Format));
        assert_eq!(validate_month(Some("2024/01")), Err(MonthError::Format));
        assert_eq!(validate_month(Some("202401")), Err(MonthError::Format));
        assert_eq!(validate_month(Some("abcd-ef")), Err(MonthError::Format));
        assert_eq!(validate_month(Some("../2024")), Err(MonthError::Format));
        assert_eq!(validate_month(Some("..\\2024")), Err(MonthError::Format));
        assert_eq!(validate_month(Some("")), Err(MonthError::Format));
    }

    #[test]
    fn test_month_component_range() {
        assert_eq!(validate_month(Some("2024-00")), Err(MonthError::Range));
        assert_eq!(validate_month(Some("2024-13")), Err(MonthError::Range));
        assert!(validate_month(Some("2024-12")).is_ok());
    }

    #[test]
    fn test_time_entry_shapes() {
        let valid = json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "activity": "build",
            "client_id": null,
            "duration_seconds": 3600,
            "time_saved_seconds": 1800,
            "metadata": {"source": "cli"}
        });
        assert!(validate_time_entry(&valid).is_ok());

        let bad_duration = json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "activity": "build",
            "duration_seconds": "3600"
        });
        assert_eq!(
            validate_time_entry(&bad_duration).unwrap_err(),
            "duration_seconds must be a number"
        );

        assert!(validate_time_entry(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_hosting_entry_requires_discriminator() {
        let no_type = json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "client_id": "acme",
            "cost_usd": 10
        });
        assert_eq!(
            validate_hosting_cost_entry(&no_type).unwrap_err(),
            "type must be 'hosting'"
        );
    }

    #[test]
    fn test_report_collects_issues_per_entry() {
        let entries = vec![
            json!({"timestamp": "t", "type": "setup", "amount_usd": 100}),
            json!({"timestamp": "t", "type": "setup", "amount_usd": "100"}),
            json!("not an object"),
        ];
        let mut report = ValidationReport::default();
        report.check("revenue", &entries, validate_revenue_entry);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].index, 1);
        assert_eq!(report.issues[1].index, 2);
        assert!(!report.is_clean());
    }
}
