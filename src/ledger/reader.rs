//! JSON ledger file access
//!
//! Every read is independently guarded: a missing or corrupt file degrades
//! to an empty collection (or a default config) so one bad file never takes
//! down a whole summary.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use log::warn;
use serde_json::Value;

use crate::ledger::models::{MonthlySummary, TrackerConfig};

/// Error type for ledger write operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only view over the on-disk data tree.
///
/// Layout under the root:
/// - `data/time_logs/<month>/*.json`
/// - `data/revenue/<month>.json`
/// - `data/costs/api/<month>.json`
/// - `data/costs/hosting/<month>.json`
/// - `data/balance_sheets/<month>.json` (precomputed summaries)
/// - `automation/tracker_config.json`
#[derive(Debug, Clone)]
pub struct LedgerStore {
    root: PathBuf,
}

impl LedgerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn balance_sheet_path(&self, month: &str) -> PathBuf {
        self.root
            .join("data")
            .join("balance_sheets")
            .join(format!("{month}.json"))
    }

    fn time_logs_dir(&self, month: &str) -> PathBuf {
        self.root.join("data").join("time_logs").join(month)
    }

    fn revenue_path(&self, month: &str) -> PathBuf {
        self.root
            .join("data")
            .join("revenue")
            .join(format!("{month}.json"))
    }

    fn api_costs_path(&self, month: &str) -> PathBuf {
        self.root
            .join("data")
            .join("costs")
            .join("api")
            .join(format!("{month}.json"))
    }

    fn hosting_costs_path(&self, month: &str) -> PathBuf {
        self.root
            .join("data")
            .join("costs")
            .join("hosting")
            .join(format!("{month}.json"))
    }

    fn tracker_config_path(&self) -> PathBuf {
        self.root.join("automation").join("tracker_config.json")
    }

    /// Load the precomputed balance sheet for a month.
    ///
    /// Returns `Some` only when the file exists and parses; a corrupt file
    /// is reported and treated as absent so the caller falls back to the
    /// derived computation.
    pub fn load_balance_sheet(&self, month: &str) -> Option<Value> {
        let path = self.balance_sheet_path(month);
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("corrupt balance sheet {:?}: {}", path, e);
                None
            }
        }
    }

    /// Load all time entries for a month, concatenating every `.json` file
    /// under the month's subdirectory.
    pub fn load_time_entries(&self, month: &str) -> Vec<Value> {
        let pattern = self.time_logs_dir(month).join("*.json");
        let files: Vec<PathBuf> = glob(pattern.to_string_lossy().as_ref())
            .map(|paths| paths.filter_map(Result::ok).collect())
            .unwrap_or_default();

        let mut entries = Vec::new();
        for file in files {
            entries.extend(read_json_array(&file));
        }
        entries
    }

    pub fn load_revenue_entries(&self, month: &str) -> Vec<Value> {
        read_json_array(&self.revenue_path(month))
    }

    pub fn load_api_cost_entries(&self, month: &str) -> Vec<Value> {
        read_json_array(&self.api_costs_path(month))
    }

    pub fn load_hosting_cost_entries(&self, month: &str) -> Vec<Value> {
        read_json_array(&self.hosting_costs_path(month))
    }

    /// Load the tracker configuration, falling back to defaults when the
    /// file is absent or unparsable.
    pub fn load_tracker_config(&self) -> TrackerConfig {
        let path = self.tracker_config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return TrackerConfig::default(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("failed to parse {:?}: {}", path, e);
            TrackerConfig::default()
        })
    }

    /// Write a generated balance sheet to `data/balance_sheets/<month>.json`.
    pub fn write_balance_sheet(&self, summary: &MonthlySummary) -> Result<PathBuf, StoreError> {
        let path = self.balance_sheet_path(&summary.month);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        Ok(path)
    }
}

/// Read a JSON file expected to hold an array of entries.
///
/// Missing file, unparsable JSON, or a non-array document all degrade to an
/// empty vector.
fn read_json_array(path: &Path) -> Vec<Value> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to read {:?}: {}", path, e);
            }
            return Vec::new();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!("{:?} is not a JSON array, ignoring", path);
            Vec::new()
        }
        Err(e) => {
            warn!("failed to parse {:?}: {}", path, e);
            Vec::new()
        }
    }
}
