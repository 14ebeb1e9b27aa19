//! Data models for the monthly financial ledger

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Processing rate applied when `tracker_config.json` is absent or silent
pub const DEFAULT_PROCESSING_RATE: f64 = 0.03;

/// Automation tracker configuration (`automation/tracker_config.json`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub payment_processing_rate: Option<f64>,
}

impl TrackerConfig {
    pub fn processing_rate(&self) -> f64 {
        self.payment_processing_rate
            .unwrap_or(DEFAULT_PROCESSING_RATE)
    }
}

/// Monetary and time totals for one month, rounded to 2 decimals
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTotals {
    pub revenue_usd: f64,
    pub costs_usd: f64,
    pub api_cost_usd: f64,
    pub hosting_cost_usd: f64,
    pub payment_fee_usd: f64,
    pub net_income_usd: f64,
    pub hours: f64,
    pub time_saved_hours: f64,
    pub effective_hourly_usd: f64,
}

/// Raw entry collections attached to a summary.
///
/// Entries stay untyped: malformed entries must still flow into the
/// aggregate and the response, so the summary never drops or reshapes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyEntries {
    pub time: Vec<Value>,
    pub revenue: Vec<Value>,
    /// API costs followed by hosting costs
    pub costs: Vec<Value>,
}

/// One point of the cumulative day-by-day balance series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalancePoint {
    pub day: String,
    pub balance_usd: f64,
}

/// Financial/time summary for one month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: String,
    pub totals: MonthlyTotals,
    /// Empty for on-the-fly summaries; populated by the balance generator
    pub running_balance: Vec<BalancePoint>,
    pub entries: MonthlyEntries,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_rate_default() {
        assert_eq!(TrackerConfig::default().processing_rate(), 0.03);
    }

    #[test]
    fn test_processing_rate_configured() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"payment_processing_rate": 0.05}"#).unwrap();
        assert_eq!(config.processing_rate(), 0.05);
    }

    #[test]
    fn test_config_ignores_unknown_fields() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"hourly_rate_usd": 95, "currency": "USD"}"#).unwrap();
        assert_eq!(config.processing_rate(), 0.03);
    }
}
