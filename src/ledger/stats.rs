//! Monthly summary aggregation
//!
//! A summary is a pure function of (month, data tree): no mutation, no
//! caching, and calling it twice against unchanged files yields identical
//! output.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::ledger::models::{BalancePoint, MonthlyEntries, MonthlySummary, MonthlyTotals};
use crate::ledger::reader::LedgerStore;
use crate::ledger::validate::{
    validate_api_cost_entry, validate_hosting_cost_entry, validate_revenue_entry,
    validate_time_entry, ValidationReport,
};

/// Resolved summary for one month
#[derive(Debug)]
pub enum Summary {
    /// Balance sheet written by the generator, returned verbatim.
    ///
    /// Precomputed sheets come from inside the same trust boundary, so
    /// their shape is deliberately not re-validated here.
    Precomputed(Value),
    /// On-the-fly aggregation over the raw entry files
    Derived {
        summary: MonthlySummary,
        report: ValidationReport,
    },
}

/// Resolve the summary for a month: precomputed sheet when present and
/// parsable, derived computation otherwise.
pub fn resolve_summary(store: &LedgerStore, month: &str) -> Summary {
    if let Some(sheet) = store.load_balance_sheet(month) {
        return Summary::Precomputed(sheet);
    }
    let (summary, report) = compute_summary(store, month);
    Summary::Derived { summary, report }
}

/// Derive a summary from the raw per-category entry files.
pub fn compute_summary(store: &LedgerStore, month: &str) -> (MonthlySummary, ValidationReport) {
    aggregate(store, month, false)
}

/// Derive a summary including the day-by-day running balance series.
/// Used by the balance-sheet generator.
pub fn compute_balance_sheet(
    store: &LedgerStore,
    month: &str,
) -> (MonthlySummary, ValidationReport) {
    aggregate(store, month, true)
}

fn aggregate(
    store: &LedgerStore,
    month: &str,
    with_running_balance: bool,
) -> (MonthlySummary, ValidationReport) {
    let rate = store.load_tracker_config().processing_rate();

    let time_entries = store.load_time_entries(month);
    let revenue_entries = store.load_revenue_entries(month);
    let api_entries = store.load_api_cost_entries(month);
    let hosting_entries = store.load_hosting_cost_entries(month);

    let mut report = ValidationReport::default();
    report.check("time", &time_entries, validate_time_entry);
    report.check("revenue", &revenue_entries, validate_revenue_entry);
    report.check("api_cost", &api_entries, validate_api_cost_entry);
    report.check("hosting_cost", &hosting_entries, validate_hosting_cost_entry);

    // Merged collection; sub-totals filter on discriminators, not source list
    let mut cost_entries = api_entries;
    cost_entries.extend(hosting_entries);

    let total_seconds: f64 = time_entries.iter().map(|e| num(e, "duration_seconds")).sum();
    let time_saved_seconds: f64 = time_entries
        .iter()
        .map(|e| num(e, "time_saved_seconds"))
        .sum();
    let hours = total_seconds / 3600.0;

    let revenue_total: f64 = revenue_entries.iter().map(|e| num(e, "amount_usd")).sum();
    let api_cost_total: f64 = cost_entries
        .iter()
        .filter(|e| truthy(e.get("provider")))
        .map(|e| num(e, "cost_usd"))
        .sum();
    let hosting_cost_total: f64 = cost_entries
        .iter()
        .filter(|e| is_hosting(e))
        .map(|e| num(e, "cost_usd"))
        .sum();

    let payment_fee = revenue_total * rate;
    let total_costs = api_cost_total + hosting_cost_total + payment_fee;
    let net_income = revenue_total - total_costs;
    let effective_hourly = if hours > 0.0 { net_income / hours } else { 0.0 };

    let running_balance = if with_running_balance {
        running_balance(&revenue_entries, &cost_entries, rate)
    } else {
        Vec::new()
    };

    let summary = MonthlySummary {
        month: month.to_string(),
        totals: MonthlyTotals {
            revenue_usd: round2(revenue_total),
            costs_usd: round2(total_costs),
            api_cost_usd: round2(api_cost_total),
            hosting_cost_usd: round2(hosting_cost_total),
            payment_fee_usd: round2(payment_fee),
            net_income_usd: round2(net_income),
            hours: round2(hours),
            time_saved_hours: round2(time_saved_seconds / 3600.0),
            effective_hourly_usd: round2(effective_hourly),
        },
        running_balance,
        entries: MonthlyEntries {
            time: time_entries,
            revenue: revenue_entries,
            costs: cost_entries,
        },
    };

    (summary, report)
}

/// Cumulative day-by-day balance: daily revenue minus daily costs, with the
/// payment-processing fee applied on revenue days.
fn running_balance(revenue: &[Value], costs: &[Value], rate: f64) -> Vec<BalancePoint> {
    let daily_revenue = daily_totals(revenue, "amount_usd");
    let mut daily_costs = daily_totals(costs, "cost_usd");

    for (day, amount) in &daily_revenue {
        *daily_costs.entry(day.clone()).or_insert(0.0) += amount * rate;
    }

    let days: BTreeSet<String> = daily_revenue
        .keys()
        .chain(daily_costs.keys())
        .cloned()
        .collect();

    let mut cumulative = 0.0;
    let mut points = Vec::with_capacity(days.len());
    for day in days {
        let delta = daily_revenue.get(&day).copied().unwrap_or(0.0)
            - daily_costs.get(&day).copied().unwrap_or(0.0);
        cumulative += delta;
        points.push(BalancePoint {
            day,
            balance_usd: round2(cumulative),
        });
    }
    points
}

fn daily_totals(entries: &[Value], amount_key: &str) -> std::collections::BTreeMap<String, f64> {
    let mut daily = std::collections::BTreeMap::new();
    for entry in entries {
        let Some(ts) = entry.get("timestamp").and_then(Value::as_str) else {
            continue;
        };
        let day = ts.get(..10).unwrap_or(ts);
        *daily.entry(day.to_string()).or_insert(0.0) += num(entry, amount_key);
    }
    daily
}

/// Safe numeric field sum contribution: anything that is not a JSON number
/// counts as zero, never NaN and never an error.
pub fn num(entry: &Value, key: &str) -> f64 {
    entry.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Round to 2 decimal places for output
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn is_hosting(entry: &Value) -> bool {
    entry.get("type").and_then(Value::as_str) == Some("hosting")
}

/// JSON truthiness: null, false, 0, and the empty string are falsey.
/// Matches the discriminator semantics of the data producers.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
