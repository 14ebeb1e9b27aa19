//! Generate the precomputed monthly balance sheet
//!
//! Run with: cargo run --bin gf-balance -- --month 2024-01
//!
//! Writes `data/balance_sheets/<month>.json`, which the dashboard server
//! returns verbatim instead of recomputing the summary per request.

use gf_dashboard_lib::ledger::reader::LedgerStore;
use gf_dashboard_lib::ledger::stats::compute_balance_sheet;
use gf_dashboard_lib::ledger::validate::validate_month;
use log::{info, warn};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut month_arg: Option<String> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--month" => month_arg = args.next(),
            other => {
                eprintln!("unknown argument: {other}");
                eprintln!("usage: gf-balance [--month YYYY-MM]");
                std::process::exit(2);
            }
        }
    }

    let month = match validate_month(month_arg.as_deref()) {
        Ok(month) => month,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let data_dir = std::env::var("GF_DATA_DIR").unwrap_or_else(|_| ".".to_string());
    let store = LedgerStore::new(data_dir);

    let (summary, report) = compute_balance_sheet(&store, &month);
    for issue in &report.issues {
        warn!(
            "invalid {} entry {} in {}: {}",
            issue.category, issue.index, month, issue.message
        );
    }

    match store.write_balance_sheet(&summary) {
        Ok(path) => info!(
            "{} revenue=${} net=${} effective_hourly=${} -> {:?}",
            month,
            summary.totals.revenue_usd,
            summary.totals.net_income_usd,
            summary.totals.effective_hourly_usd,
            path
        ),
        Err(e) => {
            eprintln!("failed to write balance sheet: {e}");
            std::process::exit(1);
        }
    }
}
