//! Monthly financial ledger - JSON data access, validation and aggregation

pub mod models;
pub mod reader;
pub mod routes;
pub mod stats;
pub mod validate;

pub use models::*;
pub use reader::{LedgerStore, StoreError};
pub use stats::{compute_balance_sheet, compute_summary, resolve_summary, Summary};
pub use validate::{validate_month, MonthError, ValidationIssue, ValidationReport};
