//! Dashboard API route handlers

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;
use serde::Deserialize;
use serde_json::json;

use crate::auth::is_authorized;
use crate::ledger::stats::{resolve_summary, Summary};
use crate::ledger::validate::{validate_month, ValidationReport};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

/// GET /api/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> Response {
    let month = match guard(&state, &headers, &query) {
        Ok(month) => month,
        Err(response) => return response,
    };

    match resolve_summary(&state.store, &month) {
        Summary::Precomputed(sheet) => Json(sheet).into_response(),
        Summary::Derived { summary, report } => {
            log_report(&month, &report);
            Json(summary).into_response()
        }
    }
}

/// GET /api/dashboard/time
pub async fn time(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> Response {
    let month = match guard(&state, &headers, &query) {
        Ok(month) => month,
        Err(response) => return response,
    };

    let entries = state.store.load_time_entries(&month);
    Json(json!({ "month": month, "entries": entries })).into_response()
}

/// GET /api/dashboard/revenue
pub async fn revenue(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> Response {
    let month = match guard(&state, &headers, &query) {
        Ok(month) => month,
        Err(response) => return response,
    };

    let entries = state.store.load_revenue_entries(&month);
    Json(json!({ "month": month, "entries": entries })).into_response()
}

/// GET /api/dashboard/costs
pub async fn costs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> Response {
    let month = match guard(&state, &headers, &query) {
        Ok(month) => month,
        Err(response) => return response,
    };

    let api = state.store.load_api_cost_entries(&month);
    let hosting = state.store.load_hosting_cost_entries(&month);
    Json(json!({ "month": month, "api": api, "hosting": hosting })).into_response()
}

/// Auth gate plus month validation, shared by all dashboard routes
fn guard(state: &AppState, headers: &HeaderMap, query: &MonthQuery) -> Result<String, Response> {
    if !is_authorized(headers, state.config.dashboard_secret.as_deref()) {
        return Err(error_response(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }
    validate_month(query.month.as_deref())
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e.to_string()))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn log_report(month: &str, report: &ValidationReport) {
    for issue in &report.issues {
        warn!(
            "invalid {} entry {} in {}: {}",
            issue.category, issue.index, month, issue.message
        );
    }
}
