//! Shared-secret gate for the dashboard routes

use axum::http::HeaderMap;

/// Check whether a request may access the dashboard API.
///
/// When no secret is configured the gate is disabled (local development).
/// Otherwise the request must carry the secret either as a bearer token or
/// in the `x-api-key` header.
pub fn is_authorized(headers: &HeaderMap, expected_secret: Option<&str>) -> bool {
    let Some(expected) = expected_secret else {
        return true;
    };

    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            return token == expected;
        }
    }

    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return key == expected;
    }

    false
}
