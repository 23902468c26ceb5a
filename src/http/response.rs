//! Response construction.
//!
//! # Responsibilities
//! - Map routing errors to status codes and JSON bodies
//! - Build strict-slash redirects
//!
//! # Design Decisions
//! - Error details are only exposed when informative errors are enabled;
//!   otherwise the body carries the status reason phrase

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::routing::RouteError;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Converts a routing error into a response.
pub fn route_error(err: &RouteError, informative: bool) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, status = %status, "Request rejected");
    }

    let error = if informative {
        err.to_string()
    } else {
        status.canonical_reason().unwrap_or("error").to_string()
    };
    (status, Json(ErrorBody { error })).into_response()
}

/// A permanent redirect to `location`, keeping the query string.
pub fn redirect(location: &str, query: Option<&str>) -> Response {
    let location = match query {
        Some(q) => format!("{location}?{q}"),
        None => location.to_string(),
    };
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}
