//! Routing error definitions.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors produced while matching or building route paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No route matches the method and path.
    #[error("no route matches {method} {path}")]
    NotFound { method: String, path: String },

    /// A URL was requested for a route name that is not registered.
    #[error("unknown route {0:?}")]
    UnknownRoute(String),

    /// A route requires a variable the caller did not supply.
    #[error("route {route:?} requires variable {variable:?}")]
    MissingVariable { route: String, variable: String },

    /// A percent-encoded value could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A tree path escapes the tree root or is otherwise lexically invalid.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A built placeholder value does not satisfy the placeholder constraint.
    #[error("value {value:?} is not valid for placeholder {variable:?}")]
    InvalidVariable { variable: String, value: String },

    /// A route template could not be parsed or compiled.
    #[error("invalid route template {template:?}: {reason}")]
    Pattern { template: String, reason: String },
}

impl RouteError {
    pub(crate) fn not_found(method: impl ToString, path: impl Into<String>) -> Self {
        RouteError::NotFound {
            method: method.to_string(),
            path: path.into(),
        }
    }

    pub(crate) fn missing(route: &str, variable: &str) -> Self {
        RouteError::MissingVariable {
            route: route.to_string(),
            variable: variable.to_string(),
        }
    }

    /// HTTP status the serving layer reports for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouteError::NotFound { .. } => StatusCode::NOT_FOUND,
            RouteError::MalformedInput(_)
            | RouteError::InvalidPath(_)
            | RouteError::InvalidVariable { .. } => StatusCode::BAD_REQUEST,
            RouteError::UnknownRoute(_)
            | RouteError::MissingVariable { .. }
            | RouteError::Pattern { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true for errors caused by the client's request.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}
