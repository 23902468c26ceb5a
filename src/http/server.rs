//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Dispatch requests to the routing engine
//! - Observability (metrics, correlation IDs)

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, Uri},
    response::Response,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::request_id;
use crate::http::response;
use crate::observability::metrics::{self, UNMATCHED_ROUTE};
use crate::routing::{RouteError, Router};
use crate::storage::Storage;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub storage: Arc<Storage>,
    /// Include error details in error responses.
    pub informative_errors: bool,
}

/// HTTP server for vcsstore.
pub struct HttpServer {
    app: axum::Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, RouteError> {
        let state = AppState {
            router: Arc::new(Router::new()?),
            storage: Arc::new(config.storage.storage()),
            informative_errors: config.debug,
        };

        let app = Self::build_app(&config, state);
        Ok(Self { app, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServiceConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured application, for serving or in-process testing.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the server until `shutdown` completes.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            storage_dir = %self.config.storage.dir.display(),
            layout = %self.config.storage.layout,
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolves every request through the vcsstore router.
async fn dispatch(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let start = Instant::now();
    let path = uri.path();

    let (route, response) = match state.router.match_path(&method, path) {
        Ok(matched) => (matched.name, handlers::handle_route(&state, matched)),
        Err(err @ RouteError::NotFound { .. }) => match state.router.redirect_for(&method, path) {
            Some(location) => (UNMATCHED_ROUTE, response::redirect(&location, uri.query())),
            None => {
                tracing::warn!(method = %method, path = %path, "No route matched");
                (UNMATCHED_ROUTE, response::route_error(&err, state.informative_errors))
            }
        },
        Err(err) => (UNMATCHED_ROUTE, response::route_error(&err, state.informative_errors)),
    };

    metrics::record_request(route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handlers::RepositoryView;
    use crate::http::response::ErrorBody;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    const COMMIT: &str = "/repos/git/https%3A$$example.com$r.git/commits/abc";

    async fn get(app: axum::Router, path: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn app(debug: bool) -> axum::Router {
        let mut config = ServiceConfig::default();
        config.debug = debug;
        HttpServer::new(config).unwrap().app()
    }

    #[tokio::test]
    async fn test_tree_path_dot_segments_are_canonicalized() {
        let (status, body) = get(app(true), &format!("{COMMIT}/tree/./src//lib/../")).await;
        assert_eq!(status, StatusCode::OK);

        let view: RepositoryView = serde_json::from_slice(&body).unwrap();
        assert_eq!(view.vars["Path"], "src");
        assert_eq!(view.links["self"], format!("{COMMIT}/tree/src"));
    }

    #[tokio::test]
    async fn test_tree_path_above_root_is_bad_request() {
        let (status, body) = get(app(true), &format!("{COMMIT}/tree/../../etc/passwd")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert!(body.error.starts_with("invalid path"));
    }

    #[tokio::test]
    async fn test_error_details_hidden_without_debug() {
        let (status, body) = get(app(false), &format!("{COMMIT}/tree/../../etc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "Bad Request");
    }
}
