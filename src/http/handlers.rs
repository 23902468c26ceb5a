//! Handlers for matched routes.
//!
//! The root route describes the service. Every repository route answers
//! with the resolved repository, its storage location and links to related
//! routes built through the [`Router`](crate::routing::Router).

use std::collections::BTreeMap;
use std::path::PathBuf;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::response;
use crate::http::server::AppState;
use crate::routing::table::{
    ROUTE_REPO_COMMIT, ROUTE_REPO_TREE_ENTRY, ROUTE_ROOT, VAR_CLONE_URL, VAR_COMMIT_ID, VAR_PATH,
    VAR_VCS,
};
use crate::routing::{RouteError, RouteMatch, Vars};
use crate::storage::PathLayout;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteInfo {
    pub name: String,
    pub method: String,
    pub template: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub storage_layout: PathLayout,
    pub routes: Vec<RouteInfo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryView {
    pub route: String,
    pub vcs: String,
    pub clone_url: String,
    pub vars: Vars,
    /// Location relative to the storage root.
    pub repository_path: PathBuf,
    pub cloned: bool,
    pub links: BTreeMap<String, String>,
}

/// Produces the response for a matched route.
pub fn handle_route(state: &AppState, route: RouteMatch) -> Response {
    tracing::debug!(route = route.name, vars = ?route.vars, "Serving route");

    if route.name == ROUTE_ROOT {
        return Json(service_info(state)).into_response();
    }
    match repository_view(state, &route) {
        Ok(view) => Json(view).into_response(),
        Err(err) => response::route_error(&err, state.informative_errors),
    }
}

pub fn service_info(state: &AppState) -> ServiceInfo {
    ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage_layout: state.storage.layout(),
        routes: state
            .router
            .table()
            .routes()
            .map(|r| RouteInfo {
                name: r.name.to_string(),
                method: r.method.to_string(),
                template: r.pattern.template().to_string(),
            })
            .collect(),
    }
}

pub fn repository_view(state: &AppState, route: &RouteMatch) -> Result<RepositoryView, RouteError> {
    let vcs = route
        .var(VAR_VCS)
        .ok_or_else(|| RouteError::missing(route.name, VAR_VCS))?;
    let clone_url_raw = route
        .var(VAR_CLONE_URL)
        .ok_or_else(|| RouteError::missing(route.name, VAR_CLONE_URL))?;
    let clone_url = Url::parse(clone_url_raw).map_err(|e| {
        RouteError::MalformedInput(format!("invalid clone URL {clone_url_raw:?}: {e}"))
    })?;

    let router = &state.router;
    let mut links = BTreeMap::new();
    links.insert("self".to_string(), router.build(route.name, &route.vars)?);

    match route.name {
        ROUTE_REPO_COMMIT => {
            let mut tree = route.vars.clone();
            tree.insert(VAR_PATH.to_string(), ".".to_string());
            links.insert("tree".to_string(), router.build(ROUTE_REPO_TREE_ENTRY, &tree)?);
        }
        ROUTE_REPO_TREE_ENTRY => {
            let commit_id = route
                .var(VAR_COMMIT_ID)
                .ok_or_else(|| RouteError::missing(route.name, VAR_COMMIT_ID))?;
            links.insert(
                "commit".to_string(),
                router.url_to_repo_commit(vcs, &clone_url, commit_id)?,
            );
        }
        _ => {}
    }

    Ok(RepositoryView {
        route: route.name.to_string(),
        vcs: vcs.to_string(),
        clone_url: clone_url_raw.to_string(),
        vars: route.vars.clone(),
        repository_path: state.storage.layout().repository_path(vcs, &clone_url),
        cloned: state.storage.is_cloned(vcs, &clone_url),
        links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Router;
    use crate::storage::Storage;
    use axum::http::Method;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState {
            router: Arc::new(Router::new().unwrap()),
            storage: Arc::new(Storage::new("/nonexistent/vcsstore", PathLayout::Flat)),
            informative_errors: true,
        }
    }

    #[test]
    fn test_service_info_lists_routes() {
        let info = service_info(&state());
        assert_eq!(info.name, "vcsstore");
        assert_eq!(info.routes.len(), 7);
        assert_eq!(info.routes[0].name, "root");
        assert_eq!(info.routes[0].method, "GET");
    }

    #[test]
    fn test_commit_view_links() {
        let state = state();
        let route = state
            .router
            .match_path(&Method::GET, "/repos/git/https%3A$$example.com$r.git/commits/abc")
            .unwrap();
        let view = repository_view(&state, &route).unwrap();
        assert_eq!(view.vcs, "git");
        assert_eq!(view.clone_url, "https://example.com/r.git");
        assert!(!view.cloned);
        assert_eq!(view.repository_path, PathBuf::from("git/https/example.com/r.git"));
        assert_eq!(
            view.links["tree"],
            "/repos/git/https%3A$$example.com$r.git/commits/abc/tree"
        );
    }

    #[test]
    fn test_tree_view_links_back_to_commit() {
        let state = state();
        let route = state
            .router
            .match_path(&Method::GET, "/repos/git/https%3A$$example.com$r.git/commits/abc/tree/./src/")
            .unwrap();
        let view = repository_view(&state, &route).unwrap();
        assert_eq!(
            view.links["self"],
            "/repos/git/https%3A$$example.com$r.git/commits/abc/tree/src"
        );
        assert_eq!(view.links["commit"], "/repos/git/https%3A$$example.com$r.git/commits/abc");
    }

    #[test]
    fn test_relative_clone_url_rejected() {
        let state = state();
        let route = state.router.match_path(&Method::GET, "/repos/git/not-a-url").unwrap();
        let err = repository_view(&state, &route).unwrap_err();
        assert!(matches!(err, RouteError::MalformedInput(_)));
    }
}
