//! Route lookup and URL generation.
//!
//! # Responsibilities
//! - Match (method, path) to a route name and canonical variables
//! - Build paths for a route name from caller variables
//! - Return an explicit NotFound rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Top-down walk of the route tree; children are tried before their parent
//!   so the most deeply nested route wins
//! - Matching works on the raw (still percent-encoded) request path

use axum::http::Method;
use url::Url;

use super::codec;
use super::error::RouteError;
use super::table::{
    RouteNode, RouteTable, Transform, Vars, ROUTE_REPO_COMMIT, VAR_CLONE_URL, VAR_COMMIT_ID,
    VAR_VCS,
};

/// A successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: &'static str,
    pub vars: Vars,
}

impl RouteMatch {
    /// Returns the value of a decoded variable.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Raw structural match collected while walking the tree.
struct RawMatch<'t> {
    name: &'static str,
    method: &'t Method,
    captures: Vec<(String, String)>,
    transforms: Vec<Transform>,
}

/// Matches request paths against a [`RouteTable`] and builds paths from it.
#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
}

impl Router {
    /// Creates a router over the standard vcsstore routes.
    pub fn new() -> Result<Self, RouteError> {
        Ok(Self::from_table(RouteTable::standard()?))
    }

    pub fn from_table(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolves a request to a route and its decoded variables.
    ///
    /// Fails with [`RouteError::NotFound`] when no route matches structurally
    /// or the matched route does not accept `method`, and with a decode error
    /// when a matched value is malformed.
    pub fn match_path(&self, method: &Method, path: &str) -> Result<RouteMatch, RouteError> {
        let raw = self
            .table
            .roots()
            .iter()
            .find_map(|node| walk(node, path, Vec::new(), Vec::new()))
            .ok_or_else(|| RouteError::not_found(method, path))?;

        if raw.method != method {
            return Err(RouteError::not_found(method, path));
        }

        let mut vars = Vars::new();
        for (name, value) in raw.captures {
            let governed = raw.transforms.iter().any(|t| t.governs().contains(&name.as_str()));
            let value = if governed { value } else { codec::unescape(&value)? };
            vars.insert(name, value);
        }
        for transform in &raw.transforms {
            transform.decode(&mut vars)?;
        }

        tracing::trace!(route = raw.name, %method, path, "Route matched");
        Ok(RouteMatch {
            name: raw.name,
            vars,
        })
    }

    /// Builds the path for a named route.
    pub fn build(&self, name: &str, vars: &Vars) -> Result<String, RouteError> {
        let route = self
            .table
            .get(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;

        let mut encoded = vars.clone();
        for transform in &route.transforms {
            transform.encode(route.name, &mut encoded)?;
        }

        route.pattern.expand(|placeholder| {
            let value = encoded
                .get(placeholder)
                .ok_or_else(|| RouteError::missing(route.name, placeholder))?;
            let segment = if route.is_governed(placeholder) {
                value.clone()
            } else {
                codec::escape_segment(value)
            };
            // Clients drop dot segments, so the request would reach another route.
            if codec::is_dot_segment(&segment) {
                return Err(RouteError::InvalidVariable {
                    variable: placeholder.to_string(),
                    value: vars.get(placeholder).unwrap_or(value).clone(),
                });
            }
            Ok(segment)
        })
    }

    /// [`Router::build`] with variables given as name/value pairs.
    pub fn url_to(&self, name: &str, pairs: &[(&str, &str)]) -> Result<String, RouteError> {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.build(name, &vars)
    }

    /// Path of a repository commit.
    pub fn url_to_repo_commit(
        &self,
        vcs_type: &str,
        clone_url: &Url,
        commit_id: &str,
    ) -> Result<String, RouteError> {
        self.url_to(
            ROUTE_REPO_COMMIT,
            &[
                (VAR_VCS, vcs_type),
                (VAR_CLONE_URL, clone_url.as_str()),
                (VAR_COMMIT_ID, commit_id),
            ],
        )
    }

    /// Canonical location for a path that only differs from a route by a
    /// trailing slash.
    pub fn redirect_for(&self, method: &Method, path: &str) -> Option<String> {
        let trimmed = path.strip_suffix('/').filter(|t| !t.is_empty())?;
        if self.match_path(method, path).is_ok() {
            return None;
        }
        self.match_path(method, trimmed).ok()?;
        Some(trimmed.to_string())
    }
}

/// Walks one subtree; children first, then the node itself.
fn walk<'t>(
    node: &'t RouteNode,
    path: &str,
    mut captures: Vec<(String, String)>,
    mut transforms: Vec<Transform>,
) -> Option<RawMatch<'t>> {
    let (values, rest) = node.pattern().match_prefix(path)?;
    captures.extend(values);
    if node.transform() != Transform::None {
        transforms.push(node.transform());
    }

    if !rest.is_empty() {
        if let Some(found) = node
            .children()
            .iter()
            .find_map(|child| walk(child, rest, captures.clone(), transforms.clone()))
        {
            return Some(found);
        }
    }

    match node.route() {
        Some(spec) if rest.is_empty() => Some(RawMatch {
            name: spec.name,
            method: &spec.method,
            captures,
            transforms,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::table::*;

    fn vars(pairs: &[(&str, &str)]) -> Vars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_match_root() {
        let router = Router::new().unwrap();
        let m = router.match_path(&Method::GET, "/").unwrap();
        assert_eq!(m.name, ROUTE_ROOT);
        assert!(m.vars.is_empty());
    }

    #[test]
    fn test_match_repo() {
        let router = Router::new().unwrap();
        let m = router
            .match_path(&Method::GET, "/repos/git/https%3A$$example.com$foo$bar.git")
            .unwrap();
        assert_eq!(m.name, ROUTE_REPO);
        assert_eq!(
            m.vars,
            vars(&[("VCS", "git"), ("CloneURL", "https://example.com/foo/bar.git")])
        );
    }

    #[test]
    fn test_match_unvalidated_vcs() {
        let router = Router::new().unwrap();
        let m = router.match_path(&Method::GET, "/repos/unknowntype/x").unwrap();
        assert_eq!(m.name, ROUTE_REPO);
        assert_eq!(m.var(VAR_VCS), Some("unknowntype"));
        assert_eq!(m.var(VAR_CLONE_URL), Some("x"));
    }

    #[test]
    fn test_method_mismatch_is_not_found() {
        let router = Router::new().unwrap();
        let err = router.match_path(&Method::POST, "/").unwrap_err();
        assert!(matches!(err, RouteError::NotFound { .. }));
    }

    #[test]
    fn test_unregistered_path_is_not_found() {
        let router = Router::new().unwrap();
        for path in ["/nope", "/repos", "/repos/git", "/repos/git/x/unknown/y", "/repos/git/x/commits"] {
            assert!(
                matches!(router.match_path(&Method::GET, path), Err(RouteError::NotFound { .. })),
                "{path} should not match"
            );
        }
    }

    #[test]
    fn test_most_specific_route_wins() {
        let router = Router::new().unwrap();
        let m = router
            .match_path(&Method::GET, "/repos/git/x/commits/abc123/tree/src/lib.rs")
            .unwrap();
        assert_eq!(m.name, ROUTE_REPO_TREE_ENTRY);
        assert_eq!(m.var(VAR_PATH), Some("src/lib.rs"));

        let m = router.match_path(&Method::GET, "/repos/git/x/commits/abc123").unwrap();
        assert_eq!(m.name, ROUTE_REPO_COMMIT);
        assert_eq!(m.var(VAR_COMMIT_ID), Some("abc123"));
    }

    #[test]
    fn test_tree_path_canonicalized_on_match() {
        let router = Router::new().unwrap();
        for suffix in ["", "/", "/.", "/a/.."] {
            let path = format!("/repos/git/x/commits/c/tree{suffix}");
            let m = router.match_path(&Method::GET, &path).unwrap();
            assert_eq!(m.var(VAR_PATH), Some("."), "suffix {suffix:?}");
        }
        let err = router
            .match_path(&Method::GET, "/repos/git/x/commits/c/tree/../../etc")
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPath(_)));
    }

    #[test]
    fn test_malformed_clone_url_on_match() {
        let router = Router::new().unwrap();
        let err = router.match_path(&Method::GET, "/repos/git/bad%zz").unwrap_err();
        assert!(matches!(err, RouteError::MalformedInput(_)));
    }

    #[test]
    fn test_build_tree_entry_root() {
        let router = Router::new().unwrap();
        let v = vars(&[
            ("VCS", "git"),
            ("CloneURL", "https://x.com/a/b.git"),
            ("CommitID", "abc123"),
            ("Path", "."),
        ]);
        let url = router.build(ROUTE_REPO_TREE_ENTRY, &v).unwrap();
        assert_eq!(url, "/repos/git/https%3A$$x.com$a$b.git/commits/abc123/tree");

        let m = router.match_path(&Method::GET, &url).unwrap();
        assert_eq!(m.name, ROUTE_REPO_TREE_ENTRY);
        assert_eq!(m.vars, v);
    }

    #[test]
    fn test_build_missing_variables() {
        let router = Router::new().unwrap();
        let err = router.build(ROUTE_REPO_COMMIT, &vars(&[("VCS", "git")])).unwrap_err();
        assert!(matches!(err, RouteError::MissingVariable { .. }));

        let err = router
            .build(ROUTE_REPO_COMMIT, &vars(&[("VCS", "git"), ("CloneURL", "https://x.com/r")]))
            .unwrap_err();
        assert_eq!(err, RouteError::missing(ROUTE_REPO_COMMIT, VAR_COMMIT_ID));
    }

    #[test]
    fn test_build_unknown_route() {
        let router = Router::new().unwrap();
        let err = router.build("repo.blame", &Vars::new()).unwrap_err();
        assert_eq!(err, RouteError::UnknownRoute("repo.blame".into()));
    }

    #[test]
    fn test_build_rejects_invalid_values() {
        let router = Router::new().unwrap();
        let err = router
            .url_to(ROUTE_REPO_BRANCH, &[("VCS", "git"), ("CloneURL", "x"), ("Branch", "")])
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidVariable { .. }));

        let err = router
            .url_to(
                ROUTE_REPO_TREE_ENTRY,
                &[("VCS", "git"), ("CloneURL", "x"), ("CommitID", "c"), ("Path", "../x")],
            )
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPath(_)));
    }

    #[test]
    fn test_build_rejects_dot_segments() {
        let router = Router::new().unwrap();
        let base = [("VCS", "git"), ("CloneURL", "https://h/r")];
        for (route, var) in [
            (ROUTE_REPO_BRANCH, "Branch"),
            (ROUTE_REPO_REVISION, "RevSpec"),
            (ROUTE_REPO_TAG, "Tag"),
            (ROUTE_REPO_COMMIT, "CommitID"),
        ] {
            for value in [".", ".."] {
                let mut pairs = base.to_vec();
                pairs.push((var, value));
                let err = router.url_to(route, &pairs).unwrap_err();
                assert_eq!(
                    err,
                    RouteError::InvalidVariable {
                        variable: var.to_string(),
                        value: value.to_string(),
                    }
                );
            }
        }

        for vcs in [".", ".."] {
            let err = router.url_to(ROUTE_REPO, &[("VCS", vcs), ("CloneURL", "https://h/r")]);
            assert!(matches!(err, Err(RouteError::InvalidVariable { .. })));
        }
        let err = router.url_to(ROUTE_REPO, &[("VCS", "git"), ("CloneURL", "..")]);
        assert!(matches!(err, Err(RouteError::InvalidVariable { .. })));

        // Longer runs of dots are ordinary segments.
        let mut pairs = base.to_vec();
        pairs.push(("RevSpec", "..."));
        let url = router.url_to(ROUTE_REPO_REVISION, &pairs).unwrap();
        assert!(url.ends_with("/revs/..."));
    }

    #[test]
    fn test_branch_with_slash_round_trips() {
        let router = Router::new().unwrap();
        let v = vars(&[("VCS", "hg"), ("CloneURL", "https://x.com/r"), ("Branch", "feature/new ui")]);
        let url = router.build(ROUTE_REPO_BRANCH, &v).unwrap();
        assert_eq!(url, "/repos/hg/https%3A$$x.com$r/branches/feature%2Fnew%20ui");
        let m = router.match_path(&Method::GET, &url).unwrap();
        assert_eq!(m.name, ROUTE_REPO_BRANCH);
        assert_eq!(m.vars, v);
    }

    #[test]
    fn test_url_to_repo_commit() {
        let router = Router::new().unwrap();
        let clone_url = Url::parse("https://example.com/foo/bar.git").unwrap();
        let url = router.url_to_repo_commit("git", &clone_url, "deadbeef").unwrap();
        assert_eq!(url, "/repos/git/https%3A$$example.com$foo$bar.git/commits/deadbeef");
    }

    #[test]
    fn test_redirect_for_trailing_slash() {
        let router = Router::new().unwrap();
        assert_eq!(
            router.redirect_for(&Method::GET, "/repos/git/x/"),
            Some("/repos/git/x".to_string())
        );
        assert_eq!(router.redirect_for(&Method::GET, "/repos/git/x"), None);
        assert_eq!(router.redirect_for(&Method::GET, "/"), None);
        assert_eq!(router.redirect_for(&Method::GET, "/nope/"), None);
        // The tree suffix accepts a trailing slash directly.
        assert_eq!(router.redirect_for(&Method::GET, "/repos/git/x/commits/c/tree/"), None);
    }
}
