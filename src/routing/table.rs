//! The fixed route set.
//!
//! # Responsibilities
//! - Define the service's named routes as a tree of path-prefix nodes
//! - Attach the codec transform each subtree needs
//! - Flatten the tree into a by-name index for URL building
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards (shared without locks)
//! - A child's effective template is its parent's template followed by its own
//! - Transforms are a closed enum, not closures, so every codec is enumerable

use std::collections::{BTreeMap, HashMap};

use axum::http::Method;

use super::codec;
use super::error::RouteError;
use super::matcher::PathPattern;

// Route names.
pub const ROUTE_ROOT: &str = "root";
pub const ROUTE_REPO: &str = "repo";
pub const ROUTE_REPO_BRANCH: &str = "repo.branch";
pub const ROUTE_REPO_REVISION: &str = "repo.rev";
pub const ROUTE_REPO_TAG: &str = "repo.tag";
pub const ROUTE_REPO_COMMIT: &str = "repo.commit";
pub const ROUTE_REPO_TREE_ENTRY: &str = "repo.tree-entry";

// Variable names.
pub const VAR_VCS: &str = "VCS";
pub const VAR_CLONE_URL: &str = "CloneURL";
pub const VAR_CLONE_URL_ESCAPED: &str = "CloneURLEscaped";
pub const VAR_BRANCH: &str = "Branch";
pub const VAR_REV_SPEC: &str = "RevSpec";
pub const VAR_TAG: &str = "Tag";
pub const VAR_COMMIT_ID: &str = "CommitID";
pub const VAR_PATH: &str = "Path";

/// Route variables keyed by name.
pub type Vars = BTreeMap<String, String>;

/// Encode/decode step applied to the variables of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Placeholders are plain percent-escaped values.
    None,
    /// `CloneURL` travels as the single-segment `CloneURLEscaped`.
    CloneUrl,
    /// `Path` travels as an optional `/`-prefixed suffix.
    TreePath,
}

impl Transform {
    /// Placeholders whose path form this transform produces itself.
    pub fn governs(self) -> &'static [&'static str] {
        match self {
            Transform::None => &[],
            Transform::CloneUrl => &[VAR_CLONE_URL_ESCAPED],
            Transform::TreePath => &[VAR_PATH],
        }
    }

    /// Turns caller variables into placeholder values.
    pub fn encode(self, route: &str, vars: &mut Vars) -> Result<(), RouteError> {
        match self {
            Transform::None => Ok(()),
            Transform::CloneUrl => {
                let clone_url = vars
                    .remove(VAR_CLONE_URL)
                    .ok_or_else(|| RouteError::missing(route, VAR_CLONE_URL))?;
                vars.insert(
                    VAR_CLONE_URL_ESCAPED.to_string(),
                    codec::encode_clone_url(&clone_url),
                );
                Ok(())
            }
            Transform::TreePath => {
                let path = vars
                    .get(VAR_PATH)
                    .ok_or_else(|| RouteError::missing(route, VAR_PATH))?;
                let suffix = codec::escape_path(&codec::encode_tree_path(path)?);
                vars.insert(VAR_PATH.to_string(), suffix);
                Ok(())
            }
        }
    }

    /// Turns raw placeholder captures into canonical variables.
    pub fn decode(self, vars: &mut Vars) -> Result<(), RouteError> {
        match self {
            Transform::None => Ok(()),
            Transform::CloneUrl => {
                if let Some(escaped) = vars.remove(VAR_CLONE_URL_ESCAPED) {
                    vars.insert(VAR_CLONE_URL.to_string(), codec::decode_clone_url(&escaped)?);
                }
                Ok(())
            }
            Transform::TreePath => {
                if let Some(raw) = vars.get(VAR_PATH) {
                    let path = codec::decode_tree_path(&codec::unescape(raw)?)?;
                    vars.insert(VAR_PATH.to_string(), path);
                }
                Ok(())
            }
        }
    }
}

/// Name and method of a node that is itself a route.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub name: &'static str,
    pub method: Method,
}

/// A node in the route tree.
#[derive(Debug, Clone)]
pub struct RouteNode {
    pattern: PathPattern,
    route: Option<RouteSpec>,
    transform: Transform,
    children: Vec<RouteNode>,
}

impl RouteNode {
    /// A node owning `template`, with no route of its own.
    pub fn prefix(template: &str) -> Result<Self, RouteError> {
        Ok(Self {
            pattern: PathPattern::parse(template)?,
            route: None,
            transform: Transform::None,
            children: Vec::new(),
        })
    }

    /// A node that is also the named GET route for its full template.
    pub fn get(template: &str, name: &'static str) -> Result<Self, RouteError> {
        let mut node = Self::prefix(template)?;
        node.route = Some(RouteSpec {
            name,
            method: Method::GET,
        });
        Ok(node)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: RouteNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn route(&self) -> Option<&RouteSpec> {
        self.route.as_ref()
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn children(&self) -> &[RouteNode] {
        &self.children
    }
}

/// A named route flattened out of the tree.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub name: &'static str,
    pub method: Method,
    /// Full template, ancestors included.
    pub pattern: PathPattern,
    /// Transforms from the outermost ancestor down to this route.
    pub transforms: Vec<Transform>,
}

impl CompiledRoute {
    /// Returns true if `placeholder` is produced by one of this route's transforms.
    pub fn is_governed(&self, placeholder: &str) -> bool {
        self.transforms
            .iter()
            .any(|t| t.governs().contains(&placeholder))
    }
}

/// The immutable set of routes the service answers.
#[derive(Debug, Clone)]
pub struct RouteTable {
    roots: Vec<RouteNode>,
    by_name: HashMap<&'static str, CompiledRoute>,
    /// Route names in definition order.
    order: Vec<&'static str>,
}

impl RouteTable {
    /// Builds a table from top-level nodes. Route names must be unique.
    pub fn from_nodes(roots: Vec<RouteNode>) -> Result<Self, RouteError> {
        let mut table = Self {
            roots: Vec::new(),
            by_name: HashMap::new(),
            order: Vec::new(),
        };
        for node in &roots {
            table.index(node, None, &[])?;
        }
        table.roots = roots;
        Ok(table)
    }

    /// The repository routes served by vcsstore.
    pub fn standard() -> Result<Self, RouteError> {
        let commit = RouteNode::get("/commits/{CommitID}", ROUTE_REPO_COMMIT)?.with_child(
            RouteNode::get("/tree{Path:(?:/.*)*}", ROUTE_REPO_TREE_ENTRY)?
                .with_transform(Transform::TreePath),
        );

        let repo = RouteNode::get("/repos/{VCS}/{CloneURLEscaped:[^/]+}", ROUTE_REPO)?
            .with_transform(Transform::CloneUrl)
            .with_child(RouteNode::get("/branches/{Branch}", ROUTE_REPO_BRANCH)?)
            .with_child(RouteNode::get("/revs/{RevSpec}", ROUTE_REPO_REVISION)?)
            .with_child(RouteNode::get("/tags/{Tag}", ROUTE_REPO_TAG)?)
            .with_child(commit);

        Self::from_nodes(vec![RouteNode::get("/", ROUTE_ROOT)?, repo])
    }

    fn index(
        &mut self,
        node: &RouteNode,
        parent: Option<&PathPattern>,
        parent_transforms: &[Transform],
    ) -> Result<(), RouteError> {
        let pattern = match parent {
            Some(parent) => parent.join(&node.pattern)?,
            None => node.pattern.clone(),
        };
        let mut transforms = parent_transforms.to_vec();
        if node.transform != Transform::None {
            transforms.push(node.transform);
        }

        if let Some(spec) = &node.route {
            if self.by_name.contains_key(spec.name) {
                return Err(RouteError::Pattern {
                    template: pattern.template().to_string(),
                    reason: format!("duplicate route name {:?}", spec.name),
                });
            }
            self.order.push(spec.name);
            self.by_name.insert(
                spec.name,
                CompiledRoute {
                    name: spec.name,
                    method: spec.method.clone(),
                    pattern: pattern.clone(),
                    transforms: transforms.clone(),
                },
            );
        }

        for child in &node.children {
            self.index(child, Some(&pattern), &transforms)?;
        }
        Ok(())
    }

    /// Top-level nodes of the route tree.
    pub fn roots(&self) -> &[RouteNode] {
        &self.roots
    }

    /// Looks up a route by name.
    pub fn get(&self, name: &str) -> Option<&CompiledRoute> {
        self.by_name.get(name)
    }

    /// All routes in definition order.
    pub fn routes(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.order.iter().filter_map(|name| self.by_name.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
