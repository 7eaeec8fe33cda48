//! Route configuration and the in-app route map.
//!
//! Each site declares its routes as a static tree of path strings. The
//! [`RouteMap`] built from that tree answers whether a concrete pathname can
//! be served in-app (soft navigation) or needs a full page load.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

pub mod pattern;
pub mod site;

pub use pattern::{is_parameterized_route, PathMatch, PathPattern};
pub use site::{site_routes, SiteType};

/// A nested tree of route paths. Leaves are path strings; branches group
/// related routes under a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteTree {
    Leaf(String),
    Branch(BTreeMap<String, RouteTree>),
}

impl RouteTree {
    /// Create a leaf
    pub fn leaf(path: impl Into<String>) -> Self {
        RouteTree::Leaf(path.into())
    }

    /// Create a branch from `(name, subtree)` pairs
    pub fn branch<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, RouteTree)>,
        K: Into<String>,
    {
        RouteTree::Branch(
            children
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }

    /// Look up a subtree or leaf by a dotted name, e.g. `onboarding.step1`
    pub fn get(&self, dotted: &str) -> Option<&RouteTree> {
        dotted.split('.').try_fold(self, |node, key| match node {
            RouteTree::Branch(children) => children.get(key),
            RouteTree::Leaf(_) => None,
        })
    }

    /// Look up a leaf path by a dotted name
    pub fn path(&self, dotted: &str) -> Option<&str> {
        match self.get(dotted)? {
            RouteTree::Leaf(path) => Some(path),
            RouteTree::Branch(_) => None,
        }
    }

    /// Visit every leaf path in the tree
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            RouteTree::Leaf(path) => out.push(path),
            RouteTree::Branch(children) => {
                for child in children.values() {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

/// How the client should get to a destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// In-app route change, no page reload
    Soft(String),
    /// Full browser page load
    Hard(String),
}

impl Navigation {
    /// The destination path or URL
    pub fn target(&self) -> &str {
        match self {
            Navigation::Soft(path) | Navigation::Hard(path) => path,
        }
    }

    pub fn is_soft(&self) -> bool {
        matches!(self, Navigation::Soft(_))
    }
}

/// Lookup key for exact routes: lowercase, one trailing slash dropped
fn normalize_route(path: &str) -> String {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    path.to_lowercase()
}

/// Index of every route a site can serve without a full page load
#[derive(Debug, Clone, Default)]
pub struct RouteMap {
    /// Normalized lookup key to the route as declared
    existence: HashMap<String, String>,
    parameterized: Vec<PathPattern>,
}

impl RouteMap {
    /// Build the map by walking every leaf of the route tree
    pub fn new(routes: &RouteTree) -> Self {
        let mut map = Self::default();
        for path in routes.leaves() {
            if is_parameterized_route(path) {
                map.parameterized.push(PathPattern::new(path));
            } else {
                map.existence.insert(normalize_route(path), path.to_string());
            }
        }
        tracing::debug!(
            exact = map.existence.len(),
            parameterized = map.parameterized.len(),
            "Built route map"
        );
        map
    }

    /// Whether a client-servable route exists for the concrete pathname
    pub fn exists(&self, pathname: &str) -> bool {
        if self.existence.contains_key(&normalize_route(pathname)) {
            return true;
        }
        self.parameterized
            .iter()
            .any(|pattern| pattern.matches(pathname, true))
    }

    /// Number of non-parameterized routes
    pub fn size(&self) -> usize {
        self.existence.len()
    }

    /// All non-parameterized routes, sorted
    pub fn non_parameterized_routes(&self) -> Vec<&str> {
        let mut routes: Vec<&str> = self.existence.values().map(String::as_str).collect();
        routes.sort_unstable();
        routes
    }

    /// All parameterized patterns in declaration order
    pub fn parameterized_routes(&self) -> impl Iterator<Item = &str> {
        self.parameterized.iter().map(PathPattern::as_str)
    }

    /// Decide between soft and hard navigation for a redirect target.
    ///
    /// Only the path component is looked up, so query strings and fragments
    /// do not force a reload.
    pub fn navigation_for(&self, target: &str) -> Navigation {
        let path = target
            .split(['?', '#'])
            .next()
            .unwrap_or(target);
        if self.exists(path) {
            Navigation::Soft(target.to_string())
        } else {
            Navigation::Hard(target.to_string())
        }
    }
}
