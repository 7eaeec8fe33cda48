//! URL path patterns with `:param` segments.
//!
//! Matching is case-insensitive. An exact match must consume the whole
//! pathname (a single trailing slash is tolerated); a prefix match must end
//! on a segment boundary, so `/foo` matches `/foo/bar` but not `/foobar`.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

/// Marker that introduces a named parameter segment
pub const PARAM_TOKEN: char = ':';

/// A compiled route pattern such as `/letter/:id/preview`
#[derive(Clone)]
pub struct PathPattern {
    source: String,
    param_names: Vec<String>,
    exact_re: Regex,
    prefix_re: Regex,
}

/// Result of matching a pathname against a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// Portion of the pathname consumed by the pattern
    pub url: String,
    /// Whether the whole pathname was consumed
    pub is_exact: bool,
    /// Values captured by `:param` segments, keyed by name
    pub params: BTreeMap<String, String>,
}

impl PathPattern {
    /// Compile a pattern. Every `:name` segment captures one non-empty
    /// path segment.
    pub fn new(pattern: &str) -> Self {
        let trimmed = pattern.trim_end_matches('/');
        let mut body = String::new();
        let mut param_names = Vec::new();

        for (i, segment) in trimmed.split('/').enumerate() {
            if i > 0 {
                body.push('/');
            }
            if let Some(name) = segment.strip_prefix(PARAM_TOKEN) {
                param_names.push(name.to_string());
                body.push_str("([^/]+)");
            } else {
                body.push_str(&regex::escape(segment));
            }
        }

        // Both expressions are assembled from escaped literals and fixed
        // groups, so compilation cannot fail.
        let exact_re = Regex::new(&format!("(?i)^{}/?$", body))
            .unwrap_or_else(|e| panic!("invalid route pattern {pattern:?}: {e}"));
        let prefix_re = Regex::new(&format!("(?i)^{}(?:/|$)", body))
            .unwrap_or_else(|e| panic!("invalid route pattern {pattern:?}: {e}"));

        Self {
            source: pattern.to_string(),
            param_names,
            exact_re,
            prefix_re,
        }
    }

    /// The pattern as originally written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern has any `:param` segments
    pub fn is_parameterized(&self) -> bool {
        !self.param_names.is_empty()
    }

    /// Names of the parameters in declaration order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Test the pathname, honoring the requested match mode
    pub fn matches(&self, pathname: &str, exact: bool) -> bool {
        if exact {
            self.exact_re.is_match(pathname)
        } else {
            self.prefix_re.is_match(pathname)
        }
    }

    /// Match the pathname and extract parameters.
    ///
    /// Returns `None` when the pattern does not match, or when `exact` is
    /// requested and only a prefix of the pathname matched.
    pub fn match_path(&self, pathname: &str, exact: bool) -> Option<PathMatch> {
        let is_exact = self.exact_re.is_match(pathname);
        if exact && !is_exact {
            return None;
        }
        let caps = self.prefix_re.captures(pathname)?;
        let whole = caps.get(0)?.as_str();
        let url = if whole.len() > 1 {
            whole.trim_end_matches('/').to_string()
        } else {
            whole.to_string()
        };
        let params = self
            .param_names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                caps.get(i + 1)
                    .map(|m| (name.clone(), m.as_str().to_string()))
            })
            .collect();

        Some(PathMatch {
            url,
            is_exact,
            params,
        })
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.source).finish()
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Whether a route string contains a parameter token
pub fn is_parameterized_route(path: &str) -> bool {
    path.contains(PARAM_TOKEN)
}
