//! Declaration of a single wizard step

use std::fmt;
use std::sync::Arc;

use crate::routes::PathPattern;
use crate::session::Session;

/// Predicate evaluated against the current session
pub type SessionPredicate = Arc<dyn Fn(&Session) -> bool + Send + Sync>;

/// One page of a multi-step flow.
///
/// Steps are declared once at startup and never change afterwards.
#[derive(Clone)]
pub struct Step {
    path: String,
    exact: bool,
    component: String,
    is_complete: Option<SessionPredicate>,
    should_be_skipped: Option<SessionPredicate>,
    never_go_back_to: bool,
    pattern: PathPattern,
}

impl Step {
    /// Declare a step served at `path` and rendered by `component`.
    /// Matching is by prefix until [`Step::exact`] is set.
    pub fn new(path: impl Into<String>, component: impl Into<String>) -> Self {
        let path = path.into();
        let pattern = PathPattern::new(&path);
        Self {
            path,
            exact: false,
            component: component.into(),
            is_complete: None,
            should_be_skipped: None,
            never_go_back_to: false,
            pattern,
        }
    }

    /// Require the whole pathname to match
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn complete_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Session) -> bool + Send + Sync + 'static,
    {
        self.is_complete = Some(Arc::new(predicate));
        self
    }

    pub fn skip_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Session) -> bool + Send + Sync + 'static,
    {
        self.should_be_skipped = Some(Arc::new(predicate));
        self
    }

    /// Back navigation must never land on (or walk past) this step
    pub fn never_go_back_to(mut self) -> Self {
        self.never_go_back_to = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Render key identifying the page component
    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn has_completion_predicate(&self) -> bool {
        self.is_complete.is_some()
    }

    pub fn is_never_go_back_to(&self) -> bool {
        self.never_go_back_to
    }

    /// Whether the pathname addresses this step
    pub fn matches(&self, pathname: &str) -> bool {
        self.pattern.matches(pathname, self.exact)
    }

    pub fn should_be_skipped(&self, session: &Session) -> bool {
        self.should_be_skipped
            .as_ref()
            .is_some_and(|skip| skip(session))
    }

    /// Completion as seen by back navigation: no predicate means incomplete
    pub fn is_complete_for_back_navigation(&self, session: &Session) -> bool {
        self.is_complete
            .as_ref()
            .is_some_and(|complete| complete(session))
    }

    /// Completion as seen by the latest-step redirect: no predicate means
    /// complete
    pub fn is_complete_for_latest_step(&self, session: &Session) -> bool {
        self.is_complete
            .as_ref()
            .map_or(true, |complete| complete(session))
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("path", &self.path)
            .field("exact", &self.exact)
            .field("component", &self.component)
            .field("is_complete", &self.is_complete.is_some())
            .field("should_be_skipped", &self.should_be_skipped.is_some())
            .field("never_go_back_to", &self.never_go_back_to)
            .finish()
    }
}
