//! Guard against leaving a form with unsaved changes

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default confirmation text shown before discarding changes
pub const DEFAULT_UNSAVED_CHANGES_MESSAGE: &str =
    "Are you sure you want to leave this page? Changes you have made may not be saved.";

/// What to do when the user leaves a dirty form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardMode {
    /// Ask the user to confirm
    #[default]
    Prompt,
    /// Let the navigation through but log it
    ReportOnly,
    /// Never intercept
    Off,
}

/// Verdict for an attempted navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    /// Show this confirmation prompt before leaving
    Confirm(String),
    /// Leaving is allowed; the unsaved changes were reported
    AllowWithReport,
}

impl NavigationDecision {
    /// Whether the UI must stop and ask first
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, NavigationDecision::Confirm(_))
    }
}

/// Intercepts in-app navigation and page unloads while a form is dirty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsavedChangesGuard {
    mode: GuardMode,
    message: String,
}

impl UnsavedChangesGuard {
    pub fn new(mode: GuardMode, message: impl Into<String>) -> Self {
        Self {
            mode,
            message: message.into(),
        }
    }

    pub fn mode(&self) -> GuardMode {
        self.mode
    }

    /// Decide whether an in-app navigation to `destination` may proceed
    pub fn check_navigation(
        &self,
        dirty: bool,
        submitted: bool,
        destination: &str,
    ) -> NavigationDecision {
        self.decide(dirty, submitted, Some(destination))
    }

    /// Decide whether the page may be unloaded
    pub fn check_unload(&self, dirty: bool, submitted: bool) -> NavigationDecision {
        self.decide(dirty, submitted, None)
    }

    fn decide(&self, dirty: bool, submitted: bool, destination: Option<&str>) -> NavigationDecision {
        if !dirty || submitted {
            return NavigationDecision::Allow;
        }
        match self.mode {
            GuardMode::Off => NavigationDecision::Allow,
            GuardMode::Prompt => NavigationDecision::Confirm(self.message.clone()),
            GuardMode::ReportOnly => {
                warn!(
                    destination = destination.unwrap_or("<unload>"),
                    "Leaving a form with unsaved changes"
                );
                NavigationDecision::AllowWithReport
            }
        }
    }
}

impl Default for UnsavedChangesGuard {
    fn default() -> Self {
        Self::new(GuardMode::Prompt, DEFAULT_UNSAVED_CHANGES_MESSAGE)
    }
}
