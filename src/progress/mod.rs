//! Progress step engine for multi-step flows

use std::collections::HashSet;

use crate::session::Session;

pub mod engine;
pub mod step;

#[cfg(test)]
mod proptests;

pub use engine::{
    get_best_next_step, get_best_prev_step, get_latest_step_path, get_relative_step,
    get_step_index_for_pathname, Direction,
};
pub use step::{SessionPredicate, Step};

/// Previous and next destinations for the page at a given path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepNavigation {
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Position within the fill-out portion of a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepProgress {
    /// Zero-based index into the fill-out steps
    pub current: usize,
    pub total: usize,
}

/// The steps of one flow, grouped the way the flow is presented: an
/// introduction, the steps that collect information, and the final
/// confirmation pages.
#[derive(Debug, Clone)]
pub struct ProgressRoutes {
    label: String,
    welcome_steps: Vec<Step>,
    steps_to_fill_out: Vec<Step>,
    confirmation_steps: Vec<Step>,
    all: Vec<Step>,
}

impl ProgressRoutes {
    /// Assemble a flow.
    ///
    /// # Panics
    ///
    /// Panics when the flow is empty or two steps share a path; both are
    /// declaration bugs.
    pub fn new(
        label: impl Into<String>,
        welcome_steps: Vec<Step>,
        steps_to_fill_out: Vec<Step>,
        confirmation_steps: Vec<Step>,
    ) -> Self {
        let label = label.into();
        let all: Vec<Step> = welcome_steps
            .iter()
            .chain(&steps_to_fill_out)
            .chain(&confirmation_steps)
            .cloned()
            .collect();

        assert!(!all.is_empty(), "flow {label:?} declares no steps");
        let mut seen = HashSet::new();
        for step in &all {
            assert!(
                seen.insert(step.path()),
                "flow {label:?} declares {} twice",
                step.path()
            );
        }

        Self {
            label,
            welcome_steps,
            steps_to_fill_out,
            confirmation_steps,
            all,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn welcome_steps(&self) -> &[Step] {
        &self.welcome_steps
    }

    pub fn steps_to_fill_out(&self) -> &[Step] {
        &self.steps_to_fill_out
    }

    pub fn confirmation_steps(&self) -> &[Step] {
        &self.confirmation_steps
    }

    /// Every step in presentation order
    pub fn all_steps(&self) -> &[Step] {
        &self.all
    }

    /// The step addressed by a pathname, if any
    pub fn step_for(&self, pathname: &str) -> Option<&Step> {
        get_step_index_for_pathname(pathname, &self.all).map(|i| &self.all[i])
    }

    /// Where a "continue where you left off" link should point
    pub fn latest_step_path(&self, session: &Session) -> &str {
        get_latest_step_path(session, &self.all).unwrap_or_else(|| self.all[0].path())
    }

    pub fn prev(&self, session: &Session, pathname: &str) -> Option<&Step> {
        get_best_prev_step(session, pathname, &self.all)
    }

    pub fn next(&self, session: &Session, pathname: &str) -> Option<&Step> {
        get_best_next_step(session, pathname, &self.all)
    }

    /// Back and next destinations for the page at `pathname`
    pub fn navigation(&self, session: &Session, pathname: &str) -> StepNavigation {
        StepNavigation {
            prev: self.prev(session, pathname).map(|s| s.path().to_string()),
            next: self.next(session, pathname).map(|s| s.path().to_string()),
        }
    }

    /// Progress through the fill-out steps, for a progress bar. `None` on
    /// welcome and confirmation pages.
    pub fn progress(&self, pathname: &str) -> Option<StepProgress> {
        let current = self
            .steps_to_fill_out
            .iter()
            .position(|step| step.matches(pathname))?;
        Some(StepProgress {
            current,
            total: self.steps_to_fill_out.len(),
        })
    }

    /// Format flow progress for display.
    /// Returns something like: "Welcome > [Step1] > Step2 > Confirmation"
    pub fn format_progress(&self, pathname: &str) -> String {
        let current = self.all.iter().position(|step| step.matches(pathname));
        self.all
            .iter()
            .enumerate()
            .map(|(i, step)| {
                if Some(i) == current {
                    format!("[{}]", step.component())
                } else {
                    step.component().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
