//! Per-form submission state machine.
//!
//! The submitter is driven by three calls: [`FormSubmitter::submit`] when
//! the user submits, then either [`FormSubmitter::on_response`] or
//! [`FormSubmitter::on_error`] when the mutation settles. Each submission
//! gets a new [`SubmissionId`]; results for anything but the latest one are
//! discarded. UI layers follow state changes through
//! [`FormSubmitter::subscribe`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::errors::FormErrors;
use super::fields::have_fields_changed;
use super::guard::{NavigationDecision, UnsavedChangesGuard};
use super::response::{FormMutation, FormResponse};
use crate::graphql::GraphQlError;
use crate::routes::{Navigation, RouteMap};
use crate::session::SessionStore;

/// Generation number of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionId(u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a form submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    SucceededNoRedirect,
    SucceededRedirecting(Navigation),
    Failed(FormErrors),
}

/// Computes a redirect from the mutation output and the submitted input
pub type RedirectFn<I, O> = Arc<dyn Fn(&FormResponse<O>, &I) -> Option<String> + Send + Sync>;

/// Where to go after a successful submission
pub enum SuccessRedirect<I, O> {
    /// Stay on the page
    None,
    To(String),
    With(RedirectFn<I, O>),
}

impl<I, O> SuccessRedirect<I, O> {
    fn resolve(&self, output: &FormResponse<O>, input: &I) -> Option<String> {
        match self {
            SuccessRedirect::None => None,
            SuccessRedirect::To(path) => Some(path.clone()),
            SuccessRedirect::With(f) => f(output, input),
        }
    }
}

/// Drives one form from submission to success or failure
pub struct FormSubmitter<I, O = Map<String, Value>> {
    session: Arc<SessionStore>,
    route_map: Arc<RouteMap>,
    guard: UnsavedChangesGuard,
    redirect: SuccessRedirect<I, O>,
    initial_input: I,
    submitted_input: Option<I>,
    latest_output: Option<FormResponse<O>>,
    generation: u64,
    was_submitted_successfully: bool,
    state_tx: watch::Sender<SubmissionState>,
}

impl<I, O> FormSubmitter<I, O>
where
    I: Serialize + Clone,
{
    pub fn new(initial_input: I, session: Arc<SessionStore>, route_map: Arc<RouteMap>) -> Self {
        let (state_tx, _rx) = watch::channel(SubmissionState::Idle);
        Self {
            session,
            route_map,
            guard: UnsavedChangesGuard::default(),
            redirect: SuccessRedirect::None,
            initial_input,
            submitted_input: None,
            latest_output: None,
            generation: 0,
            was_submitted_successfully: false,
            state_tx,
        }
    }

    /// Redirect to a fixed path after success
    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect = SuccessRedirect::To(path.into());
        self
    }

    /// Compute the redirect from the output and input after success
    pub fn redirect_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&FormResponse<O>, &I) -> Option<String> + Send + Sync + 'static,
    {
        self.redirect = SuccessRedirect::With(Arc::new(f));
        self
    }

    pub fn with_guard(mut self, guard: UnsavedChangesGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn state(&self) -> SubmissionState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state_tx.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state_tx.borrow(), SubmissionState::Submitting)
    }

    /// Validation errors of the last settled submission
    pub fn errors(&self) -> Option<FormErrors> {
        match &*self.state_tx.borrow() {
            SubmissionState::Failed(errors) => Some(errors.clone()),
            _ => None,
        }
    }

    pub fn latest_output(&self) -> Option<&FormResponse<O>> {
        self.latest_output.as_ref()
    }

    pub fn initial_input(&self) -> &I {
        &self.initial_input
    }

    /// Input captured by the most recent submission
    pub fn submitted_input(&self) -> Option<&I> {
        self.submitted_input.as_ref()
    }

    pub fn was_submitted_successfully(&self) -> bool {
        self.was_submitted_successfully
    }

    fn set_state(&self, state: SubmissionState) {
        self.state_tx.send_replace(state);
    }

    fn is_current(&self, id: SubmissionId) -> bool {
        if id.0 == self.generation {
            true
        } else {
            debug!(
                stale = %id,
                current = self.generation,
                "Ignoring result of superseded submission"
            );
            false
        }
    }

    /// Start a submission with a snapshot of the input
    pub fn submit(&mut self, input: I) -> SubmissionId {
        self.generation += 1;
        self.submitted_input = Some(input);
        self.set_state(SubmissionState::Submitting);
        let id = SubmissionId(self.generation);
        debug!(submission = %id, "Form submitted");
        id
    }

    /// Apply the server's verdict. Returns `false` when the response
    /// belonged to a superseded submission and was ignored.
    pub fn on_response(&mut self, id: SubmissionId, response: FormResponse<O>) -> bool {
        if !self.is_current(id) {
            return false;
        }

        if !response.errors.is_empty() {
            let errors = FormErrors::from_field_errors(&response.errors);
            info!(
                submission = %id,
                count = response.errors.len(),
                "Form submission returned validation errors"
            );
            self.latest_output = Some(response);
            self.set_state(SubmissionState::Failed(errors));
            return true;
        }

        if let Some(update) = &response.session {
            // The mutation already succeeded server-side; a fragment we
            // cannot apply is logged by the store and otherwise ignored.
            if let Err(e) = self.session.merge(update) {
                debug!(submission = %id, error = %e, "Session fragment not applied");
            }
        }
        self.was_submitted_successfully = true;

        let redirect = match &self.submitted_input {
            Some(input) => self.redirect.resolve(&response, input),
            None => None,
        };
        self.latest_output = Some(response);

        match redirect {
            Some(target) => {
                let navigation = self.route_map.navigation_for(&target);
                info!(
                    submission = %id,
                    target = %navigation.target(),
                    soft = navigation.is_soft(),
                    "Form submission succeeded, redirecting"
                );
                self.set_state(SubmissionState::SucceededRedirecting(navigation));
            }
            None => {
                info!(submission = %id, "Form submission succeeded");
                self.set_state(SubmissionState::SucceededNoRedirect);
            }
        }
        true
    }

    /// Record a transport or protocol failure as a page-level error.
    /// Returns `false` for superseded submissions.
    pub fn on_error(&mut self, id: SubmissionId, error: &GraphQlError) -> bool {
        if !self.is_current(id) {
            return false;
        }
        warn!(submission = %id, error = %error, "Form submission failed");
        self.set_state(SubmissionState::Failed(FormErrors::network_error()));
        true
    }

    /// Submit through a mutation and apply its result
    pub async fn run<M>(&mut self, mutation: &M, input: I) -> SubmissionState
    where
        M: FormMutation<I, O> + ?Sized,
        I: Send + Sync,
        O: Send,
    {
        let id = self.submit(input.clone());
        match mutation.submit(&input).await {
            Ok(response) => self.on_response(id, response),
            Err(e) => self.on_error(id, &e),
        };
        self.state()
    }

    /// Return to `Idle` with fresh initial input, as on a remount.
    /// Results of submissions still in flight will be ignored.
    pub fn reset(&mut self, initial_input: I) {
        self.generation += 1;
        self.initial_input = initial_input;
        self.submitted_input = None;
        self.latest_output = None;
        self.was_submitted_successfully = false;
        self.set_state(SubmissionState::Idle);
    }

    /// Whether `current` differs from the initial input
    pub fn is_dirty(&self, current: &I) -> bool {
        match (
            serde_json::to_value(&self.initial_input),
            serde_json::to_value(current),
        ) {
            (Ok(initial), Ok(current)) => have_fields_changed(&initial, &current),
            _ => true,
        }
    }

    /// Whether an in-app navigation away from the form may proceed
    pub fn guard_navigation(&self, current: &I, destination: &str) -> NavigationDecision {
        self.guard.check_navigation(
            self.is_dirty(current),
            self.was_submitted_successfully,
            destination,
        )
    }

    /// Whether the page may unload
    pub fn guard_unload(&self, current: &I) -> NavigationDecision {
        self.guard
            .check_unload(self.is_dirty(current), self.was_submitted_successfully)
    }
}
