//! Form submission: server-side validation errors, the mutation contract,
//! change tracking and the per-form submission state machine

pub mod errors;
pub mod fields;
pub mod guard;
pub mod response;
pub mod submitter;

pub use errors::{
    ExtendedMessage, FieldError, FormErrors, NETWORK_ERROR_MESSAGE, NON_FIELD_ERRORS_KEY,
};
pub use fields::{are_fields_equal, have_fields_changed};
pub use guard::{GuardMode, NavigationDecision, UnsavedChangesGuard, DEFAULT_UNSAVED_CHANGES_MESSAGE};
pub use response::{FnMutation, FormMutation, FormResponse};
pub use submitter::{FormSubmitter, RedirectFn, SubmissionId, SubmissionState, SuccessRedirect};
