//! The contract every form mutation follows

use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::FieldError;
use crate::graphql::GraphQlError;
use crate::session::SessionUpdate;

/// What a form mutation returns: validation errors, an optional session
/// fragment, and any mutation-specific fields.
///
/// An empty `errors` list means the mutation succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponse<T = Map<String, Value>> {
    #[serde(default)]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionUpdate>,
    #[serde(flatten)]
    pub output: T,
}

impl<T: Default> FormResponse<T> {
    /// A successful response carrying a session fragment
    pub fn success(session: Option<SessionUpdate>) -> Self {
        Self {
            errors: Vec::new(),
            session,
            output: T::default(),
        }
    }

    /// A failed response
    pub fn failure(errors: Vec<FieldError>) -> Self {
        Self {
            errors,
            session: None,
            output: T::default(),
        }
    }
}

impl<T> FormResponse<T> {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Anything that can carry a form input to the server and return its verdict
#[async_trait]
pub trait FormMutation<I, O>: Send + Sync
where
    I: Send + Sync,
    O: Send,
{
    async fn submit(&self, input: &I) -> Result<FormResponse<O>, GraphQlError>;
}

/// Adapts an async closure into a [`FormMutation`]
pub struct FnMutation<F>(pub F);

#[async_trait]
impl<I, O, F, Fut> FormMutation<I, O> for FnMutation<F>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FormResponse<O>, GraphQlError>> + Send,
{
    async fn submit(&self, input: &I) -> Result<FormResponse<O>, GraphQlError> {
        (self.0)(input.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_wire_format() {
        let response: FormResponse = serde_json::from_value(json!({
            "errors": [],
            "session": {"csrfToken": "boop"},
            "redirectUrl": "/next"
        }))
        .unwrap();
        assert!(response.is_success());
        assert_eq!(response.output.get("redirectUrl"), Some(&json!("/next")));
        assert!(response.session.is_some());
    }

    #[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct LoginOutput {
        #[serde(default)]
        welcome_message: Option<String>,
    }

    #[test]
    fn test_typed_output() {
        let response: FormResponse<LoginOutput> = serde_json::from_value(json!({
            "errors": [{"field": "__all__", "extendedMessages": [{"message": "Nope", "code": null}]}],
            "welcomeMessage": null
        }))
        .unwrap();
        assert!(!response.is_success());
        assert_eq!(response.output, LoginOutput::default());
    }

    #[tokio::test]
    async fn test_fn_mutation() {
        let mutation = FnMutation(|input: String| async move {
            Ok::<_, GraphQlError>(FormResponse::<Map<String, Value>>::failure(vec![
                FieldError::new("name", input),
            ]))
        });
        let response: FormResponse =
            FormMutation::<String, Map<String, Value>>::submit(&mutation, &"bad".to_string())
                .await
                .unwrap();
        assert_eq!(response.errors[0].message_texts(), vec!["bad".to_string()]);
    }
}
