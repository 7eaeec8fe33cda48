//! Form mutations executed through the batching client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::{GraphQlClient, GraphQlError};
use crate::forms::{FormMutation, FormResponse};

/// A named GraphQL mutation taking a single `$input` variable.
///
/// The payload is read from `data.<name>` of the response.
#[derive(Clone)]
pub struct GraphQlMutation {
    client: GraphQlClient,
    name: String,
    document: String,
}

impl GraphQlMutation {
    pub fn new(client: GraphQlClient, name: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            document: document.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl<I, O> FormMutation<I, O> for GraphQlMutation
where
    I: Serialize + Send + Sync,
    O: DeserializeOwned + Send + 'static,
{
    async fn submit(&self, input: &I) -> Result<FormResponse<O>, GraphQlError> {
        let input = serde_json::to_value(input).map_err(|e| GraphQlError::Decode(e.to_string()))?;
        let mut data = self
            .client
            .fetch(self.document.clone(), Some(json!({ "input": input })))
            .await?;

        let payload = data
            .get_mut(&self.name)
            .map(Value::take)
            .ok_or_else(|| GraphQlError::Decode(format!("response has no {} field", self.name)))?;

        serde_json::from_value(payload).map_err(|e| GraphQlError::Decode(e.to_string()))
    }
}
