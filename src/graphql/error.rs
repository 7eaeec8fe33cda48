//! Errors surfaced to callers of the GraphQL client

use thiserror::Error;

/// Failure of one GraphQL request.
///
/// Batch-wide failures (transport, status, malformed body) are delivered to
/// every request of the batch, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphQlError {
    /// The request never produced an HTTP response
    #[error("{0}")]
    Network(String),
    #[error("Expected HTTP 200, got {0}")]
    UnexpectedStatus(u16),
    #[error("Result is not an array with size equal to requests")]
    BatchSizeMismatch,
    /// The response body could not be decoded
    #[error("Unable to decode GraphQL response: {0}")]
    Decode(String),
    /// The server answered this request with an error
    #[error("{0}")]
    Query(String),
    /// The client went away before the batch was answered
    #[error("GraphQL request was cancelled")]
    Cancelled,
}

impl GraphQlError {
    /// Whether the failure affected the whole batch rather than one query
    pub fn is_batch_failure(&self) -> bool {
        !matches!(self, GraphQlError::Query(_))
    }
}

impl From<reqwest::Error> for GraphQlError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GraphQlError::Decode(err.to_string())
        } else {
            GraphQlError::Network(err.to_string())
        }
    }
}
