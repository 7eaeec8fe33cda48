//! GraphQL transport: batching client and typed mutation wrappers

pub mod client;
pub mod error;
pub mod mutation;

pub use client::{CsrfSource, FlushStrategy, GraphQlClient, CSRF_HEADER};
pub use error::GraphQlError;
pub use mutation::GraphQlMutation;
