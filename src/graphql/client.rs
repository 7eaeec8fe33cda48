//! Batching GraphQL-over-HTTP client.
//!
//! Requests issued before a flush are sent together as one JSON array and
//! answered positionally by the server's JSON array.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

use super::error::GraphQlError;
use crate::session::Session;

/// Header carrying the CSRF token on every batch
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// When queued requests are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStrategy {
    /// Wait this long after the first queued request, then send everything
    /// queued so far. With zero delay the batch closes when the first of its
    /// futures is polled, so every `fetch` issued before the caller awaits
    /// shares one POST on any runtime flavor.
    Timer(Duration),
    /// Send every request on its own as soon as it is issued
    Immediate,
}

impl Default for FlushStrategy {
    fn default() -> Self {
        FlushStrategy::Timer(Duration::ZERO)
    }
}

/// Where the CSRF token comes from at flush time
#[derive(Debug, Clone)]
pub enum CsrfSource {
    Static(String),
    /// Read from the live session, so a rotated token is picked up
    Session(watch::Receiver<Arc<Session>>),
}

impl CsrfSource {
    fn token(&self) -> String {
        match self {
            CsrfSource::Static(token) => token.clone(),
            CsrfSource::Session(rx) => rx.borrow().csrf_token.clone(),
        }
    }
}

type Responder = oneshot::Sender<Result<Value, GraphQlError>>;

struct QueuedRequest {
    query: String,
    variables: Option<Value>,
    responder: Responder,
}

#[derive(Serialize)]
struct BatchItem<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a Value>,
}

#[derive(Default)]
struct QueueState {
    queue: Vec<QueuedRequest>,
    flush_scheduled: bool,
}

struct Inner {
    http: Client,
    batch_url: String,
    csrf: CsrfSource,
    strategy: FlushStrategy,
    state: Mutex<QueueState>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_queue(&self) -> Vec<QueuedRequest> {
        let mut state = self.lock();
        state.flush_scheduled = false;
        std::mem::take(&mut state.queue)
    }

    async fn post(&self, batch: &[QueuedRequest]) -> Result<Vec<Value>, GraphQlError> {
        let body: Vec<BatchItem<'_>> = batch
            .iter()
            .map(|r| BatchItem {
                query: &r.query,
                variables: r.variables.as_ref(),
            })
            .collect();

        let response = self
            .http
            .post(&self.batch_url)
            .header(CSRF_HEADER, self.csrf.token())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GraphQlError::UnexpectedStatus(status.as_u16()));
        }

        match response.json::<Value>().await? {
            Value::Array(results) if results.len() == batch.len() => Ok(results),
            _ => Err(GraphQlError::BatchSizeMismatch),
        }
    }

    async fn send_batch(&self, batch: Vec<QueuedRequest>) {
        if batch.is_empty() {
            return;
        }
        debug!(count = batch.len(), url = %self.batch_url, "Sending GraphQL batch");

        match self.post(&batch).await {
            Ok(results) => {
                for (request, result) in batch.into_iter().zip(results) {
                    // A dropped receiver means the caller lost interest.
                    let _ = request.responder.send(interpret_result(result));
                }
            }
            Err(e) => {
                warn!(error = %e, count = batch.len(), "GraphQL batch failed");
                for request in batch {
                    let _ = request.responder.send(Err(e.clone()));
                }
            }
        }
    }
}

/// Turn one element of the response array into the caller's result
fn interpret_result(mut result: Value) -> Result<Value, GraphQlError> {
    if let Some(error) = result.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(GraphQlError::Query(message));
    }
    if let Some(Value::Array(errors)) = result.get("errors") {
        if !errors.is_empty() {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map_or_else(|| e.to_string(), str::to_string)
                })
                .collect();
            return Err(GraphQlError::Query(messages.join("; ")));
        }
    }
    Ok(result
        .get_mut("data")
        .map(Value::take)
        .unwrap_or(Value::Null))
}

/// Client that coalesces requests into batches.
///
/// Cloning is cheap; clones share one queue.
#[derive(Clone)]
pub struct GraphQlClient {
    inner: Arc<Inner>,
}

impl GraphQlClient {
    pub fn new(batch_url: impl Into<String>, csrf: CsrfSource, strategy: FlushStrategy) -> Self {
        Self::with_http_client(Client::new(), batch_url, csrf, strategy)
    }

    /// Use a preconfigured reqwest client (proxies, cookie store, timeouts)
    pub fn with_http_client(
        http: Client,
        batch_url: impl Into<String>,
        csrf: CsrfSource,
        strategy: FlushStrategy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                batch_url: batch_url.into(),
                csrf,
                strategy,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    pub fn batch_url(&self) -> &str {
        &self.inner.batch_url
    }

    pub fn strategy(&self) -> FlushStrategy {
        self.inner.strategy
    }

    /// Number of requests waiting for the next flush
    pub fn pending_requests(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Queue a query or mutation.
    ///
    /// The request joins the current batch as soon as this is called, not
    /// when the returned future is first polled. Must be called from within
    /// a tokio runtime. With a zero-delay timer, nothing is sent until one of
    /// the batch's futures is polled.
    pub fn fetch(
        &self,
        query: impl Into<String>,
        variables: Option<Value>,
    ) -> impl Future<Output = Result<Value, GraphQlError>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        let request = QueuedRequest {
            query: query.into(),
            variables,
            responder: tx,
        };

        let mut flush_on_poll = None;
        match self.inner.strategy {
            FlushStrategy::Immediate => {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move { inner.send_batch(vec![request]).await });
            }
            FlushStrategy::Timer(delay) if delay.is_zero() => {
                self.inner.lock().queue.push(request);
                flush_on_poll = Some(Arc::clone(&self.inner));
            }
            FlushStrategy::Timer(delay) => {
                let schedule = {
                    let mut state = self.inner.lock();
                    state.queue.push(request);
                    !std::mem::replace(&mut state.flush_scheduled, true)
                };
                if schedule {
                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let batch = inner.take_queue();
                        inner.send_batch(batch).await;
                    });
                }
            }
        }

        async move {
            if let Some(inner) = flush_on_poll {
                // Later futures of the same batch find the queue empty.
                let batch = inner.take_queue();
                if !batch.is_empty() {
                    tokio::spawn(async move { inner.send_batch(batch).await });
                }
            }
            rx.await.unwrap_or(Err(GraphQlError::Cancelled))
        }
    }

    /// Like [`GraphQlClient::fetch`], decoding `data` into `T`
    pub fn fetch_typed<T>(
        &self,
        query: impl Into<String>,
        variables: Option<Value>,
    ) -> impl Future<Output = Result<T, GraphQlError>> + Send + 'static
    where
        T: DeserializeOwned + Send + 'static,
    {
        let pending = self.fetch(query, variables);
        async move {
            let data = pending.await?;
            serde_json::from_value(data).map_err(|e| GraphQlError::Decode(e.to_string()))
        }
    }
}
