//! The single owner of the live session.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::{Session, SessionError, SessionUpdate};

/// Owns the current session and publishes immutable snapshots.
///
/// Readers get `Arc<Session>` snapshots or a [`watch::Receiver`]; only the
/// store writes. Share it behind an `Arc` with the components allowed to
/// apply server responses.
pub struct SessionStore {
    tx: watch::Sender<Arc<Session>>,
}

impl SessionStore {
    pub fn new(initial: Session) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Session> {
        self.tx.borrow().clone()
    }

    /// Subscribe to every future snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<Session>> {
        self.tx.subscribe()
    }

    /// CSRF token of the current snapshot
    pub fn csrf_token(&self) -> String {
        self.tx.borrow().csrf_token.clone()
    }

    /// Replace the session wholesale
    pub fn replace(&self, session: Session) {
        self.tx.send_replace(Arc::new(session));
    }

    /// Shallow-merge a server-provided fragment into the session.
    ///
    /// On error the session is left untouched.
    pub fn merge(&self, update: &SessionUpdate) -> Result<(), SessionError> {
        if update.is_empty() {
            return Ok(());
        }
        let merged = match self.snapshot().merged(update) {
            Ok(merged) => merged,
            Err(e) => {
                warn!(error = %e, "Discarding malformed session fragment");
                return Err(e);
            }
        };
        debug!(
            keys = ?update.keys().collect::<Vec<_>>(),
            "Merged session fragment"
        );
        self.tx.send_replace(Arc::new(merged));
        Ok(())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Session::default())
    }
}
