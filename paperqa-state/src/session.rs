//! Session-shaped storage with single-writer-per-session serialization.
//!
//! `SessionStore` wraps any `StateStore` backend and adds the property
//! the bare backend does not provide on its own: writes for the same
//! session never interleave. Concurrent turns for different sessions
//! proceed unordered; a concurrent turn for the *same* session queues
//! behind the lock instead of racing.

use async_trait::async_trait;
use layer0::{Scope, SessionId, StateError, StateStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

const SESSION_KEY: &str = "session";

/// A held write lock for one session. Dropping it releases the slot.
pub struct SessionWriteGuard {
    _guard: OwnedMutexGuard<()>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    saved_at_unix_secs: u64,
    record: T,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    saved_at_unix_secs: u64,
    record: &'a T,
}

fn now_unix_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Wraps a `StateStore` with per-session record (de)serialization and a
/// lock table enforcing single-writer-per-session. Optionally enforces a
/// TTL: a record older than the TTL loads as if it were never saved.
pub struct SessionStore<B: StateStore> {
    backend: B,
    locks: StdMutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
    ttl: Option<Duration>,
}

impl<B: StateStore> SessionStore<B> {
    /// Wrap a `StateStore` backend with no TTL — a saved record never
    /// expires.
    pub fn new(backend: B) -> Self {
        Self { backend, locks: StdMutex::new(HashMap::new()), ttl: None }
    }

    /// Wrap a `StateStore` backend, expiring records older than `ttl`.
    pub fn with_ttl(backend: B, ttl: Duration) -> Self {
        Self { backend, locks: StdMutex::new(HashMap::new()), ttl: Some(ttl) }
    }

    fn lock_for(&self, session_id: &SessionId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().expect("session lock table poisoned");
        locks.entry(session_id.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// Acquire the write lock for a session. Holding this guard across a
    /// load-modify-save sequence is how callers get single-writer
    /// semantics; the store itself never auto-acquires it.
    pub async fn lock_session(&self, session_id: &SessionId) -> SessionWriteGuard {
        let lock = self.lock_for(session_id);
        SessionWriteGuard { _guard: lock.lock_owned().await }
    }

    /// Load the session record, if one exists and has not expired.
    pub async fn load<T: DeserializeOwned>(&self, session_id: &SessionId) -> Result<Option<T>, StateError> {
        let scope = Scope::Session(session_id.clone());
        match self.backend.read(&scope, SESSION_KEY).await? {
            Some(value) => {
                let envelope: Envelope<T> =
                    serde_json::from_value(value).map_err(|e| StateError::Serialization(e.to_string()))?;
                if let Some(ttl) = self.ttl {
                    let age = now_unix_secs().saturating_sub(envelope.saved_at_unix_secs);
                    if age > ttl.as_secs() {
                        return Ok(None);
                    }
                }
                Ok(Some(envelope.record))
            }
            None => Ok(None),
        }
    }

    /// Persist the session record, replacing any prior one.
    pub async fn save<T: Serialize>(&self, session_id: &SessionId, record: &T) -> Result<(), StateError> {
        let scope = Scope::Session(session_id.clone());
        let envelope = EnvelopeRef { saved_at_unix_secs: now_unix_secs(), record };
        let value = serde_json::to_value(&envelope).map_err(|e| StateError::Serialization(e.to_string()))?;
        self.backend.write(&scope, SESSION_KEY, value).await
    }

    /// Delete the session record.
    pub async fn clear(&self, session_id: &SessionId) -> Result<(), StateError> {
        let scope = Scope::Session(session_id.clone());
        self.backend.delete(&scope, SESSION_KEY).await
    }
}
