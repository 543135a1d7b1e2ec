//! The State protocol — how data persists and is retrieved across turns.

use crate::error::StateError;
use crate::id::SessionId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A persistence scope. Every key lives inside exactly one scope, so two
/// sessions (or a session and the global scope) never collide even if
/// they happen to pick the same key string.
#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Data belonging to one conversation session.
    Session(SessionId),
    /// Data shared across all sessions.
    Global,
}

/// Protocol ③ — State
///
/// How data persists and is retrieved across turns and sessions.
///
/// Implementations:
/// - `MemoryStore` (crate `paperqa-state`): `HashMap`, testing/ephemeral.
/// - `FsStore` (crate `paperqa-state`): one file per key, durable across restarts.
///
/// The trait is deliberately minimal — read/write/delete. Anything that
/// needs per-session write serialization builds that on top of this
/// trait rather than inside it (see `paperqa-state::SessionStore`).
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a value by key within a scope. Returns `None` if absent.
    async fn read(&self, scope: &Scope, key: &str) -> Result<Option<serde_json::Value>, StateError>;

    /// Write a value. Creates or overwrites.
    async fn write(&self, scope: &Scope, key: &str, value: serde_json::Value) -> Result<(), StateError>;

    /// Delete a value. No-op if the key doesn't exist.
    async fn delete(&self, scope: &Scope, key: &str) -> Result<(), StateError>;
}

/// Read-only view of a [`StateStore`]. Exists to enforce the read/write
/// asymmetry at the type level for callers that should never write.
#[async_trait]
pub trait StateReader: Send + Sync {
    /// Read a value by key within a scope.
    async fn read(&self, scope: &Scope, key: &str) -> Result<Option<serde_json::Value>, StateError>;
}

/// Blanket implementation: every StateStore is a StateReader.
#[async_trait]
impl<T: StateStore> StateReader for T {
    async fn read(&self, scope: &Scope, key: &str) -> Result<Option<serde_json::Value>, StateError> {
        StateStore::read(self, scope, key).await
    }
}
