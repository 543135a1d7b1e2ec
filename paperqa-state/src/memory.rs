//! In-memory `StateStore` implementation.

use async_trait::async_trait;
use layer0::{Scope, StateError, StateStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// `HashMap`-backed state store with full scope isolation, for tests
/// and ephemeral runs. Nothing survives process restart.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn composite_key(scope: &Scope, key: &str) -> String {
    let scope_str = serde_json::to_string(scope).unwrap_or_else(|_| "unknown".into());
    format!("{scope_str}\0{key}")
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn read(&self, scope: &Scope, key: &str) -> Result<Option<serde_json::Value>, StateError> {
        let ck = composite_key(scope, key);
        let data = self.data.read().await;
        Ok(data.get(&ck).cloned())
    }

    async fn write(&self, scope: &Scope, key: &str, value: serde_json::Value) -> Result<(), StateError> {
        let ck = composite_key(scope, key);
        let mut data = self.data.write().await;
        data.insert(ck, value);
        Ok(())
    }

    async fn delete(&self, scope: &Scope, key: &str) -> Result<(), StateError> {
        let ck = composite_key(scope, key);
        let mut data = self.data.write().await;
        data.remove(&ck);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer0::SessionId;
    use serde_json::json;

    #[tokio::test]
    async fn write_then_read() {
        let store = MemoryStore::new();
        let scope = Scope::Session(SessionId::new("s1"));
        store.write(&scope, "k", json!("v")).await.unwrap();
        assert_eq!(store.read(&scope, "k").await.unwrap(), Some(json!("v")));
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let store = MemoryStore::new();
        let a = Scope::Session(SessionId::new("a"));
        let b = Scope::Session(SessionId::new("b"));
        store.write(&a, "k", json!(1)).await.unwrap();
        assert_eq!(store.read(&b, "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_value() {
        let store = MemoryStore::new();
        let scope = Scope::Global;
        store.write(&scope, "k", json!(1)).await.unwrap();
        store.delete(&scope, "k").await.unwrap();
        assert_eq!(store.read(&scope, "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_nonexistent_is_ok() {
        let store = MemoryStore::new();
        let scope = Scope::Global;
        assert!(store.delete(&scope, "missing").await.is_ok());
    }
}
