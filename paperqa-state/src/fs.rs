//! Filesystem-backed `StateStore` implementation.
//!
//! Each scope maps to a subdirectory under the root; keys are
//! URL-encoded `.json` files within it. Provides persistence across
//! process restarts for a single-machine deployment.

use async_trait::async_trait;
use layer0::{Scope, StateError, StateStore};
use std::path::{Path, PathBuf};

/// Filesystem-backed state store rooted at a directory.
///
/// ```text
/// root/
///   scope-<hash>/
///     <url-encoded-key>.json
/// ```
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`. The directory is created lazily
    /// on first write.
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf() }
    }
}

fn scope_dir_name(scope: &Scope) -> String {
    let json = serde_json::to_string(scope).unwrap_or_else(|_| "unknown".into());
    let mut hash: u64 = 5381;
    for byte in json.as_bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(*byte as u64);
    }
    format!("scope-{hash:016x}")
}

fn key_to_filename(key: &str) -> String {
    let mut encoded = String::new();
    for ch in key.chars() {
        match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => encoded.push(ch),
            _ => {
                for byte in ch.to_string().as_bytes() {
                    encoded.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    format!("{encoded}.json")
}

#[async_trait]
impl StateStore for FsStore {
    async fn read(&self, scope: &Scope, key: &str) -> Result<Option<serde_json::Value>, StateError> {
        let path = self.root.join(scope_dir_name(scope)).join(key_to_filename(key));
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let value = serde_json::from_str(&contents)
                    .map_err(|e| StateError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateError::WriteFailed(e.to_string())),
        }
    }

    async fn write(&self, scope: &Scope, key: &str, value: serde_json::Value) -> Result<(), StateError> {
        let dir = self.root.join(scope_dir_name(scope));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StateError::WriteFailed(e.to_string()))?;
        let path = dir.join(key_to_filename(key));
        let contents = serde_json::to_string_pretty(&value)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| StateError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, scope: &Scope, key: &str) -> Result<(), StateError> {
        let path = self.root.join(scope_dir_name(scope)).join(key_to_filename(key));
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::WriteFailed(e.to_string())),
        }
    }
}
