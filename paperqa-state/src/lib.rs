#![deny(missing_docs)]
//! Session persistence: two `layer0::StateStore` backends and a
//! session-shaped wrapper adding single-writer-per-session
//! serialization.

pub mod fs;
pub mod memory;
pub mod session;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use session::{SessionStore, SessionWriteGuard};
