//! In-memory storage backend.
//!
//! Mirrors the store's key validation, conditional writes and scan filtering
//! so the facade can be exercised without network access.

mod backend;

pub use backend::InMemoryBackend;
