//! In-memory data-store backend.

pub mod storage;

pub use storage::InMemoryCatalog;
