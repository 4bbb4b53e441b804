//! Data-store abstraction layer for the Ostad catalog server.
//!
//! The store owns the normalized entities; caches only mirror them.

pub mod error;
pub mod traits;

pub use error::StorageError;
pub use traits::CatalogStore;
