//! Cache store and cache-aside orchestration.
//!
//! The expensive part of every catalog page is a relational rollup across
//! courses, teachers, academies and ratings. This crate wraps those rollups
//! in a read-through cache with fixed TTLs: stale-but-bounded listings are
//! served until the entry expires.

pub mod aside;
pub mod backend;
pub mod keys;

pub use aside::{AsideStatsSnapshot, CacheAside};
pub use backend::{CacheBackend, CacheStats, CachedEntry};
