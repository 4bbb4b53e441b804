//! In-memory search over the cached course snapshot.
//!
//! Exact filters, a pluggable approximate ranker, one ordering policy per
//! request, and fixed-size pagination. The engine is pure; snapshot loading
//! and name→id resolution are the caller's job.

pub mod engine;
pub mod ranker;
pub mod types;

pub use engine::SearchEngine;
pub use ranker::{EditDistanceRanker, RankingStrategy};
pub use types::{
    CourseRecord, NameId, Order, PAGE_SIZE, PriceTier, SearchPage, SearchRequest, resolve_ids,
};
