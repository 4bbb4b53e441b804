//! Search request/response types and the snapshot record the engine runs on.

use ostad_core::CourseStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Fixed page size for search results.
pub const PAGE_SIZE: usize = 12;

/// One course in the cached search snapshot, pre-joined with the teacher and
/// academy display fields so no data-store access happens at query time.
///
/// This struct is also the response projection for search results: fields
/// not listed here are dropped by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub academy_id: String,
    pub academy_name: String,
    pub teacher_id: String,
    pub teacher_name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub price: u64,
    #[serde(default)]
    pub discount: u64,
    pub status: CourseStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub release_date: OffsetDateTime,
    pub ratings: f64,
    pub ratings_number: u64,
    pub purchased: u64,
    pub course_length: u64,
    pub total_lessons: u64,
}

/// Ordering policy selected by the `order` request code.
///
/// Codes 3 and 4 are status filters, not sorts; exactly one policy applies
/// per request. Unknown codes fall back to `Newest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// 1 — `releaseDate` descending (the default).
    Newest,
    /// 2 — `releaseDate` ascending.
    Oldest,
    /// 3 — keep only finished courses.
    Finished,
    /// 4 — keep only ongoing courses.
    Ongoing,
    /// 5 — rating descending.
    Rating,
    /// 6 — purchase count descending.
    Purchased,
}

impl Order {
    pub fn from_code(code: Option<u8>) -> Self {
        match code {
            Some(2) => Self::Oldest,
            Some(3) => Self::Finished,
            Some(4) => Self::Ongoing,
            Some(5) => Self::Rating,
            Some(6) => Self::Purchased,
            _ => Self::Newest,
        }
    }
}

/// Price tier selected by the `price` request code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    /// 1 — no price restriction (the default).
    All,
    /// 2 — `price == 0`.
    Free,
    /// 3 — `price > 0`.
    Paid,
    /// 4 — an active discount.
    Discounted,
}

impl PriceTier {
    pub fn from_code(code: Option<u8>) -> Self {
        match code {
            Some(2) => Self::Free,
            Some(3) => Self::Paid,
            Some(4) => Self::Discounted,
            _ => Self::All,
        }
    }

    pub fn matches(&self, record: &CourseRecord) -> bool {
        match self {
            Self::All => true,
            Self::Free => record.price == 0,
            Self::Paid => record.price > 0,
            Self::Discounted => record.discount > 0,
        }
    }
}

/// A resolved search request. Entity names have already been mapped to id
/// sets through the cached lookup tables; empty lists mean "no restriction".
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub search_text: String,
    pub order: Option<u8>,
    pub price: Option<u8>,
    pub academy_ids: Vec<String>,
    pub teacher_ids: Vec<String>,
    pub category_ids: Vec<String>,
    pub page: Option<u32>,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub courses: Vec<CourseRecord>,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Entry of a cached name→id lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameId {
    pub id: String,
    pub name: String,
}

/// Resolve a list of requested names against a lookup table.
///
/// Unknown names are dropped silently; the resulting id set only narrows the
/// search when non-empty, so an all-unknown request behaves like "match
/// nothing" only if the caller asked for specific names.
pub fn resolve_ids(table: &[NameId], names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter_map(|name| {
            table
                .iter()
                .find(|entry| &entry.name == name)
                .map(|entry| entry.id.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_codes() {
        assert_eq!(Order::from_code(None), Order::Newest);
        assert_eq!(Order::from_code(Some(1)), Order::Newest);
        assert_eq!(Order::from_code(Some(2)), Order::Oldest);
        assert_eq!(Order::from_code(Some(3)), Order::Finished);
        assert_eq!(Order::from_code(Some(4)), Order::Ongoing);
        assert_eq!(Order::from_code(Some(5)), Order::Rating);
        assert_eq!(Order::from_code(Some(6)), Order::Purchased);
        assert_eq!(Order::from_code(Some(99)), Order::Newest);
    }

    #[test]
    fn price_codes() {
        assert_eq!(PriceTier::from_code(None), PriceTier::All);
        assert_eq!(PriceTier::from_code(Some(2)), PriceTier::Free);
        assert_eq!(PriceTier::from_code(Some(3)), PriceTier::Paid);
        assert_eq!(PriceTier::from_code(Some(4)), PriceTier::Discounted);
    }

    #[test]
    fn resolve_ids_drops_unknown_names() {
        let table = vec![
            NameId {
                id: "a1".into(),
                name: "rahnema".into(),
            },
            NameId {
                id: "a2".into(),
                name: "maktab".into(),
            },
        ];
        let ids = resolve_ids(&table, &["maktab".into(), "ghost".into()]);
        assert_eq!(ids, vec!["a2".to_string()]);
    }
}
