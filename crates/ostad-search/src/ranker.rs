//! Approximate text matching over course names and tags.
//!
//! The ranking step is behind a trait so the in-memory scorer can be swapped
//! for an inverted-index engine without touching filter or pagination logic.

use crate::types::CourseRecord;

/// Ranks a working set against a free-text query.
///
/// Returns only the matching records, best match first. A query with no
/// matches yields an empty vector — never the unfiltered input.
pub trait RankingStrategy: Send + Sync {
    fn rank(&self, items: Vec<CourseRecord>, query: &str) -> Vec<CourseRecord>;
}

/// Default ranker: case-insensitive substring and bounded edit distance over
/// `name` and `tags`, lower score = better match.
///
/// A record matches when the query is a substring of the name or a tag
/// (score 0), or when some word of the name or some tag is within the edit
/// distance budget (1 for short queries, 2 from five characters up).
#[derive(Debug, Default, Clone, Copy)]
pub struct EditDistanceRanker;

impl EditDistanceRanker {
    fn budget(query: &str) -> usize {
        if query.chars().count() >= 5 { 2 } else { 1 }
    }

    fn score(record: &CourseRecord, query: &str) -> Option<usize> {
        let name = record.name.to_lowercase();
        if name.contains(query) {
            return Some(0);
        }
        if record.tags.iter().any(|t| t.to_lowercase().contains(query)) {
            return Some(0);
        }

        let budget = Self::budget(query);
        let candidates = name
            .split_whitespace()
            .map(str::to_string)
            .chain(record.tags.iter().map(|t| t.to_lowercase()));

        candidates
            .map(|candidate| edit_distance(&candidate, query))
            .filter(|&d| d <= budget)
            .min()
    }
}

impl RankingStrategy for EditDistanceRanker {
    fn rank(&self, items: Vec<CourseRecord>, query: &str) -> Vec<CourseRecord> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return items;
        }

        let mut scored: Vec<(usize, CourseRecord)> = items
            .into_iter()
            .filter_map(|record| Self::score(&record, &query).map(|s| (s, record)))
            .collect();
        // Stable sort keeps the incoming order among equal scores
        scored.sort_by_key(|(score, _)| *score);
        scored.into_iter().map(|(_, record)| record).collect()
    }
}

/// Levenshtein distance over unicode scalar values.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
