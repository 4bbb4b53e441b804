//! The search pipeline: exact filters, approximate ranking, one ordering
//! policy, fixed-size pagination.

use crate::ranker::{EditDistanceRanker, RankingStrategy};
use crate::types::{CourseRecord, Order, PAGE_SIZE, PriceTier, SearchPage, SearchRequest};

/// Filters and paginates the cached course snapshot.
///
/// The engine is pure: it never touches the data store or the cache. The
/// caller supplies the snapshot (visible courses only, newest first) and a
/// resolved [`SearchRequest`].
pub struct SearchEngine {
    ranker: Box<dyn RankingStrategy>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(Box::new(EditDistanceRanker))
    }
}

impl SearchEngine {
    /// Create an engine with the given ranking strategy.
    pub fn new(ranker: Box<dyn RankingStrategy>) -> Self {
        Self { ranker }
    }

    /// Run the full pipeline over the snapshot.
    pub fn search(&self, snapshot: Vec<CourseRecord>, req: &SearchRequest) -> SearchPage {
        let mut working = snapshot;

        // Exact filters narrow the working set sequentially. An empty id
        // list means "no restriction", never "match nothing".
        if !req.academy_ids.is_empty() {
            working.retain(|c| req.academy_ids.contains(&c.academy_id));
        }
        if !req.teacher_ids.is_empty() {
            working.retain(|c| req.teacher_ids.contains(&c.teacher_id));
        }
        if !req.category_ids.is_empty() {
            // At least one requested category must be present on the course
            working.retain(|c| c.categories.iter().any(|id| req.category_ids.contains(id)));
        }

        let tier = PriceTier::from_code(req.price);
        if tier != PriceTier::All {
            working.retain(|c| tier.matches(c));
        }

        if !req.search_text.trim().is_empty() {
            working = self.ranker.rank(working, &req.search_text);
        }

        match Order::from_code(req.order) {
            Order::Newest => working.sort_by(|a, b| b.release_date.cmp(&a.release_date)),
            Order::Oldest => working.sort_by(|a, b| a.release_date.cmp(&b.release_date)),
            Order::Finished => working.retain(|c| c.status == ostad_core::CourseStatus::Finished),
            Order::Ongoing => working.retain(|c| c.status == ostad_core::CourseStatus::Ongoing),
            Order::Rating => working.sort_by(|a, b| b.ratings.total_cmp(&a.ratings)),
            Order::Purchased => working.sort_by(|a, b| b.purchased.cmp(&a.purchased)),
        }

        paginate(working, req.page)
    }
}

/// Slice one fixed-size page out of the result set.
///
/// An absent or zero page defaults to 1; a page past the end yields an empty
/// course list, not an error.
fn paginate(results: Vec<CourseRecord>, page: Option<u32>) -> SearchPage {
    let total_pages = results.len().div_ceil(PAGE_SIZE) as u32;
    let current_page = page.filter(|&p| p >= 1).unwrap_or(1);

    let start = (current_page as usize - 1).saturating_mul(PAGE_SIZE);
    let courses = if start >= results.len() {
        Vec::new()
    } else {
        results
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .collect()
    };

    SearchPage {
        courses,
        current_page,
        total_pages,
    }
}
