//! Cache key builders and TTL policy.
//!
//! Keys must be reproducible byte-for-byte — they are part of the external
//! contract (interop with other readers of the same cache store, and the
//! integration tests assert them literally).

use std::time::Duration;

/// Global academy listing.
pub const ACADEMIES_ALL: &str = "academies_all";
/// Global teacher listing.
pub const TEACHERS_ALL: &str = "teachers_all";
/// Academy name→id lookup table for search filters.
pub const ALL_ACADEMIES: &str = "all_academies";
/// Teacher name→id lookup table for search filters.
pub const ALL_TEACHERS: &str = "all_teachers";
/// Category name→id lookup table for search filters.
pub const ALL_CATEGORIES: &str = "all_categories";
/// Full visible-course snapshot, the base set for filtered search.
pub const ALL_COURSES: &str = "all_courses";
/// Pre-joined course index backing the home page search box.
pub const COURSES_FOR_HOME_SEARCH: &str = "courses_for_home_search";

/// TTL for per-entity and listing caches (24h).
pub const LISTING_TTL: Duration = Duration::from_secs(86_400);
/// TTL for the full course snapshot (1h).
pub const COURSE_SNAPSHOT_TTL: Duration = Duration::from_secs(3_600);
/// TTL for the name→id lookup tables (24h).
pub const LOOKUP_TTL: Duration = Duration::from_secs(86_400);
/// TTL for the home-search course index (2h).
pub const HOME_SEARCH_TTL: Duration = Duration::from_secs(7_200);

/// Per-academy detail key.
pub fn academy(eng_name: &str) -> String {
    format!("academy:{eng_name}")
}

/// Per-academy top-courses sublist key.
pub fn academy_top_courses(eng_name: &str) -> String {
    format!("academy:{eng_name}:topCourses")
}

/// Per-academy top-teachers sublist key.
pub fn academy_top_teachers(eng_name: &str) -> String {
    format!("academy:{eng_name}:topTeachers")
}

/// Per-teacher detail key.
pub fn teacher(eng_name: &str) -> String {
    format!("teacher:{eng_name}")
}

/// Per-teacher academies sublist key.
pub fn teacher_academies(eng_name: &str) -> String {
    format!("teacher:{eng_name}:academies")
}

/// Per-teacher top-courses sublist key.
pub fn teacher_top_courses(eng_name: &str) -> String {
    format!("teacher:{eng_name}:topCourses")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_keys_match_contract() {
        assert_eq!(academy("rahnema"), "academy:rahnema");
        assert_eq!(academy_top_courses("rahnema"), "academy:rahnema:topCourses");
        assert_eq!(academy_top_teachers("rahnema"), "academy:rahnema:topTeachers");
        assert_eq!(teacher("sara"), "teacher:sara");
        assert_eq!(teacher_academies("sara"), "teacher:sara:academies");
        assert_eq!(teacher_top_courses("sara"), "teacher:sara:topCourses");
    }

    #[test]
    fn ttl_policy_matches_contract() {
        assert_eq!(LISTING_TTL.as_secs(), 86_400);
        assert_eq!(COURSE_SNAPSHOT_TTL.as_secs(), 3_600);
        assert_eq!(LOOKUP_TTL.as_secs(), 86_400);
        assert_eq!(HOME_SEARCH_TTL.as_secs(), 7_200);
    }
}
