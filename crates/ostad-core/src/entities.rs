//! Catalog domain entities.
//!
//! Field names follow the established wire contract (camelCase, with the
//! historical `rating`/`ratings` split between Academy/Teacher and Course).
//! Ownership lists (`Academy::courses`, `Teacher::academies`, ...) are the
//! canonical relationship; the derived aggregate fields mirror them and are
//! maintained by rollup jobs and incremental child updates.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An organization owning courses and associated with teachers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Academy {
    pub id: String,
    pub eng_name: String,
    pub fa_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Average review rating, recomputed by the academy-ratings rollup.
    #[serde(default)]
    pub rating: f64,
    /// Number of reviews backing `rating`.
    #[serde(default)]
    pub rating_number: u64,
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub total_teachers: u64,
    #[serde(default)]
    pub total_courses: u64,
    /// Owned course ids. Canonical; `total_courses` caches its cardinality.
    #[serde(default)]
    pub courses: Vec<String>,
    /// Member teacher ids.
    #[serde(default)]
    pub teachers: Vec<String>,
}

impl Academy {
    pub fn new(id: impl Into<String>, eng_name: impl Into<String>, fa_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            eng_name: eng_name.into(),
            fa_name: fa_name.into(),
            description: String::new(),
            avatar: None,
            rating: 0.0,
            rating_number: 0,
            total_students: 0,
            total_teachers: 0,
            total_courses: 0,
            courses: Vec::new(),
            teachers: Vec::new(),
        }
    }
}

/// An instructor associated with one or more academies.
///
/// Academy membership is a shared-array many-to-many: the teacher lists its
/// academies and each academy lists its teachers. There is no join table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub eng_name: String,
    pub fa_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_number: u64,
    /// Students enrolled with this teacher across all courses.
    #[serde(default)]
    pub students: u64,
    #[serde(default)]
    pub total_courses: u64,
    /// Academy ids this teacher belongs to.
    #[serde(default)]
    pub academies: Vec<String>,
    /// Owned course ids.
    #[serde(default)]
    pub courses: Vec<String>,
}

impl Teacher {
    pub fn new(id: impl Into<String>, eng_name: impl Into<String>, fa_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            eng_name: eng_name.into(),
            fa_name: fa_name.into(),
            description: String::new(),
            avatar: None,
            rating: 0.0,
            rating_number: 0,
            students: 0,
            total_courses: 0,
            academies: Vec::new(),
            courses: Vec::new(),
        }
    }
}

/// Publication status of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Ongoing,
    Finished,
}

impl Default for CourseStatus {
    fn default() -> Self {
        Self::Ongoing
    }
}

/// The sellable catalog unit. Belongs to exactly one academy and one teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover: Option<String>,
    /// Owning academy id.
    pub academy: String,
    /// Owning teacher id.
    pub teacher: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Price in the smallest currency unit. Zero means free.
    #[serde(default)]
    pub price: u64,
    /// Discounted price; zero means no discount is active.
    #[serde(default)]
    pub discount: u64,
    #[serde(default)]
    pub status: CourseStatus,
    /// Listing inclusion gate. Hidden courses never appear in catalog pages.
    #[serde(default = "default_show_course")]
    pub show_course: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub release_date: OffsetDateTime,
    /// Completed purchases.
    #[serde(default)]
    pub purchased: u64,
    /// Enrolled students.
    #[serde(default)]
    pub students: u64,
    /// Average review rating, recomputed by the course-ratings rollup.
    #[serde(default)]
    pub ratings: f64,
    /// Number of reviews backing `ratings`.
    #[serde(default)]
    pub ratings_number: u64,
    #[serde(default)]
    pub total_sections: u64,
    #[serde(default)]
    pub total_lessons: u64,
    /// Total length in seconds, summed bottom-up from lessons.
    #[serde(default)]
    pub course_length: u64,
}

fn default_show_course() -> bool {
    true
}

impl Course {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        academy: impl Into<String>,
        teacher: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            cover: None,
            academy: academy.into(),
            teacher: teacher.into(),
            categories: Vec::new(),
            tags: Vec::new(),
            price: 0,
            discount: 0,
            status: CourseStatus::default(),
            show_course: true,
            release_date: OffsetDateTime::UNIX_EPOCH,
            purchased: 0,
            students: 0,
            ratings: 0.0,
            ratings_number: 0,
            total_sections: 0,
            total_lessons: 0,
            course_length: 0,
        }
    }

    /// Whether this course is free of charge.
    pub fn is_free(&self) -> bool {
        self.price == 0
    }

    /// Whether a discount is currently active.
    pub fn is_discounted(&self) -> bool {
        self.discount > 0
    }
}

/// A course topic used for search filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// An ordered chapter of a course.
///
/// `order` is the explicit position; array position in query results carries
/// no meaning. `total_lessons`/`total_length` are rollups over live lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub course: String,
    pub name: String,
    pub order: u32,
    #[serde(default)]
    pub total_lessons: u64,
    #[serde(default)]
    pub total_length: u64,
}

/// An ordered lesson within a section.
///
/// The owning course id is denormalized so course-level rollups do not need
/// to walk through sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub section: String,
    pub course: String,
    pub name: String,
    pub order: u32,
    /// Length in seconds.
    #[serde(default)]
    pub lesson_length: u64,
}

/// A user review of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub course: String,
    pub user: String,
    /// Score in 1..=5.
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
