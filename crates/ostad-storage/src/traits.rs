//! Storage traits for the catalog data-store abstraction layer.
//!
//! This module defines the contract every data-store backend must implement.

use async_trait::async_trait;

use ostad_core::{Academy, Category, Course, Lesson, Review, Section, Teacher};

use crate::error::StorageError;

/// The main data-store trait for catalog entities.
///
/// The store holds normalized documents; all denormalization (joins, counts,
/// sums) happens above this seam in the aggregation layer. Implementations
/// must be thread-safe (`Send + Sync`).
///
/// Listing methods never fail on empty results; an error means an
/// infrastructure problem. The narrow `set_*` methods update only the named
/// rollup fields so concurrent edits of unrelated fields are never clobbered.
///
/// # Example
///
/// ```ignore
/// use ostad_storage::{CatalogStore, StorageError};
///
/// async fn academy_or_404(store: &dyn CatalogStore, name: &str) -> Result<Academy, StorageError> {
///     store
///         .academy_by_eng_name(name)
///         .await?
///         .ok_or_else(|| StorageError::not_found("academy", name))
/// }
/// ```
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // ==================== Academies ====================

    /// Lists all academies.
    async fn academies(&self) -> Result<Vec<Academy>, StorageError>;

    /// Reads an academy by id. Returns `None` when absent.
    async fn academy(&self, id: &str) -> Result<Option<Academy>, StorageError>;

    /// Reads an academy by its English name, the natural key used in URLs
    /// and cache keys.
    async fn academy_by_eng_name(&self, eng_name: &str) -> Result<Option<Academy>, StorageError>;

    /// Creates a new academy.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` on id collision.
    async fn insert_academy(&self, academy: &Academy) -> Result<(), StorageError>;

    /// Replaces an existing academy document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the academy does not exist.
    async fn update_academy(&self, academy: &Academy) -> Result<(), StorageError>;

    /// Removes an academy document. Referencing arrays on other entities are
    /// the caller's responsibility (soft cascade lives above this seam).
    async fn delete_academy(&self, id: &str) -> Result<(), StorageError>;

    /// Updates only the review-derived rating fields.
    async fn set_academy_ratings(
        &self,
        id: &str,
        rating: f64,
        rating_number: u64,
    ) -> Result<(), StorageError>;

    // ==================== Teachers ====================

    /// Lists all teachers.
    async fn teachers(&self) -> Result<Vec<Teacher>, StorageError>;

    /// Reads a teacher by id. Returns `None` when absent.
    async fn teacher(&self, id: &str) -> Result<Option<Teacher>, StorageError>;

    /// Reads a teacher by its English name.
    async fn teacher_by_eng_name(&self, eng_name: &str) -> Result<Option<Teacher>, StorageError>;

    /// Creates a new teacher.
    async fn insert_teacher(&self, teacher: &Teacher) -> Result<(), StorageError>;

    /// Replaces an existing teacher document.
    async fn update_teacher(&self, teacher: &Teacher) -> Result<(), StorageError>;

    /// Removes a teacher document (no cascade, see `delete_academy`).
    async fn delete_teacher(&self, id: &str) -> Result<(), StorageError>;

    /// Updates only the review-derived rating fields.
    async fn set_teacher_ratings(
        &self,
        id: &str,
        rating: f64,
        rating_number: u64,
    ) -> Result<(), StorageError>;

    // ==================== Courses ====================

    /// Lists all courses, visible or not.
    async fn courses(&self) -> Result<Vec<Course>, StorageError>;

    /// Reads a course by id. Returns `None` when absent.
    async fn course(&self, id: &str) -> Result<Option<Course>, StorageError>;

    /// Lists courses owned by an academy.
    async fn courses_by_academy(&self, academy_id: &str) -> Result<Vec<Course>, StorageError>;

    /// Lists courses owned by a teacher.
    async fn courses_by_teacher(&self, teacher_id: &str) -> Result<Vec<Course>, StorageError>;

    /// Creates a new course.
    async fn insert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Replaces an existing course document.
    async fn update_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Updates only the review-derived rating fields.
    async fn set_course_ratings(
        &self,
        id: &str,
        ratings: f64,
        ratings_number: u64,
    ) -> Result<(), StorageError>;

    /// Updates only the section/lesson structure rollups.
    async fn set_course_structure(
        &self,
        id: &str,
        total_sections: u64,
        total_lessons: u64,
        course_length: u64,
    ) -> Result<(), StorageError>;

    // ==================== Categories ====================

    /// Lists all categories.
    async fn categories(&self) -> Result<Vec<Category>, StorageError>;

    /// Creates a new category.
    async fn insert_category(&self, category: &Category) -> Result<(), StorageError>;

    // ==================== Sections & lessons ====================

    /// Lists the sections of a course, sorted by their `order` field.
    async fn sections_by_course(&self, course_id: &str) -> Result<Vec<Section>, StorageError>;

    /// Reads a section by id.
    async fn section(&self, id: &str) -> Result<Option<Section>, StorageError>;

    /// Creates a new section.
    async fn insert_section(&self, section: &Section) -> Result<(), StorageError>;

    /// Replaces an existing section document.
    async fn update_section(&self, section: &Section) -> Result<(), StorageError>;

    /// Updates only the lesson-derived rollup fields.
    async fn set_section_rollups(
        &self,
        id: &str,
        total_lessons: u64,
        total_length: u64,
    ) -> Result<(), StorageError>;

    /// Lists the lessons of a section, sorted by their `order` field.
    async fn lessons_by_section(&self, section_id: &str) -> Result<Vec<Lesson>, StorageError>;

    /// Reads a lesson by id.
    async fn lesson(&self, id: &str) -> Result<Option<Lesson>, StorageError>;

    /// Creates a new lesson.
    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Replaces an existing lesson document.
    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    // ==================== Reviews ====================

    /// Lists the reviews left on a course.
    async fn reviews_by_course(&self, course_id: &str) -> Result<Vec<Review>, StorageError>;

    /// Creates a new review.
    async fn insert_review(&self, review: &Review) -> Result<(), StorageError>;

    // ==================== Metadata ====================

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

// Ensure the trait stays object-safe
#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that CatalogStore is object-safe
    fn _assert_store_object_safe(_: &dyn CatalogStore) {}
}
