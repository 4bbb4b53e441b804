//! Full-table rollup recompute jobs.
//!
//! Each job walks one collection and rewrites its derived fields from the
//! current children, so the jobs are idempotent and safe to rerun at any
//! time. They run synchronously inside the admin request that triggers them.
//! There is no partial-failure recovery: the first persistence error aborts
//! the job and already-updated rows keep their new values.

use ostad_core::Review;
use ostad_storage::{CatalogStore, StorageError};

/// Average rating and review count; `(0.0, 0)` when there are no reviews.
fn summarize(reviews: &[Review]) -> (f64, u64) {
    if reviews.is_empty() {
        return (0.0, 0);
    }
    let total: u64 = reviews.iter().map(|review| u64::from(review.rating)).sum();
    (total as f64 / reviews.len() as f64, reviews.len() as u64)
}

/// Recompute every course's `ratings`/`ratingsNumber` from its reviews.
/// Returns the number of courses updated.
pub async fn recompute_course_ratings(store: &dyn CatalogStore) -> Result<u64, StorageError> {
    let courses = store.courses().await?;
    let mut updated = 0;
    for course in &courses {
        let reviews = store.reviews_by_course(&course.id).await?;
        let (rating, count) = summarize(&reviews);
        store.set_course_ratings(&course.id, rating, count).await?;
        updated += 1;
    }
    tracing::info!(updated, "Course ratings rollup finished");
    Ok(updated)
}

/// Recompute every academy's rating from the reviews of its courses.
pub async fn recompute_academy_ratings(store: &dyn CatalogStore) -> Result<u64, StorageError> {
    let academies = store.academies().await?;
    let mut updated = 0;
    for academy in &academies {
        let mut reviews = Vec::new();
        for course in store.courses_by_academy(&academy.id).await? {
            reviews.extend(store.reviews_by_course(&course.id).await?);
        }
        let (rating, count) = summarize(&reviews);
        store.set_academy_ratings(&academy.id, rating, count).await?;
        updated += 1;
    }
    tracing::info!(updated, "Academy ratings rollup finished");
    Ok(updated)
}

/// Recompute every teacher's rating from the reviews of its courses.
pub async fn recompute_teacher_ratings(store: &dyn CatalogStore) -> Result<u64, StorageError> {
    let teachers = store.teachers().await?;
    let mut updated = 0;
    for teacher in &teachers {
        let mut reviews = Vec::new();
        for course in store.courses_by_teacher(&teacher.id).await? {
            reviews.extend(store.reviews_by_course(&course.id).await?);
        }
        let (rating, count) = summarize(&reviews);
        store.set_teacher_ratings(&teacher.id, rating, count).await?;
        updated += 1;
    }
    tracing::info!(updated, "Teacher ratings rollup finished");
    Ok(updated)
}

/// Recompute every section's and course's structure rollups bottom-up:
/// section lesson counts and lengths first, then the course totals.
pub async fn recompute_course_structure(store: &dyn CatalogStore) -> Result<u64, StorageError> {
    let courses = store.courses().await?;
    let mut updated = 0;
    for course in &courses {
        let sections = store.sections_by_course(&course.id).await?;
        let mut total_lessons = 0u64;
        let mut course_length = 0u64;
        for section in &sections {
            let lessons = store.lessons_by_section(&section.id).await?;
            let section_length: u64 = lessons.iter().map(|lesson| lesson.lesson_length).sum();
            store
                .set_section_rollups(&section.id, lessons.len() as u64, section_length)
                .await?;
            total_lessons += lessons.len() as u64;
            course_length += section_length;
        }
        store
            .set_course_structure(&course.id, sections.len() as u64, total_lessons, course_length)
            .await?;
        updated += 1;
    }
    tracing::info!(updated, "Course structure rollup finished");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostad_core::{Academy, Course, Lesson, Review, Section, Teacher};
    use ostad_db_memory::InMemoryCatalog;
    use time::OffsetDateTime;

    fn review(id: &str, course: &str, rating: u8) -> Review {
        Review {
            id: id.into(),
            course: course.into(),
            user: "u1".into(),
            rating,
            comment: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    async fn seeded() -> InMemoryCatalog {
        let store = InMemoryCatalog::new();
        store
            .insert_academy(&Academy::new("a1", "rahnema", "رهنما"))
            .await
            .unwrap();
        let mut teacher = Teacher::new("t1", "ali", "علی");
        teacher.academies = vec!["a1".into()];
        store.insert_teacher(&teacher).await.unwrap();

        let mut reviewed = Course::new("c1", "reviewed", "a1", "t1");
        // Stale value that the rollup must overwrite.
        reviewed.ratings = 1.0;
        reviewed.ratings_number = 99;
        store.insert_course(&reviewed).await.unwrap();
        store.insert_course(&Course::new("c2", "bare", "a1", "t1")).await.unwrap();

        store.insert_review(&review("r1", "c1", 5)).await.unwrap();
        store.insert_review(&review("r2", "c1", 4)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn course_ratings_average_and_reset() {
        let store = seeded().await;
        let updated = recompute_course_ratings(&store).await.unwrap();
        assert_eq!(updated, 2);

        let reviewed = store.course("c1").await.unwrap().unwrap();
        assert_eq!(reviewed.ratings, 4.5);
        assert_eq!(reviewed.ratings_number, 2);

        // No reviews means zero, not NaN and not the stale value.
        let bare = store.course("c2").await.unwrap().unwrap();
        assert_eq!(bare.ratings, 0.0);
        assert_eq!(bare.ratings_number, 0);
    }

    #[tokio::test]
    async fn academy_and_teacher_ratings_span_courses() {
        let store = seeded().await;
        store.insert_review(&review("r3", "c2", 3)).await.unwrap();

        recompute_academy_ratings(&store).await.unwrap();
        recompute_teacher_ratings(&store).await.unwrap();

        let academy = store.academy("a1").await.unwrap().unwrap();
        assert_eq!(academy.rating, 4.0);
        assert_eq!(academy.rating_number, 3);

        let teacher = store.teacher("t1").await.unwrap().unwrap();
        assert_eq!(teacher.rating, 4.0);
        assert_eq!(teacher.rating_number, 3);
    }

    #[tokio::test]
    async fn structure_rollup_counts_bottom_up() {
        let store = seeded().await;
        store
            .insert_section(&Section {
                id: "s1".into(),
                course: "c1".into(),
                name: "basics".into(),
                order: 1,
                total_lessons: 0,
                total_length: 0,
            })
            .await
            .unwrap();
        for (id, length) in [("l1", 60u64), ("l2", 120)] {
            store
                .insert_lesson(&Lesson {
                    id: id.into(),
                    section: "s1".into(),
                    course: "c1".into(),
                    name: id.into(),
                    order: 1,
                    lesson_length: length,
                })
                .await
                .unwrap();
        }

        recompute_course_structure(&store).await.unwrap();

        let section = store.section("s1").await.unwrap().unwrap();
        assert_eq!(section.total_lessons, 2);
        assert_eq!(section.total_length, 180);

        let course = store.course("c1").await.unwrap().unwrap();
        assert_eq!(course.total_sections, 1);
        assert_eq!(course.total_lessons, 2);
        assert_eq!(course.course_length, 180);
    }
}
