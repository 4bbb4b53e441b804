use papaya::HashMap as PapayaHashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ostad_core::{Academy, Category, Collection, Course, Lesson, Review, Section, Teacher};
use ostad_storage::{CatalogStore, StorageError};

/// In-memory catalog store backed by papaya lock-free maps.
///
/// One map per collection, keyed by entity id. Every read clones the
/// document out of the map, so callers never observe partial writes. This
/// backend is the default for tests and single-node deployments; a document
/// database backend implements the same [`CatalogStore`] seam.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    academies: Arc<PapayaHashMap<String, Academy>>,
    teachers: Arc<PapayaHashMap<String, Teacher>>,
    courses: Arc<PapayaHashMap<String, Course>>,
    categories: Arc<PapayaHashMap<String, Category>>,
    sections: Arc<PapayaHashMap<String, Section>>,
    lessons: Arc<PapayaHashMap<String, Lesson>>,
    reviews: Arc<PapayaHashMap<String, Review>>,
}

impl InMemoryCatalog {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_unique<T: Clone>(
        map: &PapayaHashMap<String, T>,
        collection: &str,
        id: &str,
        doc: T,
    ) -> Result<(), StorageError> {
        let guard = map.pin();
        if guard.get(id).is_some() {
            return Err(StorageError::already_exists(collection, id));
        }
        guard.insert(id.to_string(), doc);
        Ok(())
    }

    fn replace_existing<T: Clone>(
        map: &PapayaHashMap<String, T>,
        collection: &str,
        id: &str,
        doc: T,
    ) -> Result<(), StorageError> {
        let guard = map.pin();
        if guard.get(id).is_none() {
            return Err(StorageError::not_found(collection, id));
        }
        guard.insert(id.to_string(), doc);
        Ok(())
    }

    fn mutate<T: Clone>(
        map: &PapayaHashMap<String, T>,
        collection: &str,
        id: &str,
        apply: impl FnOnce(&mut T),
    ) -> Result<(), StorageError> {
        let guard = map.pin();
        let mut doc = guard
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(collection, id))?;
        apply(&mut doc);
        guard.insert(id.to_string(), doc);
        Ok(())
    }

    fn all<T: Clone>(map: &PapayaHashMap<String, T>) -> Vec<T> {
        let guard = map.pin();
        guard.values().cloned().collect()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn academies(&self) -> Result<Vec<Academy>, StorageError> {
        Ok(Self::all(&self.academies))
    }

    async fn academy(&self, id: &str) -> Result<Option<Academy>, StorageError> {
        Ok(self.academies.pin().get(id).cloned())
    }

    async fn academy_by_eng_name(&self, eng_name: &str) -> Result<Option<Academy>, StorageError> {
        let guard = self.academies.pin();
        Ok(guard.values().find(|a| a.eng_name == eng_name).cloned())
    }

    async fn insert_academy(&self, academy: &Academy) -> Result<(), StorageError> {
        Self::insert_unique(&self.academies, Collection::Academy.as_str(), &academy.id, academy.clone())
    }

    async fn update_academy(&self, academy: &Academy) -> Result<(), StorageError> {
        Self::replace_existing(&self.academies, Collection::Academy.as_str(), &academy.id, academy.clone())
    }

    async fn delete_academy(&self, id: &str) -> Result<(), StorageError> {
        self.academies.pin().remove(id);
        Ok(())
    }

    async fn set_academy_ratings(
        &self,
        id: &str,
        rating: f64,
        rating_number: u64,
    ) -> Result<(), StorageError> {
        Self::mutate(&self.academies, Collection::Academy.as_str(), id, |a| {
            a.rating = rating;
            a.rating_number = rating_number;
        })
    }

    async fn teachers(&self) -> Result<Vec<Teacher>, StorageError> {
        Ok(Self::all(&self.teachers))
    }

    async fn teacher(&self, id: &str) -> Result<Option<Teacher>, StorageError> {
        Ok(self.teachers.pin().get(id).cloned())
    }

    async fn teacher_by_eng_name(&self, eng_name: &str) -> Result<Option<Teacher>, StorageError> {
        let guard = self.teachers.pin();
        Ok(guard.values().find(|t| t.eng_name == eng_name).cloned())
    }

    async fn insert_teacher(&self, teacher: &Teacher) -> Result<(), StorageError> {
        Self::insert_unique(&self.teachers, Collection::Teacher.as_str(), &teacher.id, teacher.clone())
    }

    async fn update_teacher(&self, teacher: &Teacher) -> Result<(), StorageError> {
        Self::replace_existing(&self.teachers, Collection::Teacher.as_str(), &teacher.id, teacher.clone())
    }

    async fn delete_teacher(&self, id: &str) -> Result<(), StorageError> {
        self.teachers.pin().remove(id);
        Ok(())
    }

    async fn set_teacher_ratings(
        &self,
        id: &str,
        rating: f64,
        rating_number: u64,
    ) -> Result<(), StorageError> {
        Self::mutate(&self.teachers, Collection::Teacher.as_str(), id, |t| {
            t.rating = rating;
            t.rating_number = rating_number;
        })
    }

    async fn courses(&self) -> Result<Vec<Course>, StorageError> {
        Ok(Self::all(&self.courses))
    }

    async fn course(&self, id: &str) -> Result<Option<Course>, StorageError> {
        Ok(self.courses.pin().get(id).cloned())
    }

    async fn courses_by_academy(&self, academy_id: &str) -> Result<Vec<Course>, StorageError> {
        let guard = self.courses.pin();
        Ok(guard
            .values()
            .filter(|c| c.academy == academy_id)
            .cloned()
            .collect())
    }

    async fn courses_by_teacher(&self, teacher_id: &str) -> Result<Vec<Course>, StorageError> {
        let guard = self.courses.pin();
        Ok(guard
            .values()
            .filter(|c| c.teacher == teacher_id)
            .cloned()
            .collect())
    }

    async fn insert_course(&self, course: &Course) -> Result<(), StorageError> {
        Self::insert_unique(&self.courses, Collection::Course.as_str(), &course.id, course.clone())
    }

    async fn update_course(&self, course: &Course) -> Result<(), StorageError> {
        Self::replace_existing(&self.courses, Collection::Course.as_str(), &course.id, course.clone())
    }

    async fn set_course_ratings(
        &self,
        id: &str,
        ratings: f64,
        ratings_number: u64,
    ) -> Result<(), StorageError> {
        Self::mutate(&self.courses, Collection::Course.as_str(), id, |c| {
            c.ratings = ratings;
            c.ratings_number = ratings_number;
        })
    }

    async fn set_course_structure(
        &self,
        id: &str,
        total_sections: u64,
        total_lessons: u64,
        course_length: u64,
    ) -> Result<(), StorageError> {
        Self::mutate(&self.courses, Collection::Course.as_str(), id, |c| {
            c.total_sections = total_sections;
            c.total_lessons = total_lessons;
            c.course_length = course_length;
        })
    }

    async fn categories(&self) -> Result<Vec<Category>, StorageError> {
        Ok(Self::all(&self.categories))
    }

    async fn insert_category(&self, category: &Category) -> Result<(), StorageError> {
        Self::insert_unique(&self.categories, Collection::Category.as_str(), &category.id, category.clone())
    }

    async fn sections_by_course(&self, course_id: &str) -> Result<Vec<Section>, StorageError> {
        let guard = self.sections.pin();
        let mut sections: Vec<Section> = guard
            .values()
            .filter(|s| s.course == course_id)
            .cloned()
            .collect();
        // Explicit order field, not insertion order
        sections.sort_by_key(|s| s.order);
        Ok(sections)
    }

    async fn section(&self, id: &str) -> Result<Option<Section>, StorageError> {
        Ok(self.sections.pin().get(id).cloned())
    }

    async fn insert_section(&self, section: &Section) -> Result<(), StorageError> {
        Self::insert_unique(&self.sections, Collection::Section.as_str(), &section.id, section.clone())
    }

    async fn update_section(&self, section: &Section) -> Result<(), StorageError> {
        Self::replace_existing(&self.sections, Collection::Section.as_str(), &section.id, section.clone())
    }

    async fn set_section_rollups(
        &self,
        id: &str,
        total_lessons: u64,
        total_length: u64,
    ) -> Result<(), StorageError> {
        Self::mutate(&self.sections, Collection::Section.as_str(), id, |s| {
            s.total_lessons = total_lessons;
            s.total_length = total_length;
        })
    }

    async fn lessons_by_section(&self, section_id: &str) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lessons.pin();
        let mut lessons: Vec<Lesson> = guard
            .values()
            .filter(|l| l.section == section_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.order);
        Ok(lessons)
    }

    async fn lesson(&self, id: &str) -> Result<Option<Lesson>, StorageError> {
        Ok(self.lessons.pin().get(id).cloned())
    }

    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        Self::insert_unique(&self.lessons, Collection::Lesson.as_str(), &lesson.id, lesson.clone())
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        Self::replace_existing(&self.lessons, Collection::Lesson.as_str(), &lesson.id, lesson.clone())
    }

    async fn reviews_by_course(&self, course_id: &str) -> Result<Vec<Review>, StorageError> {
        let guard = self.reviews.pin();
        Ok(guard
            .values()
            .filter(|r| r.course == course_id)
            .cloned()
            .collect())
    }

    async fn insert_review(&self, review: &Review) -> Result<(), StorageError> {
        Self::insert_unique(&self.reviews, Collection::Review.as_str(), &review.id, review.clone())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryCatalog {
        InMemoryCatalog::new()
    }

    #[tokio::test]
    async fn insert_and_read_academy() {
        let store = store();
        let academy = Academy::new("a1", "rust-academy", "آکادمی راست");
        store.insert_academy(&academy).await.unwrap();

        let found = store.academy("a1").await.unwrap().unwrap();
        assert_eq!(found, academy);

        let by_name = store
            .academy_by_eng_name("rust-academy")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, "a1");
        assert!(store.academy_by_eng_name("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = store();
        let academy = Academy::new("a1", "x", "y");
        store.insert_academy(&academy).await.unwrap();
        let err = store.insert_academy(&academy).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn update_missing_entity_is_not_found() {
        let store = store();
        let teacher = Teacher::new("t1", "x", "y");
        let err = store.update_teacher(&teacher).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn sections_come_back_in_order() {
        let store = store();
        for (id, order) in [("s3", 3), ("s1", 1), ("s2", 2)] {
            store
                .insert_section(&Section {
                    id: id.into(),
                    course: "c1".into(),
                    name: format!("section {order}"),
                    order,
                    total_lessons: 0,
                    total_length: 0,
                })
                .await
                .unwrap();
        }

        let sections = store.sections_by_course("c1").await.unwrap();
        let orders: Vec<u32> = sections.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn set_course_ratings_touches_only_rating_fields() {
        let store = store();
        let mut course = Course::new("c1", "Rust", "a1", "t1");
        course.purchased = 7;
        store.insert_course(&course).await.unwrap();

        store.set_course_ratings("c1", 4.5, 10).await.unwrap();

        let updated = store.course("c1").await.unwrap().unwrap();
        assert_eq!(updated.ratings, 4.5);
        assert_eq!(updated.ratings_number, 10);
        assert_eq!(updated.purchased, 7);
    }

    #[tokio::test]
    async fn courses_by_owner_filters() {
        let store = store();
        store
            .insert_course(&Course::new("c1", "a", "a1", "t1"))
            .await
            .unwrap();
        store
            .insert_course(&Course::new("c2", "b", "a1", "t2"))
            .await
            .unwrap();
        store
            .insert_course(&Course::new("c3", "c", "a2", "t1"))
            .await
            .unwrap();

        assert_eq!(store.courses_by_academy("a1").await.unwrap().len(), 2);
        assert_eq!(store.courses_by_teacher("t1").await.unwrap().len(), 2);
        assert_eq!(store.courses().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_teacher_removes_only_that_document() {
        let store = store();
        store
            .insert_teacher(&Teacher::new("t1", "x", "y"))
            .await
            .unwrap();
        store
            .insert_course(&Course::new("c1", "a", "a1", "t1"))
            .await
            .unwrap();

        store.delete_teacher("t1").await.unwrap();
        assert!(store.teacher("t1").await.unwrap().is_none());
        // Authored courses are untouched
        assert!(store.course("c1").await.unwrap().is_some());
    }
}
