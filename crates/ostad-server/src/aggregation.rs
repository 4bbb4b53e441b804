//! Denormalized listing builders.
//!
//! Every listing the catalog serves is computed here by joining full
//! collection scans above the storage seam. The joins are left joins: an
//! academy with no teachers or courses still appears, with zero counts.
//! Handlers cache the results, so the scan cost is paid once per TTL window.
//!
//! Projections are typed allow-lists. A field reaches the client only by
//! being declared on one of the structs below; internal ownership arrays and
//! ids never leak into listings by accident.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use ostad_core::{Academy, Course, Lesson, Section, Teacher};
use ostad_search::{CourseRecord, NameId};
use ostad_storage::{CatalogStore, StorageError};

/// Courses shown in a "top courses" sublist.
pub const TOP_COURSES_LIMIT: usize = 8;
/// Teachers shown in a "top teachers" sublist.
pub const TOP_TEACHERS_LIMIT: usize = 6;

/// One academy row in a listing.
///
/// `total_teachers` counts the teachers whose membership array references the
/// academy, `total_students` sums those teachers' student counts, and
/// `total_courses` counts every owned course, hidden ones included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademyListing {
    pub eng_name: String,
    pub fa_name: String,
    pub avatar: Option<String>,
    pub rating: f64,
    pub rating_number: u64,
    pub total_students: u64,
    pub total_teachers: u64,
    pub total_courses: u64,
}

/// The single-academy page payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademyDetail {
    pub id: String,
    pub eng_name: String,
    pub fa_name: String,
    pub description: String,
    pub avatar: Option<String>,
    pub rating: f64,
    pub rating_number: u64,
    pub total_students: u64,
    pub total_teachers: u64,
    pub total_courses: u64,
}

/// One teacher row in a listing. `total_students` sums the students of the
/// teacher's courses; `total_courses` counts them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherListing {
    pub eng_name: String,
    pub fa_name: String,
    pub avatar: Option<String>,
    pub rating: f64,
    pub rating_number: u64,
    pub total_students: u64,
    pub total_courses: u64,
}

/// The single-teacher page payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDetail {
    pub id: String,
    pub eng_name: String,
    pub fa_name: String,
    pub description: String,
    pub avatar: Option<String>,
    pub rating: f64,
    pub rating_number: u64,
    pub total_students: u64,
    pub total_courses: u64,
}

/// One course card in a "top courses" sublist, pre-joined with the owner
/// display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCard {
    pub id: String,
    pub name: String,
    pub cover: Option<String>,
    pub price: u64,
    pub discount: u64,
    pub ratings: f64,
    pub ratings_number: u64,
    pub purchased: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub release_date: OffsetDateTime,
    pub academy_name: String,
    pub teacher_name: String,
    pub course_length: u64,
    pub total_lessons: u64,
}

/// A minimal course entry for the home-page quick search box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSearchEntry {
    pub id: String,
    pub name: String,
    pub cover: Option<String>,
    pub tags: Vec<String>,
    pub academy_name: String,
    pub teacher_name: String,
}

/// A section with its lessons inlined, both in `order` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionWithLessons {
    #[serde(flatten)]
    pub section: Section,
    pub lessons: Vec<Lesson>,
}

/// Builds denormalized listings over a [`CatalogStore`].
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn CatalogStore>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    // ==================== Academies ====================

    /// All academies, sorted by total students, then teachers, then courses,
    /// all descending.
    pub async fn academy_listings(&self) -> Result<Vec<AcademyListing>, StorageError> {
        let academies = self.store.academies().await?;
        let teachers = self.store.teachers().await?;
        let courses = self.store.courses().await?;

        let mut listings: Vec<AcademyListing> = academies
            .iter()
            .map(|academy| {
                let (total_teachers, total_students, total_courses) =
                    academy_counts(academy, &teachers, &courses);
                AcademyListing {
                    eng_name: academy.eng_name.clone(),
                    fa_name: academy.fa_name.clone(),
                    avatar: academy.avatar.clone(),
                    rating: academy.rating,
                    rating_number: academy.rating_number,
                    total_students,
                    total_teachers,
                    total_courses,
                }
            })
            .collect();

        listings.sort_by(|a, b| {
            b.total_students
                .cmp(&a.total_students)
                .then(b.total_teachers.cmp(&a.total_teachers))
                .then(b.total_courses.cmp(&a.total_courses))
        });
        Ok(listings)
    }

    /// One academy by its English name, with joined counts. `None` when the
    /// academy does not exist.
    pub async fn academy_detail(
        &self,
        eng_name: &str,
    ) -> Result<Option<AcademyDetail>, StorageError> {
        let Some(academy) = self.store.academy_by_eng_name(eng_name).await? else {
            return Ok(None);
        };
        let teachers = self.store.teachers().await?;
        let courses = self.store.courses_by_academy(&academy.id).await?;
        let (total_teachers, total_students, total_courses) =
            academy_counts(&academy, &teachers, &courses);

        Ok(Some(AcademyDetail {
            id: academy.id,
            eng_name: academy.eng_name,
            fa_name: academy.fa_name,
            description: academy.description,
            avatar: academy.avatar,
            rating: academy.rating,
            rating_number: academy.rating_number,
            total_students,
            total_teachers,
            total_courses,
        }))
    }

    /// The academy's most purchased visible courses.
    pub async fn academy_top_courses(
        &self,
        eng_name: &str,
    ) -> Result<Option<Vec<CourseCard>>, StorageError> {
        let Some(academy) = self.store.academy_by_eng_name(eng_name).await? else {
            return Ok(None);
        };
        let courses = self.store.courses_by_academy(&academy.id).await?;
        let teacher_names = self.teacher_name_map().await?;
        let academy_names = HashMap::from([(academy.id.clone(), academy.fa_name.clone())]);
        Ok(Some(top_cards(courses, &academy_names, &teacher_names)))
    }

    /// The academy's member teachers with the most students.
    pub async fn academy_top_teachers(
        &self,
        eng_name: &str,
    ) -> Result<Option<Vec<TeacherListing>>, StorageError> {
        let Some(academy) = self.store.academy_by_eng_name(eng_name).await? else {
            return Ok(None);
        };
        let teachers = self.store.teachers().await?;
        let courses = self.store.courses().await?;

        let mut listings: Vec<TeacherListing> = teachers
            .iter()
            .filter(|teacher| teacher.academies.contains(&academy.id))
            .map(|teacher| teacher_listing(teacher, &courses))
            .collect();
        listings.sort_by(|a, b| {
            b.total_students
                .cmp(&a.total_students)
                .then(b.rating.total_cmp(&a.rating))
        });
        listings.truncate(TOP_TEACHERS_LIMIT);
        Ok(Some(listings))
    }

    // ==================== Teachers ====================

    /// All teachers, sorted by total students then rating, descending.
    pub async fn teacher_listings(&self) -> Result<Vec<TeacherListing>, StorageError> {
        let teachers = self.store.teachers().await?;
        let courses = self.store.courses().await?;

        let mut listings: Vec<TeacherListing> = teachers
            .iter()
            .map(|teacher| teacher_listing(teacher, &courses))
            .collect();
        listings.sort_by(|a, b| {
            b.total_students
                .cmp(&a.total_students)
                .then(b.rating.total_cmp(&a.rating))
        });
        Ok(listings)
    }

    /// One teacher by its English name, with joined counts.
    pub async fn teacher_detail(
        &self,
        eng_name: &str,
    ) -> Result<Option<TeacherDetail>, StorageError> {
        let Some(teacher) = self.store.teacher_by_eng_name(eng_name).await? else {
            return Ok(None);
        };
        let courses = self.store.courses_by_teacher(&teacher.id).await?;
        let listing = teacher_listing(&teacher, &courses);

        Ok(Some(TeacherDetail {
            id: teacher.id,
            eng_name: teacher.eng_name,
            fa_name: teacher.fa_name,
            description: teacher.description,
            avatar: teacher.avatar,
            rating: teacher.rating,
            rating_number: teacher.rating_number,
            total_students: listing.total_students,
            total_courses: listing.total_courses,
        }))
    }

    /// The academies a teacher belongs to, as listing rows.
    pub async fn teacher_academies(
        &self,
        eng_name: &str,
    ) -> Result<Option<Vec<AcademyListing>>, StorageError> {
        let Some(teacher) = self.store.teacher_by_eng_name(eng_name).await? else {
            return Ok(None);
        };
        let listings = self.academy_listings().await?;
        let academies = self.store.academies().await?;
        let member_names: Vec<&str> = academies
            .iter()
            .filter(|academy| teacher.academies.contains(&academy.id))
            .map(|academy| academy.eng_name.as_str())
            .collect();

        // Reuse the sorted global listing so membership pages keep the same
        // order as the academies page.
        Ok(Some(
            listings
                .into_iter()
                .filter(|listing| member_names.contains(&listing.eng_name.as_str()))
                .collect(),
        ))
    }

    /// The teacher's most purchased visible courses.
    pub async fn teacher_top_courses(
        &self,
        eng_name: &str,
    ) -> Result<Option<Vec<CourseCard>>, StorageError> {
        let Some(teacher) = self.store.teacher_by_eng_name(eng_name).await? else {
            return Ok(None);
        };
        let courses = self.store.courses_by_teacher(&teacher.id).await?;
        let academy_names = self.academy_name_map().await?;
        let teacher_names = HashMap::from([(teacher.id.clone(), teacher.fa_name.clone())]);
        Ok(Some(top_cards(courses, &academy_names, &teacher_names)))
    }

    // ==================== Courses ====================

    /// The visible-course snapshot the search engine runs on, pre-joined with
    /// owner display names and sorted newest first.
    pub async fn course_snapshot(&self) -> Result<Vec<CourseRecord>, StorageError> {
        let courses = self.store.courses().await?;
        let academy_names = self.academy_name_map().await?;
        let teacher_names = self.teacher_name_map().await?;

        let mut records: Vec<CourseRecord> = courses
            .into_iter()
            .filter(|course| course.show_course)
            .map(|course| CourseRecord {
                academy_name: academy_names.get(&course.academy).cloned().unwrap_or_default(),
                teacher_name: teacher_names.get(&course.teacher).cloned().unwrap_or_default(),
                academy_id: course.academy,
                teacher_id: course.teacher,
                id: course.id,
                name: course.name,
                cover: course.cover,
                tags: course.tags,
                categories: course.categories,
                price: course.price,
                discount: course.discount,
                status: course.status,
                release_date: course.release_date,
                ratings: course.ratings,
                ratings_number: course.ratings_number,
                purchased: course.purchased,
                course_length: course.course_length,
                total_lessons: course.total_lessons,
            })
            .collect();
        records.sort_by(|a, b| b.release_date.cmp(&a.release_date));
        Ok(records)
    }

    /// The slim index behind the home-page quick search box.
    pub async fn home_search_index(&self) -> Result<Vec<HomeSearchEntry>, StorageError> {
        let snapshot = self.course_snapshot().await?;
        Ok(snapshot
            .into_iter()
            .map(|record| HomeSearchEntry {
                id: record.id,
                name: record.name,
                cover: record.cover,
                tags: record.tags,
                academy_name: record.academy_name,
                teacher_name: record.teacher_name,
            })
            .collect())
    }

    /// The whole-catalog top courses shown on the home page.
    pub async fn home_top_courses(&self) -> Result<Vec<CourseCard>, StorageError> {
        let courses = self.store.courses().await?;
        let academy_names = self.academy_name_map().await?;
        let teacher_names = self.teacher_name_map().await?;
        Ok(top_cards(courses, &academy_names, &teacher_names))
    }

    /// The sections of a course with their lessons inlined. Lessons for all
    /// sections are fetched concurrently, then reassembled in section order.
    pub async fn course_outline(
        &self,
        course_id: &str,
    ) -> Result<Option<Vec<SectionWithLessons>>, StorageError> {
        if self.store.course(course_id).await?.is_none() {
            return Ok(None);
        }
        let sections = self.store.sections_by_course(course_id).await?;
        let lesson_lists = try_join_all(
            sections
                .iter()
                .map(|section| self.store.lessons_by_section(&section.id)),
        )
        .await?;

        Ok(Some(
            sections
                .into_iter()
                .zip(lesson_lists)
                .map(|(section, lessons)| SectionWithLessons { section, lessons })
                .collect(),
        ))
    }

    // ==================== Lookup tables ====================

    /// Academy name→id table keyed by English name.
    pub async fn academy_lookup(&self) -> Result<Vec<NameId>, StorageError> {
        Ok(self
            .store
            .academies()
            .await?
            .into_iter()
            .map(|academy| NameId {
                id: academy.id,
                name: academy.eng_name,
            })
            .collect())
    }

    /// Teacher name→id table keyed by English name.
    pub async fn teacher_lookup(&self) -> Result<Vec<NameId>, StorageError> {
        Ok(self
            .store
            .teachers()
            .await?
            .into_iter()
            .map(|teacher| NameId {
                id: teacher.id,
                name: teacher.eng_name,
            })
            .collect())
    }

    /// Category name→id table.
    pub async fn category_lookup(&self) -> Result<Vec<NameId>, StorageError> {
        Ok(self
            .store
            .categories()
            .await?
            .into_iter()
            .map(|category| NameId {
                id: category.id,
                name: category.name,
            })
            .collect())
    }

    async fn academy_name_map(&self) -> Result<HashMap<String, String>, StorageError> {
        Ok(self
            .store
            .academies()
            .await?
            .into_iter()
            .map(|academy| (academy.id, academy.fa_name))
            .collect())
    }

    async fn teacher_name_map(&self) -> Result<HashMap<String, String>, StorageError> {
        Ok(self
            .store
            .teachers()
            .await?
            .into_iter()
            .map(|teacher| (teacher.id, teacher.fa_name))
            .collect())
    }
}

/// Joined counts for one academy: (teachers, students, courses).
///
/// `courses` may be pre-filtered to the academy or the full collection; both
/// work because ownership is re-checked here. Visibility is deliberately not
/// applied: the listing counts every course the academy owns.
fn academy_counts(
    academy: &Academy,
    teachers: &[Teacher],
    courses: &[Course],
) -> (u64, u64, u64) {
    let members: Vec<&Teacher> = teachers
        .iter()
        .filter(|teacher| teacher.academies.contains(&academy.id))
        .collect();
    let total_teachers = members.len() as u64;
    let total_students = members.iter().map(|teacher| teacher.students).sum();
    let total_courses = courses
        .iter()
        .filter(|course| course.academy == academy.id)
        .count() as u64;
    (total_teachers, total_students, total_courses)
}

fn teacher_listing(teacher: &Teacher, courses: &[Course]) -> TeacherListing {
    let owned: Vec<&Course> = courses
        .iter()
        .filter(|course| course.teacher == teacher.id)
        .collect();
    TeacherListing {
        eng_name: teacher.eng_name.clone(),
        fa_name: teacher.fa_name.clone(),
        avatar: teacher.avatar.clone(),
        rating: teacher.rating,
        rating_number: teacher.rating_number,
        total_students: owned.iter().map(|course| course.students).sum(),
        total_courses: owned.len() as u64,
    }
}

/// Filter to visible courses, sort by purchases then rating (descending),
/// cut to the sublist limit and project to cards.
fn top_cards(
    courses: Vec<Course>,
    academy_names: &HashMap<String, String>,
    teacher_names: &HashMap<String, String>,
) -> Vec<CourseCard> {
    let mut visible: Vec<Course> = courses
        .into_iter()
        .filter(|course| course.show_course)
        .collect();
    visible.sort_by(|a, b| {
        b.purchased
            .cmp(&a.purchased)
            .then(b.ratings.total_cmp(&a.ratings))
    });
    visible.truncate(TOP_COURSES_LIMIT);
    visible
        .into_iter()
        .map(|course| CourseCard {
            academy_name: academy_names.get(&course.academy).cloned().unwrap_or_default(),
            teacher_name: teacher_names.get(&course.teacher).cloned().unwrap_or_default(),
            id: course.id,
            name: course.name,
            cover: course.cover,
            price: course.price,
            discount: course.discount,
            ratings: course.ratings,
            ratings_number: course.ratings_number,
            purchased: course.purchased,
            release_date: course.release_date,
            course_length: course.course_length,
            total_lessons: course.total_lessons,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostad_core::{Lesson, Section};
    use ostad_db_memory::InMemoryCatalog;
    use time::OffsetDateTime;

    async fn seeded() -> Aggregator {
        let store = InMemoryCatalog::new();

        let mut rahnema = Academy::new("a1", "rahnema", "رهنما");
        rahnema.teachers = vec!["t1".into(), "t2".into()];
        rahnema.courses = vec!["c1".into(), "c2".into(), "c3".into()];
        store.insert_academy(&rahnema).await.unwrap();

        let mut empty = Academy::new("a2", "empty-academy", "خالی");
        empty.rating = 4.0;
        store.insert_academy(&empty).await.unwrap();

        let mut ali = Teacher::new("t1", "ali", "علی");
        ali.academies = vec!["a1".into()];
        ali.students = 700;
        store.insert_teacher(&ali).await.unwrap();

        let mut sara = Teacher::new("t2", "sara", "سارا");
        sara.academies = vec!["a1".into()];
        sara.students = 300;
        store.insert_teacher(&sara).await.unwrap();

        for (id, purchased, students, visible) in [
            ("c1", 50u64, 120u64, true),
            ("c2", 90, 80, true),
            ("c3", 200, 400, false),
        ] {
            let mut course = Course::new(id, format!("course {id}"), "a1", "t1");
            course.purchased = purchased;
            course.students = students;
            course.show_course = visible;
            course.release_date = OffsetDateTime::UNIX_EPOCH;
            store.insert_course(&course).await.unwrap();
        }

        Aggregator::new(Arc::new(store))
    }

    #[tokio::test]
    async fn academy_listing_joins_counts() {
        let aggregator = seeded().await;
        let listings = aggregator.academy_listings().await.unwrap();

        assert_eq!(listings.len(), 2);
        // rahnema first: more students.
        assert_eq!(listings[0].eng_name, "rahnema");
        assert_eq!(listings[0].total_teachers, 2);
        assert_eq!(listings[0].total_students, 1000);
        // Hidden courses still count toward the total.
        assert_eq!(listings[0].total_courses, 3);
        // Left join: the empty academy shows zeros.
        assert_eq!(listings[1].total_teachers, 0);
        assert_eq!(listings[1].total_courses, 0);
    }

    #[tokio::test]
    async fn top_courses_exclude_hidden_and_sort_by_purchases() {
        let aggregator = seeded().await;
        let cards = aggregator
            .academy_top_courses("rahnema")
            .await
            .unwrap()
            .unwrap();

        let ids: Vec<&str> = cards.iter().map(|card| card.id.as_str()).collect();
        // c3 has the most purchases but is hidden.
        assert_eq!(ids, vec!["c2", "c1"]);
        assert_eq!(cards[0].teacher_name, "علی");
    }

    #[tokio::test]
    async fn missing_academy_is_none() {
        let aggregator = seeded().await;
        assert!(aggregator.academy_detail("ghost").await.unwrap().is_none());
        assert!(aggregator.academy_top_courses("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn teacher_listing_sums_course_students() {
        let aggregator = seeded().await;
        let listings = aggregator.teacher_listings().await.unwrap();

        let ali = listings.iter().find(|t| t.eng_name == "ali").unwrap();
        // All three courses belong to ali, hidden included.
        assert_eq!(ali.total_courses, 3);
        assert_eq!(ali.total_students, 600);
        let sara = listings.iter().find(|t| t.eng_name == "sara").unwrap();
        assert_eq!(sara.total_courses, 0);
    }

    #[tokio::test]
    async fn snapshot_is_visible_only_and_newest_first() {
        let aggregator = seeded().await;
        let snapshot = aggregator.course_snapshot().await.unwrap();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|record| record.id != "c3"));
        assert_eq!(snapshot[0].academy_name, "رهنما");
    }

    #[tokio::test]
    async fn course_outline_keeps_section_order() {
        let aggregator = seeded().await;
        let store = &aggregator.store;

        for (id, order) in [("s2", 2u32), ("s1", 1)] {
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
        store
            .insert_lesson(&Lesson {
                id: "l1".into(),
                section: "s1".into(),
                course: "c1".into(),
                name: "intro".into(),
                order: 1,
                lesson_length: 90,
            })
            .await
            .unwrap();

        let outline = aggregator.course_outline("c1").await.unwrap().unwrap();
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].section.id, "s1");
        assert_eq!(outline[0].lessons.len(), 1);
        assert!(outline[1].lessons.is_empty());

        assert!(aggregator.course_outline("nope").await.unwrap().is_none());
    }
}
