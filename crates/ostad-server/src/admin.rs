//! Admin mutations and rollup triggers.
//!
//! Mutations write normalized documents and keep the shared ownership arrays
//! in sync. The two sides of a many-to-many edit (and incremental parent
//! rollups) are independent writes with no transaction around them; the
//! full-table rollup jobs exist to repair any drift.
//!
//! None of these endpoints invalidate listing caches. Catalog pages keep
//! serving the previous snapshot until its TTL runs out.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use ostad_api::{ApiError, ApiResult, ApiSuccess};
use ostad_core::{
    Academy, Category, Course, CourseStatus, Lesson, Review, Section, Teacher, generate_id,
    validate_id,
};

use crate::rollup;
use crate::state::AppState;

fn check_id(id: &str) -> ApiResult<()> {
    validate_id(id).map_err(|_| ApiError::bad_request(format!("invalid id: {id}")))
}

// ==================== Academies ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAcademy {
    pub eng_name: String,
    pub fa_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AcademyCreated {
    academy: Academy,
}

/// POST /admin/academies
pub async fn create_academy(
    State(state): State<AppState>,
    Json(body): Json<CreateAcademy>,
) -> ApiResult<ApiSuccess<AcademyCreated>> {
    if body.eng_name.trim().is_empty() || body.fa_name.trim().is_empty() {
        return Err(ApiError::bad_request("engName and faName are required"));
    }
    if state.store.academy_by_eng_name(&body.eng_name).await?.is_some() {
        return Err(ApiError::conflict(format!(
            "academy already exists: {}",
            body.eng_name
        )));
    }

    let mut academy = Academy::new(generate_id(), body.eng_name, body.fa_name);
    academy.description = body.description;
    academy.avatar = body.avatar;
    state.store.insert_academy(&academy).await?;

    tracing::info!(id = %academy.id, eng_name = %academy.eng_name, "Academy created");
    Ok(ApiSuccess::new(AcademyCreated { academy }))
}

/// DELETE /admin/academies/{id}
///
/// Removes the academy and pulls its id from every member teacher's
/// membership array. Courses keep their dangling owner reference; listings
/// drop them through the join.
pub async fn delete_academy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiSuccess<Deleted>> {
    check_id(&id)?;
    if state.store.academy(&id).await?.is_none() {
        return Err(ApiError::not_found(format!("academy not found: {id}")));
    }
    state.store.delete_academy(&id).await?;

    for mut teacher in state.store.teachers().await? {
        if teacher.academies.iter().any(|a| a == &id) {
            teacher.academies.retain(|a| a != &id);
            state.store.update_teacher(&teacher).await?;
        }
    }

    tracing::info!(%id, "Academy deleted");
    Ok(ApiSuccess::new(Deleted { id }))
}

// ==================== Teachers ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacher {
    pub eng_name: String,
    pub fa_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Academy ids this teacher joins on creation.
    #[serde(default)]
    pub academies: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TeacherCreated {
    teacher: Teacher,
}

/// POST /admin/teachers
pub async fn create_teacher(
    State(state): State<AppState>,
    Json(body): Json<CreateTeacher>,
) -> ApiResult<ApiSuccess<TeacherCreated>> {
    if body.eng_name.trim().is_empty() || body.fa_name.trim().is_empty() {
        return Err(ApiError::bad_request("engName and faName are required"));
    }
    if state.store.teacher_by_eng_name(&body.eng_name).await?.is_some() {
        return Err(ApiError::conflict(format!(
            "teacher already exists: {}",
            body.eng_name
        )));
    }
    for academy_id in &body.academies {
        if state.store.academy(academy_id).await?.is_none() {
            return Err(ApiError::bad_request(format!(
                "unknown academy: {academy_id}"
            )));
        }
    }

    let mut teacher = Teacher::new(generate_id(), body.eng_name, body.fa_name);
    teacher.description = body.description;
    teacher.avatar = body.avatar;
    teacher.academies = body.academies;
    state.store.insert_teacher(&teacher).await?;

    // The other side of the shared-array membership.
    for academy_id in &teacher.academies {
        if let Some(mut academy) = state.store.academy(academy_id).await? {
            if !academy.teachers.contains(&teacher.id) {
                academy.teachers.push(teacher.id.clone());
                state.store.update_academy(&academy).await?;
            }
        }
    }

    tracing::info!(id = %teacher.id, eng_name = %teacher.eng_name, "Teacher created");
    Ok(ApiSuccess::new(TeacherCreated { teacher }))
}

/// DELETE /admin/teachers/{id}
///
/// Removes the teacher and pulls its id from every academy that listed it.
/// The teacher's courses stay in the catalog untouched.
pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiSuccess<Deleted>> {
    check_id(&id)?;
    if state.store.teacher(&id).await?.is_none() {
        return Err(ApiError::not_found(format!("teacher not found: {id}")));
    }
    state.store.delete_teacher(&id).await?;

    for mut academy in state.store.academies().await? {
        if academy.teachers.iter().any(|t| t == &id) {
            academy.teachers.retain(|t| t != &id);
            state.store.update_academy(&academy).await?;
        }
    }

    tracing::info!(%id, "Teacher deleted");
    Ok(ApiSuccess::new(Deleted { id }))
}

// ==================== Categories ====================

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryCreated {
    category: Category,
}

/// POST /admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategory>,
) -> ApiResult<ApiSuccess<CategoryCreated>> {
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let category = Category {
        id: generate_id(),
        name: body.name,
    };
    state.store.insert_category(&category).await?;
    Ok(ApiSuccess::new(CategoryCreated { category }))
}

// ==================== Courses ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    pub name: String,
    /// Owning academy id.
    pub academy: String,
    /// Owning teacher id.
    pub teacher: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub discount: u64,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default = "default_show_course")]
    pub show_course: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub release_date: OffsetDateTime,
}

fn default_show_course() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct CourseCreated {
    course: Course,
}

/// POST /admin/courses
pub async fn create_course(
    State(state): State<AppState>,
    Json(body): Json<CreateCourse>,
) -> ApiResult<ApiSuccess<CourseCreated>> {
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let Some(mut academy) = state.store.academy(&body.academy).await? else {
        return Err(ApiError::bad_request(format!(
            "unknown academy: {}",
            body.academy
        )));
    };
    let Some(mut teacher) = state.store.teacher(&body.teacher).await? else {
        return Err(ApiError::bad_request(format!(
            "unknown teacher: {}",
            body.teacher
        )));
    };

    let mut course = Course::new(generate_id(), body.name, body.academy, body.teacher);
    course.description = body.description;
    course.cover = body.cover;
    course.categories = body.categories;
    course.tags = body.tags;
    course.price = body.price;
    course.discount = body.discount;
    course.status = body.status;
    course.show_course = body.show_course;
    course.release_date = body.release_date;
    state.store.insert_course(&course).await?;

    academy.courses.push(course.id.clone());
    state.store.update_academy(&academy).await?;
    teacher.courses.push(course.id.clone());
    state.store.update_teacher(&teacher).await?;

    tracing::info!(id = %course.id, name = %course.name, "Course created");
    Ok(ApiSuccess::new(CourseCreated { course }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCourse {
    /// Target academy id.
    pub academy: String,
}

/// POST /admin/courses/{id}/move
///
/// Reassigns a course to another academy: pull from the old ownership list,
/// push to the new one, rewrite the course's owner field. The three writes
/// are independent; a crash in between leaves drift for the rollup jobs.
pub async fn move_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(body): Json<MoveCourse>,
) -> ApiResult<ApiSuccess<CourseCreated>> {
    check_id(&course_id)?;
    let Some(mut course) = state.store.course(&course_id).await? else {
        return Err(ApiError::not_found(format!("course not found: {course_id}")));
    };
    let Some(mut target) = state.store.academy(&body.academy).await? else {
        return Err(ApiError::bad_request(format!(
            "unknown academy: {}",
            body.academy
        )));
    };
    if target.id == course.academy {
        return Ok(ApiSuccess::new(CourseCreated { course }));
    }

    if let Some(mut source) = state.store.academy(&course.academy).await? {
        source.courses.retain(|c| c != &course_id);
        state.store.update_academy(&source).await?;
    }
    if !target.courses.contains(&course_id) {
        target.courses.push(course_id.clone());
        state.store.update_academy(&target).await?;
    }

    course.academy = target.id;
    state.store.update_course(&course).await?;

    tracing::info!(id = %course_id, academy = %course.academy, "Course moved");
    Ok(ApiSuccess::new(CourseCreated { course }))
}

// ==================== Sections & lessons ====================

#[derive(Debug, Deserialize)]
pub struct CreateSection {
    pub name: String,
    pub order: u32,
}

#[derive(Debug, Serialize)]
pub struct SectionCreated {
    section: Section,
}

/// POST /admin/courses/{id}/sections
pub async fn create_section(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(body): Json<CreateSection>,
) -> ApiResult<ApiSuccess<SectionCreated>> {
    check_id(&course_id)?;
    let Some(course) = state.store.course(&course_id).await? else {
        return Err(ApiError::not_found(format!("course not found: {course_id}")));
    };

    let section = Section {
        id: generate_id(),
        course: course_id,
        name: body.name,
        order: body.order,
        total_lessons: 0,
        total_length: 0,
    };
    state.store.insert_section(&section).await?;

    state
        .store
        .set_course_structure(
            &course.id,
            course.total_sections + 1,
            course.total_lessons,
            course.course_length,
        )
        .await?;

    Ok(ApiSuccess::new(SectionCreated { section }))
}

#[derive(Debug, Deserialize)]
pub struct EditSection {
    pub name: Option<String>,
    pub order: Option<u32>,
}

/// PUT /admin/sections/{id} — rename or reorder, rollups untouched.
pub async fn edit_section(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
    Json(body): Json<EditSection>,
) -> ApiResult<ApiSuccess<SectionCreated>> {
    let Some(mut section) = state.store.section(&section_id).await? else {
        return Err(ApiError::not_found(format!(
            "section not found: {section_id}"
        )));
    };
    if let Some(name) = body.name {
        section.name = name;
    }
    if let Some(order) = body.order {
        section.order = order;
    }
    state.store.update_section(&section).await?;
    Ok(ApiSuccess::new(SectionCreated { section }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLesson {
    pub name: String,
    pub order: u32,
    /// Length in seconds.
    #[serde(default)]
    pub lesson_length: u64,
}

#[derive(Debug, Serialize)]
pub struct LessonCreated {
    lesson: Lesson,
}

/// POST /admin/sections/{id}/lessons
///
/// Inserts the lesson and bumps the section and course rollups by its
/// length, without a full recount.
pub async fn create_lesson(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
    Json(body): Json<CreateLesson>,
) -> ApiResult<ApiSuccess<LessonCreated>> {
    check_id(&section_id)?;
    let Some(section) = state.store.section(&section_id).await? else {
        return Err(ApiError::not_found(format!(
            "section not found: {section_id}"
        )));
    };

    let lesson = Lesson {
        id: generate_id(),
        section: section_id,
        course: section.course.clone(),
        name: body.name,
        order: body.order,
        lesson_length: body.lesson_length,
    };
    state.store.insert_lesson(&lesson).await?;

    state
        .store
        .set_section_rollups(
            &section.id,
            section.total_lessons + 1,
            section.total_length + lesson.lesson_length,
        )
        .await?;
    if let Some(course) = state.store.course(&section.course).await? {
        state
            .store
            .set_course_structure(
                &course.id,
                course.total_sections,
                course.total_lessons + 1,
                course.course_length + lesson.lesson_length,
            )
            .await?;
    }

    Ok(ApiSuccess::new(LessonCreated { lesson }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditLesson {
    pub name: Option<String>,
    pub order: Option<u32>,
    pub lesson_length: Option<u64>,
}

/// PUT /admin/lessons/{id}
///
/// Length changes propagate as a delta to the section and course rollups.
/// The rollups may have drifted below the old length (the maintenance paths
/// are not transactional), so the subtraction saturates; the next structure
/// rollup repairs the exact value.
pub async fn edit_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
    Json(body): Json<EditLesson>,
) -> ApiResult<ApiSuccess<LessonCreated>> {
    let Some(mut lesson) = state.store.lesson(&lesson_id).await? else {
        return Err(ApiError::not_found(format!("lesson not found: {lesson_id}")));
    };
    let old_length = lesson.lesson_length;

    if let Some(name) = body.name {
        lesson.name = name;
    }
    if let Some(order) = body.order {
        lesson.order = order;
    }
    if let Some(length) = body.lesson_length {
        lesson.lesson_length = length;
    }
    state.store.update_lesson(&lesson).await?;

    if lesson.lesson_length != old_length {
        if let Some(section) = state.store.section(&lesson.section).await? {
            state
                .store
                .set_section_rollups(
                    &section.id,
                    section.total_lessons,
                    section.total_length.saturating_sub(old_length) + lesson.lesson_length,
                )
                .await?;
        }
        if let Some(course) = state.store.course(&lesson.course).await? {
            state
                .store
                .set_course_structure(
                    &course.id,
                    course.total_sections,
                    course.total_lessons,
                    course.course_length.saturating_sub(old_length) + lesson.lesson_length,
                )
                .await?;
        }
    }

    Ok(ApiSuccess::new(LessonCreated { lesson }))
}

// ==================== Reviews ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub course: String,
    pub user: String,
    /// Score in 1..=5.
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewCreated {
    review: Review,
}

/// POST /admin/reviews
///
/// Stores the review only. Rating aggregates refresh on the next rollup run.
pub async fn create_review(
    State(state): State<AppState>,
    Json(body): Json<CreateReview>,
) -> ApiResult<ApiSuccess<ReviewCreated>> {
    if !(1..=5).contains(&body.rating) {
        return Err(ApiError::bad_request("rating must be between 1 and 5"));
    }
    if state.store.course(&body.course).await?.is_none() {
        return Err(ApiError::bad_request(format!(
            "unknown course: {}",
            body.course
        )));
    }

    let review = Review {
        id: generate_id(),
        course: body.course,
        user: body.user,
        rating: body.rating,
        comment: body.comment,
        created_at: OffsetDateTime::now_utc(),
    };
    state.store.insert_review(&review).await?;
    Ok(ApiSuccess::new(ReviewCreated { review }))
}

// ==================== Rollup triggers ====================

#[derive(Debug, Serialize)]
pub struct RollupResult {
    updated: u64,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    id: String,
}

/// POST /admin/rollups/course-ratings
pub async fn rollup_course_ratings(
    State(state): State<AppState>,
) -> ApiResult<ApiSuccess<RollupResult>> {
    let updated = rollup::recompute_course_ratings(state.store.as_ref()).await?;
    Ok(ApiSuccess::new(RollupResult { updated }))
}

/// POST /admin/rollups/academy-ratings
pub async fn rollup_academy_ratings(
    State(state): State<AppState>,
) -> ApiResult<ApiSuccess<RollupResult>> {
    let updated = rollup::recompute_academy_ratings(state.store.as_ref()).await?;
    Ok(ApiSuccess::new(RollupResult { updated }))
}

/// POST /admin/rollups/teacher-ratings
pub async fn rollup_teacher_ratings(
    State(state): State<AppState>,
) -> ApiResult<ApiSuccess<RollupResult>> {
    let updated = rollup::recompute_teacher_ratings(state.store.as_ref()).await?;
    Ok(ApiSuccess::new(RollupResult { updated }))
}

/// POST /admin/rollups/course-structure
pub async fn rollup_course_structure(
    State(state): State<AppState>,
) -> ApiResult<ApiSuccess<RollupResult>> {
    let updated = rollup::recompute_course_structure(state.store.as_ref()).await?;
    Ok(ApiSuccess::new(RollupResult { updated }))
}
