//! Public catalog handlers.
//!
//! Every listing endpoint reads through the cache: on a miss the aggregation
//! layer recomputes the payload and the result is stored under a fixed key
//! with the TTL class of that listing. Lookup errors inside a compute closure
//! surface as the endpoint's error and are never cached.

use std::future::Future;

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use ostad_api::{ApiError, ApiResult, ApiSuccess};
use ostad_cache::keys;
use ostad_search::{NameId, SearchPage, SearchRequest, resolve_ids};

use crate::aggregation::{
    AcademyDetail, AcademyListing, CourseCard, HomeSearchEntry, SectionWithLessons,
    TOP_COURSES_LIMIT, TeacherDetail, TeacherListing,
};
use crate::state::AppState;

/// Results returned by the home quick search box.
const HOME_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePayload {
    academies: Vec<AcademyListing>,
    teachers: Vec<TeacherListing>,
    courses: Vec<CourseCard>,
}

/// GET /home — the landing page rails: academies, teachers and top courses.
pub async fn home(State(state): State<AppState>) -> ApiResult<ApiSuccess<HomePayload>> {
    let academies = cached_academy_listings(&state).await?;
    let teachers = cached_teacher_listings(&state).await?;

    let mut courses = state.aggregator.home_top_courses().await?;
    courses.truncate(TOP_COURSES_LIMIT);

    Ok(ApiSuccess::new(HomePayload {
        academies,
        teachers,
        courses,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HomeSearchParams {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct HomeSearchPayload {
    courses: Vec<HomeSearchEntry>,
}

/// GET /home/search — substring quick search over the slim home index.
pub async fn home_search(
    State(state): State<AppState>,
    Query(params): Query<HomeSearchParams>,
) -> ApiResult<ApiSuccess<HomeSearchPayload>> {
    let index: Vec<HomeSearchEntry> = state
        .cache
        .get_or_compute(keys::COURSES_FOR_HOME_SEARCH, keys::HOME_SEARCH_TTL, || async {
            state.aggregator.home_search_index().await.map_err(ApiError::from)
        })
        .await?;

    let needle = params.text.trim().to_lowercase();
    let mut courses: Vec<HomeSearchEntry> = if needle.is_empty() {
        Vec::new()
    } else {
        index
            .into_iter()
            .filter(|entry| {
                entry.name.to_lowercase().contains(&needle)
                    || entry.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
            })
            .collect()
    };
    courses.truncate(HOME_SEARCH_LIMIT);

    Ok(ApiSuccess::new(HomeSearchPayload { courses }))
}

// ==================== Academies ====================

#[derive(Debug, Serialize)]
pub struct AcademiesPayload {
    academies: Vec<AcademyListing>,
}

/// GET /academies
pub async fn academies(State(state): State<AppState>) -> ApiResult<ApiSuccess<AcademiesPayload>> {
    let academies = cached_academy_listings(&state).await?;
    Ok(ApiSuccess::new(AcademiesPayload { academies }))
}

#[derive(Debug, Serialize)]
pub struct AcademyPayload {
    academy: AcademyDetail,
}

/// GET /academies/{engName}
pub async fn academy(
    State(state): State<AppState>,
    Path(eng_name): Path<String>,
) -> ApiResult<ApiSuccess<AcademyPayload>> {
    let academy = state
        .cache
        .get_or_compute(&keys::academy(&eng_name), keys::LISTING_TTL, || async {
            state
                .aggregator
                .academy_detail(&eng_name)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("academy not found: {eng_name}")))
        })
        .await?;
    Ok(ApiSuccess::new(AcademyPayload { academy }))
}

#[derive(Debug, Serialize)]
pub struct CoursesPayload {
    courses: Vec<CourseCard>,
}

/// GET /academies/{engName}/top-courses
pub async fn academy_top_courses(
    State(state): State<AppState>,
    Path(eng_name): Path<String>,
) -> ApiResult<ApiSuccess<CoursesPayload>> {
    let courses = state
        .cache
        .get_or_compute(
            &keys::academy_top_courses(&eng_name),
            keys::LISTING_TTL,
            || async {
                state
                    .aggregator
                    .academy_top_courses(&eng_name)
                    .await?
                    .ok_or_else(|| ApiError::not_found(format!("academy not found: {eng_name}")))
            },
        )
        .await?;
    Ok(ApiSuccess::new(CoursesPayload { courses }))
}

#[derive(Debug, Serialize)]
pub struct TeachersPayload {
    teachers: Vec<TeacherListing>,
}

/// GET /academies/{engName}/top-teachers
pub async fn academy_top_teachers(
    State(state): State<AppState>,
    Path(eng_name): Path<String>,
) -> ApiResult<ApiSuccess<TeachersPayload>> {
    let teachers = state
        .cache
        .get_or_compute(
            &keys::academy_top_teachers(&eng_name),
            keys::LISTING_TTL,
            || async {
                state
                    .aggregator
                    .academy_top_teachers(&eng_name)
                    .await?
                    .ok_or_else(|| ApiError::not_found(format!("academy not found: {eng_name}")))
            },
        )
        .await?;
    Ok(ApiSuccess::new(TeachersPayload { teachers }))
}

// ==================== Teachers ====================

/// GET /teachers
pub async fn teachers(State(state): State<AppState>) -> ApiResult<ApiSuccess<TeachersPayload>> {
    let teachers = cached_teacher_listings(&state).await?;
    Ok(ApiSuccess::new(TeachersPayload { teachers }))
}

#[derive(Debug, Serialize)]
pub struct TeacherPayload {
    teacher: TeacherDetail,
}

/// GET /teachers/{engName}
pub async fn teacher(
    State(state): State<AppState>,
    Path(eng_name): Path<String>,
) -> ApiResult<ApiSuccess<TeacherPayload>> {
    let teacher = state
        .cache
        .get_or_compute(&keys::teacher(&eng_name), keys::LISTING_TTL, || async {
            state
                .aggregator
                .teacher_detail(&eng_name)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("teacher not found: {eng_name}")))
        })
        .await?;
    Ok(ApiSuccess::new(TeacherPayload { teacher }))
}

/// GET /teachers/{engName}/academies
pub async fn teacher_academies(
    State(state): State<AppState>,
    Path(eng_name): Path<String>,
) -> ApiResult<ApiSuccess<AcademiesPayload>> {
    let academies = state
        .cache
        .get_or_compute(
            &keys::teacher_academies(&eng_name),
            keys::LISTING_TTL,
            || async {
                state
                    .aggregator
                    .teacher_academies(&eng_name)
                    .await?
                    .ok_or_else(|| ApiError::not_found(format!("teacher not found: {eng_name}")))
            },
        )
        .await?;
    Ok(ApiSuccess::new(AcademiesPayload { academies }))
}

/// GET /teachers/{engName}/top-courses
pub async fn teacher_top_courses(
    State(state): State<AppState>,
    Path(eng_name): Path<String>,
) -> ApiResult<ApiSuccess<CoursesPayload>> {
    let courses = state
        .cache
        .get_or_compute(
            &keys::teacher_top_courses(&eng_name),
            keys::LISTING_TTL,
            || async {
                state
                    .aggregator
                    .teacher_top_courses(&eng_name)
                    .await?
                    .ok_or_else(|| ApiError::not_found(format!("teacher not found: {eng_name}")))
            },
        )
        .await?;
    Ok(ApiSuccess::new(CoursesPayload { courses }))
}

// ==================== Course search & outline ====================

/// Query parameters of the course search endpoint.
///
/// `academies`, `teachers` and `categories` are comma-separated name lists;
/// names are resolved to ids through the cached lookup tables and unknown
/// names are dropped. A non-numeric `page` falls back to page 1.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub search_text: String,
    pub order: Option<u8>,
    pub price: Option<u8>,
    pub academies: Option<String>,
    pub teachers: Option<String>,
    pub categories: Option<String>,
    pub page: Option<String>,
}

/// GET /courses/search
pub async fn search_courses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<ApiSuccess<SearchPage>> {
    let academy_names = split_csv(params.academies.as_deref());
    let teacher_names = split_csv(params.teachers.as_deref());
    let category_names = split_csv(params.categories.as_deref());

    let academy_ids = resolve_filter(&state, keys::ALL_ACADEMIES, &academy_names, |s| async move {
        s.aggregator.academy_lookup().await.map_err(ApiError::from)
    })
    .await?;
    let teacher_ids = resolve_filter(&state, keys::ALL_TEACHERS, &teacher_names, |s| async move {
        s.aggregator.teacher_lookup().await.map_err(ApiError::from)
    })
    .await?;
    let category_ids = resolve_filter(&state, keys::ALL_CATEGORIES, &category_names, |s| async move {
        s.aggregator.category_lookup().await.map_err(ApiError::from)
    })
    .await?;

    // A filter that named only unknown entities can match nothing; skip the
    // snapshot work entirely.
    for (names, ids) in [
        (&academy_names, &academy_ids),
        (&teacher_names, &teacher_ids),
        (&category_names, &category_ids),
    ] {
        if !names.is_empty() && ids.is_empty() {
            return Ok(ApiSuccess::new(SearchPage {
                courses: Vec::new(),
                current_page: 1,
                total_pages: 0,
            }));
        }
    }

    let snapshot = state
        .cache
        .get_or_compute(keys::ALL_COURSES, keys::COURSE_SNAPSHOT_TTL, || async {
            state.aggregator.course_snapshot().await.map_err(ApiError::from)
        })
        .await?;

    let request = SearchRequest {
        search_text: params.search_text,
        order: params.order,
        price: params.price,
        academy_ids,
        teacher_ids,
        category_ids,
        page: params.page.as_deref().and_then(|p| p.parse().ok()),
    };

    Ok(ApiSuccess::new(state.search.search(snapshot, &request)))
}

#[derive(Debug, Serialize)]
pub struct OutlinePayload {
    sections: Vec<SectionWithLessons>,
}

/// GET /courses/{id}/sections — the course outline, never cached: lesson
/// edits must be visible to students immediately.
pub async fn course_sections(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<ApiSuccess<OutlinePayload>> {
    let sections = state
        .aggregator
        .course_outline(&course_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("course not found: {course_id}")))?;
    Ok(ApiSuccess::new(OutlinePayload { sections }))
}

// ==================== Helpers ====================

async fn cached_academy_listings(state: &AppState) -> ApiResult<Vec<AcademyListing>> {
    state
        .cache
        .get_or_compute(keys::ACADEMIES_ALL, keys::LISTING_TTL, || async {
            state.aggregator.academy_listings().await.map_err(ApiError::from)
        })
        .await
}

async fn cached_teacher_listings(state: &AppState) -> ApiResult<Vec<TeacherListing>> {
    state
        .cache
        .get_or_compute(keys::TEACHERS_ALL, keys::LISTING_TTL, || async {
            state.aggregator.teacher_listings().await.map_err(ApiError::from)
        })
        .await
}

/// Resolve requested names to ids through a cached lookup table. Skips the
/// table read entirely when no names were requested.
async fn resolve_filter<F, Fut>(
    state: &AppState,
    key: &str,
    names: &[String],
    load: F,
) -> ApiResult<Vec<String>>
where
    F: FnOnce(AppState) -> Fut,
    Fut: Future<Output = ApiResult<Vec<NameId>>>,
{
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let table: Vec<NameId> = state
        .cache
        .get_or_compute(key, keys::LOOKUP_TTL, || load(state.clone()))
        .await?;
    Ok(resolve_ids(&table, names))
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_drops_empties() {
        assert_eq!(
            split_csv(Some("rahnema, maktab ,,")),
            vec!["rahnema".to_string(), "maktab".to_string()]
        );
        assert!(split_csv(None).is_empty());
        assert!(split_csv(Some("")).is_empty());
    }
}
