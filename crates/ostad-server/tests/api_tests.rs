//! Router-level tests exercising the full handler stack: routing, cache
//! composition, aggregation and the response envelope.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use time::OffsetDateTime;
use tower::util::ServiceExt;

use ostad_cache::{CacheAside, CacheBackend};
use ostad_core::{Academy, Course, Lesson, Section, Teacher};
use ostad_db_memory::InMemoryCatalog;
use ostad_server::{AppConfig, AppState, build_app};
use ostad_storage::CatalogStore;

async fn seeded_state() -> AppState {
    let store = InMemoryCatalog::new();

    let mut rahnema = Academy::new("a1", "rahnema", "رهنما");
    rahnema.teachers = vec!["t1".into()];
    rahnema.courses = vec!["c1".into(), "c2".into(), "c3".into()];
    store.insert_academy(&rahnema).await.unwrap();

    let mut ali = Teacher::new("t1", "ali", "علی");
    ali.academies = vec!["a1".into()];
    ali.students = 500;
    ali.courses = vec!["c1".into(), "c2".into(), "c3".into()];
    store.insert_teacher(&ali).await.unwrap();

    for (id, name, purchased, price, visible, day) in [
        ("c1", "Rust basics", 40u64, 0u64, true, 1),
        ("c2", "Advanced Rust", 90, 1500, true, 2),
        ("c3", "Secret draft", 999, 0, false, 3),
    ] {
        let mut course = Course::new(id, name, "a1", "t1");
        course.purchased = purchased;
        course.price = price;
        course.show_course = visible;
        course.release_date =
            OffsetDateTime::from_unix_timestamp(86_400 * day).unwrap();
        store.insert_course(&course).await.unwrap();
    }

    AppState::new(Arc::new(store), CacheAside::new(CacheBackend::new_local()))
}

async fn app() -> (Router, AppState) {
    let state = seeded_state().await;
    (build_app(&AppConfig::default(), state.clone()), state)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn academy_listing_counts_every_course_but_top_courses_hide_drafts() {
    let (app, _) = app().await;

    let (status, body) = get_json(&app, "/api/v1/academies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let academy = &body["academies"][0];
    assert_eq!(academy["engName"], json!("rahnema"));
    assert_eq!(academy["totalStudents"], json!(500));
    // The hidden course still counts toward the total.
    assert_eq!(academy["totalCourses"], json!(3));

    let (status, body) = get_json(&app, "/api/v1/academies/rahnema/top-courses").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    // Sorted by purchases, the hidden draft never appears.
    assert_eq!(names, vec!["Advanced Rust", "Rust basics"]);
}

#[tokio::test]
async fn listing_request_populates_the_cache_key() {
    let (app, state) = app().await;

    assert!(state.cache.backend().get("academies_all").await.is_none());
    get_json(&app, "/api/v1/academies").await;
    assert!(state.cache.backend().get("academies_all").await.is_some());

    get_json(&app, "/api/v1/academies/rahnema").await;
    assert!(state.cache.backend().get("academy:rahnema").await.is_some());

    let stats = state.cache.stats();
    assert_eq!(stats.misses, 2);
}

#[tokio::test]
async fn unknown_academy_is_a_json_404_and_never_cached() {
    let (app, state) = app().await;

    let (status, body) = get_json(&app, "/api/v1/academies/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("ghost"));
    assert!(state.cache.backend().get("academy:ghost").await.is_none());
}

#[tokio::test]
async fn search_filters_and_paginates() {
    let (app, _) = app().await;

    let (status, body) = get_json(&app, "/api/v1/courses/search").await;
    assert_eq!(status, StatusCode::OK);
    // Only visible courses enter the snapshot, newest first.
    assert_eq!(body["courses"].as_array().unwrap().len(), 2);
    assert_eq!(body["courses"][0]["name"], json!("Advanced Rust"));
    assert_eq!(body["currentPage"], json!(1));
    assert_eq!(body["totalPages"], json!(1));

    // price=2 keeps free courses only.
    let (_, body) = get_json(&app, "/api/v1/courses/search?price=2").await;
    assert_eq!(body["courses"].as_array().unwrap().len(), 1);
    assert_eq!(body["courses"][0]["name"], json!("Rust basics"));

    // A filter naming only unknown academies matches nothing.
    let (_, body) = get_json(&app, "/api/v1/courses/search?academies=ghost").await;
    assert!(body["courses"].as_array().unwrap().is_empty());
    assert_eq!(body["totalPages"], json!(0));

    // Known academy name resolves through the lookup table.
    let (_, body) = get_json(&app, "/api/v1/courses/search?academies=rahnema").await;
    assert_eq!(body["courses"].as_array().unwrap().len(), 2);

    // Out-of-range page yields an empty slice, not an error.
    let (status, body) = get_json(&app, "/api/v1/courses/search?page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["courses"].as_array().unwrap().is_empty());

    // Non-numeric page falls back to page 1.
    let (_, body) = get_json(&app, "/api/v1/courses/search?page=abc").await;
    assert_eq!(body["currentPage"], json!(1));
}

#[tokio::test]
async fn deleting_a_teacher_pulls_it_from_every_member_academy() {
    let (app, state) = app().await;

    // Second academy also listing t1: both membership arrays must be cleaned.
    let mut maktab = Academy::new("a2", "maktab", "مکتب");
    maktab.teachers = vec!["t1".into()];
    state.store.insert_academy(&maktab).await.unwrap();
    let mut ali = state.store.teacher("t1").await.unwrap().unwrap();
    ali.academies.push("a2".into());
    state.store.update_teacher(&ali).await.unwrap();

    let (status, body) = send_json(&app, "DELETE", "/api/v1/admin/teachers/t1", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let first = state.store.academy("a1").await.unwrap().unwrap();
    assert!(first.teachers.is_empty());
    let second = state.store.academy("a2").await.unwrap().unwrap();
    assert!(second.teachers.is_empty());
    // The teacher's courses survive with a dangling owner reference.
    assert!(state.store.course("c1").await.unwrap().is_some());
    assert!(state.store.teacher("t1").await.unwrap().is_none());
}

#[tokio::test]
async fn review_then_rollup_updates_course_ratings() {
    let (app, state) = app().await;

    for rating in [5, 4] {
        let (status, _) = send_json(
            &app,
            "POST",
            "/api/v1/admin/reviews",
            json!({"course": "c1", "user": "u1", "rating": rating}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // The aggregate is untouched until the rollup runs.
    assert_eq!(state.store.course("c1").await.unwrap().unwrap().ratings, 0.0);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/v1/admin/rollups/course-ratings",
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], json!(3));

    let course = state.store.course("c1").await.unwrap().unwrap();
    assert_eq!(course.ratings, 4.5);
    assert_eq!(course.ratings_number, 2);
}

#[tokio::test]
async fn section_and_lesson_creation_bump_parent_rollups() {
    let (app, state) = app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/v1/admin/courses/c1/sections",
        json!({"name": "Getting started", "order": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let section_id = body["section"]["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/v1/admin/sections/{section_id}/lessons"),
        json!({"name": "Hello", "order": 1, "lessonLength": 300}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let course = state.store.course("c1").await.unwrap().unwrap();
    assert_eq!(course.total_sections, 1);
    assert_eq!(course.total_lessons, 1);
    assert_eq!(course.course_length, 300);

    let (status, body) = get_json(&app, "/api/v1/courses/c1/sections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sections"][0]["totalLessons"], json!(1));
    assert_eq!(body["sections"][0]["lessons"][0]["name"], json!("Hello"));
}

#[tokio::test]
async fn lesson_edit_on_drifted_rollups_saturates_instead_of_failing() {
    let (app, state) = app().await;

    // Rollups that drifted below the lesson's stored length: the maintenance
    // paths are not transactional, so this state is reachable.
    state
        .store
        .insert_section(&Section {
            id: "s1".into(),
            course: "c1".into(),
            name: "Getting started".into(),
            order: 1,
            total_lessons: 1,
            total_length: 0,
        })
        .await
        .unwrap();
    state
        .store
        .insert_lesson(&Lesson {
            id: "l1".into(),
            section: "s1".into(),
            course: "c1".into(),
            name: "Hello".into(),
            order: 1,
            lesson_length: 100,
        })
        .await
        .unwrap();

    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/v1/admin/lessons/l1",
        json!({"lessonLength": 50}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lesson"]["lessonLength"], json!(50));

    // The drifted remainder clamps to zero before the new length is added.
    let section = state.store.section("s1").await.unwrap().unwrap();
    assert_eq!(section.total_length, 50);
    let course = state.store.course("c1").await.unwrap().unwrap();
    assert_eq!(course.course_length, 50);
}

#[tokio::test]
async fn moving_a_course_rewrites_both_ownership_lists() {
    let (app, state) = app().await;
    state
        .store
        .insert_academy(&Academy::new("a2", "maktab", "مکتب"))
        .await
        .unwrap();

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/v1/admin/courses/c1/move",
        json!({"academy": "a2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let source = state.store.academy("a1").await.unwrap().unwrap();
    assert!(!source.courses.contains(&"c1".to_string()));
    let target = state.store.academy("a2").await.unwrap().unwrap();
    assert!(target.courses.contains(&"c1".to_string()));
    let course = state.store.course("c1").await.unwrap().unwrap();
    assert_eq!(course.academy, "a2");
}

#[tokio::test]
async fn home_feed_composes_rails() {
    let (app, _) = app().await;

    let (status, body) = get_json(&app, "/api/v1/home").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["academies"][0]["engName"], json!("rahnema"));
    assert_eq!(body["teachers"][0]["engName"], json!("ali"));
    // Course rails are purchase-sorted and visibility-filtered.
    assert_eq!(body["courses"][0]["name"], json!("Advanced Rust"));

    let (_, body) = get_json(&app, "/api/v1/home/search?text=rust").await;
    assert_eq!(body["courses"].as_array().unwrap().len(), 2);
    let (_, body) = get_json(&app, "/api/v1/home/search?text=").await;
    assert!(body["courses"].as_array().unwrap().is_empty());
}
