use std::net::SocketAddr;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::error::Result;
use crate::state::AppState;
use crate::{admin, catalog, handlers};

pub struct OstadServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    let body_limit = cfg.server.body_limit;

    let api = Router::new()
        // Public catalog
        .route("/home", get(catalog::home))
        .route("/home/search", get(catalog::home_search))
        .route("/academies", get(catalog::academies))
        .route("/academies/{eng_name}", get(catalog::academy))
        .route(
            "/academies/{eng_name}/top-courses",
            get(catalog::academy_top_courses),
        )
        .route(
            "/academies/{eng_name}/top-teachers",
            get(catalog::academy_top_teachers),
        )
        .route("/teachers", get(catalog::teachers))
        .route("/teachers/{eng_name}", get(catalog::teacher))
        .route(
            "/teachers/{eng_name}/academies",
            get(catalog::teacher_academies),
        )
        .route(
            "/teachers/{eng_name}/top-courses",
            get(catalog::teacher_top_courses),
        )
        .route("/courses/search", get(catalog::search_courses))
        .route("/courses/{id}/sections", get(catalog::course_sections))
        // Admin mutations
        .route("/admin/academies", post(admin::create_academy))
        .route("/admin/academies/{id}", delete(admin::delete_academy))
        .route("/admin/teachers", post(admin::create_teacher))
        .route("/admin/teachers/{id}", delete(admin::delete_teacher))
        .route("/admin/categories", post(admin::create_category))
        .route("/admin/courses", post(admin::create_course))
        .route("/admin/courses/{id}/move", post(admin::move_course))
        .route("/admin/courses/{id}/sections", post(admin::create_section))
        .route("/admin/sections/{id}", put(admin::edit_section))
        .route("/admin/sections/{id}/lessons", post(admin::create_lesson))
        .route("/admin/lessons/{id}", put(admin::edit_lesson))
        .route("/admin/reviews", post(admin::create_review))
        // Rollup triggers
        .route(
            "/admin/rollups/course-ratings",
            post(admin::rollup_course_ratings),
        )
        .route(
            "/admin/rollups/academy-ratings",
            post(admin::rollup_academy_ratings),
        )
        .route(
            "/admin/rollups/teacher-ratings",
            post(admin::rollup_teacher_ratings),
        )
        .route(
            "/admin/rollups/course-structure",
            post(admin::rollup_course_structure),
        );

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .nest("/api/v1", api)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub struct ServerBuilder {
    config: AppConfig,
    state: AppState,
}

impl ServerBuilder {
    pub fn new(config: AppConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn build(self) -> Result<OstadServer> {
        let addr = self.config.addr()?;
        let app = build_app(&self.config, self.state);
        Ok(OstadServer { addr, app })
    }
}

impl OstadServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
