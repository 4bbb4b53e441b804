use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "Ostad Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let cache = state.cache.backend().stats();
    let aside = state.cache.stats();
    let mut body = json!({
        "status": "ready",
        "storage": state.store.backend_name(),
        "cache": {
            "mode": cache.mode,
            "l1Entries": cache.l1_entries,
            "hits": aside.hits,
            "misses": aside.misses,
        },
    });
    if cache.mode == "redis" {
        body["cache"]["redisAvailable"] =
            json!(state.cache.backend().is_redis_available().await);
    }
    (StatusCode::OK, Json(body))
}
