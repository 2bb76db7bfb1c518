//! Axum router wiring plus the operational HTTP endpoints.
//!
//! - `/v1/ws`    : WebSocket upgrade
//! - `/healthz`  : liveness
//! - `/metrics`  : Prometheus text format
//! - `/v1/online`: current online-user roster

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/ws", get(transport::ws::ws_upgrade))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/v1/online", get(online))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render();
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
        .into_response()
}

async fn online(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "online": state.hub().presence().online_users() }))
}
