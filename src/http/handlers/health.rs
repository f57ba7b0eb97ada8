use crate::upstream::BackendEndpoint;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub loaded_vehicles: usize,
    pub upstreams: Vec<BackendEndpoint>,
}

/// Always 200: the proxy itself is healthy as long as it can answer, and
/// upstream states (Degraded reported distinctly from Down) ride along for
/// observability.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let upstreams = state.registry.snapshot().await;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            loaded_vehicles: state.table.len(),
            upstreams,
        }),
    )
}
