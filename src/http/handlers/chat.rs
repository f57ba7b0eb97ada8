use crate::fallback::{self, FallbackKind};
use crate::http::handlers::attribute::{run_chat_attribute, ChatAttributeReply};
use crate::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub async fn chat(State(state): State<AppState>, req: Request<Body>) -> Response {
    handle(state, req).await
}

pub async fn chat_with_agent(
    State(state): State<AppState>,
    Path(_agent_name): Path<String>,
    req: Request<Body>,
) -> Response {
    handle(state, req).await
}

/// Chat requests that the detector can answer are served locally; everything
/// else goes to the highest-priority upstream, with a canned chat reply when
/// none is reachable.
async fn handle(state: AppState, req: Request<Body>) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let headers = req.headers().clone();

    let body = match axum::body::to_bytes(req.into_body(), BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response()
        }
    };

    if let Some(query) = extract_query(&body) {
        if let reply @ ChatAttributeReply::Answered(_) = run_chat_attribute(&query, &state.table) {
            tracing::info!(%path, "answering chat locally as attribute query");
            return (StatusCode::OK, Json(reply)).into_response();
        }
    }

    let Some(endpoint) = state.registry.first_available().await else {
        return fallback::respond(FallbackKind::Chat, &path);
    };

    match state
        .forwarder
        .forward(&endpoint, &method, &path_and_query, &headers, body)
        .await
    {
        Ok(resp) => resp,
        Err(err) => {
            tracing::warn!(endpoint = %endpoint.name, %path, error = %err, "chat forward failed");
            state.registry.mark_down(&endpoint.name).await;
            fallback::respond(FallbackKind::Chat, &path)
        }
    }
}

fn extract_query(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("query")
        .and_then(|q| q.as_str())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_query_field_from_json_body() {
        assert_eq!(
            extract_query(br#"{"query": "how many green vehicles"}"#),
            Some("how many green vehicles".to_string())
        );
        assert_eq!(extract_query(br#"{"message": "hello"}"#), None);
        assert_eq!(extract_query(b"not json"), None);
    }
}
