use crate::domain::query::{AttributeQueryRequest, DirectCountRequest, ErrorEnvelope};
use crate::fallback::{self, FallbackKind};
use crate::http::handlers::attribute;
use crate::router::priority::{self, RouteDecision};
use crate::AppState;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Catch-all route: forward to the first routable upstream, or synthesize a
/// fallback when none is available or the forward itself fails. A failed
/// forward downgrades the endpoint immediately instead of waiting for the
/// next probe tick.
pub async fn forward_or_fallback(State(state): State<AppState>, req: Request<Body>) -> Response {
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

    let snapshot = state.registry.snapshot().await;
    match priority::decide(&path, &snapshot) {
        RouteDecision::LocalAttribute => local_attribute(&state, &path, &body),
        RouteDecision::Forward(endpoint) => {
            match state
                .forwarder
                .forward(&endpoint, &method, &path_and_query, &headers, body)
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    tracing::warn!(
                        endpoint = %endpoint.name,
                        %path,
                        error = %err,
                        "forward failed, serving fallback"
                    );
                    state.registry.mark_down(&endpoint.name).await;
                    fallback::respond(FallbackKind::for_path(&path), &path)
                }
            }
        }
        RouteDecision::Fallback(kind) => {
            tracing::info!(%path, "no upstream available, serving fallback");
            fallback::respond(kind, &path)
        }
    }
}

/// The attribute surface has dedicated routes; this arm keeps the route
/// decision total for requests that reach the catch-all anyway.
fn local_attribute(state: &AppState, path: &str, body: &Bytes) -> Response {
    match path {
        "/api/direct-count" => match serde_json::from_slice::<DirectCountRequest>(body) {
            Ok(req) => match attribute::run_direct_count(&req, &state.table) {
                Ok(result) => (StatusCode::OK, Json(result)).into_response(),
                Err(envelope) => (StatusCode::BAD_REQUEST, Json(envelope)).into_response(),
            },
            Err(err) => bad_request(err),
        },
        "/api/chat-attribute" => match serde_json::from_slice::<AttributeQueryRequest>(body) {
            Ok(req) => (
                StatusCode::OK,
                Json(attribute::run_chat_attribute(&req.query, &state.table)),
            )
                .into_response(),
            Err(err) => bad_request(err),
        },
        _ => match serde_json::from_slice::<AttributeQueryRequest>(body) {
            Ok(req) => (
                StatusCode::OK,
                Json(attribute::run_attribute_query(&req.query, &state.table)),
            )
                .into_response(),
            Err(err) => bad_request(err),
        },
    }
}

fn bad_request(err: serde_json::Error) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorEnvelope::new(
            "INVALID_BODY",
            format!("malformed request body: {}", err),
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordTable;
    use crate::upstream::forward::Forwarder;
    use crate::upstream::EndpointRegistry;
    use std::sync::Arc;
    use std::time::Duration;

    fn state() -> AppState {
        AppState {
            table: Arc::new(RecordTable::synthetic()),
            registry: EndpointRegistry::new(Vec::new()),
            forwarder: Forwarder {
                client: reqwest::Client::new(),
                timeout: Duration::from_secs(1),
            },
        }
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn direct_count_arm_counts_and_rejects_unknown_attributes() {
        let state = state();

        let body = Bytes::from(r#"{"attribute_name":"color","attribute_value":"green"}"#);
        let resp = local_attribute(&state, "/api/direct-count", &body);
        assert_eq!(resp.status(), StatusCode::OK);
        let value = json_body(resp).await;
        assert_eq!(value["count"], 2);

        let bad = Bytes::from(r#"{"attribute_name":"horsepower","attribute_value":"300"}"#);
        let resp = local_attribute(&state, "/api/direct-count", &bad);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_and_query_arms_answer_from_the_table() {
        let state = state();
        let body = Bytes::from(r#"{"query":"how many green vehicles do we have?"}"#);

        let resp = local_attribute(&state, "/api/chat-attribute", &body);
        assert_eq!(resp.status(), StatusCode::OK);
        let value = json_body(resp).await;
        assert_eq!(value["is_attribute_query"], true);

        let resp = local_attribute(&state, "/api/attribute-query", &body);
        assert_eq!(resp.status(), StatusCode::OK);
        let value = json_body(resp).await;
        assert_eq!(value["detected"], true);
        assert_eq!(value["count"], 2);
    }

    #[tokio::test]
    async fn malformed_body_is_a_400_envelope() {
        let state = state();
        let resp = local_attribute(&state, "/api/attribute-query", &Bytes::from_static(b"not json"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let value = json_body(resp).await;
        assert_eq!(value["error"]["code"], "INVALID_BODY");
    }
}
