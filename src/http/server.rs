use crate::http::handlers::{attribute, chat, health, proxy};
use crate::http::middleware;
use crate::AppState;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Full middleware-wrapped router: CORS headers on every response, OPTIONS
/// answered with an empty 204, a trace span per request, and a catch-all
/// that forwards or falls back.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
            header::HeaderName::from_static("x-session-id"),
        ])
        .max_age(Duration::from_secs(86_400));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/attribute-query", post(attribute::attribute_query))
        .route("/api/direct-count", post(attribute::direct_count))
        .route("/api/chat-attribute", post(attribute::chat_attribute))
        .route("/chat", post(chat::chat))
        .route("/chat/:agent_name", post(chat::chat_with_agent))
        .fallback(proxy::forward_or_fallback)
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::options_no_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
