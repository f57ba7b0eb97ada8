use crate::upstream::BackendEndpoint;
use anyhow::{Context, Result};
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Response, StatusCode};
use std::time::Duration;

/// Connection-scoped headers that must not cross the proxy in either
/// direction.
const HOP_BY_HOP: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Sends a request verbatim to an upstream and converts the reply back into
/// an axum response, status and body unchanged. A transport error or timeout
/// is an `Err`; the caller turns that into a fallback and downgrades the
/// endpoint. Upstream 4xx/5xx replies pass through as-is.
#[derive(Clone)]
pub struct Forwarder {
    pub client: reqwest::Client,
    pub timeout: Duration,
}

impl Forwarder {
    pub async fn forward(
        &self,
        endpoint: &BackendEndpoint,
        method: &Method,
        path_and_query: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response<Body>> {
        let url = format!(
            "{}{}",
            endpoint.base_url.trim_end_matches('/'),
            path_and_query
        );
        let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
            .context("unsupported method")?;

        let mut request = self.client.request(method, &url).timeout(self.timeout);
        for (name, value) in headers {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            if let Ok(value) = value.to_str() {
                request = request.header(name.as_str(), value);
            }
        }
        if !body.is_empty() {
            request = request.body(body.to_vec());
        }

        tracing::debug!(endpoint = %endpoint.name, url = %url, "forwarding request");
        let upstream = request
            .send()
            .await
            .with_context(|| format!("forward to {} failed", endpoint.name))?;

        let status =
            StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let mut builder = Response::builder().status(status);
        for (name, value) in upstream.headers() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            if let Ok(value) = value.to_str() {
                builder = builder.header(name.as_str(), value);
            }
        }

        let bytes = upstream
            .bytes()
            .await
            .with_context(|| format!("reading body from {}", endpoint.name))?;
        Ok(builder
            .body(Body::from(bytes))
            .unwrap_or_else(|_| Response::new(Body::empty())))
    }
}
