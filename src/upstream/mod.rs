use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod forward;
pub mod probe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointState {
    Healthy,
    /// Probe reached the endpoint but got a non-2xx status. Skipped for
    /// routing exactly like Down, reported distinctly.
    Degraded,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendEndpoint {
    pub name: String,
    pub base_url: String,
    pub state: EndpointState,
    pub last_checked_at: DateTime<Utc>,
}

impl BackendEndpoint {
    pub fn is_routable(&self) -> bool {
        self.state == EndpointState::Healthy
    }
}

/// Upstream endpoints in configured priority order. The only mutable shared
/// state in the process; every update replaces the whole endpoint record
/// under the write lock so readers never observe a half-written entry.
#[derive(Clone)]
pub struct EndpointRegistry {
    inner: Arc<RwLock<Vec<BackendEndpoint>>>,
}

impl EndpointRegistry {
    /// `endpoints` as `(name, base_url)` pairs, highest priority first.
    /// Endpoints start Healthy; the first probe tick or a failed forward
    /// corrects that immediately.
    pub fn new(endpoints: Vec<(String, String)>) -> Self {
        let now = Utc::now();
        let endpoints = endpoints
            .into_iter()
            .map(|(name, base_url)| BackendEndpoint {
                name,
                base_url,
                state: EndpointState::Healthy,
                last_checked_at: now,
            })
            .collect();
        Self {
            inner: Arc::new(RwLock::new(endpoints)),
        }
    }

    pub async fn snapshot(&self) -> Vec<BackendEndpoint> {
        self.inner.read().await.clone()
    }

    /// First endpoint in priority order that is routable.
    pub async fn first_available(&self) -> Option<BackendEndpoint> {
        self.inner
            .read()
            .await
            .iter()
            .find(|e| e.is_routable())
            .cloned()
    }

    /// Records a probe outcome for `name`. Replaces the record wholesale.
    pub async fn apply_probe(&self, name: &str, state: EndpointState) {
        let mut endpoints = self.inner.write().await;
        if let Some(slot) = endpoints.iter_mut().find(|e| e.name == name) {
            if slot.state != state {
                tracing::info!(
                    endpoint = name,
                    from = ?slot.state,
                    to = ?state,
                    "upstream state changed"
                );
            }
            *slot = BackendEndpoint {
                name: slot.name.clone(),
                base_url: slot.base_url.clone(),
                state,
                last_checked_at: Utc::now(),
            };
        }
    }

    /// Opportunistic downgrade after a failed forward, rather than waiting
    /// for the next probe tick.
    pub async fn mark_down(&self, name: &str) {
        self.apply_probe(name, EndpointState::Down).await;
    }
}
