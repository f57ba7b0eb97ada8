use crate::upstream::{EndpointRegistry, EndpointState};
use std::time::Duration;

/// Periodic liveness checker for the configured upstreams. Probe outcomes
/// only ever update registry state; they are never surfaced to a caller.
#[derive(Clone)]
pub struct HealthProber {
    pub registry: EndpointRegistry,
    pub client: reqwest::Client,
    pub interval: Duration,
    pub probe_timeout: Duration,
}

impl HealthProber {
    pub async fn run(self) {
        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    pub async fn tick(&self) {
        for endpoint in self.registry.snapshot().await {
            let state = self.probe(&endpoint.base_url).await;
            self.registry.apply_probe(&endpoint.name, state).await;
        }
    }

    async fn probe(&self, base_url: &str) -> EndpointState {
        let url = format!("{}/health", base_url.trim_end_matches('/'));
        match self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => EndpointState::Healthy,
            Ok(resp) => {
                tracing::warn!(url = %url, status = %resp.status(), "health probe got non-2xx");
                EndpointState::Degraded
            }
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "health probe failed");
                EndpointState::Down
            }
        }
    }
}
