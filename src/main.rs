use attribute_proxy::config::AppConfig;
use attribute_proxy::http::server;
use attribute_proxy::store::RecordTable;
use attribute_proxy::upstream::forward::Forwarder;
use attribute_proxy::upstream::probe::HealthProber;
use attribute_proxy::upstream::EndpointRegistry;
use attribute_proxy::AppState;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let table = match RecordTable::load(Path::new(&cfg.vehicles_csv)) {
        Ok(table) => {
            tracing::info!(
                path = %cfg.vehicles_csv,
                records = table.len(),
                skipped = table.skipped,
                "loaded vehicle dataset"
            );
            table
        }
        Err(err) => {
            // Missing dataset is not an error for the rest of the system;
            // the demo stays usable on the built-in fixture table.
            tracing::warn!(path = %cfg.vehicles_csv, error = %err, "using synthetic dataset");
            RecordTable::synthetic()
        }
    };

    let registry = EndpointRegistry::new(cfg.upstreams.clone());
    for (name, url) in &cfg.upstreams {
        tracing::info!(upstream = %name, url = %url, "configured upstream");
    }

    let prober = HealthProber {
        registry: registry.clone(),
        client: reqwest::Client::new(),
        interval: Duration::from_secs(cfg.probe_interval_secs),
        probe_timeout: Duration::from_millis(cfg.probe_timeout_ms),
    };
    tokio::spawn(prober.run());

    let state = AppState {
        table: Arc::new(table),
        registry,
        forwarder: Forwarder {
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(cfg.forward_timeout_ms),
        },
    };

    let app = server::app(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
