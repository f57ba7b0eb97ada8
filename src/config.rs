#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub vehicles_csv: String,
    /// `(name, base_url)` pairs, highest priority first.
    pub upstreams: Vec<(String, String)>,
    pub probe_interval_secs: u64,
    pub probe_timeout_ms: u64,
    pub forward_timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            vehicles_csv: std::env::var("VEHICLES_CSV")
                .unwrap_or_else(|_| "data/vehicles.csv".to_string()),
            upstreams: parse_upstreams(&std::env::var("UPSTREAM_URLS").unwrap_or_else(|_| {
                "main-app=http://localhost:8000,attribute-server=http://localhost:8002".to_string()
            })),
            probe_interval_secs: env_u64("PROBE_INTERVAL_SECS", 10),
            probe_timeout_ms: env_u64("PROBE_TIMEOUT_MS", 2000),
            forward_timeout_ms: env_u64("FORWARD_TIMEOUT_MS", 2500),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

/// Parses `name=url,name=url` in priority order; entries without a `=` or
/// with an empty side are dropped.
pub fn parse_upstreams(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|entry| {
            let (name, url) = entry.split_once('=')?;
            let name = name.trim();
            let url = url.trim().trim_end_matches('/');
            if name.is_empty() || url.is_empty() {
                return None;
            }
            Some((name.to_string(), url.to_string()))
        })
        .collect()
}
