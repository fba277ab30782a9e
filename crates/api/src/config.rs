use std::time::Duration;

use vidrelay_core::simulator::SimulatorConfig;
use vidrelay_upstream::api::UpstreamConfig;

/// Which job backend serves `/api/v1/videos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Emulate the provider in memory.
    Simulate,
    /// Forward every call to the upstream provider.
    Proxy,
}

impl GenerationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationMode::Simulate => "simulate",
            GenerationMode::Proxy => "proxy",
        }
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulate" | "simulation" | "sim" => Ok(GenerationMode::Simulate),
            "proxy" | "upstream" => Ok(GenerationMode::Proxy),
            other => Err(format!(
                "unknown generation mode '{other}' (expected 'simulate' or 'proxy')"
            )),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Directory served as the router fallback, if it exists.
    pub static_dir: String,
    /// Active job backend.
    pub mode: GenerationMode,
    /// Upstream provider settings (used in proxy mode).
    pub upstream: UpstreamConfig,
    /// Simulator settings (used in simulate mode).
    pub simulator: SimulatorConfig,
    /// How often the retention sweep runs.
    pub sweep_interval: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                      |
    /// |----------------------------------|------------------------------|
    /// | `HOST`                           | `0.0.0.0`                    |
    /// | `PORT`                           | `3000`                       |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173`      |
    /// | `REQUEST_TIMEOUT_SECS`           | `60`                         |
    /// | `STATIC_DIR`                     | `public`                     |
    /// | `GENERATION_MODE`                | `simulate`                   |
    /// | `UPSTREAM_BASE_URL`              | `https://api.example.com/v1` |
    /// | `UPSTREAM_API_KEY`               | unset                        |
    /// | `UPSTREAM_TIMEOUT_SECS`          | `30`                         |
    /// | `SIMULATION_PROCESSING_DELAY_MS` | `1000`                       |
    /// | `SIMULATION_COMPLETION_DELAY_MS` | `5000`                       |
    /// | `SIMULATION_FAILURE_RATE`        | `0.0`                        |
    /// | `SIMULATION_VIDEO_BASE_URL`      | `https://example.com/videos` |
    /// | `SIMULATION_RETENTION_SECS`      | `3600`                       |
    /// | `SIMULATION_SWEEP_INTERVAL_SECS` | `60`                         |
    ///
    /// Panics on unparseable values; misconfiguration should stop startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// [`ServerConfig::from_env`] delegates here; tests pass a map instead of
    /// touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");

        let port: u16 = var("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS", "60")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let static_dir = var("STATIC_DIR", "public");

        let mode: GenerationMode = var("GENERATION_MODE", "simulate")
            .parse()
            .unwrap_or_else(|e| panic!("GENERATION_MODE is invalid: {e}"));

        let upstream_timeout_secs: u64 = var("UPSTREAM_TIMEOUT_SECS", "30")
            .parse()
            .expect("UPSTREAM_TIMEOUT_SECS must be a valid u64");

        let upstream = UpstreamConfig {
            base_url: var("UPSTREAM_BASE_URL", "https://api.example.com/v1"),
            api_key: lookup("UPSTREAM_API_KEY").filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(upstream_timeout_secs),
        };

        let processing_delay_ms: u64 = var("SIMULATION_PROCESSING_DELAY_MS", "1000")
            .parse()
            .expect("SIMULATION_PROCESSING_DELAY_MS must be a valid u64");

        let completion_delay_ms: u64 = var("SIMULATION_COMPLETION_DELAY_MS", "5000")
            .parse()
            .expect("SIMULATION_COMPLETION_DELAY_MS must be a valid u64");

        let failure_rate: f64 = var("SIMULATION_FAILURE_RATE", "0.0")
            .parse()
            .expect("SIMULATION_FAILURE_RATE must be a number between 0 and 1");

        let retention_secs: u64 = var("SIMULATION_RETENTION_SECS", "3600")
            .parse()
            .expect("SIMULATION_RETENTION_SECS must be a valid u64");

        let sweep_interval_secs: u64 = var("SIMULATION_SWEEP_INTERVAL_SECS", "60")
            .parse()
            .expect("SIMULATION_SWEEP_INTERVAL_SECS must be a valid u64");

        let simulator = SimulatorConfig {
            processing_delay: Duration::from_millis(processing_delay_ms),
            completion_delay: Duration::from_millis(completion_delay_ms),
            failure_rate,
            video_base_url: var("SIMULATION_VIDEO_BASE_URL", "https://example.com/videos"),
            retention: Duration::from_secs(retention_secs),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            static_dir,
            mode,
            upstream,
            simulator,
            // tokio::time::interval panics on a zero period.
            sweep_interval: Duration::from_secs(sweep_interval_secs.max(1)),
        }
    }
}
