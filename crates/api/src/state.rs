use std::sync::Arc;

use vidrelay_core::clock::SystemClock;
use vidrelay_core::simulator::SimulatedJobs;
use vidrelay_upstream::api::{ClientBuildError, UpstreamClient};

use crate::config::{GenerationMode, ServerConfig};

/// The component that serves job operations, fixed at startup.
#[derive(Clone)]
pub enum JobBackend {
    /// In-memory lifecycle emulation.
    Simulated(Arc<SimulatedJobs>),
    /// Passthrough to the upstream provider.
    Proxy(Arc<UpstreamClient>),
}

impl JobBackend {
    /// Build the backend selected by `config.mode`.
    ///
    /// A missing upstream credential is not an error here: proxy requests
    /// fail individually with a configuration error until one is provided.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ClientBuildError> {
        match config.mode {
            GenerationMode::Simulate => Ok(JobBackend::Simulated(Arc::new(SimulatedJobs::new(
                config.simulator.clone(),
                Arc::new(SystemClock),
            )))),
            GenerationMode::Proxy => {
                let client = UpstreamClient::new(config.upstream.clone())?;
                if !client.has_credential() {
                    tracing::warn!("UPSTREAM_API_KEY is not set; proxied requests will fail");
                }
                Ok(JobBackend::Proxy(Arc::new(client)))
            }
        }
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Active job backend.
    pub backend: JobBackend,
}
