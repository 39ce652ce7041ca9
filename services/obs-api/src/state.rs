//! Application state for the observation service.

use anyhow::Result;

use crate::config::ObsConfig;
use crate::fetch::FetchClient;

/// Shared application state.
///
/// Read-only after startup; request handlers share it behind an Arc with no
/// locking.
pub struct AppState {
    pub config: ObsConfig,
    pub fetch: FetchClient,
}

impl AppState {
    /// Build state from an already-loaded configuration.
    pub fn new(config: ObsConfig) -> Result<Self> {
        let fetch = FetchClient::new(&config.user_agent)?;
        Ok(Self { config, fetch })
    }
}
