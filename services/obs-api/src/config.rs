//! Observation service configuration.

use std::env;
use std::time::Duration;

use reqwest::Url;
use tracing::warn;

const DEFAULT_NWS_BASE: &str = "https://api.weather.gov";
const DEFAULT_USER_AGENT: &str = "weather-link (ops@example.com)";
const DEFAULT_ZIP: &str = "67460";
const DEFAULT_LAT: f64 = 38.355;
const DEFAULT_LON: f64 = -97.666;
const DEFAULT_TIMEOUT_MS: u64 = 12_000;

/// Runtime configuration, read once at startup. Nothing here changes while
/// the service runs.
#[derive(Debug, Clone)]
pub struct ObsConfig {
    /// Primary feed endpoint. None disables the primary and the service
    /// runs fallback-only.
    pub primary_feed_url: Option<Url>,
    /// Zip parameter appended to the primary feed URL.
    pub primary_feed_zip: String,
    /// Base URL of the fallback directory/observation service.
    pub nws_base: String,
    /// User-Agent for every upstream call; the fallback service rejects
    /// anonymous clients.
    pub user_agent: String,
    /// Whether the environment supplied a User-Agent (surfaced by
    /// /api/health).
    pub user_agent_configured: bool,
    /// Coordinates for the nearest-station lookup.
    pub latitude: f64,
    pub longitude: f64,
    /// Per-attempt upstream timeout.
    pub fetch_timeout: Duration,
}

impl ObsConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let primary_feed_url = env::var("PRIMARY_FEED_URL")
            .ok()
            .and_then(|raw| match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(error = %e, "PRIMARY_FEED_URL is not a valid URL, primary feed disabled");
                    None
                }
            });

        let user_agent_env = env::var("NWS_USER_AGENT").ok();
        let user_agent_configured = user_agent_env.is_some();

        Self {
            primary_feed_url,
            primary_feed_zip: env::var("PRIMARY_FEED_ZIP")
                .unwrap_or_else(|_| DEFAULT_ZIP.to_string()),
            nws_base: env::var("NWS_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_NWS_BASE.to_string()),
            user_agent: user_agent_env.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            user_agent_configured,
            latitude: env_f64("STATION_LAT", DEFAULT_LAT),
            longitude: env_f64("STATION_LON", DEFAULT_LON),
            fetch_timeout: Duration::from_millis(env_u64(
                "UPSTREAM_TIMEOUT_MS",
                DEFAULT_TIMEOUT_MS,
            )),
        }
    }

    pub fn primary_configured(&self) -> bool {
        self.primary_feed_url.is_some()
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
