//! Error types for weather-link services.

use thiserror::Error;

/// Result type alias using ObsError.
pub type ObsResult<T> = Result<T, ObsError>;

/// Primary error type for the observation pipeline.
#[derive(Debug, Error)]
pub enum ObsError {
    // === Upstream Transport Errors ===
    #[error("[{tag}] request to {url} failed: {message}")]
    UpstreamNetwork {
        tag: String,
        url: String,
        message: String,
    },

    #[error("[{tag}] HTTP {status} from {url}: {body_snippet}")]
    UpstreamHttp {
        tag: String,
        status: u16,
        url: String,
        body_snippet: String,
    },

    #[error("[{tag}] non-JSON response from {url}: {body_snippet}")]
    UpstreamFormat {
        tag: String,
        url: String,
        body_snippet: String,
    },

    // === Resolution Errors ===
    #[error("no observation station found: {0}")]
    NoStationFound(String),

    #[error("no observation available: {0}")]
    NoObservationAvailable(String),

    #[error("payload missing usable fields: {0}")]
    MissingFields(String),
}
