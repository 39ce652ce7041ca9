//! Upstream observation providers and the fallback orchestration.
//!
//! The resolver tries the privately configured primary feed first, then the
//! public NWS path: resolve the nearest station for the configured
//! coordinates and fetch its latest reading. Primary failures are logged and
//! swallowed; fallback failures carry the pipeline stage that produced them.

pub mod nws;
pub mod primary;

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use obs_common::{standardize, ObsError, Observation, Station};

use crate::config::ObsConfig;
use crate::fetch::FetchClient;

/// Which provider produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Primary,
    Nws,
}

/// Pipeline position reported with a failed observation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Primary,
    NwsResolve,
    NwsFetch,
    NwsNormalize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Primary => "primary",
            Stage::NwsResolve => "nws:resolve",
            Stage::NwsFetch => "nws:fetch",
            Stage::NwsNormalize => "nws:normalize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fallback-path failure, tagged with where the pipeline stopped.
#[derive(Debug, Error)]
#[error("{stage}: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: ObsError,
}

/// A successfully resolved current observation.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentObservation {
    pub data: Observation,
    pub station: Station,
    pub source: Source,
}

/// Resolve the current observation: primary feed first, NWS fallback.
///
/// A failing primary never surfaces to the caller; whatever it did is
/// logged and the NWS path decides the outcome.
pub async fn current_observation(
    config: &ObsConfig,
    fetch: &FetchClient,
) -> Result<CurrentObservation, PipelineError> {
    if let Some(url) = &config.primary_feed_url {
        match primary::fetch_current(fetch, url, &config.primary_feed_zip, config.fetch_timeout)
            .await
        {
            Ok(data) => {
                info!("Primary feed produced the observation");
                return Ok(CurrentObservation {
                    data,
                    station: Station::primary(),
                    source: Source::Primary,
                });
            }
            Err(e) => {
                warn!(error = %e, "Primary feed failed, falling back to NWS");
            }
        }
    }

    let station = nws::resolve_nearest_station(fetch, config)
        .await
        .map_err(|e| PipelineError {
            stage: Stage::NwsResolve,
            source: e,
        })?;

    let props = nws::fetch_station_observation(fetch, config, &station)
        .await
        .map_err(|e| PipelineError {
            stage: Stage::NwsFetch,
            source: e,
        })?;

    let raw = nws::raw_reading(&props).map_err(|e| PipelineError {
        stage: Stage::NwsNormalize,
        source: e,
    })?;

    info!(station = %station.id, "NWS fallback produced the observation");

    Ok(CurrentObservation {
        data: standardize(raw),
        station,
        source: Source::Nws,
    })
}
