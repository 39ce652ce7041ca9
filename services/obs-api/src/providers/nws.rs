//! Adapter for the public NWS fallback.
//!
//! Two-step resolution (grid point for the configured coordinates, then the
//! first entry of its observation-stations list) followed by the station's
//! latest reading, with the one-element observation list as a backstop.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use tracing::debug;

use obs_common::{ObsError, ObsResult, RawReading, Station};

use crate::config::ObsConfig;
use crate::fetch::{FetchClient, FetchOptions};

/// Headers every NWS call carries.
fn geo_json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/geo+json"));
    headers
}

/// Append a throwaway cache-busting parameter; intermediary caches on the
/// NWS side otherwise serve stale observations.
fn cache_busted(url: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}_={}", Utc::now().timestamp_millis())
}

/// Resolve the nearest station for the configured coordinates.
///
/// "Nearest" is the first entry of the service's distance-ordered station
/// list; no geometry happens here.
pub async fn resolve_nearest_station(
    fetch: &FetchClient,
    config: &ObsConfig,
) -> ObsResult<Station> {
    let points_url = format!(
        "{}/points/{},{}",
        config.nws_base, config.latitude, config.longitude
    );
    let opts =
        FetchOptions::new("nws points", config.fetch_timeout, 1).with_headers(geo_json_headers());
    let points = fetch.fetch_json(&points_url, &opts).await?;

    let stations_url = points
        .pointer("/properties/observationStations")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ObsError::NoStationFound("points response has no observationStations link".to_string())
        })?;

    let opts =
        FetchOptions::new("nws stations", config.fetch_timeout, 1).with_headers(geo_json_headers());
    let stations = fetch.fetch_json(&cache_busted(stations_url), &opts).await?;

    let first = stations
        .pointer("/features/0")
        .ok_or_else(|| ObsError::NoStationFound("station list is empty".to_string()))?;

    Ok(station_from_feature(first))
}

/// Build a descriptor from a stations-list feature.
fn station_from_feature(feature: &Value) -> Station {
    let url = feature.get("id").and_then(Value::as_str);
    let identifier = feature
        .pointer("/properties/stationIdentifier")
        .and_then(Value::as_str)
        .or_else(|| url.and_then(|u| u.rsplit('/').next()))
        .unwrap_or("unknown");
    let name = feature
        .pointer("/properties/name")
        .and_then(Value::as_str)
        .unwrap_or(identifier);

    Station {
        id: identifier.to_string(),
        name: name.to_string(),
        url: url.map(str::to_owned),
    }
}

/// Fetch the station's current reading and return its properties bag.
pub async fn fetch_station_observation(
    fetch: &FetchClient,
    config: &ObsConfig,
    station: &Station,
) -> ObsResult<Value> {
    let base = station.url.as_deref().ok_or_else(|| {
        ObsError::NoObservationAvailable(format!("station {} has no URL", station.id))
    })?;

    let latest_url = cache_busted(&format!("{base}/observations/latest"));
    let opts =
        FetchOptions::new("nws latest", config.fetch_timeout, 0).with_headers(geo_json_headers());
    match fetch.fetch_json(&latest_url, &opts).await {
        Ok(body) => {
            if let Some(props) = body.get("properties").filter(|p| p.is_object()) {
                return Ok(props.clone());
            }
            debug!(station = %station.id, "Latest observation had no properties bag, trying list");
        }
        Err(e) => {
            debug!(station = %station.id, error = %e, "Latest observation failed, trying list");
        }
    }

    let list_url = cache_busted(&format!("{base}/observations?limit=1"));
    let opts =
        FetchOptions::new("nws list", config.fetch_timeout, 0).with_headers(geo_json_headers());
    let body = fetch
        .fetch_json(&list_url, &opts)
        .await
        .map_err(|e| ObsError::NoObservationAvailable(format!("latest and list both failed: {e}")))?;

    let feature = body.pointer("/features/0").ok_or_else(|| {
        ObsError::NoObservationAvailable("station returned no observations".to_string())
    })?;

    Ok(feature.get("properties").cloned().unwrap_or(Value::Null))
}

/// Map the standard properties bag onto the raw reading shape.
///
/// Each quantity rides in a `{value, unitCode}` wrapper and any value may
/// be null after quality control; nulls pass through as absent fields.
pub fn raw_reading(props: &Value) -> ObsResult<RawReading> {
    if !props.is_object() {
        return Err(ObsError::MissingFields(
            "station reading has no properties bag".to_string(),
        ));
    }

    Ok(RawReading {
        timestamp: props
            .get("timestamp")
            .and_then(Value::as_str)
            .map(str::to_owned),
        temp_c: value_of(props, "temperature"),
        dewpoint_c: value_of(props, "dewpoint"),
        rh_pct: value_of(props, "relativeHumidity"),
        wind_speed: value_of(props, "windSpeed"),
        wind_unit: Some(
            props
                .pointer("/windSpeed/unitCode")
                .and_then(Value::as_str)
                .unwrap_or("m_s-1")
                .to_string(),
        ),
        wind_dir_deg: value_of(props, "windDirection"),
        pressure_pa: value_of(props, "barometricPressure")
            .or_else(|| value_of(props, "seaLevelPressure")),
    })
}

/// The `.value` of a quantity wrapper, absent when null.
fn value_of(props: &Value, field: &str) -> Option<f64> {
    props
        .pointer(&format!("/{field}/value"))
        .and_then(Value::as_f64)
}
