//! Adapter for the privately configured primary feed.
//!
//! The upstream schema is not pinned down, so each raw field is extracted
//! by probing an ordered list of candidate keys, first match wins. Values
//! may arrive as JSON numbers or numeric strings.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use reqwest::Url;
use serde_json::Value;

use obs_common::units::{f_to_c, in_hg_to_pa};
use obs_common::{standardize, ObsError, ObsResult, Observation, RawReading};

use crate::fetch::{FetchClient, FetchOptions};

/// Keys that may wrap the actual reading one level down.
const NESTED_KEYS: [&str; 3] = ["current", "observation", "data"];

/// Fetch the primary feed and adapt its reading.
pub async fn fetch_current(
    fetch: &FetchClient,
    url: &Url,
    zip: &str,
    timeout: Duration,
) -> ObsResult<Observation> {
    let url = feed_url(url, zip);

    let opts = FetchOptions::new("primary", timeout, 0);
    let body = fetch.fetch_json(url.as_str(), &opts).await?;

    let src = reading_source(&body).ok_or_else(|| {
        ObsError::MissingFields("primary payload is not a JSON object".to_string())
    })?;

    Ok(standardize(raw_reading(src)))
}

/// The feed URL with the configured zip. A zip already present on the
/// configured URL is replaced, not duplicated.
fn feed_url(url: &Url, zip: &str) -> Url {
    let mut url = url.clone();
    if zip.is_empty() {
        return url;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "zip")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("zip", zip);
    url
}

/// Locate the object holding the reading: a known wrapper key, else the
/// payload root.
fn reading_source(body: &Value) -> Option<&Value> {
    for key in NESTED_KEYS {
        if let Some(nested) = body.get(key) {
            if nested.is_object() {
                return Some(nested);
            }
        }
    }
    body.is_object().then_some(body)
}

/// Map the probed object onto the raw reading shape.
fn raw_reading(src: &Value) -> RawReading {
    let temp_c = num_first(src, &["/tempC", "/temperatureC"])
        .or_else(|| num_first(src, &["/tempF"]).map(f_to_c));
    let dewpoint_c =
        num_first(src, &["/dewpointC"]).or_else(|| num_first(src, &["/dewpointF"]).map(f_to_c));
    let pressure_pa = num_first(src, &["/pressurePa"])
        .or_else(|| num_first(src, &["/pressureInHg"]).map(in_hg_to_pa))
        .or_else(|| num_first(src, &["/barometricPressurePa", "/barometric_pressure_pa"]));

    RawReading {
        timestamp: timestamp_first(src, &["/timestamp", "/obsTime", "/time"]),
        temp_c,
        dewpoint_c,
        rh_pct: num_first(src, &["/humidity", "/relativeHumidity", "/rh"]),
        wind_speed: num_first(src, &["/windSpeed", "/wind_speed", "/wind/speed"]),
        wind_unit: Some(
            str_first(src, &["/windUnit", "/wind_unit"]).unwrap_or_else(|| "m_s-1".to_string()),
        ),
        wind_dir_deg: num_first(src, &["/windDir", "/wind_direction", "/wind/directionDeg"]),
        pressure_pa,
    }
}

/// First candidate pointer holding a number or numeric string.
fn num_first(src: &Value, pointers: &[&str]) -> Option<f64> {
    pointers
        .iter()
        .find_map(|p| src.pointer(p).and_then(coerce_num))
}

fn str_first(src: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .find_map(|p| src.pointer(p).and_then(Value::as_str))
        .map(str::to_owned)
}

/// Accept numbers and numeric strings; anything else counts as absent.
fn coerce_num(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Timestamps may be strings or epoch milliseconds.
fn timestamp_first(src: &Value, pointers: &[&str]) -> Option<String> {
    pointers.iter().find_map(|p| match src.pointer(p)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .map(|dt| dt.to_rfc3339()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feed_url_appends_zip() {
        let url = Url::parse("https://feed.example.com/current").unwrap();
        assert_eq!(
            feed_url(&url, "67460").as_str(),
            "https://feed.example.com/current?zip=67460"
        );
    }

    #[test]
    fn test_feed_url_replaces_existing_zip() {
        let url = Url::parse("https://feed.example.com/current?zip=11111&units=us").unwrap();
        assert_eq!(
            feed_url(&url, "67460").as_str(),
            "https://feed.example.com/current?units=us&zip=67460"
        );
    }

    #[test]
    fn test_feed_url_empty_zip_leaves_url_alone() {
        let url = Url::parse("https://feed.example.com/current?zip=11111").unwrap();
        assert_eq!(feed_url(&url, ""), url);
    }

    #[test]
    fn test_reading_source_prefers_wrapper_objects() {
        let body = json!({"current": {"tempC": 20.0}, "other": 1});
        assert_eq!(reading_source(&body).unwrap()["tempC"], 20.0);

        let body = json!({"tempC": 20.0});
        assert!(reading_source(&body).unwrap().get("tempC").is_some());
    }

    #[test]
    fn test_reading_source_skips_non_object_wrappers() {
        let body = json!({"current": "down", "data": {"tempF": 70.0}});
        assert!(reading_source(&body).unwrap().get("tempF").is_some());
    }

    #[test]
    fn test_reading_source_rejects_non_objects() {
        assert!(reading_source(&json!("just a string")).is_none());
        assert!(reading_source(&json!([1, 2, 3])).is_none());
        assert!(reading_source(&json!(null)).is_none());
    }

    #[test]
    fn test_first_match_wins_for_temperature() {
        let raw = raw_reading(&json!({"tempC": 20.0, "tempF": 100.0}));
        assert_eq!(raw.temp_c, Some(20.0));
    }

    #[test]
    fn test_fahrenheit_fields_converted() {
        let raw = raw_reading(&json!({"tempF": 70.0, "dewpointF": 50.0}));
        assert!((raw.temp_c.unwrap() - 21.1111).abs() < 1e-3);
        assert!((raw.dewpoint_c.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_strings_coerced() {
        let raw = raw_reading(&json!({"humidity": "45", "windSpeed": " 10.5 "}));
        assert_eq!(raw.rh_pct, Some(45.0));
        assert_eq!(raw.wind_speed, Some(10.5));
    }

    #[test]
    fn test_non_numeric_values_ignored() {
        let raw = raw_reading(&json!({"humidity": "calm", "windSpeed": true}));
        assert_eq!(raw.rh_pct, None);
        assert_eq!(raw.wind_speed, None);
    }

    #[test]
    fn test_nested_wind_fields() {
        let raw = raw_reading(&json!({"wind": {"speed": 4.0, "directionDeg": 90.0}}));
        assert_eq!(raw.wind_speed, Some(4.0));
        assert_eq!(raw.wind_dir_deg, Some(90.0));
    }

    #[test]
    fn test_pressure_candidate_order() {
        let raw = raw_reading(&json!({"pressureInHg": 29.92}));
        assert!((raw.pressure_pa.unwrap() - 101320.758).abs() < 0.01);

        let raw = raw_reading(&json!({"barometric_pressure_pa": 100000.0}));
        assert_eq!(raw.pressure_pa, Some(100000.0));

        let raw = raw_reading(&json!({"pressurePa": 1.0, "pressureInHg": 29.92}));
        assert_eq!(raw.pressure_pa, Some(1.0));
    }

    #[test]
    fn test_wind_unit_defaults_to_m_s() {
        let raw = raw_reading(&json!({"windSpeed": 5.0}));
        assert_eq!(raw.wind_unit.as_deref(), Some("m_s-1"));

        let raw = raw_reading(&json!({"windSpeed": 5.0, "windUnit": "mph"}));
        assert_eq!(raw.wind_unit.as_deref(), Some("mph"));
    }

    #[test]
    fn test_epoch_millis_timestamp_coerced() {
        let raw = raw_reading(&json!({"timestamp": 1705320000000i64}));
        assert!(raw.timestamp.unwrap().starts_with("2024-01-15T12:00:00"));
    }

    #[test]
    fn test_string_timestamp_passed_through() {
        let raw = raw_reading(&json!({"obsTime": "2024-01-15T12:00:00Z"}));
        assert_eq!(raw.timestamp.as_deref(), Some("2024-01-15T12:00:00Z"));
    }
}
