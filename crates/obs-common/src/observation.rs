//! The canonical observation record and the normalizer that produces it.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::derive::{rh_from_dewpoint, wet_bulb_c};
use crate::units::{c_to_f, deg_to_cardinal, kmh_to_mph, ms_to_mph, pa_to_in_hg};

/// One normalized weather reading. Every provider payload is converted into
/// this shape before anything downstream sees it.
///
/// Numeric fields are None when the upstream omitted the quantity or the
/// derivation produced something non-finite; they are never NaN. The
/// direction label is present exactly when the direction in degrees is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Dry-bulb air temperature, Fahrenheit.
    pub temp_f: Option<f64>,
    /// Relative humidity, percent, [0, 100].
    pub rh: Option<f64>,
    /// Same quantity as `temp_f`, kept distinct for display.
    pub dry_bulb_f: Option<f64>,
    /// Derived wet-bulb temperature, Fahrenheit.
    pub wet_bulb_f: Option<f64>,
    pub wind_mph: Option<f64>,
    /// Wind direction in degrees, reduced into [0, 360).
    pub wind_dir_deg: Option<f64>,
    /// 16-point compass label for `wind_dir_deg`.
    pub wind_dir_txt: Option<String>,
    pub pressure_in_hg: Option<f64>,
    /// Observation time; the moment of normalization when the provider
    /// omitted or mangled its own.
    pub timestamp: DateTime<Utc>,
}

/// Loosely-typed reading as a provider adapter extracted it, before unit
/// normalization. Adapters fill in whatever their payload offers and leave
/// the rest None.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReading {
    pub timestamp: Option<String>,
    pub temp_c: Option<f64>,
    pub dewpoint_c: Option<f64>,
    pub rh_pct: Option<f64>,
    pub wind_speed: Option<f64>,
    /// Unit code for `wind_speed`; matched by token, not exact value.
    pub wind_unit: Option<String>,
    pub wind_dir_deg: Option<f64>,
    pub pressure_pa: Option<f64>,
}

/// Convert a raw provider reading into the canonical observation.
///
/// Wind speed is resolved by unit token (`km_h-1`, `m_s-1`, otherwise taken
/// as mph already). Humidity falls back to the Magnus dew-point derivation,
/// wet bulb comes from Stull's fit, and every numeric output is filtered to
/// finite-or-None.
pub fn standardize(raw: RawReading) -> Observation {
    let wind_mph = raw.wind_speed.map(|speed| match raw.wind_unit.as_deref() {
        Some(unit) if unit.contains("km_h-1") => kmh_to_mph(speed),
        Some(unit) if unit.contains("m_s-1") => ms_to_mph(speed),
        _ => speed,
    });

    let rh = raw.rh_pct.or_else(|| match (raw.temp_c, raw.dewpoint_c) {
        (Some(t), Some(td)) => Some(rh_from_dewpoint(t, td)),
        _ => None,
    });

    let wet_bulb_f = match (raw.temp_c, rh) {
        (Some(t), Some(rh)) => Some(c_to_f(wet_bulb_c(t, rh))),
        _ => None,
    };

    let temp_f = finite(raw.temp_c.map(c_to_f));
    let wind_dir_deg = raw
        .wind_dir_deg
        .filter(|d| d.is_finite())
        .map(|d| d.rem_euclid(360.0));
    let wind_dir_txt = wind_dir_deg
        .and_then(deg_to_cardinal)
        .map(str::to_owned);
    let timestamp = raw
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);

    Observation {
        temp_f,
        rh: finite(rh),
        dry_bulb_f: temp_f,
        wet_bulb_f: finite(wet_bulb_f),
        wind_mph: finite(wind_mph),
        wind_dir_deg,
        wind_dir_txt,
        pressure_in_hg: finite(raw.pressure_pa.map(pa_to_in_hg)),
        timestamp,
    }
}

/// Drop non-finite values so serialized output is number-or-null.
fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Parse a provider timestamp: RFC 3339 first, then a naive
/// `YYYY-MM-DDTHH:MM:SS` treated as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }
    None
}
