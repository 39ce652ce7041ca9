//! Unit conversions for observation quantities.

/// The 16-point compass rose, clockwise from north.
pub const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Celsius to Fahrenheit.
pub fn c_to_f(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Fahrenheit to Celsius.
pub fn f_to_c(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Kilometers per hour to miles per hour.
pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh / 1.609344
}

/// Meters per second to miles per hour.
pub fn ms_to_mph(ms: f64) -> f64 {
    ms * 2.23693629
}

/// Pascals to inches of mercury.
pub fn pa_to_in_hg(pa: f64) -> f64 {
    pa / 3386.389
}

/// Inches of mercury to pascals.
pub fn in_hg_to_pa(in_hg: f64) -> f64 {
    in_hg * 3386.389
}

/// Map a wind direction in degrees to its 16-point compass label.
///
/// Degrees are reduced into [0, 360) first, so negative or over-rotated
/// inputs still land on a label. Non-finite input maps to None.
pub fn deg_to_cardinal(deg: f64) -> Option<&'static str> {
    if !deg.is_finite() {
        return None;
    }
    let sector = (deg.rem_euclid(360.0) / 22.5).round() as usize % 16;
    Some(COMPASS_POINTS[sector])
}
