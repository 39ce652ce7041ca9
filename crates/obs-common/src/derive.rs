//! Physical derivations for quantities a provider may omit.
//!
//! Relative humidity can be recovered from dry-bulb and dew-point
//! temperatures through the Magnus saturation-vapor-pressure ratio.
//! Wet-bulb temperature uses Stull's empirical fit (Stull, 2011), which is
//! accurate to a few tenths of a degree over ordinary surface conditions.

/// Saturation vapor pressure (hPa) at temperature t (degrees C), Magnus form.
fn saturation_vapor_pressure(t: f64) -> f64 {
    6.112 * (17.67 * t / (t + 243.5)).exp()
}

/// Relative humidity (%) from dry-bulb and dew-point temperature (degrees C),
/// clamped to [0, 100].
pub fn rh_from_dewpoint(temp_c: f64, dewpoint_c: f64) -> f64 {
    let rh = 100.0 * saturation_vapor_pressure(dewpoint_c) / saturation_vapor_pressure(temp_c);
    rh.clamp(0.0, 100.0)
}

/// Wet-bulb temperature (degrees C) from dry-bulb temperature (degrees C)
/// and relative humidity (%), Stull's approximation.
pub fn wet_bulb_c(temp_c: f64, rh_pct: f64) -> f64 {
    temp_c * (0.151977 * (rh_pct + 8.313659).sqrt()).atan()
        + (temp_c + rh_pct).atan()
        - (rh_pct - 1.676331).atan()
        + 0.00391838 * rh_pct.powf(1.5) * (0.023101 * rh_pct).atan()
        - 4.686035
}
