//! Common types and utilities shared across the weather-link services.

pub mod derive;
pub mod error;
pub mod observation;
pub mod station;
pub mod units;

pub use error::{ObsError, ObsResult};
pub use observation::{standardize, Observation, RawReading};
pub use station::Station;
