//! Observation API service library.
//!
//! Fetches the current weather reading from a privately configured primary
//! feed with a public NWS fallback, normalizes it into the canonical
//! observation schema, and serves it over HTTP next to the static UI.

pub mod config;
pub mod fetch;
pub mod providers;
pub mod server;
pub mod state;
