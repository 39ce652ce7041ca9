//! Station descriptors for upstream observation sources.

use serde::{Deserialize, Serialize};

/// Identifies which upstream source produced a reading.
///
/// Display-only: the normalizer never inspects it. The URL is present for
/// fallback stations and absent for the primary feed, whose identity is a
/// private configuration detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Station {
    /// The fixed opaque descriptor reported for the primary feed.
    pub fn primary() -> Self {
        Self {
            id: "primary".to_string(),
            name: "primary".to_string(),
            url: None,
        }
    }
}
