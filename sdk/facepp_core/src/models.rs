//! Common types shared across all Face++ crates.

use serde::{Deserialize, Serialize};

/// Fields present on every Face++ response.
///
/// Endpoint responses embed this with `#[serde(flatten)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Unique id of the request, usable when contacting support.
    #[serde(default)]
    pub request_id: String,

    /// Time the service spent on the request, in milliseconds.
    #[serde(default)]
    pub time_used: u64,

    /// Error token, only present on failed requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
