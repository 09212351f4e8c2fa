//! Request and response shapes for the web surface

use serde::{Deserialize, Serialize};

use crate::observability::MetricsSnapshot;

/// Raw intake form as posted by the browser
///
/// Every field is kept as text so that missing or non-numeric values reach
/// validation and re-render the form instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MashupForm {
    #[serde(default)]
    pub singer: String,
    #[serde(default)]
    pub videos: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub jobs: MetricsSnapshot,
}
