use serde::{Deserialize, Serialize};

/// Runtime configuration for the dashboard data layer.
///
/// Behavioral constants fixed by the dashboard contract (the 365-day
/// resolution outlier cap, the 5-entry recent-tickets list) are not
/// configurable; they live next to the calculators that use them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    /// Base URL of the admin REST API, without trailing slash.
    pub base_url: String,
    /// Page size for the ticket listing. Large enough to behave as
    /// "fetch all" at expected volumes.
    pub page_size: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Display cap for the recent-activity feed.
    pub activity_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://localhost:8000/api".to_string(),
            page_size: 1000,
            timeout_secs: 30,
            activity_limit: 10,
        }
    }
}
