// Application state module
// Immutable configuration snapshot shared by every connection

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Shared HTTP client for outbound token requests
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            http_client: reqwest::Client::new(),
        }
    }
}
