//! Bot Framework token acquisition
//!
//! OAuth2 client-credentials exchange against the Bot Framework login
//! endpoint. The ingestion path never calls this; the server only uses it to
//! check credentials at startup when asked to.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::{AppState, BotConfig};
use crate::logger;

/// Bot Framework token endpoint
pub const TOKEN_URL: &str = "https://login.microsoftonline.com/botframework.com/oauth2/v2.0/token";

/// Scope requested for Bot Connector access
pub const BOT_FRAMEWORK_SCOPE: &str = "https://api.botframework.com/.default";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token endpoint returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("token response has no access_token")]
    MissingToken,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Default bound on a single token request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client-credentials token client bound to one endpoint and scope
#[derive(Debug, Clone)]
pub struct BotTokenClient {
    client: reqwest::Client,
    token_url: String,
    scope: String,
    timeout: Duration,
}

impl BotTokenClient {
    pub fn new(client: reqwest::Client, token_url: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            scope: scope.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &BotConfig) -> Self {
        Self::new(client, &config.token_url, &config.scope).with_timeout(config.timeout())
    }

    /// Fail a request that has not completed within `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exchange an app id / secret pair for an access token
    pub async fn get_bot_token(&self, app_id: &str, secret: &str) -> Result<String, TokenError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", app_id),
            ("client_secret", secret),
            ("scope", self.scope.as_str()),
        ];

        let resp = self
            .client
            .post(&self.token_url)
            .timeout(self.timeout)
            .form(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TokenError::Status { status, body });
        }

        resp.json::<TokenResponse>()
            .await?
            .access_token
            .ok_or(TokenError::MissingToken)
    }
}

/// Acquire one token with the configured credentials and log the outcome.
///
/// Returns whether a token was obtained. Never logs the token itself.
pub async fn verify_credentials(state: &AppState) -> bool {
    let bot = &state.config.bot;
    let Some((app_id, secret)) = bot.credentials() else {
        logger::log_warning("bot.verify_on_startup is set but bot credentials are missing");
        return false;
    };

    let client = BotTokenClient::from_config(state.http_client.clone(), bot);
    match client.get_bot_token(app_id, secret).await {
        Ok(_) => {
            logger::log_info(&format!("[Bot] Token acquired for app id {app_id}"));
            true
        }
        Err(e) => {
            logger::log_error(&format!("[Bot] Token acquisition failed: {e}"));
            false
        }
    }
}
