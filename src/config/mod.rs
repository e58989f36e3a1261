// Configuration module entry point
// Loads layered settings (file, environment, defaults) and holds shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{
    BotConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, RoutesConfig, ServerConfig,
};

/// Environment variable prefix, e.g. `FILE_TO_TEXT_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "FILE_TO_TEXT";

impl Config {
    /// Load configuration from the default "config" file (any supported extension)
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "file-to-text/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("routes.ingest_path", "/api/file_to_text")?
            .set_default("routes.health_path", "/healthz")?
            .set_default("bot.token_url", crate::bot::TOKEN_URL)?
            .set_default("bot.scope", crate::bot::BOT_FRAMEWORK_SCOPE)?
            .set_default("bot.verify_on_startup", false)?
            .set_default("bot.timeout_secs", 10)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Per-connection deadline covering both read and write phases
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}
