//! Logger module
//!
//! Thin façade over `tracing` for the server:
//! - Subscriber setup (plain or JSON output, `RUST_LOG` override)
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Target used for access log lines so they can be filtered separately
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// Should be called once at application startup. A second call is a no-op.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("[WARN] Logger already initialized: {e}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("file-to-text server started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Ingest endpoint: POST {}", config.routes.ingest_path);
    tracing::info!("Health endpoint: GET {}", config.routes.health_path);
    tracing::info!("Max body size: {} bytes", config.http.max_body_size);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(max_conn) = config.performance.max_connections {
        tracing::info!("Max connections: {max_conn}");
    }
    tracing::info!("======================================");
}

pub fn log_shutdown() {
    tracing::info!("[Shutdown] Accept loop stopped");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    tracing::info!(target: ACCESS_TARGET, "{line}");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Shared buffer a test subscriber writes formatted events into
    #[derive(Clone, Default)]
    pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Route this thread's events into a buffer until the guard drops
    pub fn capture() -> (CapturedLog, tracing::subscriber::DefaultGuard) {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        (log, tracing::subscriber::set_default(subscriber))
    }

    #[test]
    fn test_level_is_not_repeated_in_message() {
        let (log, _guard) = capture();
        log_error("disk full");
        log_warning("slow client");
        log_connection_error(&"reset by peer");

        let output = log.contents();
        assert!(output.contains("ERROR"), "log: {output}");
        assert!(output.contains("WARN"), "log: {output}");
        assert!(output.contains("disk full"));
        assert!(output.contains("Failed to serve connection"));
        assert!(!output.contains("[ERROR]"), "log: {output}");
        assert!(!output.contains("[WARN]"), "log: {output}");
    }

    #[test]
    fn test_access_line_uses_access_target() {
        let (log, _guard) = capture();
        let entry = AccessLogEntry::new("10.0.0.1".to_string(), "POST", "/api/file_to_text");
        log_access(&entry, "$remote_addr $request_method $request_uri");

        let output = log.contents();
        assert!(output.contains(ACCESS_TARGET), "log: {output}");
        assert!(output.contains("10.0.0.1 POST /api/file_to_text"), "log: {output}");
    }
}
