//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format, content type in place of referer)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variables`

use chrono::{DateTime, Local};
use std::time::Duration;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// One served request, captured after the response is built
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// HTTP version without the `HTTP/` prefix
    pub http_version: String,
    pub status: u16,
    /// Declared request body size, when known
    pub request_bytes: Option<u64>,
    /// Response body size
    pub body_bytes: usize,
    /// Request `Content-Type`, which decides how the upload is read
    pub content_type: Option<String>,
    pub user_agent: Option<String>,
    pub elapsed: Duration,
}

impl AccessLogEntry {
    /// Create a new entry stamped with the current local time
    pub fn new(remote_addr: impl Into<String>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            remote_addr: remote_addr.into(),
            time: Local::now(),
            method: method.into(),
            path: path.into(),
            http_version: "1.1".to_string(),
            status: 200,
            request_bytes: None,
            body_bytes: 0,
            content_type: None,
            user_agent: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                or_dash(self.content_type.as_deref()),
                or_dash(self.user_agent.as_deref()),
            ),
            "common" => self.format_common(),
            "json" => self.format_json(),
            pattern => self.format_custom(pattern),
        }
    }

    fn request_line(&self) -> String {
        format!("{} {} HTTP/{}", self.method, self.path, self.http_version)
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "http_version": self.http_version,
            "status": self.status,
            "request_bytes": self.request_bytes,
            "body_bytes": self.body_bytes,
            "content_type": self.content_type,
            "user_agent": self.user_agent,
            "request_time_us": u64::try_from(self.elapsed.as_micros()).unwrap_or(u64::MAX),
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$request_length`,
    /// `$request_time` (seconds, 3 decimals), `$status`, `$body_bytes_sent`,
    /// `$content_type`, `$http_user_agent`.
    fn format_custom(&self, pattern: &str) -> String {
        // Longer names sharing a prefix must be replaced first
        let vars = [
            ("$remote_addr", self.remote_addr.clone()),
            ("$time_local", self.time.format(CLF_TIME).to_string()),
            ("$time_iso8601", self.time.to_rfc3339()),
            ("$request_time", format!("{:.3}", self.elapsed.as_secs_f64())),
            ("$request_method", self.method.clone()),
            ("$request_uri", self.path.clone()),
            (
                "$request_length",
                self.request_bytes.map_or_else(|| "-".to_string(), |n| n.to_string()),
            ),
            ("$request", self.request_line()),
            ("$status", self.status.to_string()),
            ("$body_bytes_sent", self.body_bytes.to_string()),
            ("$content_type", or_dash(self.content_type.as_deref()).to_string()),
            ("$http_user_agent", or_dash(self.user_agent.as_deref()).to_string()),
        ];

        vars.iter()
            .fold(pattern.to_string(), |acc, (name, value)| acc.replace(name, value))
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new("10.0.0.7", "POST", "/api/file_to_text");
        entry.status = 200;
        entry.request_bytes = Some(512);
        entry.body_bytes = 42;
        entry.content_type = Some("multipart/form-data; boundary=xyz".to_string());
        entry.user_agent = Some("curl/8.5.0".to_string());
        entry.elapsed = Duration::from_micros(1500);
        entry
    }

    #[test]
    fn test_format_common() {
        let log = upload_entry().format("common");
        assert!(log.starts_with("10.0.0.7 - - ["));
        assert!(log.contains("\"POST /api/file_to_text HTTP/1.1\" 200 42"));
        assert!(!log.contains("curl"));
    }

    #[test]
    fn test_format_combined_appends_content_type_and_agent() {
        let log = upload_entry().format("combined");
        assert!(log.contains("\"POST /api/file_to_text HTTP/1.1\" 200 42"));
        assert!(log.ends_with("\"multipart/form-data; boundary=xyz\" \"curl/8.5.0\""));
    }

    #[test]
    fn test_format_combined_missing_headers() {
        let mut entry = upload_entry();
        entry.content_type = None;
        entry.user_agent = None;
        assert!(entry.format("combined").ends_with("\"-\" \"-\""));
    }

    #[test]
    fn test_format_json_is_valid() {
        let log = upload_entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["method"], "POST");
        assert_eq!(value["status"], 200);
        assert_eq!(value["request_bytes"], 512);
        assert_eq!(value["request_time_us"], 1500);
        assert_eq!(value["content_type"], "multipart/form-data; boundary=xyz");
    }

    #[test]
    fn test_format_custom() {
        let log = upload_entry().format("$request_method $request_uri $status $request_length $request_time");
        assert_eq!(log, "POST /api/file_to_text 200 512 0.002");
    }

    #[test]
    fn test_format_custom_request_not_clobbering_longer_names() {
        let log = upload_entry().format("[$request] [$request_time]");
        assert_eq!(log, "[POST /api/file_to_text HTTP/1.1] [0.002]");
    }
}
