//! Minimal JSON string quoting
//!
//! Only backslash, double quote and newline are escaped. Other control
//! characters pass through untouched, so prefer `serde_json` for anything
//! that must round-trip.

/// Quote `s` as a JSON string literal
pub fn json_escape(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}
