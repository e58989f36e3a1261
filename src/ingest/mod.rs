//! Request classification and content extraction
//!
//! Inspects the content type of an upload and produces a small summary:
//! the decoded text of a multipart file part, or the top-level keys of a
//! JSON body. This module knows nothing about HTTP transport beyond the
//! status each failure maps to.

mod error;
pub mod escape;
pub mod multipart;

use hyper::body::Bytes;
use serde::Serialize;
use serde_json::Value;

pub use error::IngestError;
pub use escape::json_escape;

/// Value of the `type` field in a JSON body summary
pub const JSON_BODY_TYPE: &str = "json-body";

/// One upload: content type (empty when the header is absent) and raw body
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub content_type: String,
    pub body: Bytes,
}

impl IngestRequest {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

/// Successful ingestion result, serialized as the response body
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IngestSummary {
    /// `{"text": ...}`
    FileText { text: Option<String> },
    /// `{"type": "json-body", "keys": ...}`
    JsonBody {
        #[serde(rename = "type")]
        kind: &'static str,
        keys: Option<Vec<String>>,
    },
}

impl IngestSummary {
    pub fn json_body(keys: Option<Vec<String>>) -> Self {
        Self::JsonBody {
            kind: JSON_BODY_TYPE,
            keys,
        }
    }
}

/// How a body is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Multipart,
    Json,
}

/// Content-type needles, checked top to bottom; first match wins
const CLASSIFIERS: &[(&str, BodyKind)] = &[
    ("multipart/form-data", BodyKind::Multipart),
    ("application/json", BodyKind::Json),
];

/// Classify a content type by substring match against [`CLASSIFIERS`]
pub fn classify(content_type: &str) -> Option<BodyKind> {
    CLASSIFIERS
        .iter()
        .find(|(needle, _)| content_type.contains(needle))
        .map(|&(_, kind)| kind)
}

/// Classify and extract a single upload
pub async fn ingest(req: IngestRequest) -> Result<IngestSummary, IngestError> {
    match classify(&req.content_type) {
        Some(BodyKind::Multipart) => {
            let text = multipart::extract_file_text(&req.content_type, req.body).await?;
            Ok(IngestSummary::FileText { text })
        }
        Some(BodyKind::Json) => summarize_json(&req.body),
        None => Err(IngestError::UnsupportedMediaType),
    }
}

/// Parse a JSON body and list its top-level keys (document order)
pub fn summarize_json(body: &[u8]) -> Result<IngestSummary, IngestError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting JSON body");
        IngestError::InvalidJson
    })?;

    let keys = match value {
        Value::Object(map) => Some(map.into_iter().map(|(k, _)| k).collect()),
        _ => None,
    };

    Ok(IngestSummary::json_body(keys))
}

#[cfg(test)]
mod tests {
    use super::multipart::tests::{build_body, content_type};
    use super::*;

    fn to_json(summary: &IngestSummary) -> Value {
        serde_json::to_value(summary).unwrap()
    }

    #[test]
    fn test_classify_order() {
        assert_eq!(
            classify("multipart/form-data; boundary=abc"),
            Some(BodyKind::Multipart)
        );
        assert_eq!(
            classify("application/json; charset=utf-8"),
            Some(BodyKind::Json)
        );
        // Both needles present: the earlier rule wins
        assert_eq!(
            classify("multipart/form-data; x=application/json"),
            Some(BodyKind::Multipart)
        );
        assert_eq!(classify("text/plain"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify("Application/JSON"), None);
    }

    #[test]
    fn test_object_keys_in_document_order() {
        let summary = summarize_json(br#"{"b":2,"a":1,"c":{"nested":true}}"#).unwrap();
        assert_eq!(
            to_json(&summary),
            serde_json::json!({"type": "json-body", "keys": ["b", "a", "c"]})
        );
    }

    #[test]
    fn test_non_object_has_null_keys() {
        let bodies: [&[u8]; 4] = [b"[1,2,3]", b"42", b"\"text\"", b"null"];
        for body in bodies {
            let summary = summarize_json(body).unwrap();
            assert_eq!(summary, IngestSummary::json_body(None));
        }
    }

    #[test]
    fn test_empty_object() {
        let summary = summarize_json(b"{}").unwrap();
        assert_eq!(summary, IngestSummary::json_body(Some(vec![])));
    }

    #[test]
    fn test_malformed_json() {
        assert_eq!(summarize_json(b"{bad"), Err(IngestError::InvalidJson));
        assert_eq!(summarize_json(b""), Err(IngestError::InvalidJson));
        assert_eq!(summarize_json(&[0xff, 0xfe]), Err(IngestError::InvalidJson));
    }

    #[test]
    fn test_non_finite_literals_rejected() {
        assert_eq!(summarize_json(b"NaN"), Err(IngestError::InvalidJson));
        assert_eq!(summarize_json(br#"{"a": Infinity}"#), Err(IngestError::InvalidJson));
        assert_eq!(summarize_json(br#"{"a": -Infinity}"#), Err(IngestError::InvalidJson));
    }

    #[tokio::test]
    async fn test_ingest_json() {
        let summary = ingest(IngestRequest::new("application/json", r#"{"a":1,"b":2}"#))
            .await
            .unwrap();
        assert_eq!(
            to_json(&summary),
            serde_json::json!({"type": "json-body", "keys": ["a", "b"]})
        );
    }

    #[tokio::test]
    async fn test_ingest_multipart() {
        let body = build_body(&[("upload", Some("x.json"), b"[1, 2]")]);
        let summary = ingest(IngestRequest::new(content_type(), body)).await.unwrap();
        assert_eq!(to_json(&summary), serde_json::json!({"text": "[1, 2]"}));
    }

    #[tokio::test]
    async fn test_ingest_multipart_without_file_serializes_null() {
        let body = build_body(&[("note", None, b"hi")]);
        let summary = ingest(IngestRequest::new(content_type(), body)).await.unwrap();
        assert_eq!(to_json(&summary), serde_json::json!({"text": null}));
    }

    #[tokio::test]
    async fn test_ingest_unsupported() {
        let err = ingest(IngestRequest::new("text/plain", "hello"))
            .await
            .unwrap_err();
        assert_eq!(err, IngestError::UnsupportedMediaType);

        let err = ingest(IngestRequest::new("", "hello")).await.unwrap_err();
        assert_eq!(err, IngestError::UnsupportedMediaType);
    }
}
