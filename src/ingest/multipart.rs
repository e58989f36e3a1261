//! Multipart file-part extraction
//!
//! Walks every part of a `multipart/form-data` body and decodes the content of
//! parts that declare a `filename=` in their `Content-Disposition` header.

use std::convert::Infallible;

use hyper::body::Bytes;
use hyper::header::CONTENT_DISPOSITION;

use super::IngestError;

/// Decode the text of the file part in a multipart body.
///
/// Every filename-bearing part is decoded and the last one wins. A part that
/// is not valid UTF-8 fails the whole request immediately. Returns `Ok(None)`
/// when no part carries a filename.
pub async fn extract_file_text(
    content_type: &str,
    body: Bytes,
) -> Result<Option<String>, IngestError> {
    let boundary = multer::parse_boundary(content_type)
        .or_else(|e| boundary_param(content_type).ok_or(e))
        .map_err(IngestError::internal)?;
    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut file_text = None;

    while let Some(field) = multipart.next_field().await.map_err(IngestError::internal)? {
        let disposition = field
            .headers()
            .get(CONTENT_DISPOSITION)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();

        if !disposition.contains("filename=") {
            continue;
        }

        let filename = parse_filename(&disposition);
        let content = field.bytes().await.map_err(IngestError::internal)?;
        let text = std::str::from_utf8(&content).map_err(|_| {
            tracing::debug!(filename = ?filename, "file part is not valid UTF-8");
            IngestError::InvalidEncoding
        })?;

        tracing::debug!(filename = ?filename, bytes = content.len(), "decoded file part");
        file_text = Some(text.to_owned());
    }

    Ok(file_text)
}

/// Read the `boundary` parameter of any `multipart/*` content type.
///
/// Covers values the strict parser turns away, such as a `multipart/mixed`
/// header that only reached this path through a parameter mentioning
/// `multipart/form-data`.
fn boundary_param(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';').map(str::trim);
    let essence = params.next()?.to_ascii_lowercase();
    if !essence.starts_with("multipart/") {
        return None;
    }

    params
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|boundary| !boundary.is_empty())
}

/// Pull the filename out of a `Content-Disposition` value.
///
/// `form-data; name="file"; filename="report.json"` yields `report.json`.
/// Surrounding quotes are stripped; `filename*=` is not recognised.
pub fn parse_filename(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find(|token| token.starts_with("filename="))
        .and_then(|token| token.split_once('='))
        .map(|(_, value)| value.trim_matches('"').to_string())
}
