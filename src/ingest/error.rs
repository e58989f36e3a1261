//! Ingestion failure kinds
//!
//! `Display` is the exact plain-text body sent to the client; the transport
//! layer only asks for [`IngestError::status`].

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// The uploaded file part is not valid UTF-8
    #[error("Invalid text encoding (expect UTF-8).")]
    InvalidEncoding,

    /// The `application/json` body failed to parse
    #[error("Invalid JSON body.")]
    InvalidJson,

    /// Neither multipart nor JSON
    #[error("Use multipart/form-data with a JSON file (field name arbitrary).")]
    UnsupportedMediaType,

    /// Anything else, carrying the raw detail (malformed multipart, unreadable body)
    #[error("Server error: {0}")]
    Internal(String),
}

impl IngestError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEncoding | Self::InvalidJson => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
