//! file-to-text
//!
//! A small HTTP ingestion service: accepts a `multipart/form-data` upload
//! carrying one text/JSON file, or a raw `application/json` body, and
//! answers with a JSON summary of the content.

pub mod bot;
pub mod config;
pub mod handler;
pub mod http;
pub mod ingest;
pub mod logger;
pub mod server;
