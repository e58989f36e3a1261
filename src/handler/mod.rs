//! Request handler module
//!
//! Routes requests to the health probe or the ingestion endpoint and turns
//! ingestion outcomes into HTTP responses.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
