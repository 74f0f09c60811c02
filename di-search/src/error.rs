//! Error types for the di-search crate.
//!
//! These errors never cross a source task boundary: fetch and extraction
//! entry points log them and contribute an empty list instead. They surface
//! to callers only from configuration validation and client construction.

/// Errors that can occur while collecting listings.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to a source or API failed, or returned a non-200 status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A response body could not be parsed (bad selector, malformed JSON).
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid collection configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A keyed API was called without its credential.
    #[error("credential missing: {0}")]
    Credential(String),
}

/// Convenience type alias for di-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
