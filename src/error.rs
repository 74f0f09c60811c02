//! Error types for the di-agent service.

use di_search::SearchError;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Configuration file or value error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error (config file, listener bind).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Collector construction error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_convert() {
        let err: AgentError = SearchError::Config("max_results must be greater than 0".into()).into();
        assert!(matches!(err, AgentError::Search(_)));
        assert_eq!(
            err.to_string(),
            "search error: config error: max_results must be greater than 0"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: AgentError = std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy").into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
