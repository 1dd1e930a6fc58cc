//! Error types for the localization library.
//!
//! None of these errors are fatal to a lookup: providers recover from them
//! locally by keeping their previous string table, and the resolver reports
//! missing data as `None`. They exist so that loaders, fetchers and stores
//! can describe *why* something degraded, mostly for logging.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocalizationError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request to {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON payload is neither a language map nor a string map")]
    UnrecognizedShape,

    #[error("single-language payload requires a configured language")]
    MissingLanguage,

    #[error("provider has no remote source configured")]
    NoRemoteSource,

    #[error("preference store error: {0}")]
    Storage(String),
}

impl LocalizationError {
    /// Whether a transport retry could plausibly succeed.
    ///
    /// Client errors (4xx) and malformed payloads are permanent for a given
    /// source; network failures and server errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } | Self::Io { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LocalizationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_transient() {
        let err = LocalizationError::HttpStatus {
            url: "https://example.com/strings.json".to_string(),
            status: 503,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        let err = LocalizationError::HttpStatus {
            url: "https://example.com/strings.json".to_string(),
            status: 404,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_rate_limit_is_transient() {
        let err = LocalizationError::HttpStatus {
            url: "https://example.com/strings.json".to_string(),
            status: 429,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_shape_errors_are_not_transient() {
        assert!(!LocalizationError::UnrecognizedShape.is_transient());
        assert!(!LocalizationError::MissingLanguage.is_transient());
    }

    #[test]
    fn test_display_includes_status() {
        let err = LocalizationError::HttpStatus {
            url: "https://example.com/strings.json".to_string(),
            status: 500,
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("example.com"));
    }
}
