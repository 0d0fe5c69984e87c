//! Error types for the policy_tracker crawler
//!
//! One enum per failure family of the crawl pipeline: transport, parsing,
//! persistence and date normalization.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error (connection refused, DNS, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether retrying the same request could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    /// A configured CSS selector does not compile
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Invalid base URL or link
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Listing row carries no detail link
    #[error("Listing row has no detail link")]
    LinkNotFound,
}

/// Errors raised while normalizing a locale calendar date token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    /// Empty or whitespace-only token
    #[error("empty date token")]
    Empty,

    /// Token does not split into exactly three parts
    #[error("expected Y-M-D, got {found} part(s) in '{token}'")]
    WrongArity { token: String, found: usize },

    /// A part is not an integer
    #[error("non-numeric component '{part}' in '{token}'")]
    NotNumeric { token: String, part: String },

    /// Components parse but do not form a calendar date
    #[error("no such date {year}-{month}-{day}")]
    OutOfRange { year: i32, month: u32, day: u32 },
}

/// Failure class of a record store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Invalid credentials or insufficient privileges
    Auth,
    /// Database, file or table does not exist
    TargetMissing,
    /// Constraint violations, transient network loss, everything else
    Other,
}

/// Record store error with its failure class
#[derive(Error, Debug)]
#[error("{operation} failed ({kind:?}): {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub operation: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation,
            message: message.into(),
        }
    }

    pub fn auth(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Auth, operation, message)
    }

    pub fn target_missing(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::TargetMissing, operation, message)
    }

    pub fn other(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Other, operation, message)
    }

    /// Localized message for the failure class
    pub fn localized_desc(&self) -> String {
        let class = match self.kind {
            StoreErrorKind::Auth => crate::i18n::t!("errors.store.auth"),
            StoreErrorKind::TargetMissing => crate::i18n::t!("errors.store.target_missing"),
            StoreErrorKind::Other => crate::i18n::t!("errors.store.other"),
        };
        format!("{class}: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_recoverability() {
        let err = FetchError::Status {
            status: 503,
            url: "https://www.cy.gov.tw/".to_string(),
        };
        assert!(err.is_recoverable());

        let err = FetchError::Status {
            status: 404,
            url: "https://www.cy.gov.tw/".to_string(),
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_timeout_is_recoverable() {
        assert!(FetchError::Timeout("https://www.cy.gov.tw/".into()).is_recoverable());
        assert!(!FetchError::InvalidUrl("::".into()).is_recoverable());
    }

    #[test]
    fn test_store_error_display_carries_operation() {
        let err = StoreError::target_missing("insert", "no such table: control_yuan_reports");
        let text = err.to_string();
        assert!(text.starts_with("insert failed"));
        assert!(text.contains("TargetMissing"));
        assert!(text.contains("control_yuan_reports"));
    }

    #[test]
    fn test_date_parse_error_messages() {
        let err = DateParseError::WrongArity {
            token: "112-5".into(),
            found: 2,
        };
        assert_eq!(err.to_string(), "expected Y-M-D, got 2 part(s) in '112-5'");
    }
}
