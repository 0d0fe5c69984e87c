//! Unified error handling for the policy_tracker crate
//!
//! Domain errors live next to the code that raises them; this module folds
//! them into a single [`Error`] and classifies them along the crawl's failure
//! taxonomy so callers can decide what to absorb and what to surface.
//!
//! # Architecture
//!
//! - [`TrackerErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Transport, Parsing, Store (three classes), Config, Other
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use thiserror::Error;

pub use crate::utils::error::{DateParseError, FetchError, ParseError, StoreError, StoreErrorKind};

/// Common trait for all policy_tracker error types
pub trait TrackerErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get localized description for user-facing messages
    fn localized_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// HTTP fetch failures (network, non-2xx)
    Transport,
    /// Expected selector absent or invalid
    Parsing,
    /// Store rejected the credentials
    StoreAuth,
    /// Store database, file or table missing
    StoreTargetMissing,
    /// Any other store failure
    StoreOther,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get localized description for the category
    pub fn localized_desc(&self) -> String {
        match self {
            Self::Transport => crate::i18n::t!("errors.category.transport").to_string(),
            Self::Parsing => crate::i18n::t!("errors.category.parsing").to_string(),
            Self::StoreAuth => crate::i18n::t!("errors.category.store_auth").to_string(),
            Self::StoreTargetMissing => {
                crate::i18n::t!("errors.category.store_target_missing").to_string()
            }
            Self::StoreOther => crate::i18n::t!("errors.category.store_other").to_string(),
            Self::Config => crate::i18n::t!("errors.category.config").to_string(),
            Self::Other => crate::i18n::t!("errors.category.other").to_string(),
        }
    }
}

impl From<StoreErrorKind> for ErrorCategory {
    fn from(kind: StoreErrorKind) -> Self {
        match kind {
            StoreErrorKind::Auth => Self::StoreAuth,
            StoreErrorKind::TargetMissing => Self::StoreTargetMissing,
            StoreErrorKind::Other => Self::StoreOther,
        }
    }
}

/// Unified error type for the policy_tracker crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Record store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl TrackerErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Store(e) => e.kind == StoreErrorKind::Other,
            Self::Parse(_) | Self::Config(_) | Self::Other(_) => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Fetch(e) => format!("{}: {e}", crate::i18n::t!("errors.fetch")),
            Self::Store(e) => e.localized_desc(),
            Self::Parse(e) => format!("{}: {e}", self.category().localized_desc()),
            Self::Config(msg) => format!("{}: {msg}", crate::i18n::t!("errors.config")),
            Self::Other(context) => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Transport,
            Self::Parse(_) => ErrorCategory::Parsing,
            Self::Store(e) => e.kind.into(),
            Self::Config(_) => ErrorCategory::Config,
            Self::Other(_) => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other(context.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let fetch_err = Error::Fetch(FetchError::Timeout("https://www.cy.gov.tw/".into()));
        assert_eq!(fetch_err.category(), ErrorCategory::Transport);

        let parse_err = Error::Parse(ParseError::LinkNotFound);
        assert_eq!(parse_err.category(), ErrorCategory::Parsing);
    }

    #[test]
    fn test_store_kinds_map_to_distinct_categories() {
        let auth: Error = StoreError::auth("insert", "password authentication failed").into();
        let missing: Error = StoreError::target_missing("insert", "no such table").into();
        let other: Error = StoreError::other("insert", "connection reset").into();

        assert_eq!(auth.category(), ErrorCategory::StoreAuth);
        assert_eq!(missing.category(), ErrorCategory::StoreTargetMissing);
        assert_eq!(other.category(), ErrorCategory::StoreOther);
    }

    #[test]
    fn test_is_recoverable() {
        let fetch_err = Error::Fetch(FetchError::Timeout("https://www.cy.gov.tw/".into()));
        assert!(fetch_err.is_recoverable());

        let auth: Error = StoreError::auth("exists", "bad password").into();
        assert!(!auth.is_recoverable());

        let parse_err = Error::Parse(ParseError::LinkNotFound);
        assert!(!parse_err.is_recoverable());
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("page_count must be greater than 0");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.localized_desc(), "Something went wrong");
    }
}
