//! Error types for the scheduler module

use std::fmt;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug)]
pub enum SchedulerError {
    /// Zero or out-of-range interval setting
    InvalidInterval { field: String, value: u64 },

    /// The scheduling task panicked or was aborted
    TaskFailed { reason: String },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInterval { field, value } => {
                write!(f, "Invalid interval '{}': {} (must be greater than 0)", field, value)
            }
            Self::TaskFailed { reason } => {
                write!(f, "Scheduler task failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<tokio::task::JoinError> for SchedulerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed {
            reason: err.to_string(),
        }
    }
}

impl SchedulerError {
    /// Create an invalid interval error
    pub fn invalid_interval(field: impl Into<String>, value: u64) -> Self {
        Self::InvalidInterval {
            field: field.into(),
            value,
        }
    }

    /// Localized description for the error
    pub fn localized_desc(&self) -> String {
        match self {
            Self::InvalidInterval { field, value } => {
                crate::i18n::t!("errors.scheduler.invalid_interval", field = field, value = value)
                    .to_string()
            }
            Self::TaskFailed { reason } => {
                crate::i18n::t!("errors.scheduler.task_failed", reason = reason).to_string()
            }
        }
    }
}
