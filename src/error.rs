//! Error taxonomy shared by the router, the forecaster and the triggers.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Rejected before any computation starts; nothing is applied.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Reading bins or history failed; the whole run is aborted.
    #[error("failed to read {what}: {message}")]
    DataAccess { what: &'static str, message: String },

    /// Writing one derived record failed; callers log and move on.
    #[error("failed to persist {what}: {message}")]
    Persistence { what: &'static str, message: String },
}

impl PlannerError {
    pub fn validation(message: impl Into<String>) -> Self {
        PlannerError::Validation(message.into())
    }

    pub fn data_access(what: &'static str, message: impl ToString) -> Self {
        PlannerError::DataAccess {
            what,
            message: message.to_string(),
        }
    }

    pub fn persistence(what: &'static str, message: impl ToString) -> Self {
        PlannerError::Persistence {
            what,
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PlannerError::Validation(_) => ErrorCategory::Validation,
            PlannerError::DataAccess { .. } => ErrorCategory::DataAccess,
            PlannerError::Persistence { .. } => ErrorCategory::Persistence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    DataAccess,
    Persistence,
}

/// Structured failure body returned by the triggers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    pub category: ErrorCategory,
}

impl From<&PlannerError> for ErrorPayload {
    fn from(err: &PlannerError) -> Self {
        // Read failures surface a generic message; the detail goes to the log.
        let error = match err {
            PlannerError::DataAccess { what, .. } => format!("failed to load {}", what),
            other => other.to_string(),
        };
        Self {
            error,
            category: err.category(),
        }
    }
}
