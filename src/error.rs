//! Crate-level error type.
//!
//! `EngineError` is what crosses the engine boundary: domain rule failures
//! plus operational failures from the store or feed. Embedders map it onto
//! their own transport via [`EngineError::code`].

use thiserror::Error;

use crate::errors::{DomainError, ErrorCode};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("store error: {detail}")]
    Store { detail: String },
    #[error("feed error: {detail}")]
    Feed { detail: String },
}

impl EngineError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Domain(err) => ErrorCode::from(err),
            EngineError::Store { .. } => ErrorCode::InfraError,
            EngineError::Feed { .. } => ErrorCode::InternalError,
        }
    }

    /// True when a fresh load-validate-commit cycle may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Domain(err) if err.is_retryable())
    }
}
