// Path: crates/types/src/error.rs
//! Error taxonomy for the Meridian kernel.
//!
//! Errors are grouped by kind, not by module. Every variant carries a stable,
//! machine-readable string code via [`ErrorCode`] so operators can alert on
//! specific failures without parsing display strings.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised by the object store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lookup by id found nothing.
    #[error("{0} not found in store")]
    NotFound(&'static str),
    /// A unique secondary key was inserted twice.
    #[error("duplicate {0} key")]
    DuplicateKey(&'static str),
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "STORE_NOT_FOUND",
            Self::DuplicateKey(_) => "STORE_DUPLICATE_KEY",
        }
    }
}

/// Errors raised at the synthetic-operation evaluator boundary.
///
/// These are the per-record recoverable failures: the maintenance pass logs
/// them with context and continues with the next record.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// The evaluator rejected the operation on authorization grounds
    /// (blacklist or whitelist conflict).
    #[error("operation rejected: {0}")]
    AuthorityRejected(String),
    /// The operation failed its own validation.
    #[error("operation invalid: {0}")]
    Validation(String),
    /// The account or balance the operation refers to has insufficient funds.
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),
    /// A referenced object does not exist.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for EvaluatorError {
    fn code(&self) -> &'static str {
        match self {
            Self::AuthorityRejected(_) => "EVAL_AUTHORITY_REJECTED",
            Self::Validation(_) => "EVAL_VALIDATION_FAILED",
            Self::InsufficientBalance(_) => "EVAL_INSUFFICIENT_BALANCE",
            Self::Store(e) => e.code(),
        }
    }
}

/// Fatal maintenance-pass errors. Any of these aborts the containing block;
/// the surrounding transactional layer rolls state back.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    /// An arithmetic or state postcondition was breached.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// The network parameters are inconsistent.
    #[error("parameter violation: {0}")]
    ParameterViolation(String),
    /// A required object was missing from the store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for MaintenanceError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvariantViolation(_) => "MAINT_INVARIANT_VIOLATION",
            Self::ParameterViolation(_) => "MAINT_PARAMETER_VIOLATION",
            Self::Store(e) => e.code(),
        }
    }
}
