//! Central error type for the bondwire pipeline.
//!
//! Aggregates the four error kinds every service and connector needs into one type: [`ParseError`](PipelineError::Parse) and
//! [`UnknownProduct`](PipelineError::UnknownProduct) are recoverable at the record
//! level (the caller logs and skips), while
//! [`Io`](PipelineError::Io) and [`InvariantViolation`](PipelineError::InvariantViolation)
//! are not — a failing listener or a failed journal write aborts the process because
//! the in-memory caches and journals would otherwise drift out of sync.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A record could not be parsed into its target type.
    #[error("parse error: {0}")]
    Parse(String),

    /// A productId was not found in the reference data table.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// Failure reading an input file or writing a journal record.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A domain invariant was violated (e.g. negative quantity, illegal state move).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
