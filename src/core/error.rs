//! Core capability errors (id validation).
//!
//! These are bounded and stable: core errors represent domain/refusal
//! states, not library implementation details. Mutations never error for
//! "not found"; that outcome is a documented no-op, not a variant here.
//! Payload normalization has its own error type beside the payload code.

use thiserror::Error;

/// Invalid identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidId {
    #[error("entry id `{raw}` is invalid: {reason}")]
    Entry { raw: String, reason: String },
}

/// Canonical error enum for the core layers.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
}
