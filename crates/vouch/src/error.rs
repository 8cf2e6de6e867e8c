//! Error types
//!
//! - `Failure`: why a single frame failed. Shared by identity (`Arc`) so the
//!   same failure seen by several ancestor frames is recorded once.
//! - `ValidationError`: a recorded failure with its path, as returned to
//!   callers next to a partially validated value.
//! - `Rejection`: a failure that aborted the whole operation.
//! - `HandlerError`: what a wrapped field handler can fail with.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use vouch_schema::{BoxError, Diagnostics};
use vouch_value::ValuePath;

#[derive(Debug, Error)]
pub enum Failure {
    /// Null where the type mandates a value. Always propagates.
    #[error("Expected non-null value of type {ty}")]
    RequiredViolation { ty: String },

    /// A validation function raised.
    #[error("{0}")]
    Validation(#[source] BoxError),

    /// A validation function produced no value for a present input.
    #[error("validation returned undefined")]
    ReturnedUndefined,

    /// A leaf value failed its scalar coercion check.
    #[error("{message}")]
    Coercion { message: String },

    /// Internal invariant violation. Signals a schema or binding bug, never
    /// a bad value, and is never recovered.
    #[error("engine fault: {0}")]
    EngineFault(String),
}

impl Failure {
    /// Failures that propagate regardless of policy from the moment they
    /// are raised.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Failure::EngineFault(_))
    }
}

/// A recorded failure.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message} at path {path}")]
pub struct ValidationError {
    pub path: ValuePath,
    pub message: String,
    #[serde(skip)]
    #[source]
    pub cause: Arc<Failure>,
}

impl ValidationError {
    pub(crate) fn new(path: ValuePath, cause: Arc<Failure>) -> Self {
        Self {
            path,
            message: cause.to_string(),
            cause,
        }
    }
}

/// A failure that aborted validation of an operation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Rejection {
    /// Where the abort was decided
    pub path: ValuePath,
    pub message: String,
    /// Directive name and arguments of the function bound where the abort
    /// was decided, including the functions it was chained onto.
    pub properties: Option<Diagnostics>,
    #[source]
    pub cause: Arc<Failure>,
}

impl Rejection {
    pub(crate) fn new(
        path: ValuePath,
        cause: Arc<Failure>,
        properties: Option<Diagnostics>,
    ) -> Self {
        Self {
            path,
            message: cause.to_string(),
            properties,
            cause,
        }
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Rejected(#[from] Rejection),

    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl From<BoxError> for HandlerError {
    fn from(error: BoxError) -> Self {
        HandlerError::Handler(error)
    }
}
