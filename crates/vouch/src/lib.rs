//! Schema-directed validation engine.
//!
//! Validation functions are bound to schema entries (fields and arguments)
//! in [`vouch_schema`]. An [`Engine`] walks request values against that
//! schema, runs each bound function, and applies the entry's failure
//! [`Policy`](vouch_schema::Policy): failures are either recovered as null and
//! collected, or abort the operation as a [`Rejection`].
//!
//! The [`entry`] module wraps operation handlers so arguments and results are
//! validated around each call.

pub mod config;
pub mod entry;
pub mod error;
pub mod validate;

pub use config::{Config, ResultOrdering};
pub use entry::{
    ArgumentValidation, FieldHandler, Flavor, Invocation, Resolution, ResultValidation,
    handler_fn,
};
pub use error::{Failure, HandlerError, Rejection, ValidationError};
pub use validate::{Engine, Validated};

pub use vouch_schema as schema;
pub use vouch_value as value;
