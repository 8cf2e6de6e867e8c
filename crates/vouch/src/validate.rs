//! Schema-directed validation of value trees
//!
//! # Architecture
//!
//! - `Engine`: shared, cheap to clone; owns the schema and configuration
//! - `Walker`: per-invocation state (path, error collector, depth) and the
//!   recursive frame algorithm
//! - `ErrorCollector`: ordered errors, deduplicated by failure identity
//!
//! # Error Handling
//!
//! Two outcomes:
//! - `Ok(Validated)`: the (possibly transformed) value plus every failure that
//!   was recovered under [`Policy::Resolver`](vouch_schema::Policy)
//! - `Err(Rejection)`: a failure that must abort the operation (Throw policy,
//!   Required violation, or no policy anywhere on its path)

mod collector;
mod walk;

use std::sync::Arc;

use vouch_schema::{Ambient, EntryId, Schema, SchemaError};
use vouch_value::{Object, Value};

use crate::config::Config;
use crate::error::{Failure, Rejection, ValidationError};

use walk::{Step, Walker};

/// Output of a validation that did not abort.
#[derive(Debug, Clone)]
pub struct Validated<T = Option<Value>> {
    pub value: T,
    /// Recovered failures in the order they were first raised
    pub errors: Vec<ValidationError>,
}

impl<T> Validated<T> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The error list as injected into handlers: `None` when empty.
    pub fn error_list(&self) -> Option<Vec<ValidationError>> {
        (!self.errors.is_empty()).then(|| self.errors.clone())
    }
}

/// Validation engine bound to one schema.
#[derive(Debug, Clone)]
pub struct Engine {
    schema: Arc<Schema>,
    config: Arc<Config>,
}

impl Engine {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_config(schema, Config::default())
    }

    pub fn with_config(schema: Arc<Schema>, config: Config) -> Self {
        Self {
            schema,
            config: Arc::new(config),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate `value` at `entry` using the entry's own binding.
    ///
    /// Paths of reported errors start with the entry name. `container` is
    /// handed to validators as the object holding the value.
    pub fn validate_entry(
        &self,
        entry: EntryId,
        value: Option<Value>,
        container: Option<&Value>,
        context: &Ambient,
    ) -> Result<Validated, Rejection> {
        let entry = self.schema.get_entry(entry).map_err(schema_fault)?;
        let mut walker = Walker::new(&self.schema, &self.config, context);
        walker.path.push_field(entry.name.as_str());
        let step = entry.binding.validation.as_ref().map(Step::Whole);
        let value = walker
            .validate(value, entry.ty, step, container, entry.binding.policy)
            .map_err(|raised| raised.into_rejection())?;
        Ok(Validated {
            value,
            errors: walker.collector.finish(),
        })
    }

    /// Validate every declared argument of operation field `field`.
    ///
    /// `arguments` is never modified; the returned object is a fresh copy in
    /// which changed arguments are replaced. Undeclared arguments are passed
    /// through untouched.
    pub fn validate_arguments(
        &self,
        field: EntryId,
        arguments: &Object,
        context: &Ambient,
    ) -> Result<Validated<Object>, Rejection> {
        let schema = &*self.schema;
        let field_entry = schema.get_entry(field).map_err(schema_fault)?;
        let mut copy = arguments.clone();

        if !schema.arguments_require_validation(field) {
            tracing::trace!(field = %field_entry.name, "arguments need no validation");
            return Ok(Validated {
                value: copy,
                errors: Vec::new(),
            });
        }

        let container = Value::from(arguments.clone());
        let mut walker = Walker::new(schema, &self.config, context);
        for (name, &arg) in &field_entry.arguments {
            let entry = schema.entry(arg);
            let original = arguments.get(name).cloned();
            let step = entry.binding.validation.as_ref().map(Step::Whole);

            walker.path.push_field(name.as_str());
            let result = walker.validate(
                original.clone(),
                entry.ty,
                step,
                Some(&container),
                entry.binding.policy,
            );
            walker.path.pop();

            let validated = result.map_err(|raised| raised.into_rejection())?;
            if !Value::same_slot(validated.as_ref(), original.as_ref()) {
                copy.assign(name, validated);
            }
        }

        let errors = walker.collector.finish();
        if !errors.is_empty() {
            tracing::debug!(
                field = %field_entry.name,
                errors = errors.len(),
                "arguments validated with recovered errors"
            );
        }
        Ok(Validated {
            value: copy,
            errors,
        })
    }
}

fn schema_fault(error: SchemaError) -> Rejection {
    Rejection::new(
        Default::default(),
        Arc::new(Failure::EngineFault(error.to_string())),
        None,
    )
}
