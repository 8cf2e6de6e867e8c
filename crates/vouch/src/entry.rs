//! Entry-point wrappers around operation handlers.
//!
//! A [`FieldHandler`] is the final function of an operation: it consumes the
//! (validated) arguments and produces the operation's value. Wrapping it with
//! [`ArgumentValidation`] or [`ResultValidation`] runs the engine exactly once
//! per invocation. Wrapping is idempotent: a handler that already validates
//! the same field in the same way is returned as is.

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use vouch_schema::{Ambient, BoxError, EntryId};
use vouch_value::{Object, Value};

use crate::config::ResultOrdering;
use crate::error::{HandlerError, ValidationError};
use crate::validate::Engine;

/// What a handler receives besides the source object.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub arguments: Object,
    /// Failures recovered while validating, `None` when there were none.
    pub validation_errors: Option<Vec<ValidationError>>,
    /// The field value validated ahead of the call under
    /// [`ResultOrdering::ValidateThenCall`].
    pub validated: Option<Value>,
}

impl Invocation {
    pub fn new(arguments: Object) -> Self {
        Self {
            arguments,
            ..Default::default()
        }
    }

    fn push_errors(&mut self, errors: Vec<ValidationError>) {
        if errors.is_empty() {
            return;
        }
        self.validation_errors
            .get_or_insert_with(Vec::new)
            .extend(errors);
    }
}

/// What a handler produces.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub value: Option<Value>,
    /// Failures recovered while validating the produced value.
    pub errors: Vec<ValidationError>,
}

impl From<Option<Value>> for Resolution {
    fn from(value: Option<Value>) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }
}

/// Which part of an invocation a wrapper validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Arguments,
    Result,
}

pub trait FieldHandler: Send + Sync {
    fn call<'a>(
        &'a self,
        source: Option<Value>,
        invocation: Invocation,
        context: &'a Ambient,
    ) -> BoxFuture<'a, Result<Resolution, HandlerError>>;

    /// Whether this handler already runs `flavor` validation for `field`.
    fn is_validating(&self, _field: EntryId, _flavor: Flavor) -> bool {
        false
    }
}

/// Handler backed by an async closure.
pub struct FnHandler<F>(F);

/// Build a [`FieldHandler`] from a closure returning a future.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn FieldHandler>
where
    F: Fn(Option<Value>, Invocation, &Ambient) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Value>, BoxError>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

impl<F, Fut> FieldHandler for FnHandler<F>
where
    F: Fn(Option<Value>, Invocation, &Ambient) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Value>, BoxError>> + Send + 'static,
{
    fn call<'a>(
        &'a self,
        source: Option<Value>,
        invocation: Invocation,
        context: &'a Ambient,
    ) -> BoxFuture<'a, Result<Resolution, HandlerError>> {
        let fut = (self.0)(source, invocation, context);
        async move { Ok::<_, HandlerError>(Resolution::from(fut.await?)) }.boxed()
    }
}

/// Validates declared arguments before calling through.
pub struct ArgumentValidation {
    engine: Engine,
    field: EntryId,
    inner: Arc<dyn FieldHandler>,
}

impl ArgumentValidation {
    pub fn wrap(engine: Engine, field: EntryId, inner: Arc<dyn FieldHandler>) -> Arc<dyn FieldHandler> {
        if inner.is_validating(field, Flavor::Arguments) {
            return inner;
        }
        Arc::new(Self {
            engine,
            field,
            inner,
        })
    }
}

impl FieldHandler for ArgumentValidation {
    fn call<'a>(
        &'a self,
        source: Option<Value>,
        mut invocation: Invocation,
        context: &'a Ambient,
    ) -> BoxFuture<'a, Result<Resolution, HandlerError>> {
        async move {
            let validated =
                self.engine
                    .validate_arguments(self.field, &invocation.arguments, context)?;
            invocation.arguments = validated.value;
            invocation.push_errors(validated.errors);
            self.inner.call(source, invocation, context).await
        }
        .boxed()
    }

    fn is_validating(&self, field: EntryId, flavor: Flavor) -> bool {
        (field == self.field && flavor == Flavor::Arguments)
            || self.inner.is_validating(field, flavor)
    }
}

/// Validates the value a field produces.
pub struct ResultValidation {
    engine: Engine,
    field: EntryId,
    ordering: ResultOrdering,
    inner: Arc<dyn FieldHandler>,
}

impl ResultValidation {
    /// Wrap with the engine's configured ordering.
    pub fn wrap(engine: Engine, field: EntryId, inner: Arc<dyn FieldHandler>) -> Arc<dyn FieldHandler> {
        let ordering = engine.config().result_ordering;
        Self::wrap_with_ordering(engine, field, ordering, inner)
    }

    pub fn wrap_with_ordering(
        engine: Engine,
        field: EntryId,
        ordering: ResultOrdering,
        inner: Arc<dyn FieldHandler>,
    ) -> Arc<dyn FieldHandler> {
        if inner.is_validating(field, Flavor::Result) {
            return inner;
        }
        Arc::new(Self {
            engine,
            field,
            ordering,
            inner,
        })
    }

    async fn call_then_validate(
        &self,
        source: Option<Value>,
        invocation: Invocation,
        context: &Ambient,
    ) -> Result<Resolution, HandlerError> {
        let container = source.clone();
        let mut resolution = self.inner.call(source, invocation, context).await?;
        let validated = self.engine.validate_entry(
            self.field,
            resolution.value.take(),
            container.as_ref(),
            context,
        )?;
        resolution.value = validated.value;
        resolution.errors.extend(validated.errors);
        Ok(resolution)
    }

    async fn validate_then_call(
        &self,
        source: Option<Value>,
        mut invocation: Invocation,
        context: &Ambient,
    ) -> Result<Resolution, HandlerError> {
        let name = self.engine.schema().get_entry(self.field).map(|e| e.name.as_str());
        let current = match (source.as_ref().and_then(Value::as_object), name) {
            (Some(object), Ok(name)) => object.get(name).cloned(),
            _ => None,
        };
        let validated =
            self.engine
                .validate_entry(self.field, current, source.as_ref(), context)?;
        invocation.validated = validated.value;
        invocation.push_errors(validated.errors.clone());
        let mut resolution = self.inner.call(source, invocation, context).await?;
        resolution.errors.splice(0..0, validated.errors);
        Ok(resolution)
    }
}

impl FieldHandler for ResultValidation {
    fn call<'a>(
        &'a self,
        source: Option<Value>,
        invocation: Invocation,
        context: &'a Ambient,
    ) -> BoxFuture<'a, Result<Resolution, HandlerError>> {
        match self.ordering {
            ResultOrdering::CallThenValidate => {
                self.call_then_validate(source, invocation, context).boxed()
            }
            ResultOrdering::ValidateThenCall => {
                self.validate_then_call(source, invocation, context).boxed()
            }
        }
    }

    fn is_validating(&self, field: EntryId, flavor: Flavor) -> bool {
        (field == self.field && flavor == Flavor::Result) || self.inner.is_validating(field, flavor)
    }
}
