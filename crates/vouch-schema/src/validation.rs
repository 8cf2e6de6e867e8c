//! Validation functions.
//!
//! A [`ValidationFn`] is the only thing the engine knows about concrete
//! validators: a callable `(value, type, container, context) -> value` that
//! may fail, plus diagnostic metadata reported when a failure aborts an
//! operation.
//!
//! Returning `Ok(None)` means "no value produced". For a present input this
//! is itself a failure; validators that want to clear a value must return
//! `Ok(Some(Value::Null))`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use vouch_value::Value;

use crate::schema::{Schema, TypeId};

/// Error raised by a validator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Request-scoped data handed to validators untouched.
pub type Ambient = dyn Any + Send + Sync;

/// Everything a validator can see besides the value itself.
#[derive(Clone, Copy)]
pub struct Call<'a> {
    pub schema: &'a Schema,
    /// Type of the location being validated (modifiers included)
    pub ty: TypeId,
    /// The object or argument set holding the value
    pub container: Option<&'a Value>,
    pub context: &'a Ambient,
}

impl<'a> Call<'a> {
    /// Downcast the ambient context.
    pub fn context<T: Any>(&self) -> Option<&'a T> {
        self.context.downcast_ref::<T>()
    }
}

pub trait Validate: Send + Sync {
    fn validate(&self, value: Option<Value>, call: &Call<'_>) -> Result<Option<Value>, BoxError>;
}

impl<F> Validate for F
where
    F: Fn(Option<Value>, &Call<'_>) -> Result<Option<Value>, BoxError> + Send + Sync,
{
    fn validate(&self, value: Option<Value>, call: &Call<'_>) -> Result<Option<Value>, BoxError> {
        self(value, call)
    }
}

/// Where a function applies when bound to a list-typed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The whole value of the entry
    Value,
    /// Every element of a list value, each in its own frame
    Items,
}

#[derive(Debug, Error)]
pub enum ValidationFnError {
    #[error("validation returned undefined for item {index}")]
    UndefinedItem { index: usize },
}

#[derive(Clone)]
enum Kind {
    Single(Arc<dyn Validate>),
    Chain {
        previous: ValidationFn,
        next: ValidationFn,
    },
    SkipDefault {
        default: Value,
        inner: ValidationFn,
    },
}

#[derive(Clone)]
struct Inner {
    kind: Kind,
    target: Target,
    directive: Option<String>,
    arguments: IndexMap<String, Value>,
}

/// Cheaply cloneable handle to a validation function and its diagnostics.
#[derive(Clone)]
pub struct ValidationFn(Arc<Inner>);

/// Diagnostic metadata of a validation function and the functions chained
/// before it, most recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub directive: Option<String>,
    pub arguments: IndexMap<String, Value>,
    pub previous: Vec<Diagnostics>,
}

impl ValidationFn {
    pub fn new(validate: impl Validate + 'static) -> Self {
        Self(Arc::new(Inner {
            kind: Kind::Single(Arc::new(validate)),
            target: Target::Value,
            directive: None,
            arguments: IndexMap::new(),
        }))
    }

    /// Build from a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Option<Value>, &Call<'_>) -> Result<Option<Value>, BoxError> + Send + Sync + 'static,
    {
        Self::new(f)
    }

    /// Build from a closure over present values only. Absent values pass
    /// through without invoking `f`.
    pub fn from_value_fn<F>(f: F) -> Self
    where
        F: Fn(Value, &Call<'_>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::from_fn(move |value, call| match value {
            Some(value) => f(value, call).map(Some),
            None => Ok(None),
        })
    }

    /// Apply to every element of a list instead of the list itself.
    pub fn each(self) -> Self {
        self.with_target(Target::Items)
    }

    fn with_target(mut self, target: Target) -> Self {
        Arc::make_mut(&mut self.0).target = target;
        self
    }

    /// Name the directive this function was generated from.
    pub fn with_directive(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.0).directive = Some(name.into());
        self
    }

    /// Record an argument the function was configured with.
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.0)
            .arguments
            .insert(name.into(), value.into());
        self
    }

    /// Do not invoke this function when the value is absent or deep-equals
    /// `default`; the value passes through unchanged instead.
    ///
    /// The comparison is always against the whole value, so for a list entry
    /// the whole list is compared. The target is kept: a skipping
    /// [`each`](Self::each) function still runs per element when the list
    /// differs from the default. See [`skips`](Self::skips).
    pub fn skip_default(self, default: Value) -> Self {
        let target = self.0.target;
        let directive = self.0.directive.clone();
        let arguments = self.0.arguments.clone();
        Self(Arc::new(Inner {
            kind: Kind::SkipDefault {
                default,
                inner: self,
            },
            target,
            directive,
            arguments,
        }))
    }

    /// Whether this function passes `value` through without running because
    /// it is absent or equals the skipped default.
    pub fn skips(&self, value: Option<&Value>) -> bool {
        match &self.0.kind {
            Kind::SkipDefault { default, .. } => value.is_none_or(|v| v == default),
            Kind::Single(_) | Kind::Chain { .. } => false,
        }
    }

    /// Compose so that `next` runs on the output of `self`.
    ///
    /// The composed function reports the diagnostics of `next` and keeps a
    /// reference to `self` as its previous function. It targets list items
    /// only when both sides do and neither skips a default, since a default
    /// is compared against the whole list.
    pub fn then(self, next: ValidationFn) -> Self {
        let skipping = |f: &ValidationFn| matches!(f.0.kind, Kind::SkipDefault { .. });
        let target = match (self.0.target, next.0.target) {
            (Target::Items, Target::Items) if !skipping(&self) && !skipping(&next) => {
                Target::Items
            }
            _ => Target::Value,
        };
        let directive = next.0.directive.clone();
        let arguments = next.0.arguments.clone();
        Self(Arc::new(Inner {
            kind: Kind::Chain {
                previous: self,
                next,
            },
            target,
            directive,
            arguments,
        }))
    }

    pub fn target(&self) -> Target {
        self.0.target
    }

    pub fn directive(&self) -> Option<&str> {
        self.0.directive.as_deref()
    }

    pub fn arguments(&self) -> &IndexMap<String, Value> {
        &self.0.arguments
    }

    /// The function this one was chained onto, if any.
    pub fn previous(&self) -> Option<&ValidationFn> {
        match &self.0.kind {
            Kind::Chain { previous, .. } => Some(previous),
            Kind::SkipDefault { inner, .. } => inner.previous(),
            Kind::Single(_) => None,
        }
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let mut previous = Vec::new();
        let mut cursor = self.previous();
        while let Some(f) = cursor {
            previous.push(Diagnostics {
                directive: f.0.directive.clone(),
                arguments: f.0.arguments.clone(),
                previous: Vec::new(),
            });
            cursor = f.previous();
        }
        Diagnostics {
            directive: self.0.directive.clone(),
            arguments: self.0.arguments.clone(),
            previous,
        }
    }

    /// Whether two handles point at the same function.
    pub fn ptr_eq(&self, other: &ValidationFn) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Apply to the whole value of an entry.
    ///
    /// Item-targeted parts map themselves over list values.
    pub fn call(&self, value: Option<Value>, call: &Call<'_>) -> Result<Option<Value>, BoxError> {
        match &self.0.kind {
            Kind::Single(f) => match (self.0.target, value) {
                (Target::Items, Some(Value::List(items))) => {
                    let mut out = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        match f.validate(Some(item.clone()), call)? {
                            Some(v) => out.push(v),
                            None => return Err(Box::new(ValidationFnError::UndefinedItem { index })),
                        }
                    }
                    Ok(Some(Value::from(out)))
                }
                (_, value) => f.validate(value, call),
            },
            Kind::Chain { previous, next } => {
                let value = previous.call(value, call)?;
                next.call(value, call)
            }
            Kind::SkipDefault { default, inner } => match value {
                None => Ok(None),
                Some(v) if &v == default => Ok(Some(v)),
                Some(v) => inner.call(Some(v), call),
            },
        }
    }

    /// Apply to a single list element. Only meaningful for functions whose
    /// [`Target`] is [`Target::Items`]. A skipped default is decided on the
    /// whole list beforehand, see [`skips`](Self::skips).
    pub fn call_item(
        &self,
        value: Option<Value>,
        call: &Call<'_>,
    ) -> Result<Option<Value>, BoxError> {
        match &self.0.kind {
            Kind::Single(f) => f.validate(value, call),
            Kind::Chain { previous, next } => {
                let value = previous.call_item(value, call)?;
                next.call_item(value, call)
            }
            Kind::SkipDefault { inner, .. } => inner.call_item(value, call),
        }
    }
}

impl fmt::Debug for ValidationFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationFn")
            .field("directive", &self.0.directive)
            .field("target", &self.0.target)
            .field("chained", &self.previous().is_some())
            .finish()
    }
}
