//! The recursive validator.
//!
//! One call to [`Walker::validate`] is one frame: a value at one schema
//! location. A frame runs the bound function, checks the Required modifier,
//! then descends into composites and lists when the requirement propagator
//! says something below can change. Containers are rebuilt only along paths
//! where a child came back different (by identity), so untouched branches of
//! the output share their allocation with the input.

use vouch_schema::{Ambient, Call, Policy, Schema, Target, TypeId, TypeKind, ValidationFn};
use vouch_value::{Object, Value, ValuePath};

use crate::config::Config;
use crate::error::Failure;

use super::collector::{Decision, ErrorCollector, Raised, decide};

/// How a frame applies its validation function.
#[derive(Clone, Copy)]
pub(crate) enum Step<'f> {
    /// To the whole value of an entry
    Whole(&'f ValidationFn),
    /// To one list element
    Item(&'f ValidationFn),
}

impl<'f> Step<'f> {
    fn function(self) -> &'f ValidationFn {
        match self {
            Step::Whole(f) | Step::Item(f) => f,
        }
    }
}

pub(crate) struct Walker<'a> {
    schema: &'a Schema,
    config: &'a Config,
    context: &'a Ambient,
    pub(crate) collector: ErrorCollector,
    pub(crate) path: ValuePath,
    depth: usize,
}

fn is_nullish(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}

impl<'a> Walker<'a> {
    pub fn new(schema: &'a Schema, config: &'a Config, context: &'a Ambient) -> Self {
        Self {
            schema,
            config,
            context,
            collector: ErrorCollector::new(),
            path: ValuePath::root(),
            depth: 0,
        }
    }

    fn raise(&self, failure: Failure) -> Raised {
        Raised::new(failure, self.path.clone())
    }

    /// Validate one frame and apply the failure policy to anything it raised.
    pub fn validate(
        &mut self,
        value: Option<Value>,
        ty: TypeId,
        step: Option<Step<'_>>,
        container: Option<&Value>,
        policy: Option<Policy>,
    ) -> Result<Option<Value>, Raised> {
        self.depth += 1;
        let result = self.frame(value, ty, step, container, policy);
        self.depth -= 1;
        result.or_else(|raised| self.resolve(raised, ty, step, policy))
    }

    fn resolve(
        &mut self,
        mut raised: Raised,
        ty: TypeId,
        step: Option<Step<'_>>,
        policy: Option<Policy>,
    ) -> Result<Option<Value>, Raised> {
        self.collector.register(&raised.failure, &self.path);
        match decide(policy, raised.propagate, self.schema.is_required(ty)) {
            Decision::Reraise => Err(raised),
            Decision::Propagate => {
                if raised.rejection.is_none() {
                    tracing::debug!(
                        path = %self.path,
                        error = %raised.failure,
                        "validation failure aborts the operation"
                    );
                }
                raised.flag(&self.path, step.map(|s| s.function().diagnostics()));
                Err(raised)
            }
            Decision::Recover => {
                tracing::debug!(
                    path = %self.path,
                    error = %raised.failure,
                    "validation failure replaced with null"
                );
                Ok(Some(Value::Null))
            }
        }
    }

    fn frame(
        &mut self,
        value: Option<Value>,
        ty: TypeId,
        step: Option<Step<'_>>,
        container: Option<&Value>,
        policy: Option<Policy>,
    ) -> Result<Option<Value>, Raised> {
        if self.depth > self.config.max_depth {
            return Err(self.raise(Failure::EngineFault(format!(
                "value nesting exceeds the maximum depth of {}",
                self.config.max_depth
            ))));
        }
        let schema = self.schema;
        let inner = schema.unwrap_required(ty);

        let mut value = value;
        let mut item_step = None;
        match step {
            Some(Step::Item(f)) => value = self.apply(f, true, value, ty, container)?,
            Some(Step::Whole(f))
                if f.target() == Target::Items
                    && matches!(schema.kind(inner), TypeKind::List(_)) =>
            {
                if !f.skips(value.as_ref()) {
                    item_step = Some(Step::Item(f));
                }
            }
            Some(Step::Whole(f)) => value = self.apply(f, false, value, ty, container)?,
            None => {}
        }

        self.check_required(ty, value.as_ref())?;
        let Some(present) = value.as_ref().filter(|v| !v.is_null()) else {
            return Ok(value);
        };

        let out = match schema.kind(inner) {
            TypeKind::Composite(_) => {
                if self.needs_walk(inner) {
                    Some(self.walk_composite(present, inner)?)
                } else {
                    tracing::trace!(path = %self.path, "skipped composite without validation");
                    value
                }
            }
            TypeKind::List(item_ty) => {
                if item_step.is_some() || self.needs_walk(inner) {
                    Some(self.walk_list(present, *item_ty, item_step, policy)?)
                } else {
                    value
                }
            }
            TypeKind::Leaf(leaf) => {
                leaf.coerce(present)
                    .map_err(|message| self.raise(Failure::Coercion { message }))?;
                value
            }
            TypeKind::Enum(e) => {
                e.coerce(present)
                    .map_err(|message| self.raise(Failure::Coercion { message }))?;
                value
            }
            TypeKind::Required(_) => {
                return Err(self.raise(Failure::EngineFault(format!(
                    "nested required modifier in {}",
                    schema.type_display(ty)
                ))));
            }
        };

        self.check_required(ty, out.as_ref())?;
        Ok(out)
    }

    fn needs_walk(&self, ty: TypeId) -> bool {
        self.schema.requires_validation(ty) || self.schema.contains_required_deep(ty)
    }

    fn check_required(&self, ty: TypeId, value: Option<&Value>) -> Result<(), Raised> {
        if self.schema.is_required(ty) && is_nullish(value) {
            return Err(self.raise(Failure::RequiredViolation {
                ty: self.schema.type_display(ty),
            }));
        }
        Ok(())
    }

    fn apply(
        &self,
        f: &ValidationFn,
        item: bool,
        value: Option<Value>,
        ty: TypeId,
        container: Option<&Value>,
    ) -> Result<Option<Value>, Raised> {
        let call = Call {
            schema: self.schema,
            ty,
            container,
            context: self.context,
        };
        let had_value = value.is_some();
        let result = if item {
            f.call_item(value, &call)
        } else {
            f.call(value, &call)
        };
        match result {
            Ok(None) if had_value => Err(self.raise(Failure::ReturnedUndefined)),
            Ok(value) => Ok(value),
            Err(error) => Err(self.raise(Failure::Validation(error))),
        }
    }

    fn walk_composite(&mut self, present: &Value, ty: TypeId) -> Result<Value, Raised> {
        let schema = self.schema;
        let Some(composite) = schema.composite(ty) else {
            return Err(self.raise(Failure::EngineFault(format!(
                "{} is not a composite",
                schema.type_display(ty)
            ))));
        };
        let Value::Object(object) = present else {
            return Err(self.raise(Failure::EngineFault(format!(
                "expected an object for {}, got {}",
                composite.name,
                present.kind()
            ))));
        };

        let mut rebuilt: Option<Object> = None;
        for (name, &field) in &composite.fields {
            let entry = schema.entry(field);
            let original = object.get(name).cloned();
            let step = entry.binding.validation.as_ref().map(Step::Whole);

            self.path.push_field(name.as_str());
            let result = self.validate(
                original.clone(),
                entry.ty,
                step,
                Some(present),
                entry.binding.policy,
            );
            self.path.pop();

            let validated = result?;
            if !Value::same_slot(validated.as_ref(), original.as_ref()) {
                rebuilt
                    .get_or_insert_with(|| (**object).clone())
                    .assign(name, validated);
            }
        }

        Ok(match rebuilt {
            Some(object) => Value::from(object),
            None => present.clone(),
        })
    }

    fn walk_list(
        &mut self,
        present: &Value,
        item_ty: TypeId,
        item_step: Option<Step<'_>>,
        policy: Option<Policy>,
    ) -> Result<Value, Raised> {
        let Value::List(items) = present else {
            return Err(self.raise(Failure::EngineFault(format!(
                "expected a list for [{}], got {}",
                self.schema.type_display(item_ty),
                present.kind()
            ))));
        };

        let mut rebuilt: Option<Vec<Value>> = None;
        for (index, item) in items.iter().enumerate() {
            self.path.push_index(index);
            let result = self.validate(Some(item.clone()), item_ty, item_step, Some(present), policy);
            self.path.pop();

            let validated = result?.unwrap_or(Value::Null);
            if !validated.same(item) {
                rebuilt.get_or_insert_with(|| items.to_vec())[index] = validated;
            }
        }

        Ok(match rebuilt {
            Some(items) => Value::from(items),
            None => present.clone(),
        })
    }
}
