//! Entry binding registry.

use crate::error::SchemaError;
use crate::schema::{EntryId, Owner, Schema};
use crate::validation::ValidationFn;

/// What happens when validation fails at or below an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Abort the containing operation.
    Throw,
    /// Substitute null, record the error and continue.
    Resolver,
}

/// Validation attached to one entry.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    pub validation: Option<ValidationFn>,
    pub policy: Option<Policy>,
}

impl Binding {
    pub fn is_empty(&self) -> bool {
        self.validation.is_none() && self.policy.is_none()
    }
}

impl Schema {
    /// Attach `validation` and `policy` to `entry`.
    ///
    /// - The entry's container is flagged as requiring validation right away.
    /// - With no `validation`, only the policy and the flag are recorded.
    /// - A function already bound to the entry runs first: binding `v2` after
    ///   `v1` behaves as `v2(v1(value))`.
    /// - A `None` policy keeps the previously bound one.
    pub fn bind(
        &mut self,
        entry: EntryId,
        validation: Option<ValidationFn>,
        policy: Option<Policy>,
    ) -> Result<(), SchemaError> {
        let slot = self.entry_mut(entry)?;
        let owner = slot.owner;
        let name = slot.name.clone();

        if let Some(validation) = validation {
            slot.binding.validation = Some(match slot.binding.validation.take() {
                Some(previous) => previous.then(validation),
                None => validation,
            });
        }
        if policy.is_some() {
            slot.binding.policy = policy;
        }

        // A new binding can only turn "no validation needed" into "needed".
        self.requirement.forget_negative();
        match owner {
            Owner::Composite(ty) => self.requirement.mark(ty),
            Owner::Field(field) => self.entry_mut(field)?.arguments_flagged = true,
            Owner::Root => {}
        }
        tracing::debug!(entry = %name, ?policy, "bound validation");
        Ok(())
    }

    /// Like [`Schema::bind`], but the function is never invoked for an
    /// absent value or one equal to the entry's declared default.
    pub fn bind_skipping_default(
        &mut self,
        entry: EntryId,
        validation: ValidationFn,
        policy: Option<Policy>,
    ) -> Result<(), SchemaError> {
        let slot = self.get_entry(entry)?;
        let default = slot
            .default
            .clone()
            .ok_or_else(|| SchemaError::MissingDefault {
                entry: slot.name.clone(),
            })?;
        self.bind(entry, Some(validation.skip_default(default)), policy)
    }

    /// Validation attached to `entry`.
    pub fn binding(&self, entry: EntryId) -> &Binding {
        &self.entry(entry).binding
    }
}
