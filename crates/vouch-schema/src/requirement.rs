//! Requirement propagation.
//!
//! For every composite type the engine needs to know whether any field
//! reachable from it carries a validation function. The answer is memoized
//! in a side table indexed by [`TypeId`]. Entries are tri-state atomics, so
//! concurrent requests may compute the same answer twice but never observe a
//! torn or changing value: once known, an answer stays fixed until the next
//! setup-time [`Schema::bind`].

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use ahash::AHashSet;

use crate::schema::{EntryId, Schema, TypeId};
use crate::types::TypeKind;

const UNKNOWN: u8 = 0;
const NOT_REQUIRED: u8 = 1;
const REQUIRED: u8 = 2;

pub(crate) struct RequirementTable {
    slots: Vec<AtomicU8>,
}

impl RequirementTable {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| AtomicU8::new(UNKNOWN)).collect(),
        }
    }

    pub(crate) fn get(&self, ty: TypeId) -> Option<bool> {
        match self.slots.get(ty.0)?.load(Ordering::Acquire) {
            REQUIRED => Some(true),
            NOT_REQUIRED => Some(false),
            _ => None,
        }
    }

    fn store(&self, ty: TypeId, required: bool) {
        if let Some(slot) = self.slots.get(ty.0) {
            let value = if required { REQUIRED } else { NOT_REQUIRED };
            slot.store(value, Ordering::Release);
        }
    }

    pub(crate) fn mark(&self, ty: TypeId) {
        self.store(ty, true);
    }

    pub(crate) fn forget_negative(&mut self) {
        for slot in &mut self.slots {
            if *slot.get_mut() == NOT_REQUIRED {
                *slot.get_mut() = UNKNOWN;
            }
        }
    }
}

impl fmt::Debug for RequirementTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known = self
            .slots
            .iter()
            .filter(|s| s.load(Ordering::Relaxed) != UNKNOWN)
            .count();
        f.debug_struct("RequirementTable")
            .field("types", &self.slots.len())
            .field("known", &known)
            .finish()
    }
}

impl Schema {
    /// Whether values of `ty` can ever need work from the validator.
    ///
    /// List and Required modifiers are looked through. Leaves and enums never
    /// require validation on their own; a composite does when a field reachable
    /// from it, through nested composites and lists, has a bound function or
    /// was flagged at bind time.
    pub fn requires_validation(&self, ty: TypeId) -> bool {
        let ty = self.final_type(ty);
        match self.kind(ty) {
            TypeKind::Leaf(_) | TypeKind::Enum(_) => false,
            TypeKind::List(_) | TypeKind::Required(_) => {
                unreachable!("final_type strips modifiers")
            }
            TypeKind::Composite(_) => {
                if let Some(known) = self.requirement.get(ty) {
                    return known;
                }
                let required = self.reaches_binding(ty);
                self.requirement.store(ty, required);
                tracing::trace!(ty = %self.type_display(ty), required, "memoized requirement");
                required
            }
        }
    }

    /// Depth-first search over composites reachable from `root`. Cycles are
    /// cut by the visited set; known negative answers prune whole subgraphs.
    fn reaches_binding(&self, root: TypeId) -> bool {
        let mut visited = AHashSet::new();
        let mut stack = vec![root];
        while let Some(ty) = stack.pop() {
            if !visited.insert(ty) {
                continue;
            }
            match self.requirement.get(ty) {
                Some(true) => return true,
                Some(false) if ty != root => continue,
                _ => {}
            }
            let Some(composite) = self.composite(ty) else {
                continue;
            };
            for &field in composite.fields.values() {
                let entry = self.entry(field);
                if entry.binding.validation.is_some() {
                    return true;
                }
                let inner = self.final_type(entry.ty);
                if matches!(self.kind(inner), TypeKind::Composite(_)) {
                    stack.push(inner);
                }
            }
        }
        false
    }

    /// Whether any declared argument of operation field `field` needs work.
    pub fn arguments_require_validation(&self, field: EntryId) -> bool {
        let entry = self.entry(field);
        entry.arguments_flagged
            || entry.arguments.values().any(|&arg| {
                let arg = self.entry(arg);
                arg.binding.validation.is_some() || self.requires_validation(arg.ty)
            })
    }
}
