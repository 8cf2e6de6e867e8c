use ahash::AHashMap;
use indexmap::IndexMap;
use vouch_value::Value;

use crate::binding::Binding;
use crate::error::SchemaError;
use crate::requirement::RequirementTable;
use crate::types::{CompositeType, TypeKind};

/// Index of a type descriptor in its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

/// Index of an entry (field or argument) in its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub usize);

/// The container an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Field of a composite type
    Composite(TypeId),
    /// Argument of an operation field
    Field(EntryId),
    /// Free-standing entry, validated on its own
    Root,
}

/// A bindable schema location.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub ty: TypeId,
    /// Schema-declared default value
    pub default: Option<Value>,
    pub owner: Owner,
    /// Declared arguments when this entry is an operation field
    pub arguments: IndexMap<String, EntryId>,
    pub binding: Binding,
    /// Set eagerly when an argument of this entry gets bound.
    pub(crate) arguments_flagged: bool,
}

/// Arena of type descriptors and entries.
///
/// Types and entries are immutable once built; the only state that changes
/// during request handling is the requirement memo, which is write-once and
/// lock-free.
#[derive(Debug)]
pub struct Schema {
    pub(crate) types: Vec<TypeKind>,
    pub(crate) entries: Vec<Entry>,
    pub(crate) names: AHashMap<String, TypeId>,
    pub(crate) requirement: RequirementTable,
}

impl Schema {
    /// Get the descriptor of a type.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this schema. Use [`Schema::get_type`]
    /// for untrusted ids.
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.0]
    }

    pub fn get_type(&self, id: TypeId) -> Result<&TypeKind, SchemaError> {
        self.types.get(id.0).ok_or(SchemaError::UnknownType(id))
    }

    /// Get an entry.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this schema. Use
    /// [`Schema::get_entry`] for untrusted ids.
    pub fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    pub fn get_entry(&self, id: EntryId) -> Result<&Entry, SchemaError> {
        self.entries.get(id.0).ok_or(SchemaError::UnknownEntry(id))
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> Result<&mut Entry, SchemaError> {
        self.entries
            .get_mut(id.0)
            .ok_or(SchemaError::UnknownEntry(id))
    }

    /// Look up a named leaf, enum or composite type.
    pub fn type_named(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    /// The composite descriptor behind `id`, if it is one.
    pub fn composite(&self, id: TypeId) -> Option<&CompositeType> {
        match self.types.get(id.0) {
            Some(TypeKind::Composite(c)) => Some(c),
            _ => None,
        }
    }

    /// Field `name` of composite `ty`.
    pub fn field(&self, ty: TypeId, name: &str) -> Option<EntryId> {
        self.composite(ty)?.fields.get(name).copied()
    }

    /// Argument `name` of operation field `field`.
    pub fn argument(&self, field: EntryId, name: &str) -> Option<EntryId> {
        self.entries.get(field.0)?.arguments.get(name).copied()
    }

    pub fn is_required(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Required(_))
    }

    /// Strip one Required modifier, if present.
    pub fn unwrap_required(&self, ty: TypeId) -> TypeId {
        match self.kind(ty) {
            TypeKind::Required(of) => *of,
            _ => ty,
        }
    }

    /// Strip every List/Required modifier to reach the innermost named type.
    pub fn final_type(&self, mut ty: TypeId) -> TypeId {
        loop {
            match self.kind(ty) {
                TypeKind::List(of) | TypeKind::Required(of) => ty = *of,
                TypeKind::Leaf(_) | TypeKind::Enum(_) | TypeKind::Composite(_) => return ty,
            }
        }
    }

    /// Whether a Required modifier appears anywhere in the modifier chain of
    /// `ty`, e.g. `[Int!]` or `[Int]!`.
    pub fn contains_required_deep(&self, mut ty: TypeId) -> bool {
        loop {
            match self.kind(ty) {
                TypeKind::Required(_) => return true,
                TypeKind::List(of) => ty = *of,
                TypeKind::Leaf(_) | TypeKind::Enum(_) | TypeKind::Composite(_) => return false,
            }
        }
    }

    /// Human readable rendering such as `[Int!]!`.
    pub fn type_display(&self, ty: TypeId) -> String {
        match self.kind(ty) {
            TypeKind::Leaf(leaf) => leaf.name.clone(),
            TypeKind::Enum(e) => e.name.clone(),
            TypeKind::Composite(c) => c.name.clone(),
            TypeKind::List(of) => format!("[{}]", self.type_display(*of)),
            TypeKind::Required(of) => format!("{}!", self.type_display(*of)),
        }
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Scalar, SchemaBuilder};

    #[test]
    fn test_modifier_helpers() {
        let mut b = SchemaBuilder::new();
        let int = b.scalar(Scalar::Int);
        let req_int = b.required(int);
        let list = b.list_of(req_int);
        let req_list = b.required(list);
        let plain_list = b.list_of(int);
        let schema = b.finish();

        assert_eq!(schema.unwrap_required(req_list), list);
        assert_eq!(schema.unwrap_required(list), list);
        assert_eq!(schema.final_type(req_list), int);
        assert!(schema.contains_required_deep(list));
        assert!(schema.contains_required_deep(req_list));
        assert!(!schema.contains_required_deep(plain_list));
        assert_eq!(schema.type_display(req_list), "[Int!]!");
    }
}
