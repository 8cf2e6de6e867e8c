//! Schema assembly.
//!
//! [`SchemaBuilder`] maintains:
//! - An arena of type descriptors and entries
//! - A cache of builtin scalars so each one is defined once
//! - The name index for leaf, enum and composite types
//!
//! Composite types are declared first and filled with fields afterwards, so
//! recursive and mutually recursive composites need no special handling.

use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};
use vouch_value::Value;

use crate::binding::Binding;
use crate::error::SchemaError;
use crate::requirement::RequirementTable;
use crate::schema::{Entry, EntryId, Owner, Schema, TypeId};
use crate::types::{Coerce, CompositeType, EnumType, LeafType, Scalar, TypeKind};

/// Builder for constructing a [`Schema`].
///
/// # Example
///
/// ```
/// use vouch_schema::{Scalar, SchemaBuilder};
///
/// let mut b = SchemaBuilder::new();
/// let int = b.scalar(Scalar::Int);
/// let query = b.composite("Query").unwrap();
/// let things = b.field(query, "things", int).unwrap();
/// b.argument(things, "limit", int).unwrap();
/// let schema = b.finish();
/// assert!(schema.argument(things, "limit").is_some());
/// ```
pub struct SchemaBuilder {
    types: Vec<TypeKind>,
    entries: Vec<Entry>,
    names: AHashMap<String, TypeId>,
    scalars: AHashMap<Scalar, TypeId>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            entries: Vec::new(),
            names: AHashMap::new(),
            scalars: AHashMap::new(),
        }
    }

    fn push_type(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(kind);
        id
    }

    fn register_name(&mut self, name: &str, id: TypeId) -> Result<(), SchemaError> {
        if self.names.contains_key(name) {
            return Err(SchemaError::DuplicateTypeName {
                name: name.to_string(),
            });
        }
        self.names.insert(name.to_string(), id);
        Ok(())
    }

    /// Get or create a builtin scalar. Idempotent.
    pub fn scalar(&mut self, scalar: Scalar) -> TypeId {
        if let Some(&id) = self.scalars.get(&scalar) {
            return id;
        }
        let id = self.push_type(TypeKind::Leaf(scalar.leaf()));
        self.scalars.insert(scalar, id);
        self.names.entry(scalar.name().to_string()).or_insert(id);
        id
    }

    /// Define a custom leaf type.
    pub fn leaf(&mut self, name: &str, coerce: Coerce) -> Result<TypeId, SchemaError> {
        let id = TypeId(self.types.len());
        self.register_name(name, id)?;
        Ok(self.push_type(TypeKind::Leaf(LeafType::new(name, coerce))))
    }

    pub fn enumeration<I, S>(&mut self, name: &str, values: I) -> Result<TypeId, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = TypeId(self.types.len());
        self.register_name(name, id)?;
        let values: IndexSet<String> = values.into_iter().map(Into::into).collect();
        Ok(self.push_type(TypeKind::Enum(EnumType {
            name: name.to_string(),
            values,
        })))
    }

    pub fn list_of(&mut self, of: TypeId) -> TypeId {
        self.push_type(TypeKind::List(of))
    }

    pub fn required(&mut self, of: TypeId) -> TypeId {
        self.push_type(TypeKind::Required(of))
    }

    /// Declare an empty composite type. Fields are added with
    /// [`SchemaBuilder::field`].
    pub fn composite(&mut self, name: &str) -> Result<TypeId, SchemaError> {
        let id = TypeId(self.types.len());
        self.register_name(name, id)?;
        Ok(self.push_type(TypeKind::Composite(CompositeType {
            name: name.to_string(),
            fields: IndexMap::new(),
        })))
    }

    fn push_entry(&mut self, name: &str, ty: TypeId, owner: Owner) -> Result<EntryId, SchemaError> {
        if ty.0 >= self.types.len() {
            return Err(SchemaError::UnknownType(ty));
        }
        let id = EntryId(self.entries.len());
        self.entries.push(Entry {
            name: name.to_string(),
            ty,
            default: None,
            owner,
            arguments: IndexMap::new(),
            binding: Binding::default(),
            arguments_flagged: false,
        });
        Ok(id)
    }

    /// Add a field of type `ty` to `composite`.
    pub fn field(
        &mut self,
        composite: TypeId,
        name: &str,
        ty: TypeId,
    ) -> Result<EntryId, SchemaError> {
        let container = match self.types.get(composite.0) {
            Some(TypeKind::Composite(c)) => {
                if c.fields.contains_key(name) {
                    return Err(SchemaError::DuplicateField {
                        container: c.name.clone(),
                        field: name.to_string(),
                    });
                }
                c.name.clone()
            }
            Some(other) => {
                return Err(SchemaError::NotComposite {
                    actual: other.kind_name().to_string(),
                });
            }
            None => return Err(SchemaError::UnknownType(composite)),
        };
        let id = self.push_entry(name, ty, Owner::Composite(composite))?;
        if let Some(TypeKind::Composite(c)) = self.types.get_mut(composite.0) {
            c.fields.insert(name.to_string(), id);
        }
        tracing::trace!(container = %container, field = name, "declared field");
        Ok(id)
    }

    /// Declare an argument of operation field `field`.
    pub fn argument(
        &mut self,
        field: EntryId,
        name: &str,
        ty: TypeId,
    ) -> Result<EntryId, SchemaError> {
        let owner = self
            .entries
            .get(field.0)
            .ok_or(SchemaError::UnknownEntry(field))?;
        if owner.arguments.contains_key(name) {
            return Err(SchemaError::DuplicateArgument {
                field: owner.name.clone(),
                argument: name.to_string(),
            });
        }
        let id = self.push_entry(name, ty, Owner::Field(field))?;
        self.entries[field.0].arguments.insert(name.to_string(), id);
        Ok(id)
    }

    /// Declare a free-standing entry that belongs to no container.
    pub fn entry(&mut self, name: &str, ty: TypeId) -> Result<EntryId, SchemaError> {
        self.push_entry(name, ty, Owner::Root)
    }

    /// Set the schema-declared default of an entry.
    pub fn default_value(&mut self, entry: EntryId, value: Value) -> Result<(), SchemaError> {
        let entry = self
            .entries
            .get_mut(entry.0)
            .ok_or(SchemaError::UnknownEntry(entry))?;
        entry.default = Some(value);
        Ok(())
    }

    /// Consume the builder and produce the final schema.
    pub fn finish(self) -> Schema {
        let requirement = RequirementTable::new(self.types.len());
        Schema {
            types: self.types,
            entries: self.entries,
            names: self.names,
            requirement,
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
