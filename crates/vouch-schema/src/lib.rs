//! Schema side of the vouch validation engine.
//!
//! A [`Schema`] is an arena of type descriptors ([`TypeKind`]) and entries
//! (composite fields and operation arguments, see [`Entry`]). Validation
//! functions are attached to entries through the binding registry, and the
//! requirement propagator answers whether a composite type ever needs to be
//! walked. Schemas are assembled once with a [`SchemaBuilder`], bound during
//! a setup pass, and then shared read-only across requests.

mod binding;
mod builder;
mod error;
mod requirement;
mod schema;
mod types;
mod validation;

pub use binding::{Binding, Policy};
pub use builder::SchemaBuilder;
pub use error::SchemaError;
pub use schema::{Entry, EntryId, Owner, Schema, TypeId};
pub use types::{Coerce, CompositeType, EnumType, LeafType, Scalar, TypeKind};
pub use validation::{
    Ambient, BoxError, Call, Diagnostics, Target, Validate, ValidationFn, ValidationFnError,
};
