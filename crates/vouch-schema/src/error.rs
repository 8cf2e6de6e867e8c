use thiserror::Error;

use crate::schema::{EntryId, TypeId};

/// Errors raised while assembling or binding a schema.
///
/// These are setup-time errors: they describe a broken schema, never a bad
/// request value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown type id {0:?}")]
    UnknownType(TypeId),

    #[error("unknown entry id {0:?}")]
    UnknownEntry(EntryId),

    #[error("type '{name}' is already defined")]
    DuplicateTypeName { name: String },

    #[error("'{container}' already has a field named '{field}'")]
    DuplicateField { container: String, field: String },

    #[error("'{field}' already has an argument named '{argument}'")]
    DuplicateArgument { field: String, argument: String },

    #[error("expected a composite type, got {actual}")]
    NotComposite { actual: String },

    #[error("entry '{entry}' has no declared default")]
    MissingDefault { entry: String },
}
