//! Type descriptors.
//!
//! The set of descriptors is closed: every consumer matches on [`TypeKind`]
//! exhaustively, so adding a variant is a compile error everywhere it must be
//! handled.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use num_traits::ToPrimitive;
use vouch_value::Value;

use crate::schema::{EntryId, TypeId};

/// Scalar coercion check. `Err` carries a human readable reason.
pub type Coerce = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub enum TypeKind {
    Leaf(LeafType),
    Enum(EnumType),
    List(TypeId),
    Required(TypeId),
    Composite(CompositeType),
}

impl TypeKind {
    /// Short name of the descriptor kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeKind::Leaf(_) => "leaf",
            TypeKind::Enum(_) => "enum",
            TypeKind::List(_) => "list",
            TypeKind::Required(_) => "required",
            TypeKind::Composite(_) => "composite",
        }
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Leaf(leaf) => f.debug_tuple("Leaf").field(&leaf.name).finish(),
            TypeKind::Enum(e) => f.debug_tuple("Enum").field(&e.name).finish(),
            TypeKind::List(of) => f.debug_tuple("List").field(of).finish(),
            TypeKind::Required(of) => f.debug_tuple("Required").field(of).finish(),
            TypeKind::Composite(c) => f
                .debug_struct("Composite")
                .field("name", &c.name)
                .field("fields", &c.fields)
                .finish(),
        }
    }
}

/// Terminal scalar type with its coercion check.
#[derive(Clone)]
pub struct LeafType {
    pub name: String,
    coerce: Coerce,
}

impl LeafType {
    pub fn new(name: impl Into<String>, coerce: Coerce) -> Self {
        Self {
            name: name.into(),
            coerce,
        }
    }

    pub fn coerce(&self, value: &Value) -> Result<(), String> {
        (self.coerce)(value)
    }
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub values: IndexSet<String>,
}

impl EnumType {
    pub fn coerce(&self, value: &Value) -> Result<(), String> {
        match value {
            Value::Text(s) if self.values.contains(s) => Ok(()),
            other => Err(format!(
                "Enum \"{}\" cannot represent value: {}",
                self.name, other
            )),
        }
    }
}

/// Named aggregate of independently bindable fields.
#[derive(Debug, Clone)]
pub struct CompositeType {
    pub name: String,
    pub fields: IndexMap<String, EntryId>,
}

/// Builtin scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Integer in the signed 32-bit range
    Int,
    /// Finite float or integer
    Float,
    String,
    Boolean,
    /// Text or integer identifier
    Id,
}

impl Scalar {
    pub fn name(self) -> &'static str {
        match self {
            Scalar::Int => "Int",
            Scalar::Float => "Float",
            Scalar::String => "String",
            Scalar::Boolean => "Boolean",
            Scalar::Id => "ID",
        }
    }

    pub fn coerce(self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Scalar::Int, Value::Integer(n)) => {
                if n.to_i32().is_some() {
                    Ok(())
                } else {
                    Err(format!(
                        "Int cannot represent non 32-bit signed integer value: {}",
                        n
                    ))
                }
            }
            (Scalar::Int, other) => Err(format!(
                "Int cannot represent non-integer value: {}",
                other
            )),
            (Scalar::Float, Value::Integer(_)) => Ok(()),
            (Scalar::Float, Value::Float(x)) if x.is_finite() => Ok(()),
            (Scalar::Float, other) => Err(format!(
                "Float cannot represent non numeric value: {}",
                other
            )),
            (Scalar::String, Value::Text(_)) => Ok(()),
            (Scalar::String, other) => Err(format!(
                "String cannot represent a non string value: {}",
                other
            )),
            (Scalar::Boolean, Value::Bool(_)) => Ok(()),
            (Scalar::Boolean, other) => Err(format!(
                "Boolean cannot represent a non boolean value: {}",
                other
            )),
            (Scalar::Id, Value::Text(_) | Value::Integer(_)) => Ok(()),
            (Scalar::Id, other) => Err(format!("ID cannot represent value: {}", other)),
        }
    }

    pub(crate) fn leaf(self) -> LeafType {
        LeafType::new(self.name(), Arc::new(move |value| self.coerce(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_int_rejects_values_outside_i32() {
        assert!(Scalar::Int.coerce(&Value::from(i32::MAX)).is_ok());
        let err = Scalar::Int
            .coerce(&Value::Integer(BigInt::from(i32::MAX) + 1))
            .unwrap_err();
        assert!(err.contains("non 32-bit"));
        assert!(Scalar::Int.coerce(&Value::from("1")).is_err());
    }

    #[test]
    fn test_float_accepts_integers_but_not_nan() {
        assert!(Scalar::Float.coerce(&Value::from(3)).is_ok());
        assert!(Scalar::Float.coerce(&Value::Float(1.5)).is_ok());
        assert!(Scalar::Float.coerce(&Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_id_accepts_text_and_integer() {
        assert!(Scalar::Id.coerce(&Value::from("abc")).is_ok());
        assert!(Scalar::Id.coerce(&Value::from(12)).is_ok());
        assert!(Scalar::Id.coerce(&Value::Bool(true)).is_err());
    }

    #[test]
    fn test_enum_coerce() {
        let e = EnumType {
            name: "Color".to_string(),
            values: ["RED", "GREEN"].into_iter().map(String::from).collect(),
        };
        assert!(e.coerce(&Value::from("RED")).is_ok());
        let err = e.coerce(&Value::from("BLUE")).unwrap_err();
        assert_eq!(err, "Enum \"Color\" cannot represent value: \"BLUE\"");
    }
}
