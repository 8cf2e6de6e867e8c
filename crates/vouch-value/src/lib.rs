//! Value trees validated by the vouch engine.
//!
//! Containers are reference counted so that a validated tree can share every
//! untouched branch with its input. Identity of containers is observable via
//! [`Value::same`], which is what copy-on-write reconstruction relies on.

/// A type-safe data-type of values flowing through validation.
pub mod value;

/// Insertion-ordered string-keyed objects.
pub mod object;

/// Data structure for representing a location inside a value tree.
pub mod path;

/// Conversion between [`Value`] and `serde_json::Value`.
pub mod json;

pub use json::ConversionError;
pub use object::Object;
pub use path::{PathSegment, ValuePath};
pub use value::{Value, ValueKind};
