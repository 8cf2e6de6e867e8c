use core::fmt::Display;

use serde::{Serialize, Serializer};
use thisisplural::Plural;

/// Location of a value inside the tree handed to the engine, starting at an
/// argument or entry name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Plural)]
#[plural(len, is_empty, iter, into_iter, into_iter_ref, from_iter)]
pub struct ValuePath(pub Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object field or argument name
    Field(String),
    /// List element index
    Index(usize),
}

impl ValuePath {
    /// Create an empty path
    pub fn root() -> Self {
        ValuePath(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push_field(&mut self, name: impl Into<String>) {
        self.0.push(PathSegment::Field(name.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }

    /// Path with every segment rendered as a string, e.g. `["arg", "1"]`.
    pub fn to_strings(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|segment| match segment {
                PathSegment::Field(name) => name.clone(),
                PathSegment::Index(index) => index.to_string(),
            })
            .collect()
    }
}

impl<S: Into<String>> From<Vec<S>> for ValuePath {
    fn from(fields: Vec<S>) -> Self {
        ValuePath(
            fields
                .into_iter()
                .map(|f| PathSegment::Field(f.into()))
                .collect(),
        )
    }
}

impl Display for ValuePath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        let mut is_first = true;
        for segment in &self.0 {
            match segment {
                PathSegment::Field(name) => {
                    if !is_first {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
            is_first = false;
        }
        Ok(())
    }
}

impl Serialize for ValuePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_strings().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_empty_path() {
        assert_eq!(format!("{}", ValuePath::root()), "(root)");
    }

    #[test]
    fn test_display_nested() {
        let mut path = ValuePath::root();
        path.push_field("input");
        path.push_field("numbers");
        path.push_index(3);
        assert_eq!(format!("{}", path), "input.numbers[3]");
    }

    #[test]
    fn test_to_strings() {
        let mut path = ValuePath::from(vec!["arg"]);
        path.push_index(1);
        assert_eq!(path.to_strings(), vec!["arg", "1"]);
    }

    #[test]
    fn test_serializes_as_string_list() {
        let mut path = ValuePath::from(vec!["arg"]);
        path.push_index(2);
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, serde_json::json!(["arg", "2"]));
    }
}
