use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde_json::json;
use thiserror::Error;

use crate::object::Object;
use crate::value::Value;

#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error("Invalid number: cannot represent {0} as JSON number")]
    InvalidNumber(String),
}

impl Value {
    /// Convert a JSON value into a value tree.
    ///
    /// Integral JSON numbers become [`Value::Integer`], every other number
    /// becomes [`Value::Float`].
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(BigInt::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Integer(BigInt::from(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => Value::list(items.iter().map(Value::from_json)),
            serde_json::Value::Object(map) => Value::from(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect::<Object>(),
            ),
        }
    }

    /// Convert the value tree into JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, ConversionError> {
        match self {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(json!(*b)),
            Value::Integer(n) => {
                if let Some(i) = n.to_i64() {
                    Ok(json!(i))
                } else if let Some(u) = n.to_u64() {
                    Ok(json!(u))
                } else {
                    Err(ConversionError::InvalidNumber(n.to_string()))
                }
            }
            Value::Float(f) => {
                if f.is_finite() {
                    Ok(json!(*f))
                } else {
                    Err(ConversionError::InvalidNumber(format!("float value {f}")))
                }
            }
            Value::Text(s) => Ok(json!(s)),
            Value::List(items) => {
                let json_items: Result<Vec<_>, _> = items.iter().map(Value::to_json).collect();
                Ok(serde_json::Value::Array(json_items?))
            }
            Value::Object(object) => {
                let mut json_map = serde_json::Map::new();
                for (key, value) in object.iter() {
                    json_map.insert(key.clone(), value.to_json()?);
                }
                Ok(serde_json::Value::Object(json_map))
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(&json)
    }
}
