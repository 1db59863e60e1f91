/*!
 * Dynamic Values
 *
 * A small dynamically typed value for callers that need heterogeneous keys
 * or values in one collection. `List` is the mutable sequence and cannot be a
 * key; `Tuple` can, as long as nothing inside it is a `List`.
 */

use super::key::HashKey;
use crate::core::errors::KeyError;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

/// Dynamically typed key or value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Value>),
    List(Vec<Value>),
}

impl Value {
    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
        }
    }

    /// Whether this value can be used as a map or set key
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }

    #[inline]
    fn tag(&self) -> u8 {
        match self {
            Value::None => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Str(_) => 4,
            Value::Bytes(_) => 5,
            Value::Tuple(_) => 6,
            Value::List(_) => 7,
        }
    }
}

/// Bit pattern with `-0.0` folded into `0.0` and every NaN made canonical
#[inline]
fn float_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_bits(*a) == float_bits(*b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl HashKey for Value {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<(), KeyError> {
        state.write_u8(self.tag());
        match self {
            Value::None => {}
            Value::Bool(b) => state.write_u8(u8::from(*b)),
            Value::Int(i) => state.write_i64(*i),
            Value::Float(f) => state.write_u64(float_bits(*f)),
            Value::Str(s) => {
                state.write(s.as_bytes());
                state.write_u8(0xff);
            }
            Value::Bytes(b) => {
                state.write_usize(b.len());
                state.write(b);
            }
            Value::Tuple(items) => {
                state.write_usize(items.len());
                for item in items {
                    item.try_hash(state)?;
                }
            }
            Value::List(_) => return Err(KeyError::unhashable(self.type_name())),
        }
        Ok(())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}
