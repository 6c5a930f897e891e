// used for limits of arbitrary size
use bigdecimal::ToPrimitive;
use bigdecimal::num_bigint::{BigInt, Sign};

// used when parsing a string to a Limit
use std::str::FromStr;
// used to print out readable forms of a data type
use std::fmt;
// used to expose the wrapped integer of a limit
use std::ops;

use crate::error::{ClientError, Result};

/// A Rust scalar that can be used as a constraint value.
pub trait DataType: fmt::Display {
    // static stuff which needs to be implemented downstream
    const UID: u8;
    const DATA_TYPE: &'static str;
    fn into_value(self) -> Value;
}

// ------------- Data Types --------------
impl DataType for String {
    const UID: u8 = 1;
    const DATA_TYPE: &'static str = "string";
    fn into_value(self) -> Value {
        Value::String(self)
    }
}
impl DataType for &str {
    const UID: u8 = 1;
    const DATA_TYPE: &'static str = "string";
    fn into_value(self) -> Value {
        Value::String(self.to_owned())
    }
}
impl DataType for i64 {
    const UID: u8 = 2;
    const DATA_TYPE: &'static str = "int64";
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}
impl DataType for i32 {
    const UID: u8 = 2;
    const DATA_TYPE: &'static str = "int64";
    fn into_value(self) -> Value {
        Value::Int(self.into())
    }
}
impl DataType for u32 {
    const UID: u8 = 2;
    const DATA_TYPE: &'static str = "int64";
    fn into_value(self) -> Value {
        Value::Int(self.into())
    }
}
impl DataType for f64 {
    const UID: u8 = 3;
    const DATA_TYPE: &'static str = "float";
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

/// The attribute values a space can be searched on.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn data_type(&self) -> &'static str {
        match self {
            Value::String(_) => String::DATA_TYPE,
            Value::Int(_) => i64::DATA_TYPE,
            Value::Float(_) => f64::DATA_TYPE,
        }
    }
    pub fn identifier(&self) -> u8 {
        match self {
            Value::String(_) => String::UID,
            Value::Int(_) => i64::UID,
            Value::Float(_) => f64::UID,
        }
    }
    /// Converts a JSON scalar. Anything that is not a string or a number is
    /// not a searchable value.
    pub fn from_json(json: &serde_json::Value) -> Result<Value> {
        match json {
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if n.is_u64() {
                    Err(ClientError::Type(format!("integer {} does not fit in int64", n)))
                } else {
                    n.as_f64().map(Value::Float).ok_or_else(|| {
                        ClientError::Type(format!("number {} is not representable", n))
                    })
                }
            }
            other => Err(ClientError::Type(format!(
                "unsupported value {} (expected string or number)",
                other
            ))),
        }
    }
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::from(s.as_str()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(x) => serde_json::Value::from(*x),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

impl<T: DataType> From<T> for Value {
    fn from(value: T) -> Value {
        value.into_value()
    }
}

/// Maximum number of objects a sorted search returns. Non-negative, and not
/// bounded by the machine word.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Limit(BigInt);

impl Limit {
    pub fn new(value: BigInt) -> Result<Limit> {
        if value.sign() == Sign::Minus {
            return Err(ClientError::Value(format!("limit must be non-negative, got {}", value)));
        }
        Ok(Limit(value))
    }
    /// The limit as a machine word, when it fits.
    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }
}
impl From<u64> for Limit {
    fn from(value: u64) -> Limit {
        Limit(BigInt::from(value))
    }
}
impl From<u32> for Limit {
    fn from(value: u32) -> Limit {
        Limit(BigInt::from(value))
    }
}
impl From<usize> for Limit {
    fn from(value: usize) -> Limit {
        Limit(BigInt::from(value))
    }
}
impl TryFrom<BigInt> for Limit {
    type Error = ClientError;
    fn try_from(value: BigInt) -> Result<Limit> {
        Limit::new(value)
    }
}
impl FromStr for Limit {
    type Err = ClientError;
    fn from_str(s: &str) -> Result<Limit> {
        let value = BigInt::from_str(s.trim())
            .map_err(|e| ClientError::Value(format!("limit {:?} is not an integer: {}", s, e)))?;
        Limit::new(value)
    }
}
impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl ops::Deref for Limit {
    type Target = BigInt;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
