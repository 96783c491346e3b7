mod entry;

mod identity;
pub use identity::{IdentityValue, IdentityValues};

mod record;
pub use record::ValueRecord;

use crate::{Error, Result, Type};
use indexmap::IndexMap;

/// A dynamically typed value read from a source or stored in a record.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit float
    F64(f64),

    /// String value
    String(String),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// Ordered list of values
    List(Vec<Value>),

    /// String keyed map, iterated in insertion order
    Map(IndexMap<String, Value>),

    /// An instance of a model
    Record(ValueRecord),
}

impl Value {
    pub const fn null() -> Value {
        Value::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub const fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Name of the variant, used in conversion errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Record(_) => "Record",
        }
    }

    /// Returns `true` if the value can be stored in a slot of type `ty`.
    /// `Null` fits every type; nullability is checked separately.
    pub fn is_a(&self, ty: &Type) -> bool {
        match (self, ty) {
            (_, Type::Any) | (Value::Null, _) => true,
            (Value::Bool(_), Type::Bool) => true,
            (Value::I32(_), Type::I32) => true,
            (Value::I64(_), Type::I64) => true,
            (Value::F64(_), Type::F64) => true,
            (Value::String(_), Type::String) => true,
            (Value::Bytes(_), Type::Bytes) => true,
            (Value::Record(record), Type::Model(id)) => record.model() == *id,
            (Value::List(items), Type::List(ty)) => items.iter().all(|item| item.is_a(ty)),
            (Value::Map(entries), Type::Map(ty)) => entries.values().all(|item| item.is_a(ty)),
            _ => false,
        }
    }

    pub fn to_bool(self) -> Result<bool> {
        match self {
            Value::Bool(v) => Ok(v),
            _ => Err(Error::type_conversion(&self, "bool")),
        }
    }

    pub fn to_i32(self) -> Result<i32> {
        match self {
            Value::I32(v) => Ok(v),
            _ => Err(Error::type_conversion(&self, "i32")),
        }
    }

    pub fn to_i64(self) -> Result<i64> {
        match self {
            Value::I64(v) => Ok(v),
            Value::I32(v) => Ok(v.into()),
            _ => Err(Error::type_conversion(&self, "i64")),
        }
    }

    pub fn to_f64(self) -> Result<f64> {
        match self {
            Value::F64(v) => Ok(v),
            _ => Err(Error::type_conversion(&self, "f64")),
        }
    }

    pub fn to_string(self) -> Result<String> {
        match self {
            Value::String(v) => Ok(v),
            _ => Err(Error::type_conversion(&self, "String")),
        }
    }

    pub fn to_option_string(self) -> Result<Option<String>> {
        match self {
            Value::Null => Ok(None),
            Value::String(v) => Ok(Some(v)),
            _ => Err(Error::type_conversion(&self, "Option<String>")),
        }
    }

    pub fn to_option_i64(self) -> Result<Option<i64>> {
        match self {
            Value::Null => Ok(None),
            value => value.to_i64().map(Some),
        }
    }

    pub fn to_record(self) -> Result<ValueRecord> {
        match self {
            Value::Record(record) => Ok(record),
            _ => Err(Error::type_conversion(&self, "record")),
        }
    }

    pub fn to_option_record(self) -> Result<Option<ValueRecord>> {
        match self {
            Value::Null => Ok(None),
            Value::Record(record) => Ok(Some(record)),
            _ => Err(Error::type_conversion(&self, "Option<record>")),
        }
    }

    pub fn to_list(self) -> Result<Vec<Value>> {
        match self {
            Value::List(items) => Ok(items),
            _ => Err(Error::type_conversion(&self, "list")),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&ValueRecord> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Value {
        Value::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Value {
        Value::I32(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Value {
        Value::I64(src)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Value {
        Value::F64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Value {
        Value::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Value {
        Value::String(src.clone())
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Value {
        Value::String(src.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(src: Vec<u8>) -> Value {
        Value::Bytes(src)
    }
}

impl From<Vec<Value>> for Value {
    fn from(src: Vec<Value>) -> Value {
        Value::List(src)
    }
}

impl From<ValueRecord> for Value {
    fn from(value: ValueRecord) -> Value {
        Value::Record(value)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Value {
        match value {
            Some(value) => Value::from(value),
            None => Value::Null,
        }
    }
}
