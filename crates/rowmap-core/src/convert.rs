use crate::{Error, MappingContext, Result, Type, Value};
use std::{fmt, sync::Arc};

/// The single conversion step a plan may insert between a getter and the
/// property it feeds.
pub trait Converter: Send + Sync {
    fn convert(&self, value: Value, cx: &MappingContext) -> Result<Value>;
}

impl<F> Converter for F
where
    F: Fn(Value, &MappingContext) -> Result<Value> + Send + Sync,
{
    fn convert(&self, value: Value, cx: &MappingContext) -> Result<Value> {
        self(value, cx)
    }
}

/// Converters keyed by (source type, target type).
///
/// Registered converters are consulted first. Without one, values from an
/// untyped getter are coerced to the target type, strings are parsed into
/// primitives and integers widen.
#[derive(Clone, Default)]
pub struct Converters {
    registered: Vec<(Type, Type, Arc<dyn Converter>)>,
}

/// Coerces any value into one target type. See [`coerce`].
#[derive(Debug, Clone)]
pub struct CoerceTo(pub Type);

impl Converters {
    pub fn new() -> Converters {
        Converters::default()
    }

    pub fn register(&mut self, from: Type, to: Type, converter: Arc<dyn Converter>) {
        self.registered.push((from, to, converter));
    }

    /// The converter to insert between a getter producing `from` and a
    /// property of type `to`, or `None` when the types cannot be bridged.
    pub fn find(&self, from: &Type, to: &Type) -> Option<Arc<dyn Converter>> {
        if let Some((_, _, converter)) = self
            .registered
            .iter()
            .rev()
            .find(|(f, t, _)| f == from && t == to)
        {
            return Some(converter.clone());
        }

        let builtin = match (from, to) {
            (Type::Any, _) => true,
            (Type::String, to) => to.is_scalar(),
            (Type::I32, Type::I64 | Type::F64 | Type::Bool | Type::String) => true,
            (Type::I64, Type::I32 | Type::F64 | Type::Bool | Type::String) => true,
            (Type::F64 | Type::Bool, Type::String) => true,
            _ => false,
        };

        builtin.then(|| Arc::new(CoerceTo(to.clone())) as Arc<dyn Converter>)
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.registered.iter().map(|(from, to, _)| (from, to)))
            .finish()
    }
}

impl Converter for CoerceTo {
    fn convert(&self, value: Value, _cx: &MappingContext) -> Result<Value> {
        coerce(value, &self.0)
    }
}

/// Converts `value` to `ty`.
///
/// Null stays null. Strings are parsed with `str::parse`, trimmed of
/// surrounding whitespace. Integers widen, narrow when the value fits and
/// read as booleans when 0 or 1. Scalars render into strings.
pub fn coerce(value: Value, ty: &Type) -> Result<Value> {
    if value.is_a(ty) {
        return Ok(value);
    }

    let converted = match (&value, ty) {
        (Value::String(s), Type::Bool) => match s.trim() {
            "true" | "TRUE" | "True" | "1" => Some(Value::Bool(true)),
            "false" | "FALSE" | "False" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        (Value::String(s), Type::I32) => Some(Value::I32(s.trim().parse()?)),
        (Value::String(s), Type::I64) => Some(Value::I64(s.trim().parse()?)),
        (Value::String(s), Type::F64) => Some(Value::F64(s.trim().parse()?)),
        (Value::String(s), Type::Bytes) => Some(Value::Bytes(s.as_bytes().to_vec())),
        (Value::I32(v), Type::I64) => Some(Value::I64((*v).into())),
        (Value::I32(v), Type::F64) => Some(Value::F64((*v).into())),
        (Value::I64(v), Type::I32) => i32::try_from(*v).ok().map(Value::I32),
        (Value::I64(v), Type::F64) => Some(Value::F64(*v as f64)),
        (Value::I32(0), Type::Bool) | (Value::I64(0), Type::Bool) => Some(Value::Bool(false)),
        (Value::I32(1), Type::Bool) | (Value::I64(1), Type::Bool) => Some(Value::Bool(true)),
        (Value::Bool(v), Type::String) => Some(Value::String(v.to_string())),
        (Value::I32(v), Type::String) => Some(Value::String(v.to_string())),
        (Value::I64(v), Type::String) => Some(Value::String(v.to_string())),
        (Value::F64(v), Type::String) => Some(Value::String(v.to_string())),
        _ => None,
    };

    converted.ok_or_else(|| Error::type_conversion(&value, ty.to_string()))
}
