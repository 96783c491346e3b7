use crate::schema::ModelId;
use std::fmt;

/// Declared type of a property or of a getter's output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I32,
    I64,
    F64,
    String,
    Bytes,

    /// An instance of a model in the schema
    Model(ModelId),

    /// Ordered list of the inner type
    List(Box<Type>),

    /// String-keyed map of the inner type
    Map(Box<Type>),

    /// Any value. Getters of this type skip the conversion step.
    Any,
}

impl Type {
    pub fn list(ty: impl Into<Type>) -> Type {
        Type::List(Box::new(ty.into()))
    }

    pub fn map(ty: impl Into<Type>) -> Type {
        Type::Map(Box::new(ty.into()))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool)
    }

    pub fn is_i32(&self) -> bool {
        matches!(self, Type::I32)
    }

    pub fn is_i64(&self) -> bool {
        matches!(self, Type::I64)
    }

    pub fn is_f64(&self) -> bool {
        matches!(self, Type::F64)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::String)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    pub fn as_model(&self) -> Option<ModelId> {
        match self {
            Type::Model(id) => Some(*id),
            _ => None,
        }
    }

    /// Element type of a list or map.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::List(ty) | Type::Map(ty) => Some(ty),
            _ => None,
        }
    }

    /// True for types stored directly in a single column.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Type::Bool | Type::I32 | Type::I64 | Type::F64 | Type::String | Type::Bytes
        )
    }
}

impl From<ModelId> for Type {
    fn from(id: ModelId) -> Type {
        Type::Model(id)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("Bool"),
            Type::I32 => f.write_str("I32"),
            Type::I64 => f.write_str("I64"),
            Type::F64 => f.write_str("F64"),
            Type::String => f.write_str("String"),
            Type::Bytes => f.write_str("Bytes"),
            Type::Model(id) => write!(f, "Model({})", id.0),
            Type::List(ty) => write!(f, "List<{ty}>"),
            Type::Map(ty) => write!(f, "Map<{ty}>"),
            Type::Any => f.write_str("Any"),
        }
    }
}
