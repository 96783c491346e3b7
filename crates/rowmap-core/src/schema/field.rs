use super::{ModelId, Name};
use crate::Type;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Field {
    /// Uniquely identifies the field within the containing model.
    pub id: FieldId,

    /// The field name
    pub name: Name,

    /// Scalar, sub-object, list or map
    pub ty: Type,

    /// True if the field accepts null
    pub nullable: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldId {
    pub model: ModelId,
    pub index: usize,
}

impl Field {
    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

impl From<&Field> for FieldId {
    fn from(value: &Field) -> Self {
        value.id
    }
}

impl From<&FieldId> for FieldId {
    fn from(value: &FieldId) -> Self {
        *value
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({}/{})", self.model.0, self.index)
    }
}
