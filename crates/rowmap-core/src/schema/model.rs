use super::{Field, FieldId, Name};
use std::fmt;

/// A target type: named fields, the constructor signature and an optional
/// parent model the type can stand in for.
#[derive(Debug, Clone)]
pub struct Model {
    /// Uniquely identifies the model within the schema
    pub id: ModelId,

    /// Name of the model
    pub name: Name,

    /// Fields contained by the model, in record order
    pub fields: Vec<Field>,

    /// Field indices passed to the constructor, in parameter order. Fields
    /// not listed here are set after construction.
    pub constructor: Vec<usize>,

    /// Model this one inherits from. An inheriting model starts with the
    /// parent's fields, in the same order.
    pub parent: Option<ModelId>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelId(pub usize);

impl Model {
    pub fn field(&self, field: impl Into<FieldId>) -> &Field {
        let field_id = field.into();
        assert_eq!(self.id, field_id.model);
        &self.fields[field_id.index]
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name.as_str() == name)
    }

    /// Constructor parameter position of the field at `index`.
    pub fn constructor_position(&self, index: usize) -> Option<usize> {
        self.constructor.iter().position(|field| *field == index)
    }

    /// True when the model is built through its constructor rather than
    /// from an all-null record.
    pub fn has_constructor(&self) -> bool {
        !self.constructor.is_empty()
    }
}

impl ModelId {
    /// Create a `FieldId` representing the current model's field at index
    /// `index`.
    pub const fn field(self, index: usize) -> FieldId {
        FieldId { model: self, index }
    }
}

impl From<&ModelId> for ModelId {
    fn from(src: &ModelId) -> ModelId {
        *src
    }
}

impl From<&Model> for ModelId {
    fn from(value: &Model) -> Self {
        value.id
    }
}

impl fmt::Debug for ModelId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ModelId({})", self.0)
    }
}
