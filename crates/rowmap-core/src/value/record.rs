use super::Value;
use crate::schema::ModelId;

use std::ops;

/// Field values of one model instance, positional by field index.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRecord {
    model: ModelId,
    pub fields: Vec<Value>,
}

impl ValueRecord {
    /// A record of `len` null fields.
    pub fn new(model: ModelId, len: usize) -> ValueRecord {
        ValueRecord {
            model,
            fields: vec![Value::Null; len],
        }
    }

    pub fn from_vec(model: ModelId, fields: Vec<Value>) -> ValueRecord {
        ValueRecord { model, fields }
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn into_fields(self) -> Vec<Value> {
        self.fields
    }
}

impl ops::Deref for ValueRecord {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.fields[..]
    }
}

impl ops::DerefMut for ValueRecord {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.fields[..]
    }
}

impl<'a> IntoIterator for &'a ValueRecord {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
