use crate::{ContextualGetter, FieldKey, GetterFactory, Result, Type, Value};
use std::sync::Arc;

/// An owned row of values with its column keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRow {
    keys: Arc<[FieldKey]>,
    values: Vec<Value>,
}

/// Reads [`ValueRow`]s.
///
/// Answers every request with an untyped getter, leaving conversion to the
/// plan. Reads by the key's index (0-based), or by name for keys without
/// one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueRowGetterFactory;

impl ValueRow {
    pub fn new(keys: Arc<[FieldKey]>, values: Vec<Value>) -> ValueRow {
        ValueRow { keys, values }
    }

    pub fn keys(&self) -> &Arc<[FieldKey]> {
        &self.keys
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let position = self.keys.iter().position(|key| key.name() == name)?;
        self.values.get(position)
    }
}

impl GetterFactory<ValueRow> for ValueRowGetterFactory {
    fn new_getter(&self, _ty: &Type, key: &FieldKey) -> Option<ContextualGetter<ValueRow>> {
        Some(match key.index() {
            Some(index) => ContextualGetter::new(Type::Any, move |row: &ValueRow, _| {
                Ok(row.get(index).cloned().unwrap_or_default())
            }),
            None => {
                let name = key.name().to_string();
                ContextualGetter::new(Type::Any, move |row: &ValueRow, _| {
                    Ok(row.get_by_name(&name).cloned().unwrap_or_default())
                })
            }
        })
    }
}

/// Convenience for building rows in tests and adapters.
pub fn value_row<I, V>(keys: &Arc<[FieldKey]>, values: I) -> Result<ValueRow>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    if values.len() != keys.len() {
        crate::bail!(
            "row has {} values for {} columns",
            values.len(),
            keys.len()
        );
    }
    Ok(ValueRow::new(keys.clone(), values))
}
