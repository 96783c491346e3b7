use super::Value;
use crate::schema::ModelId;

/// Hashable projection of a [`Value`], used as an identity key.
///
/// Floats compare by bit pattern so that `NaN` keys are stable and equal to
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityValue {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(u64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<IdentityValue>),
    Map(Vec<(String, IdentityValue)>),
    Record(ModelId, Vec<IdentityValue>),
}

/// The identity tuple of one node.
pub type IdentityValues = Vec<IdentityValue>;

impl IdentityValue {
    pub fn is_null(&self) -> bool {
        matches!(self, IdentityValue::Null)
    }
}

impl From<&Value> for IdentityValue {
    fn from(value: &Value) -> IdentityValue {
        match value {
            Value::Null => IdentityValue::Null,
            Value::Bool(v) => IdentityValue::Bool(*v),
            Value::I32(v) => IdentityValue::I32(*v),
            Value::I64(v) => IdentityValue::I64(*v),
            Value::F64(v) => IdentityValue::F64(v.to_bits()),
            Value::String(v) => IdentityValue::String(v.clone()),
            Value::Bytes(v) => IdentityValue::Bytes(v.clone()),
            Value::List(items) => IdentityValue::List(items.iter().map(Into::into).collect()),
            Value::Map(entries) => IdentityValue::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.into()))
                    .collect(),
            ),
            Value::Record(record) => IdentityValue::Record(
                record.model(),
                record.iter().map(Into::into).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_identity_by_bits() {
        let a = IdentityValue::from(&Value::F64(f64::NAN));
        let b = IdentityValue::from(&Value::F64(f64::NAN));
        assert_eq!(a, b);

        let pos = IdentityValue::from(&Value::F64(0.0));
        let neg = IdentityValue::from(&Value::F64(-0.0));
        assert_ne!(pos, neg);
    }

    #[test]
    fn integer_widths_are_distinct() {
        assert_ne!(
            IdentityValue::from(&Value::I32(1)),
            IdentityValue::from(&Value::I64(1))
        );
    }
}
