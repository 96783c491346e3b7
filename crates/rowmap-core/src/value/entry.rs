use super::{Value, ValueRecord};
use crate::{schema::Step, Error, Result};

impl Value {
    /// Reads the value at `path`. Missing list positions and map entries,
    /// and paths that cross a null, read as `None`.
    pub fn entry(&self, path: &[Step]) -> Option<&Value> {
        let mut current = self;

        for step in path {
            current = match (current, step) {
                (Value::Record(record), Step::Field(index)) => record.get(*index)?,
                (Value::List(items), Step::Index(index)) => items.get(*index)?,
                (Value::Map(entries), Step::Key(key)) => entries.get(key)?,
                _ => return None,
            };
        }

        Some(current)
    }
}

impl ValueRecord {
    /// Reads the value at `path`, relative to this record.
    pub fn entry(&self, path: &[Step]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        match first {
            Step::Field(index) => self.get(*index)?.entry(rest),
            _ => None,
        }
    }

    /// Mutable access to the slot at `path`, creating intermediate lists and
    /// maps as needed. Writing past the end of a list grows it with nulls.
    pub fn slot_mut(&mut self, path: &[Step]) -> Result<&mut Value> {
        let Some((Step::Field(index), rest)) = path.split_first() else {
            return Err(Error::invalid_schema(format!(
                "record slot path must start at a field; path={path:?}"
            )));
        };

        let len = self.len();
        let mut current = self.get_mut(*index).ok_or_else(|| {
            Error::invalid_schema(format!("field {index} out of bounds for record of {len}"))
        })?;

        for step in rest {
            current = descend_mut(current, step)?;
        }

        Ok(current)
    }

    /// Stores `value` at `path`.
    pub fn assign(&mut self, path: &[Step], value: Value) -> Result<()> {
        *self.slot_mut(path)? = value;
        Ok(())
    }
}

fn descend_mut<'a>(current: &'a mut Value, step: &Step) -> Result<&'a mut Value> {
    match step {
        Step::Field(index) => match current {
            Value::Record(record) => {
                let len = record.len();
                record.get_mut(*index).ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "field {index} out of bounds for record of {len}"
                    ))
                })
            }
            other => Err(Error::type_conversion(other, "record")),
        },
        Step::Index(index) => {
            if current.is_null() {
                *current = Value::List(Vec::new());
            }
            match current {
                Value::List(items) => {
                    if items.len() <= *index {
                        let Some(len) = index.checked_add(1) else {
                            return Err(crate::err!("list position {index} is out of range"));
                        };
                        items.resize(len, Value::Null);
                    }
                    Ok(&mut items[*index])
                }
                other => Err(Error::type_conversion(other, "list")),
            }
        }
        Step::Key(key) => {
            if current.is_null() {
                *current = Value::Map(Default::default());
            }
            match current {
                Value::Map(entries) => Ok(entries.entry(key.clone()).or_default()),
                other => Err(Error::type_conversion(other, "map")),
            }
        }
        Step::Element => Err(crate::err!(
            "list element steps are not addressable; they are appended by the session"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ModelId;

    #[test]
    fn index_past_end_grows_with_nulls() {
        let mut record = ValueRecord::new(ModelId(0), 1);
        record
            .assign(&[Step::Field(0), Step::Index(2)], Value::from("c"))
            .unwrap();

        assert_eq!(
            record[0],
            Value::List(vec![Value::Null, Value::Null, Value::from("c")])
        );
    }

    #[test]
    fn index_at_usize_max_is_an_error() {
        let mut record = ValueRecord::new(ModelId(0), 1);
        let err = record
            .assign(&[Step::Field(0), Step::Index(usize::MAX)], Value::from("c"))
            .unwrap_err();
        assert!(err.is_adhoc());
    }

    #[test]
    fn map_entries_are_created() {
        let mut record = ValueRecord::new(ModelId(0), 1);
        record
            .assign(&[Step::Field(0), Step::Key("en".into())], Value::from("hi"))
            .unwrap();

        let read = record.entry(&[Step::Field(0), Step::Key("en".into())]);
        assert_eq!(read, Some(&Value::from("hi")));
    }

    #[test]
    fn element_is_not_addressable() {
        let mut record = ValueRecord::new(ModelId(0), 1);
        assert!(record.slot_mut(&[Step::Field(0), Step::Element]).is_err());
    }
}
