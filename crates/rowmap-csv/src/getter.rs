use rowmap_core::{convert::coerce, ContextualGetter, FieldKey, GetterFactory, Type, Value};

/// Reads cells of CSV rows, parsing each into the property's type.
///
/// An empty cell reads as the empty string for string properties and as
/// null otherwise. A cell past the end of a short row reads as null. Only
/// scalar properties are handled, and the key must carry its column
/// index.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvGetterFactory;

impl GetterFactory<Vec<String>> for CsvGetterFactory {
    fn new_getter(&self, ty: &Type, key: &FieldKey) -> Option<ContextualGetter<Vec<String>>> {
        let index = key.index()?;

        let ty = match ty {
            Type::Any => Type::String,
            ty if ty.is_scalar() => ty.clone(),
            _ => return None,
        };

        Some(ContextualGetter::new(ty.clone(), move |row: &Vec<String>, _| {
            match row.get(index).map(String::as_str) {
                None => Ok(Value::Null),
                Some("") if ty.is_string() => Ok(Value::String(String::new())),
                Some("") => Ok(Value::Null),
                Some(cell) => coerce(Value::from(cell), &ty),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowmap_core::MappingContext;

    fn read(ty: Type, row: &[&str], index: usize) -> rowmap_core::Result<Value> {
        let getter = CsvGetterFactory
            .new_getter(&ty, &FieldKey::new("c", index))
            .unwrap();
        let row = row.iter().map(|cell| cell.to_string()).collect();
        getter.get(&row, &MappingContext::default())
    }

    #[test]
    fn parses_by_type() {
        assert_eq!(read(Type::I64, &["12"], 0).unwrap(), Value::I64(12));
        assert_eq!(read(Type::F64, &["x", "2.5"], 1).unwrap(), Value::F64(2.5));
        assert_eq!(read(Type::Bool, &["true"], 0).unwrap(), Value::Bool(true));
        assert_eq!(read(Type::Any, &["a"], 0).unwrap(), Value::from("a"));
        assert!(read(Type::I32, &["abc"], 0).is_err());
    }

    #[test]
    fn empty_and_missing_cells() {
        assert_eq!(read(Type::I64, &[""], 0).unwrap(), Value::Null);
        assert_eq!(read(Type::String, &[""], 0).unwrap(), Value::from(""));
        assert_eq!(read(Type::Any, &[""], 0).unwrap(), Value::from(""));
        assert_eq!(read(Type::String, &["a"], 3).unwrap(), Value::Null);
    }

    #[test]
    fn named_keys_and_records_unsupported() {
        let factory = CsvGetterFactory;
        assert!(factory
            .new_getter(&Type::String, &FieldKey::named("c"))
            .is_none());
        assert!(factory
            .new_getter(&Type::list(Type::String), &FieldKey::new("c", 0))
            .is_none());
    }
}
