use pretty_assertions::assert_eq;
use rowmap::{
    schema::ModelId, ColumnDefinition, FieldKey, Load, MapperFactory, Result, Schema, Store,
    Type, Value, ValueRecord, ValueRow, WriterBuilder,
};
use rowmap_core::{setter::PropertyMapping, source::ValueRowGetterFactory, Setter};
use std::sync::Arc;

const PERSON: ModelId = ModelId(0);
const ADDRESS: ModelId = ModelId(1);
const ORDER: ModelId = ModelId(2);

#[derive(Debug, Clone, PartialEq)]
struct Person {
    id: i64,
    name: String,
    city: Option<String>,
}

impl Store for Person {
    fn store(&self) -> ValueRecord {
        let address = match &self.city {
            Some(city) => Value::Record(ValueRecord::from_vec(ADDRESS, vec![city.into()])),
            None => Value::Null,
        };
        ValueRecord::from_vec(
            PERSON,
            vec![
                self.id.into(),
                self.name.clone().into(),
                address,
                Value::List(vec![]),
            ],
        )
    }
}

impl Load for Person {
    fn load(record: ValueRecord) -> Result<Person> {
        let mut fields = record.into_fields().into_iter();
        let id = fields.next().unwrap_or_default().to_i64()?;
        let name = fields.next().unwrap_or_default().to_string()?;
        let city = match fields.next().unwrap_or_default().to_option_record()? {
            Some(address) => address
                .into_fields()
                .into_iter()
                .next()
                .unwrap_or_default()
                .to_option_string()?,
            None => None,
        };
        Ok(Person { id, name, city })
    }
}

/// Person { id, name, address: Address?, orders: [Order] }
fn schema() -> Arc<Schema> {
    let mut builder = Schema::builder();
    builder.declare("Person");
    builder.declare("Address");
    builder.declare("Order");

    builder
        .model(PERSON)
        .field("id", Type::I64)
        .field("name", Type::String)
        .nullable_field("address", ADDRESS)
        .field("orders", Type::list(ORDER));

    builder.model(ADDRESS).field("city", Type::String);
    builder.model(ORDER).field("id", Type::I64);

    builder.build().unwrap()
}

fn text(mapping: &PropertyMapping) -> Option<Setter<Vec<String>>> {
    mapping.property.ty.is_scalar().then(|| {
        Setter::new(|out: &mut Vec<String>, value: &Value| {
            out.push(match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                Value::I64(v) => v.to_string(),
                other => format!("{other:?}"),
            });
            Ok(())
        })
    })
}

fn writer_builder() -> WriterBuilder<Vec<String>> {
    let mut builder = WriterBuilder::new(schema(), PERSON);
    builder.setter_factory(text);
    builder
}

fn ann() -> Person {
    Person {
        id: 1,
        name: "Ann".to_string(),
        city: Some("Oslo".to_string()),
    }
}

#[test]
fn columns_written_in_added_order() {
    let mut builder = writer_builder();
    builder
        .columns(FieldKey::sequence(["name", "address_city", "id"]))
        .unwrap();
    let writer = builder.writer().unwrap();

    let mut out = vec![];
    writer.write_value(&ann(), &mut out).unwrap();
    assert_eq!(out, ["Ann", "Oslo", "1"]);
}

#[test]
fn absent_nested_object_writes_null() {
    let mut builder = writer_builder();
    builder
        .columns(FieldKey::sequence(["id", "address_city"]))
        .unwrap();
    let writer = builder.writer().unwrap();

    let person = Person {
        city: None,
        ..ann()
    };
    let mut out = vec![];
    writer.write_value(&person, &mut out).unwrap();
    assert_eq!(out, ["1", ""]);
}

#[test]
fn list_element_column_rejected() {
    let mut builder = writer_builder();
    let err = builder
        .add_column(FieldKey::new("orders_id", 0), ColumnDefinition::identity())
        .unwrap_err();
    assert!(err.is_accessor_not_found());
}

#[test]
fn appender_overrides_factory() {
    let mut builder = writer_builder();
    builder
        .add_column(
            FieldKey::new("name", 0),
            ColumnDefinition::identity().with_appender(Setter::new(
                |out: &mut Vec<String>, value: &Value| {
                    out.push(value.as_str().unwrap_or_default().to_uppercase());
                    Ok(())
                },
            )),
        )
        .unwrap();
    let writer = builder.writer().unwrap();

    let mut out = vec![];
    writer.write_value(&ann(), &mut out).unwrap();
    assert_eq!(out, ["ANN"]);
}

#[test]
fn ignored_and_renamed_columns() {
    let mut builder = writer_builder();
    builder
        .add_column(FieldKey::new("label", 0), ColumnDefinition::rename("name"))
        .unwrap()
        .add_column(FieldKey::new("secret", 1), ColumnDefinition::ignore())
        .unwrap();
    assert_eq!(builder.keys(), [FieldKey::new("label", 0)]);
}

#[test]
fn setter_error_names_column() {
    let mut builder: WriterBuilder<Vec<String>> = WriterBuilder::new(schema(), PERSON);
    builder.setter_factory(|_: &PropertyMapping| {
        Some(Setter::new(|_: &mut Vec<String>, value: &Value| {
            Err(rowmap::Error::type_conversion(value, "cell"))
        }))
    });
    builder.columns([FieldKey::new("id", 0)]).unwrap();
    let writer = builder.writer().unwrap();

    let err = writer.write_value(&ann(), &mut vec![]).unwrap_err();
    assert!(err.to_string().starts_with("column `id#0`: "), "{err}");
}

#[test]
fn mapped_records_load_into_structs() {
    let factory = MapperFactory::<ValueRow>::builder(schema())
        .getter_factory(ValueRowGetterFactory)
        .column("id", ColumnDefinition::key())
        .build()
        .unwrap();
    let keys = FieldKey::sequence(["id", "name", "address_city"]);
    let mapper = factory.mapper(PERSON, &keys).unwrap();

    let keys: Arc<[FieldKey]> = keys.into();
    let rows = [
        ValueRow::new(keys.clone(), vec![Value::I64(1), "Ann".into(), "Oslo".into()]),
        ValueRow::new(keys.clone(), vec![Value::I64(2), "Bob".into(), Value::Null]),
    ];

    let people: Vec<Person> = mapper.load_all(&rows).unwrap();
    assert_eq!(
        people,
        [
            ann(),
            Person {
                id: 2,
                name: "Bob".to_string(),
                city: None,
            }
        ]
    );
}
