use pretty_assertions::assert_eq;
use rowmap::{
    schema::ModelId, ColumnDefinition, FieldKey, Mapper, MapperFactory, Schema,
    SourceFieldMapper, SourceMapperBuilder, Type, Value, ValueRecord, ValueRow, Writer,
};
use rowmap_core::{
    getter::GetterProperty, source::ValueRowGetterFactory, ContextualGetter, MappingContext,
    Result,
};
use std::sync::Arc;

const PRODUCT: ModelId = ModelId(0);

/// Product { id, title, price?, stock?, tags: [String], attrs: {String}, note? }
fn schema() -> Arc<Schema> {
    let mut builder = Schema::builder();
    builder.declare("Product");

    builder
        .model(PRODUCT)
        .field("id", Type::I64)
        .field("title", Type::String)
        .nullable_field("price", Type::F64)
        .nullable_field("stock", Type::I32)
        .field("tags", Type::list(Type::String))
        .field("attrs", Type::map(Type::String))
        .nullable_field("note", Type::String);

    builder.build().unwrap()
}

fn factory() -> MapperFactory<ValueRow> {
    MapperFactory::<ValueRow>::builder(schema())
        .getter_factory(ValueRowGetterFactory)
        .build()
        .unwrap()
}

fn map_one(mapper: &Mapper<ValueRow>, keys: &[FieldKey], values: Vec<Value>) -> ValueRecord {
    mapper
        .map_row(&ValueRow::new(keys.into(), values))
        .unwrap()
}

#[test]
fn renamed_column_resolves_under_its_new_name() {
    let factory = MapperFactory::<ValueRow>::builder(schema())
        .getter_factory(ValueRowGetterFactory)
        .column("product_name", ColumnDefinition::rename("title"))
        .build()
        .unwrap();

    let keys = FieldKey::sequence(["id", "product_name"]);
    let mapper = factory.mapper(PRODUCT, &keys).unwrap();

    let product = map_one(&mapper, &keys, vec![1.into(), "Lamp".into()]);
    assert_eq!(product[1], Value::from("Lamp"));
}

#[test]
fn columns_matching_a_predicate_are_ignored() {
    let factory = MapperFactory::<ValueRow>::builder(schema())
        .getter_factory(ValueRowGetterFactory)
        .column_matching(|key| key.name().starts_with('_'), ColumnDefinition::ignore())
        .build()
        .unwrap();

    let keys = FieldKey::sequence(["_rownum", "id", "title"]);
    let mut builder = factory.new_builder(PRODUCT);
    builder.columns(keys.clone()).unwrap();
    assert_eq!(builder.keys(), keys[1..].to_vec());

    let mapper = builder.mapper().unwrap();
    let product = map_one(&mapper, &keys, vec![7.into(), 1.into(), "Lamp".into()]);
    assert_eq!(product[0], Value::I64(1));
}

#[test]
fn case_sensitivity_is_configurable() {
    let keys = FieldKey::sequence(["ID", "Title"]);
    assert!(factory().mapper(PRODUCT, &keys).is_ok());

    let strict = MapperFactory::<ValueRow>::builder(schema())
        .getter_factory(ValueRowGetterFactory)
        .case_sensitive(true)
        .build()
        .unwrap();
    let err = strict.mapper(PRODUCT, &keys).unwrap_err();
    assert!(err.is_property_not_found());
}

#[test]
fn custom_getter_replaces_the_factory() {
    let keys = FieldKey::sequence(["id", "title"]);
    let title = ContextualGetter::new(Type::String, |row: &ValueRow, _: &MappingContext| {
        let id = row.get(0).cloned().unwrap_or_default().to_i64()?;
        Ok(Value::String(format!("product {id}")))
    });

    let factory = factory();
    let mut builder = factory.new_builder(PRODUCT);
    builder
        .add_mapping(keys[0].clone(), ColumnDefinition::identity())
        .unwrap()
        .add_mapping(keys[1].clone(), ColumnDefinition::identity().with_getter(title))
        .unwrap();
    let mapper = builder.mapper().unwrap();

    let product = map_one(&mapper, &keys, vec![Value::I64(3), Value::Null]);
    assert_eq!(product[1], Value::from("product 3"));
}

#[test]
fn registered_converter_is_preferred() {
    // Prices arrive in cents.
    let factory = MapperFactory::<ValueRow>::builder(schema())
        .getter_factory(ValueRowGetterFactory)
        .converter(
            Type::Any,
            Type::F64,
            |value: Value, _: &MappingContext| -> Result<Value> {
                Ok(match value {
                    Value::I32(cents) => Value::F64(f64::from(cents) / 100.0),
                    other => other,
                })
            },
        )
        .build()
        .unwrap();

    let keys = FieldKey::sequence(["id", "price"]);
    let mapper = factory.mapper(PRODUCT, &keys).unwrap();

    let product = map_one(&mapper, &keys, vec![1.into(), 250.into()]);
    assert_eq!(product[2], Value::F64(2.5));
}

#[test]
fn default_applies_to_null_cells() {
    let factory = MapperFactory::<ValueRow>::builder(schema())
        .getter_factory(ValueRowGetterFactory)
        .column("stock", ColumnDefinition::identity().with_default(0))
        .build()
        .unwrap();

    let keys = FieldKey::sequence(["id", "stock"]);
    let mapper = factory.mapper(PRODUCT, &keys).unwrap();

    let product = map_one(&mapper, &keys, vec![1.into(), Value::Null]);
    assert_eq!(product[3], Value::I32(0));

    let product = map_one(&mapper, &keys, vec![1.into(), 5.into()]);
    assert_eq!(product[3], Value::I32(5));
}

#[test]
fn list_positions_and_map_entries() {
    let keys = FieldKey::sequence(["id", "tags[1]", "tags[0]", "attrs_color", "attrs[size]"]);
    let mapper = factory().mapper(PRODUCT, &keys).unwrap();

    let product = map_one(
        &mapper,
        &keys,
        vec![1.into(), "b".into(), "a".into(), "red".into(), "XL".into()],
    );

    assert_eq!(
        product[4],
        Value::List(vec![Value::from("a"), Value::from("b")])
    );

    let attrs = match &product[5] {
        Value::Map(attrs) => attrs,
        other => panic!("expected a map, got {other:?}"),
    };
    assert_eq!(attrs.get("color"), Some(&Value::from("red")));
    assert_eq!(attrs.get("size"), Some(&Value::from("XL")));
}

#[test]
fn extra_mappers_run_after_the_columns() {
    let keys = FieldKey::sequence(["id", "title"]);
    let factory = factory();
    let mut builder = factory.new_builder(PRODUCT);
    builder.columns(keys.clone()).unwrap();
    builder.add_mapper(Arc::new(
        |_: &ValueRow, record: &mut ValueRecord, cx: &MappingContext| -> Result<()> {
            let title = record[1].as_str().unwrap_or_default().to_uppercase();
            record[6] = Value::String(format!("{title} @ row {}", cx.row()));
            Ok(())
        },
    ));
    let mapper = builder.mapper().unwrap();

    let rows: Vec<ValueRow> = [(1, "lamp"), (2, "desk")]
        .into_iter()
        .map(|(id, title)| ValueRow::new(keys.clone().into(), vec![id.into(), title.into()]))
        .collect();

    let products = mapper.map_all(&rows).unwrap();
    assert_eq!(products[1][6], Value::from("DESK @ row 1"));
}

#[test]
fn named_keys_read_by_name() {
    let keys = vec![FieldKey::named("title"), FieldKey::named("id")];
    let mapper = factory().mapper(PRODUCT, &keys).unwrap();

    let product = map_one(&mapper, &keys, vec!["Lamp".into(), 4.into()]);
    assert_eq!(product[0], Value::I64(4));
    assert_eq!(product[1], Value::from("Lamp"));
}

#[test]
fn typed_getters_answer_for_their_type_only() {
    let factory = MapperFactory::<Vec<i64>>::builder(schema())
        .getter_factory(GetterProperty::indexed(Type::I64, |row: &Vec<i64>, index| {
            Ok(Value::I64(row[index]))
        }))
        .build()
        .unwrap();

    let keys = FieldKey::sequence(["id"]);
    let mapper = factory.mapper(PRODUCT, &keys).unwrap();
    let product = mapper.map_row(&vec![9]).unwrap();
    assert_eq!(product[0], Value::I64(9));

    let keys = FieldKey::sequence(["id", "stock"]);
    let err = factory.mapper(PRODUCT, &keys).unwrap_err();
    assert!(err.is_accessor_not_found());
}

#[test]
fn compiled_plans_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Mapper<ValueRow>>();
    assert_send_sync::<SourceFieldMapper<ValueRow>>();
    assert_send_sync::<MapperFactory<ValueRow>>();
    assert_send_sync::<Writer<Vec<String>>>();

    let keys = FieldKey::sequence(["id", "title"]);
    let mapper = factory().mapper(PRODUCT, &keys).unwrap();
    let keys: Arc<[FieldKey]> = keys.into();

    let handles: Vec<_> = (0..4)
        .map(|id| {
            let mapper = mapper.clone();
            let keys = keys.clone();
            std::thread::spawn(move || {
                let row = ValueRow::new(keys, vec![Value::I64(id), "x".into()]);
                mapper.map_row(&row).unwrap()[0].clone()
            })
        })
        .collect();

    for (id, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Value::I64(id as i64));
    }
}
