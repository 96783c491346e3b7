use pretty_assertions::assert_eq;
use rowmap::{
    schema::{FinderOptions, ModelId, PropertyFinder},
    ColumnDefinition, DiscriminatorCase, FieldKey, MapperFactory, Schema, SourceMapperBuilder,
    Type, Value, ValueRecord, ValueRow,
};
use rowmap_core::source::ValueRowGetterFactory;
use std::sync::Arc;

const VEHICLE: ModelId = ModelId(0);
const CAR: ModelId = ModelId(1);
const TRUCK: ModelId = ModelId(2);
const GARAGE: ModelId = ModelId(3);

/// Vehicle { id, name }
/// Car: Vehicle { id, name, doors }
/// Truck: Vehicle { id, name, payload }
/// Garage { id, vehicles: [Vehicle] }
fn schema() -> Arc<Schema> {
    let mut builder = Schema::builder();
    builder.declare("Vehicle");
    builder.declare("Car");
    builder.declare("Truck");
    builder.declare("Garage");

    builder
        .model(VEHICLE)
        .field("id", Type::I64)
        .nullable_field("name", Type::String);

    builder
        .model(CAR)
        .extends(VEHICLE)
        .field("id", Type::I64)
        .nullable_field("name", Type::String)
        .field("doors", Type::I32);

    builder
        .model(TRUCK)
        .extends(VEHICLE)
        .field("id", Type::I64)
        .nullable_field("name", Type::String)
        .field("payload", Type::F64);

    builder
        .model(GARAGE)
        .field("id", Type::I64)
        .field("vehicles", Type::list(VEHICLE));

    builder.build().unwrap()
}

fn kind_is(
    column: &'static str,
    kind: &'static str,
) -> impl Fn(&ValueRow) -> bool + Send + Sync + 'static {
    move |row| row.get_by_name(column).and_then(Value::as_str) == Some(kind)
}

fn car_or_truck(column: &'static str) -> Vec<DiscriminatorCase<ValueRow>> {
    vec![
        DiscriminatorCase::new(CAR, kind_is(column, "car")),
        DiscriminatorCase::new(TRUCK, kind_is(column, "truck")),
    ]
}

fn factory(cases: Vec<DiscriminatorCase<ValueRow>>) -> MapperFactory<ValueRow> {
    MapperFactory::<ValueRow>::builder(schema())
        .getter_factory(ValueRowGetterFactory)
        .column_matching(|key| key.name().ends_with("kind"), ColumnDefinition::ignore())
        .column("id", ColumnDefinition::key())
        .column("vehicles_id", ColumnDefinition::key())
        .discriminator(VEHICLE, cases)
        .build()
        .unwrap()
}

fn rows(keys: &[FieldKey], data: Vec<Vec<Value>>) -> Vec<ValueRow> {
    let keys: Arc<[FieldKey]> = keys.into();
    data.into_iter()
        .map(|values| ValueRow::new(keys.clone(), values))
        .collect()
}

fn models(records: &[ValueRecord]) -> Vec<ModelId> {
    records.iter().map(ValueRecord::model).collect()
}

#[test]
fn first_matching_case_builds_the_row() {
    let cases = vec![
        DiscriminatorCase::new(CAR, |row: &ValueRow| {
            row.get_by_name("kind")
                .and_then(Value::as_str)
                .is_some_and(|kind| kind.starts_with('c'))
        }),
        DiscriminatorCase::new(TRUCK, |_: &ValueRow| true),
    ];

    let keys = FieldKey::sequence(["kind", "id", "doors", "payload"]);
    let mapper = factory(cases).mapper(VEHICLE, &keys).unwrap();

    let rows = rows(
        &keys,
        vec![
            vec!["car".into(), 1.into(), 4.into(), Value::Null],
            vec!["cab".into(), 2.into(), 2.into(), Value::Null],
            vec!["truck".into(), 3.into(), Value::Null, 1.5.into()],
        ],
    );

    let vehicles = mapper.map_all(&rows).unwrap();
    assert_eq!(models(&vehicles), vec![CAR, CAR, TRUCK]);

    assert_eq!(vehicles[0].fields, vec![Value::I64(1), Value::Null, Value::I32(4)]);
    assert_eq!(vehicles[2].fields, vec![Value::I64(3), Value::Null, Value::F64(1.5)]);
}

#[test]
fn no_matching_case_fails_the_row_only() {
    let keys = FieldKey::sequence(["kind", "id", "doors"]);
    let mapper = factory(car_or_truck("kind")).mapper(VEHICLE, &keys).unwrap();

    let rows = rows(
        &keys,
        vec![
            vec!["car".into(), 1.into(), 4.into()],
            vec!["boat".into(), 2.into(), Value::Null],
            vec!["car".into(), 3.into(), 2.into()],
        ],
    );

    let mut session = mapper.session();
    session.push(&rows[0]).unwrap();

    let err = session.push(&rows[1]).unwrap_err();
    assert!(err.is_discriminator_mismatch());
    assert_eq!(err.row_position(), Some(1));
    assert_eq!(
        err.to_string(),
        "row 1: no discriminator case matched for `Vehicle`"
    );

    session.push(&rows[2]).unwrap();
    assert_eq!(session.position(), 3);

    let vehicles = session.finish().unwrap();
    assert_eq!(vehicles.len(), 2);
    assert_eq!(vehicles[1][0], Value::I64(3));
}

#[test]
fn reused_object_keeps_its_original_case() {
    let keys = FieldKey::sequence(["kind", "id", "doors", "payload"]);
    let mapper = factory(car_or_truck("kind")).mapper(VEHICLE, &keys).unwrap();

    let rows = rows(
        &keys,
        vec![
            vec!["car".into(), 1.into(), 4.into(), Value::Null],
            vec!["truck".into(), 1.into(), Value::Null, 9.0.into()],
        ],
    );

    let vehicles = mapper.map_all(&rows).unwrap();
    assert_eq!(models(&vehicles), vec![CAR]);
    assert_eq!(vehicles[0][2], Value::I32(4));
}

#[test]
fn column_unknown_to_every_case_is_rejected() {
    let keys = FieldKey::sequence(["kind", "id", "color"]);
    let err = factory(car_or_truck("kind"))
        .mapper(VEHICLE, &keys)
        .unwrap_err();

    assert!(err.is_no_compatible_builder());
    assert!(err.is_property_not_found());
    assert_eq!(
        err.to_string(),
        "no builder of `Vehicle` is compatible with `color`: property `color` not found on `Car`"
    );
}

#[test]
fn keys_are_the_union_over_cases() {
    let factory = factory(car_or_truck("kind"));
    let mut builder = factory.new_builder(VEHICLE);

    let keys = FieldKey::sequence(["id", "doors", "payload"]);
    for key in keys.iter().chain(&keys[1..2]) {
        builder
            .add_mapping(key.clone(), ColumnDefinition::identity())
            .unwrap();
    }

    assert_eq!(builder.keys(), keys);
}

#[test]
fn property_mapping_goes_to_assignable_cases_only() {
    let factory = factory(car_or_truck("kind"));
    let keys = FieldKey::sequence(["kind", "id", "doors"]);

    let mut finder = PropertyFinder::new(schema(), CAR, FinderOptions::default());
    let doors = finder.find("doors").unwrap().property;

    let mut builder = factory.new_builder(VEHICLE);
    builder
        .add_mapping(keys[1].clone(), ColumnDefinition::identity())
        .unwrap()
        .add_property_mapping(keys[2].clone(), ColumnDefinition::identity(), doors)
        .unwrap();
    let mapper = builder.mapper().unwrap();

    let rows = rows(
        &keys,
        vec![
            vec!["car".into(), 1.into(), 4.into()],
            vec!["truck".into(), 2.into(), 4.into()],
        ],
    );

    let vehicles = mapper.map_all(&rows).unwrap();
    assert_eq!(vehicles[0][2], Value::I32(4));
    // Trucks have no doors; their third field stays unset.
    assert_eq!(vehicles[1][2], Value::Null);

    let mut finder = PropertyFinder::new(schema(), GARAGE, FinderOptions::default());
    let garage_id = finder.find("id").unwrap().property;

    let mut builder = factory.new_builder(VEHICLE);
    let err = builder
        .add_property_mapping(keys[1].clone(), ColumnDefinition::identity(), garage_id)
        .map(|_| ())
        .unwrap_err();
    assert!(err.is_no_compatible_builder());
}

#[test]
fn nested_objects_are_discriminated_too() {
    let keys = FieldKey::sequence([
        "id",
        "vehicles_kind",
        "vehicles_id",
        "vehicles_doors",
        "vehicles_payload",
    ]);
    let mapper = factory(car_or_truck("vehicles_kind"))
        .mapper(GARAGE, &keys)
        .unwrap();

    let rows = rows(
        &keys,
        vec![
            vec![1.into(), "car".into(), 10.into(), 2.into(), Value::Null],
            vec![1.into(), "truck".into(), 11.into(), Value::Null, 3.5.into()],
            vec![1.into(), "car".into(), 10.into(), 2.into(), Value::Null],
        ],
    );

    let garages = mapper.map_all(&rows).unwrap();
    assert_eq!(garages.len(), 1);

    let vehicles: Vec<ValueRecord> = garages[0][1]
        .as_list()
        .unwrap()
        .iter()
        .map(|vehicle| vehicle.as_record().unwrap().clone())
        .collect();
    assert_eq!(models(&vehicles), vec![CAR, TRUCK]);
    assert_eq!(vehicles[1][2], Value::F64(3.5));
}
