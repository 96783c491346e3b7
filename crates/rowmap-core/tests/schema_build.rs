use rowmap_core::schema::*;
use rowmap_core::Type;

#[test]
fn constructor_names_must_exist() {
    let mut builder = Schema::builder();
    let person = builder.declare("Person");
    builder
        .model(person)
        .field("id", Type::I64)
        .constructor(&["id", "name"]);

    let err = builder.build().unwrap_err();
    assert!(err.is_invalid_schema());
    assert_eq!(
        err.to_string(),
        "invalid schema: constructor of `Person` names unknown field `name`"
    );
}

#[test]
fn declare_is_idempotent() {
    let mut builder = Schema::builder();
    let a = builder.declare("A");
    let b = builder.declare("B");
    assert_ne!(a, b);
    assert_eq!(builder.declare("A"), a);
}

#[test]
fn subtype_must_extend_parent_layout() {
    let mut builder = Schema::builder();
    let vehicle = builder.declare("Vehicle");
    let car = builder.declare("Car");
    builder
        .model(vehicle)
        .field("id", Type::I64)
        .field("wheels", Type::I32);
    builder
        .model(car)
        .field("wheels", Type::I32)
        .field("id", Type::I64)
        .extends(vehicle);

    let err = builder.build().unwrap_err();
    assert!(err.is_invalid_schema());
}

#[test]
fn inheritance_cycles_are_rejected() {
    let mut builder = Schema::builder();
    let a = builder.declare("A");
    let b = builder.declare("B");
    builder.model(a).extends(b);
    builder.model(b).extends(a);

    let err = builder.build().unwrap_err();
    assert!(err.to_string().contains("inheritance cycle"));
}

#[test]
fn assignability_follows_parents() {
    let mut builder = Schema::builder();
    let vehicle = builder.declare("Vehicle");
    let car = builder.declare("Car");
    let truck = builder.declare("Truck");
    let sports = builder.declare("SportsCar");

    builder.model(vehicle).field("id", Type::I64);
    builder.model(car).field("id", Type::I64).extends(vehicle);
    builder.model(truck).field("id", Type::I64).extends(vehicle);
    builder
        .model(sports)
        .field("id", Type::I64)
        .field("top_speed", Type::I32)
        .extends(car);

    let schema = builder.build().unwrap();
    assert!(schema.is_assignable(sports, vehicle));
    assert!(schema.is_assignable(car, car));
    assert!(!schema.is_assignable(vehicle, car));
    assert!(!schema.is_assignable(truck, car));
    assert_eq!(schema.sub_models(vehicle), [car, truck, sports]);
    assert_eq!(schema.model_by_name("SportsCar").map(|m| m.id), Some(sports));
}
