use pretty_assertions::assert_eq;
use rowmap_core::schema::*;
use rowmap_core::Type;
use std::sync::Arc;

const PERSON: ModelId = ModelId(0);
const ADDRESS: ModelId = ModelId(1);
const ORDER: ModelId = ModelId(2);

/// Schema:
///   Person { id, name, address: Address?, orders: [Order], tags: [String], labels: {String} }
///     constructor(id, name)
///   Address { city, zip }
///   Order { id, total }
fn schema() -> Arc<Schema> {
    let mut builder = Schema::builder();
    assert_eq!(builder.declare("Person"), PERSON);
    assert_eq!(builder.declare("Address"), ADDRESS);
    assert_eq!(builder.declare("Order"), ORDER);

    builder
        .model(PERSON)
        .field("id", Type::I64)
        .field("name", Type::String)
        .nullable_field("address", ADDRESS)
        .field("orders", Type::list(ORDER))
        .field("tags", Type::list(Type::String))
        .field("labels", Type::map(Type::String))
        .constructor(&["id", "name"]);

    builder
        .model(ADDRESS)
        .field("city", Type::String)
        .field("zip", Type::String);

    builder
        .model(ORDER)
        .field("id", Type::I64)
        .field("total", Type::F64);

    builder.build().unwrap()
}

fn finder() -> PropertyFinder {
    PropertyFinder::new(schema(), PERSON, FinderOptions::default())
}

#[test]
fn resolving_twice_returns_the_same_node() {
    let mut finder = finder();

    let a = finder.find("name").unwrap();
    let b = finder.find("NAME").unwrap();

    assert!(Arc::ptr_eq(&a.property, &b.property));
    assert_eq!(a.property.injection, Injection::Constructor(1));
    assert_eq!(a.rest, None);
}

#[test]
fn separators_resolve_to_the_same_sub_object() {
    let mut finder = finder();

    let dotted = finder.find("address.city").unwrap();
    let snake = finder.find("address_zip").unwrap();
    let camel = finder.find("addressCity").unwrap();

    assert!(Arc::ptr_eq(&dotted.property, &snake.property));
    assert!(Arc::ptr_eq(&dotted.property, &camel.property));
    assert_eq!(dotted.property.ty, Type::Model(ADDRESS));
    assert_eq!(dotted.rest.as_deref(), Some("city"));
    assert_eq!(snake.rest.as_deref(), Some("zip"));
    assert_eq!(camel.rest.as_deref(), Some("City"));
}

#[test]
fn list_of_models_resolves_to_element() {
    let mut finder = finder();

    let resolved = finder.find("orders_total").unwrap();
    assert_eq!(resolved.property.step, Step::Element);
    assert_eq!(resolved.property.steps(), [Step::Field(3), Step::Element]);
    assert_eq!(resolved.property.path, "orders[]");
    assert_eq!(resolved.rest.as_deref(), Some("total"));

    let indexed = finder.find("orders[1].id").unwrap();
    assert_eq!(indexed.property.steps(), [Step::Field(3), Step::Index(1)]);
    assert_eq!(indexed.rest.as_deref(), Some("id"));
}

#[test]
fn indexed_and_keyed_collections() {
    let mut finder = finder();

    let tag = finder.find("tags[2]").unwrap();
    assert_eq!(tag.property.steps(), [Step::Field(4), Step::Index(2)]);
    assert_eq!(tag.property.ty, Type::String);
    assert!(tag.property.nullable);

    let label = finder.find("labels_en").unwrap();
    assert_eq!(
        label.property.steps(),
        [Step::Field(5), Step::Key("en".to_string())]
    );

    let bracketed = finder.find("labels[en]").unwrap();
    assert!(Arc::ptr_eq(&label.property, &bracketed.property));
}

#[test]
fn list_position_is_bounded() {
    let mut finder = finder();
    assert!(finder.find("tags[4096]").is_ok());

    let err = finder.find("tags[18446744073709551615]").unwrap_err();
    assert!(err.is_property_not_found());
    assert!(err
        .to_string()
        .ends_with("list position 18446744073709551615 exceeds the limit of 4096"));

    let options = FinderOptions {
        max_index: 2,
        ..Default::default()
    };
    let mut finder = PropertyFinder::new(schema(), PERSON, options);
    assert!(finder.find("tags[2]").is_ok());
    assert!(finder.find("tags[3]").unwrap_err().is_property_not_found());
}

#[test]
fn scalar_list_requires_an_index() {
    let mut finder = finder();
    let resolved = finder.find("tags").unwrap();
    assert_eq!(resolved.property.ty, Type::list(Type::String));

    let err = finder.find("tags_first").unwrap_err();
    assert!(err.is_property_not_found());
}

#[test]
fn unknown_property() {
    let mut finder = finder();
    let err = finder.find("nickname").unwrap_err();
    assert!(err.is_property_not_found());
    assert_eq!(err.to_string(), "property `nickname` not found on `Person`");
}

#[test]
fn ambiguous_property() {
    let mut builder = Schema::builder();
    let person = builder.declare("Person");
    let address = builder.declare("Address");

    builder
        .model(person)
        .field("address_city", Type::String)
        .field("address", address);
    builder.model(address).field("city", Type::String);

    let mut finder = PropertyFinder::new(builder.build().unwrap(), person, Default::default());
    let err = finder.find("address_city").unwrap_err();

    assert!(err.is_ambiguous_property());
    assert_eq!(
        err.to_string(),
        "property `address_city` is ambiguous on `Person`; candidates: address_city, address.city"
    );
}

#[test]
fn case_sensitive_matching() {
    let options = FinderOptions {
        case: CaseSensitivity::Sensitive,
        ..Default::default()
    };
    let mut finder = PropertyFinder::new(schema(), PERSON, options);

    assert!(finder.find("name").is_ok());
    assert!(finder.find("Name").unwrap_err().is_property_not_found());
}

#[test]
fn self_referencing_model_is_bounded() {
    let mut builder = Schema::builder();
    let node = builder.declare("Node");
    builder
        .model(node)
        .field("name", Type::String)
        .nullable_field("next", node);
    let schema = builder.build().unwrap();

    let mut finder = PropertyFinder::new(schema.clone(), node, FinderOptions::default());
    let shallow = finder.find("next_next_name").unwrap();
    assert_eq!(shallow.rest.as_deref(), Some("next_name"));

    let deep = format!("{}name", "next_".repeat(40));
    let err = finder.find(&deep).unwrap_err();
    assert!(err.is_property_not_found());
    assert!(err.to_string().ends_with("resolution depth limit of 16 reached"));

    let options = FinderOptions {
        max_depth: 64,
        ..Default::default()
    };
    let mut finder = PropertyFinder::new(schema, node, options);
    assert!(finder.find(&deep).is_ok());
}

#[test]
fn missing_constructor_params() {
    let mut finder = finder();

    assert_eq!(finder.missing_constructor_params(), ["id", "name"]);

    let id = finder.find("id").unwrap();
    finder.mark_mapped(&id.property);
    assert_eq!(finder.missing_constructor_params(), ["name"]);

    let name = finder.find("name").unwrap();
    finder.mark_mapped(&name.property);
    assert!(finder.missing_constructor_params().is_empty());
}

#[test]
fn variants_extend_nested_resolution() {
    let mut builder = Schema::builder();
    let garage = builder.declare("Garage");
    let vehicle = builder.declare("Vehicle");
    let car = builder.declare("Car");

    builder.model(garage).field("vehicle", vehicle);
    builder.model(vehicle).field("wheels", Type::I32);
    builder
        .model(car)
        .field("wheels", Type::I32)
        .field("doors", Type::I32)
        .extends(vehicle);
    let schema = builder.build().unwrap();

    let mut plain = PropertyFinder::new(schema.clone(), garage, FinderOptions::default());
    assert!(plain.find("vehicle_doors").is_err());

    let mut options = FinderOptions::default();
    options.variants.insert(vehicle, vec![car]);
    let mut finder = PropertyFinder::new(schema, garage, options);
    let resolved = finder.find("vehicle_doors").unwrap();
    assert_eq!(resolved.rest.as_deref(), Some("doors"));
}
