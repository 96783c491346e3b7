use rowmap_core::FieldKey;

#[test]
fn sequence_assigns_positions() {
    let keys = FieldKey::sequence(["id", "name"]);
    assert_eq!(keys[0], FieldKey::new("id", 0));
    assert_eq!(keys[1].index(), Some(1));
    assert_eq!(keys[1].name(), "name");
}

#[test]
fn rename_keeps_position() {
    let key = FieldKey::new("person_name", 3);
    let renamed = key.with_name("name");
    assert_eq!(renamed.index(), Some(3));
    assert_ne!(renamed, key);
    assert_eq!(renamed.to_string(), "name#3");
    assert_eq!(FieldKey::named("name").to_string(), "name");
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip() {
    let key = FieldKey::new("id", 0);
    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(json, r#"{"name":"id","index":0}"#);
    let back: FieldKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, key);
}
