use bt_core::{BbKey, Blackboard, Handle, KeyDecl, PairValue, PropertyPair, Value};

#[test]
fn blackboard_set_get_remove_roundtrip() {
    let k_i32 = BbKey::<i32>::new("count");
    let k_str = BbKey::<String>::new("name");

    let mut bb = Blackboard::new();
    assert!(!bb.contains("count"));

    bb.set(k_i32, 123);
    bb.set(k_str, "hello".to_string());

    assert_eq!(bb.get(k_i32), Some(123));
    assert_eq!(bb.get(k_str).as_deref(), Some("hello"));
    assert_eq!(bb.value("name").and_then(Value::as_str), Some("hello"));

    assert_eq!(bb.remove(k_i32), Some(123));
    assert_eq!(bb.get(k_i32), None);
}

#[test]
fn undeclared_key_reads_as_none() {
    let bb = Blackboard::new();
    assert_eq!(bb.get(BbKey::<f32>::new("missing")), None);
    assert_eq!(bb.value("missing"), None);
}

#[test]
fn type_mismatch_reads_as_none() {
    let mut bb = Blackboard::new();
    bb.set(BbKey::<i64>::new("speed"), 3);
    assert_eq!(bb.get(BbKey::<f32>::new("speed")), None);
    assert_eq!(bb.get(BbKey::<i64>::new("speed")), Some(3));
}

#[test]
fn decls_seed_defaults_and_skip_unset() {
    let decls = [
        KeyDecl::new("target").with_default(Handle(9)),
        KeyDecl::new("goal"),
        KeyDecl::new("speed").with_default(2.5f32),
    ];
    let bb = Blackboard::from_decls(&decls);

    assert_eq!(bb.len(), 2);
    assert_eq!(bb.get(BbKey::<Handle>::new("target")), Some(Handle(9)));
    assert_eq!(bb.get(BbKey::<f32>::new("speed")), Some(2.5));
    assert!(!bb.contains("goal"));
}

#[test]
fn resolve_reads_literal_or_key() {
    let mut bb = Blackboard::new();
    bb.set(BbKey::<[f32; 3]>::new("home"), [1.0, 2.0, 3.0]);

    let by_key = PropertyPair::keys("dest", "home");
    assert_eq!(bb.resolve(&by_key.value), Some(Value::Vec3([1.0, 2.0, 3.0])));

    let literal = PropertyPair::literal("dest", true);
    assert_eq!(bb.resolve(&literal.value), Some(Value::Bool(true)));

    assert_eq!(bb.resolve(&PairValue::Key("nope".into())), None);
}

#[test]
fn i32_conversion_rejects_out_of_range() {
    let mut bb = Blackboard::new();
    bb.set_value("big", Value::Int(i64::MAX));
    assert_eq!(bb.get(BbKey::<i32>::new("big")), None);
}
