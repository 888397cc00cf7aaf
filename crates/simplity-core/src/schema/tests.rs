#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::wildcard_enum_match_arm)]

use super::*;

#[test]
fn value_type_names_round_trip() {
    for vt in ValueType::ALL {
        assert_eq!(ValueType::from_name(vt.as_str()), Some(vt));
    }
    assert_eq!(ValueType::from_name("string"), None);
}

#[test]
fn text_schema_defaults_apply() {
    let schema: ValueSchema =
        serde_json::from_str(r#"{"name":"code","valueType":"text"}"#).expect("parse");
    assert_eq!(schema.value_type(), ValueType::Text);
    let Constraints::Text(c) = &schema.constraints else {
        panic!("expected text constraints, got {:?}", schema.constraints);
    };
    assert_eq!(c.min_length, 1);
    assert_eq!(c.max_length, 1000);
    assert_eq!(c.regex, None);
}

#[test]
fn numeric_and_date_defaults_apply() {
    let int: ValueSchema =
        serde_json::from_str(r#"{"name":"qty","valueType":"integer"}"#).expect("parse");
    assert_eq!(
        int.constraints,
        Constraints::Integer(IntegerConstraints {
            min_value: 0,
            max_value: MAX_SAFE_INTEGER
        })
    );

    let dec: ValueSchema =
        serde_json::from_str(r#"{"name":"amt","valueType":"decimal","maxValue":100}"#)
            .expect("parse");
    let Constraints::Decimal(c) = &dec.constraints else {
        panic!("expected decimal constraints");
    };
    assert_eq!(c.nbr_decimal_places, 2);
    assert!((c.max_value - 100.0).abs() < f64::EPSILON);

    let date: ValueSchema =
        serde_json::from_str(r#"{"name":"dob","valueType":"date","maxPastDays":-10}"#)
            .expect("parse");
    assert_eq!(
        date.constraints,
        Constraints::Date(DateWindow {
            max_past_days: -10,
            max_future_days: DEFAULT_MAX_FUTURE_DAYS
        })
    );
}

#[test]
fn foreign_constraints_are_ignored() {
    let schema: ValueSchema = serde_json::from_str(
        r#"{"name":"qty","valueType":"integer","maxLength":3,"regex":"^a$"}"#,
    )
    .expect("parse");
    assert_eq!(
        schema.constraints,
        Constraints::Integer(IntegerConstraints::default())
    );
}

#[test]
fn boolean_schema_round_trips() {
    let schema = ValueSchema::new("flag", ValueType::Boolean).description("a flag");
    let json = serde_json::to_value(&schema).expect("serialize");
    assert_eq!(json["valueType"], "boolean");
    assert_eq!(json["name"], "flag");
    let back: ValueSchema = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, schema);
}

#[test]
fn optional_attributes_use_camel_case() {
    let schema = ValueSchema::new("code", ValueType::Text)
        .message_name("_invalidValue")
        .validation_fn("checkCode");
    let json = serde_json::to_value(&schema).expect("serialize");
    assert_eq!(json["messageName"], "_invalidValue");
    assert_eq!(json["validationFn"], "checkCode");
    assert_eq!(json["minLength"], 1);
    assert!(json.get("description").is_none());
}

#[test]
fn unknown_value_type_is_rejected() {
    let res: Result<ValueSchema, _> =
        serde_json::from_str(r#"{"name":"x","valueType":"money"}"#);
    assert!(res.is_err());
}

#[test]
fn compile_rejects_bad_regex() {
    let schema = ValueSchema::with_constraints(
        "bad",
        Constraints::Text(TextConstraints {
            regex: Some("([a-z".to_owned()),
            ..TextConstraints::default()
        }),
    );
    match CompiledSchema::compile(schema) {
        Err(SchemaError::InvalidRegex { schema, .. }) => assert_eq!(schema, "bad"),
        other => panic!("expected InvalidRegex, got {other:?}"),
    }
}

#[test]
fn system_catalog_has_name_schema() {
    let catalog = ValueSchemas::with_system();
    let name = catalog.get("_name").expect("_name schema");
    assert_eq!(name.value_type(), ValueType::Text);
    assert_eq!(name.schema().message_name.as_deref(), Some("_invalidName"));
    let Constraints::Text(c) = &name.schema().constraints else {
        panic!("expected text");
    };
    assert_eq!(c.max_length, 50);
}

#[test]
fn catalog_from_json_overrides_system_schemas() {
    let catalog = ValueSchemas::from_json_str(
        r#"{
            "_name": {"name": "_name", "valueType": "text", "maxLength": 80},
            "pin": {"name": "pin", "valueType": "text", "regex": "^[0-9]{6}$"}
        }"#,
    )
    .expect("catalog");
    assert_eq!(catalog.names(), vec!["_name", "pin"]);
    let Constraints::Text(c) = &catalog.get("_name").expect("_name").schema().constraints else {
        panic!("expected text");
    };
    assert_eq!(c.max_length, 80);
    assert!(catalog.get("pin").expect("pin").pattern().is_some());
}

#[test]
fn catalog_from_json_rejects_name_mismatch() {
    let err = ValueSchemas::from_json_str(r#"{"a": {"name": "b", "valueType": "boolean"}}"#)
        .expect_err("mismatch");
    assert!(matches!(err, SchemaError::NameMismatch { .. }), "{err}");
}

#[test]
fn insert_returns_replaced_schema() {
    let mut catalog = ValueSchemas::new();
    assert!(catalog.is_empty());
    let first = catalog
        .insert(ValueSchema::new("x", ValueType::Integer))
        .expect("insert");
    assert!(first.is_none());
    let second = catalog
        .insert(ValueSchema::new("x", ValueType::Decimal))
        .expect("insert");
    assert_eq!(
        second.map(|s| s.value_type()),
        Some(ValueType::Integer)
    );
    assert_eq!(catalog.len(), 1);
}
