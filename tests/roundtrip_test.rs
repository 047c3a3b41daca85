//! Round-trip and structural properties of the parser and conversions

use colcast::{parse, Registry, TypeDescriptor, Value};
use pretty_assertions::assert_eq;

/// Strip the outer SQL quoting `serialize` adds to string-ish literals.
fn serialize_inner(literal: &str) -> String {
    colcast::unquote(literal).unwrap()
}

#[test]
fn test_parse_depth_independence() {
    for depth in [1usize, 5, 50, 500] {
        let mut input = String::new();
        for _ in 0..depth {
            input.push_str("Array(");
        }
        input.push_str("Int32");
        for _ in 0..depth {
            input.push(')');
        }

        let mut descriptor = parse(&input).unwrap();
        for level in 0..depth {
            assert_eq!(descriptor.name, "Array", "depth {} level {}", depth, level);
            assert_eq!(descriptor.args.len(), 1);
            descriptor = descriptor.args.into_iter().next().unwrap();
        }
        assert_eq!(descriptor, TypeDescriptor::leaf("Int32"));
    }
}

#[test]
fn test_descriptor_display_reparses() {
    for type_string in [
        "UInt64",
        "Array(Nullable(String))",
        "Map(String, Array(Nullable(Int64)))",
        "Tuple(UInt8, Tuple(String, Float64), Date)",
        "LowCardinality(Nullable(String))",
    ] {
        let descriptor = parse(type_string).unwrap();
        assert_eq!(parse(&descriptor.to_string()).unwrap(), descriptor);
    }
}

#[test]
fn test_deserialize_is_stable() {
    let registry = Registry::new();
    let cases = [
        ("UInt64", serde_json::json!(42)),
        ("Float64", serde_json::json!(1.25)),
        ("Nullable(String)", serde_json::json!(null)),
        ("Array(Int32)", serde_json::json!([1, 2, 3])),
        ("Map(String, UInt8)", serde_json::json!({"a": 1})),
        ("Enum8('on' = 1, 'off' = 0)", serde_json::json!("on")),
    ];
    for (type_string, wire) in &cases {
        let column = registry.resolve(type_string).unwrap();
        assert_eq!(
            column.deserialize(wire).unwrap(),
            column.deserialize(wire).unwrap(),
            "{}",
            type_string
        );
    }
}

#[test]
fn test_scalar_serialize_cast_round_trip() {
    let registry = Registry::new();

    let cases: Vec<(&str, Value)> = vec![
        ("Int64", Value::Int(-7)),
        ("UInt8", Value::UInt(200)),
        ("Float64", Value::Float(2.5)),
        ("Bool", Value::Bool(true)),
        ("String", Value::from("plain text")),
        ("String", Value::from("quote ' and \\ slash")),
    ];
    for (type_string, input) in cases {
        let column = registry.resolve(type_string).unwrap();
        let canonical = column.cast(input).unwrap();
        let literal = column.serialize(&canonical).unwrap();
        let back = column.cast(Value::String(serialize_inner(&literal))).unwrap();
        assert_eq!(back, canonical, "{}", type_string);
    }
}

#[test]
fn test_decimal_serialize_cast_round_trip() {
    let registry = Registry::new();
    let column = registry.resolve("Decimal(38, 10)").unwrap();

    for text in ["0.0000000001", "-12345678901234567.0000000001", "42"] {
        let canonical = column.cast(Value::from(text)).unwrap();
        let literal = column.serialize(&canonical).unwrap();
        let back = column.cast(Value::String(literal)).unwrap();
        assert_eq!(back, canonical, "{}", text);
    }
}

#[test]
fn test_uuid_serialize_cast_round_trip() {
    let registry = Registry::new();
    let column = registry.resolve("UUID").unwrap();

    let canonical = column
        .cast(Value::from("6D1C6B5C-97A2-4A5A-8A5B-1F2A3B4C5D6E"))
        .unwrap();
    let literal = column.serialize(&canonical).unwrap();
    assert_eq!(literal, "'6d1c6b5c-97a2-4a5a-8a5b-1f2a3b4c5d6e'");
    let back = column
        .cast(Value::String(serialize_inner(&literal)))
        .unwrap();
    assert_eq!(back, canonical);
}

#[test]
fn test_enum_serialize_cast_round_trip() {
    let registry = Registry::new();
    let column = registry
        .resolve("Enum16('first' = 100, 'second' = 200)")
        .unwrap();

    for input in [Value::from("first"), Value::Int(200)] {
        let canonical = column.cast(input).unwrap();
        let literal = column.serialize(&canonical).unwrap();
        let back = column
            .cast(Value::String(serialize_inner(&literal)))
            .unwrap();
        assert_eq!(back, canonical);
    }
}

#[test]
fn test_composite_text_round_trip() {
    let registry = Registry::new();
    let cases = [
        ("Array(Array(Int32))", "[[1, 2], [3]]"),
        ("Array(String)", "['a, b', 'c']"),
        ("Tuple(UInt8, Tuple(String, Float64))", "(1, ('x', 2.5))"),
        ("Map(String, Array(Nullable(Int64)))", "{a: [1, NULL, 3]}"),
        ("Map(String, Int32)", "{'k:with:colon': 1, plain: 2}"),
    ];
    for (type_string, literal) in &cases {
        let column = registry.resolve(type_string).unwrap();
        let canonical = column.cast(Value::from(*literal)).unwrap();
        assert_eq!(
            column.serialize(&canonical).unwrap(),
            *literal,
            "{}",
            type_string
        );
    }
}

#[test]
fn test_datetime_text_round_trip() {
    let registry = Registry::new();
    let column = registry.resolve("DateTime64(3)").unwrap();

    let canonical = column.cast(Value::from("2024-05-01 12:30:00.250")).unwrap();
    let literal = column.serialize(&canonical).unwrap();
    assert_eq!(literal, "'2024-05-01 12:30:00.250'");
    let back = column
        .cast(Value::String(serialize_inner(&literal)))
        .unwrap();
    assert_eq!(back, canonical);
}
