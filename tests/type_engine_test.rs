//! End-to-end scenarios: resolve a type-string, then push values through
//! cast/deserialize/serialize the way a result container and query
//! builder would.

use colcast::{Registry, TypeCastError, Value};
use pretty_assertions::assert_eq;

#[test]
fn test_nested_composite_round_trip() {
    let registry = Registry::new();
    let column = registry.resolve("Map(String, Array(Nullable(Int64)))").unwrap();

    let input = Value::Map(vec![(
        Value::from("a"),
        Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)]),
    )]);
    let cast = column.cast(input).unwrap();
    assert_eq!(column.serialize(&cast).unwrap(), "{a: [1, NULL, 3]}");

    // the serialized literal feeds back through cast
    let reparsed = column.cast(Value::from("{a: [1, NULL, 3]}")).unwrap();
    assert_eq!(reparsed, cast);
}

#[test]
fn test_fixed_string_scenario() {
    let registry = Registry::new();
    let column = registry.resolve("FixedString(5)").unwrap();

    let cast = column.cast(Value::from("hi")).unwrap();
    match &cast {
        Value::String(s) => assert_eq!(s.len(), 5),
        other => panic!("expected string, got {:?}", other),
    }

    let wire = serde_json::json!("hi\0\0\0");
    assert_eq!(column.deserialize(&wire).unwrap(), Value::from("hi"));
}

#[test]
fn test_integer_overflow_scenario() {
    let registry = Registry::new();
    let int8 = registry.resolve("Int8").unwrap();

    assert_eq!(int8.cast(Value::Int(127)).unwrap(), Value::Int(127));
    assert_eq!(int8.cast(Value::Int(-128)).unwrap(), Value::Int(-128));

    let err: TypeCastError = int8.cast(Value::Int(128)).unwrap_err();
    assert_eq!(err.to_type, "Int8");
    assert_eq!(err.value, "128");
}

#[test]
fn test_decimal_boundary_scenario() {
    let registry = Registry::new();
    let column = registry.resolve("Decimal(10, 2)").unwrap();

    assert!(column.cast(Value::from("99999999.99")).is_ok());
    assert!(column.cast(Value::from("100000000.00")).is_err());
}

#[test]
fn test_enum_bijectivity_scenario() {
    let registry = Registry::new();
    let column = registry
        .resolve("Enum8('active' = 1, 'inactive' = 2)")
        .unwrap();

    assert_eq!(
        column.cast(Value::Int(1)).unwrap(),
        column.cast(Value::from("active")).unwrap()
    );
    assert_eq!(
        column.cast(Value::Int(2)).unwrap(),
        column.cast(Value::from("inactive")).unwrap()
    );
    assert!(column.cast(Value::Int(99)).is_err());
    assert!(column.cast(Value::from("unknown")).is_err());

    assert_eq!(
        column
            .serialize(&column.cast(Value::Int(1)).unwrap())
            .unwrap(),
        "'active'"
    );
}

#[test]
fn test_unknown_type_passthrough_scenario() {
    let registry = Registry::new();
    let column = registry.resolve("SomeFutureType").unwrap();

    let wire = serde_json::json!("opaque payload");
    let value = column.deserialize(&wire).unwrap();
    assert_eq!(value, Value::from("opaque payload"));
    assert_eq!(column.serialize(&value).unwrap(), "'opaque payload'");
}

#[test]
fn test_result_container_flow() {
    // per-column metadata plus rows of wire values, as the result
    // container hands them over
    let registry = Registry::new();
    let columns = [
        ("id", "UInt64"),
        ("name", "Nullable(String)"),
        ("balance", "Decimal(18, 4)"),
        ("tags", "Array(String)"),
    ];
    let rows = [
        serde_json::json!([1, "alice", "10.5", ["a", "b"]]),
        serde_json::json!([2, null, "-3.1415", []]),
    ];

    let types: Vec<_> = columns
        .iter()
        .map(|(_, type_string)| registry.resolve(type_string).unwrap())
        .collect();

    let mut decoded = Vec::new();
    for row in &rows {
        let cells = row.as_array().unwrap();
        let values: Vec<Value> = types
            .iter()
            .zip(cells.iter())
            .map(|(column, cell)| column.deserialize(cell).unwrap())
            .collect();
        decoded.push(values);
    }

    assert_eq!(decoded[0][0], Value::UInt(1));
    assert_eq!(decoded[0][1], Value::from("alice"));
    assert_eq!(
        decoded[0][2],
        Value::Decimal {
            digits: "10.5000".to_string(),
            precision: 18,
            scale: 4
        }
    );
    assert_eq!(decoded[1][1], Value::Null);
    assert_eq!(decoded[1][3], Value::Array(vec![]));
}

#[test]
fn test_query_builder_flow() {
    // application value + target type-string -> cast then serialize,
    // ready for embedding into query text
    let registry = Registry::new();

    let cases: Vec<(&str, Value, &str)> = vec![
        ("String", Value::from("it's here"), r"'it\'s here'"),
        ("UInt8", Value::from("200"), "200"),
        ("Decimal(10, 2)", Value::Int(7), "7.00"),
        ("Date", Value::from("2024-05-01"), "'2024-05-01'"),
        (
            "Tuple(String, UInt64)",
            Value::Tuple(vec![Value::from("x"), Value::UInt(9)]),
            "('x', 9)",
        ),
        ("Nullable(Int32)", Value::Null, "NULL"),
    ];

    for (type_string, input, expected) in cases {
        let column = registry.resolve(type_string).unwrap();
        let cast = column.cast(input).unwrap();
        assert_eq!(column.serialize(&cast).unwrap(), expected, "{}", type_string);
    }
}

#[test]
fn test_registry_shared_across_threads() {
    use std::sync::Arc;

    let registry = Arc::new(Registry::new());
    let mut handles = Vec::new();
    for _ in 0..4 {
        let registry = Arc::clone(&registry);
        handles.push(std::thread::spawn(move || {
            for _ in 0..100 {
                let column = registry.resolve("Array(Nullable(Int64))").unwrap();
                let value = column
                    .cast(Value::from("[1, NULL, 3]"))
                    .unwrap();
                assert_eq!(column.serialize(&value).unwrap(), "[1, NULL, 3]");
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}
