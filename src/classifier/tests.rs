use super::*;
use crate::codec::InMemoryCodecRegistry;
use crate::test_util::{point, point_registry, POINT_CODEC, POINT_TYPE};
use crate::types::Cell;

fn classify_plain(column: &Column) -> Result<Classification, TabwireError> {
    classify(column, &InMemoryCodecRegistry::new())
}

#[test]
fn test_empty_column_is_string() {
    for column in [
        Column::int64s("a", vec![]),
        Column::bools("b", vec![]),
        Column::object("c", vec![]),
    ] {
        assert_eq!(
            classify_plain(&column).unwrap(),
            Classification::builtin(SimpleType::String)
        );
    }
}

#[test]
fn test_declared_storage_types() {
    let bools = Column::bools("b", vec![Some(true), None]);
    assert_eq!(classify_plain(&bools).unwrap().simple_type, SimpleType::Boolean);

    let floats = Column::float64s("f", vec![Some(1.0), Some(f64::NAN)]);
    assert_eq!(classify_plain(&floats).unwrap().simple_type, SimpleType::Double);
}

#[test]
fn test_integer_range_boundary() {
    let fits = Column::int64s("i", vec![Some(-2_147_483_648), Some(2_147_483_647)]);
    assert_eq!(classify_plain(&fits).unwrap().simple_type, SimpleType::Integer);

    let overflows = Column::int64s(
        "i",
        vec![Some(-2_147_483_648), Some(2_147_483_647), Some(2_147_483_648)],
    );
    assert_eq!(classify_plain(&overflows).unwrap().simple_type, SimpleType::Long);

    let underflows = Column::int64s("i", vec![Some(-2_147_483_649)]);
    assert_eq!(classify_plain(&underflows).unwrap().simple_type, SimpleType::Long);
}

#[test]
fn test_all_missing_typed_storage_is_string() {
    let columns = vec![
        Column::int32s("i", vec![None, None]),
        Column::int64s("l", vec![None]),
        Column::bools("b", vec![None, None]),
        Column::float64s("f", vec![None, Some(f64::NAN)]),
    ];
    for column in &columns {
        assert_eq!(
            classify_plain(column).unwrap(),
            Classification::builtin(SimpleType::String),
            "column {}",
            column.name()
        );
    }
}

#[test]
fn test_object_scalars() {
    let cases = vec![
        (vec![Cell::from(true), Cell::Missing], SimpleType::Boolean),
        (vec![Cell::from(1), Cell::from(2_i64)], SimpleType::Integer),
        (vec![Cell::from(1), Cell::from(3_000_000_000_i64)], SimpleType::Long),
        (vec![Cell::from(0.5), Cell::Double(f64::NAN)], SimpleType::Double),
        (vec![Cell::from("a"), Cell::Missing], SimpleType::String),
        (vec![Cell::from(vec![1u8, 2]), Cell::Missing], SimpleType::Bytes),
    ];
    for (cells, expected) in cases {
        let column = Column::object("c", cells);
        let result = classify_plain(&column).unwrap();
        assert_eq!(result.simple_type, expected, "cells: {:?}", column.cells());
        assert_eq!(result.codec_id, None);
    }
}

#[test]
fn test_all_missing_object_columns_are_string() {
    let column = Column::object("c", vec![Cell::Missing, Cell::Double(f64::NAN)]);
    assert_eq!(classify_plain(&column).unwrap().simple_type, SimpleType::String);

    let lists = Column::object("l", vec![Cell::List(vec![Cell::Missing]), Cell::Missing]);
    assert_eq!(classify_plain(&lists).unwrap().simple_type, SimpleType::StringList);

    let sets = Column::object("s", vec![Cell::Set(vec![]), Cell::set(vec![Cell::Missing])]);
    assert_eq!(classify_plain(&sets).unwrap().simple_type, SimpleType::StringSet);
}

#[test]
fn test_heterogeneous_column_names_both_types() {
    let column = Column::object("mixed", vec![Cell::from(1), Cell::Missing, Cell::from("a")]);
    let err = classify_plain(&column).unwrap_err();
    match &err {
        TabwireError::HeterogeneousColumn {
            column,
            first,
            second,
        } => {
            assert_eq!(column, "mixed");
            assert_eq!(first, "int");
            assert_eq!(second, "str");
        }
        other => panic!("expected HeterogeneousColumn, got {:?}", other),
    }
    let msg = err.to_string();
    assert!(msg.contains("int") && msg.contains("str") && msg.contains("mixed"));
}

#[test]
fn test_list_and_set_mix_is_heterogeneous() {
    let column = Column::object(
        "c",
        vec![Cell::List(vec![Cell::from(1)]), Cell::set(vec![Cell::from(2)])],
    );
    assert!(matches!(
        classify_plain(&column),
        Err(TabwireError::HeterogeneousColumn { .. })
    ));
}

#[test]
fn test_collection_element_types() {
    let ints = Column::object(
        "c",
        vec![
            Cell::List(vec![Cell::from(1), Cell::Missing]),
            Cell::Missing,
            Cell::List(vec![Cell::from(-5)]),
        ],
    );
    assert_eq!(classify_plain(&ints).unwrap().simple_type, SimpleType::IntegerList);

    let longs = Column::object("c", vec![Cell::set(vec![Cell::from(i64::MAX)])]);
    assert_eq!(classify_plain(&longs).unwrap().simple_type, SimpleType::LongSet);

    let doubles = Column::object("c", vec![Cell::set(vec![Cell::from(1.5)])]);
    assert_eq!(classify_plain(&doubles).unwrap().simple_type, SimpleType::DoubleSet);

    let bools = Column::object("c", vec![Cell::List(vec![Cell::from(false)])]);
    assert_eq!(classify_plain(&bools).unwrap().simple_type, SimpleType::BooleanList);

    let strs = Column::object("c", vec![Cell::List(vec![Cell::from("x")])]);
    assert_eq!(classify_plain(&strs).unwrap().simple_type, SimpleType::StringList);
}

#[test]
fn test_heterogeneous_elements_across_rows() {
    let column = Column::object(
        "c",
        vec![
            Cell::List(vec![Cell::Missing]),
            Cell::List(vec![Cell::from(1)]),
            Cell::List(vec![Cell::from("a")]),
        ],
    );
    match classify_plain(&column) {
        Err(TabwireError::HeterogeneousColumn { first, second, .. }) => {
            assert_eq!((first.as_str(), second.as_str()), ("int", "str"));
        }
        other => panic!("expected HeterogeneousColumn, got {:?}", other),
    }
}

#[test]
fn test_nested_collection_is_rejected() {
    let column = Column::object(
        "nested",
        vec![Cell::List(vec![Cell::List(vec![Cell::from(1)])])],
    );
    match classify_plain(&column) {
        Err(TabwireError::NestedCollection { column }) => assert_eq!(column, "nested"),
        other => panic!("expected NestedCollection, got {:?}", other),
    }

    let set_in_list = Column::object("n", vec![Cell::List(vec![Cell::Set(vec![])])]);
    assert!(matches!(
        classify_plain(&set_in_list),
        Err(TabwireError::NestedCollection { .. })
    ));
}

#[test]
fn test_extension_scalar_resolves_codec() {
    let registry = point_registry();
    let column = Column::object("p", vec![Cell::Missing, point(1, 2), point(3, 4)]);
    assert_eq!(
        classify(&column, &registry).unwrap(),
        Classification::with_codec(SimpleType::Bytes, POINT_CODEC.into())
    );
}

#[test]
fn test_extension_collections_resolve_codec() {
    let registry = point_registry();
    let sets = Column::object(
        "tags",
        vec![
            Cell::set(vec![point(1, 1), point(2, 2)]),
            Cell::Missing,
            Cell::set(vec![point(3, 3)]),
        ],
    );
    assert_eq!(
        classify(&sets, &registry).unwrap(),
        Classification::with_codec(SimpleType::BytesSet, POINT_CODEC.into())
    );

    let lists = Column::object("l", vec![Cell::List(vec![Cell::Missing, point(0, 0)])]);
    assert_eq!(
        classify(&lists, &registry).unwrap().simple_type,
        SimpleType::BytesList
    );
}

#[test]
fn test_unregistered_extension_is_unresolved() {
    let column = Column::object("p", vec![point(1, 2)]);
    match classify_plain(&column) {
        Err(TabwireError::UnresolvedType {
            column,
            storage,
            type_name,
        }) => {
            assert_eq!(column, "p");
            assert_eq!(storage, "object");
            assert_eq!(type_name, POINT_TYPE);
        }
        other => panic!("expected UnresolvedType, got {:?}", other),
    }

    let in_list = Column::object("l", vec![Cell::List(vec![point(1, 2)])]);
    assert!(matches!(
        classify_plain(&in_list),
        Err(TabwireError::UnresolvedType { .. })
    ));
}

#[test]
fn test_raw_bytes_inside_collections_need_a_codec() {
    let column = Column::object("l", vec![Cell::List(vec![Cell::from(vec![1u8])])]);
    match classify_plain(&column) {
        Err(TabwireError::UnresolvedType { type_name, .. }) => assert_eq!(type_name, "bytes"),
        other => panic!("expected UnresolvedType, got {:?}", other),
    }
}
