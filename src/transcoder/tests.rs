use super::*;
use crate::frame::StorageType;
use crate::test_util::{point, PointCodec};
use std::cell::RefCell;

fn serialize(column: &mut Column) -> Result<(), TabwireError> {
    serialize_column(column, &PointCodec, None, 5)
}

fn deserialize(column: &mut Column) -> Result<(), TabwireError> {
    deserialize_column(column, &PointCodec, None, 5)
}

#[test]
fn test_scalar_round_trip_preserves_missing() {
    // Arrange
    let original = vec![point(1, 2), Cell::Missing, point(-3, 4)];
    let mut column = Column::object("p", original.clone());

    // Act
    serialize(&mut column).unwrap();

    // Assert
    assert_eq!(
        column.cells(),
        &[
            Cell::Bytes(b"1,2".to_vec()),
            Cell::Missing,
            Cell::Bytes(b"-3,4".to_vec())
        ]
    );
    deserialize(&mut column).unwrap();
    assert_eq!(column.cells(), original.as_slice());
    assert_eq!(column.storage(), StorageType::Object);
}

#[test]
fn test_list_round_trip_keeps_order_and_missing_elements() {
    let original = vec![
        Cell::List(vec![point(1, 1), Cell::Missing, point(0, 0)]),
        Cell::Missing,
        Cell::List(vec![]),
    ];
    let mut column = Column::object("l", original.clone());

    serialize(&mut column).unwrap();
    assert_eq!(
        column.cells()[0],
        Cell::List(vec![
            Cell::Bytes(b"1,1".to_vec()),
            Cell::Missing,
            Cell::Bytes(b"0,0".to_vec())
        ])
    );

    deserialize(&mut column).unwrap();
    assert_eq!(column.cells(), original.as_slice());
}

#[test]
fn test_set_round_trip() {
    let original = vec![Cell::set(vec![point(1, 1), point(2, 2)]), Cell::Missing];
    let mut column = Column::object("s", original.clone());

    serialize(&mut column).unwrap();
    assert!(matches!(&column.cells()[0], Cell::Set(items) if items.len() == 2));

    deserialize(&mut column).unwrap();
    assert_eq!(column.cells(), original.as_slice());
}

#[test]
fn test_deserialize_normalizes_nan_and_empty_bytes_to_missing() {
    let mut column = Column::object(
        "p",
        vec![
            Cell::Double(f64::NAN),
            Cell::Bytes(vec![]),
            Cell::Bytes(b"5,6".to_vec()),
            Cell::List(vec![Cell::Bytes(vec![]), Cell::Double(f64::NAN)]),
        ],
    );

    deserialize(&mut column).unwrap();

    assert_eq!(
        column.cells(),
        &[
            Cell::Missing,
            Cell::Missing,
            point(5, 6),
            Cell::List(vec![Cell::Missing, Cell::Missing])
        ]
    );
}

#[test]
fn test_deserialize_rejects_non_byte_payloads() {
    let mut column = Column::object("p", vec![Cell::Bytes(b"1,1".to_vec()), Cell::from("x")]);
    match deserialize(&mut column) {
        Err(TabwireError::InvalidPayload { column, found }) => {
            assert_eq!(column, "p");
            assert_eq!(found, "str");
        }
        other => panic!("expected InvalidPayload, got {:?}", other),
    }

    let mut nested = Column::object("l", vec![Cell::List(vec![Cell::from(1)])]);
    assert!(matches!(
        deserialize(&mut nested),
        Err(TabwireError::InvalidPayload { .. })
    ));
}

#[test]
fn test_failed_column_is_left_untouched() {
    // The second payload is malformed, so the first must not be decoded in place.
    let original = vec![Cell::Bytes(b"1,1".to_vec()), Cell::Bytes(b"garbage".to_vec())];
    let mut column = Column::object("p", original.clone());

    let err = deserialize(&mut column).unwrap_err();

    assert!(matches!(err, TabwireError::Codec { .. }));
    assert_eq!(column.cells(), original.as_slice());
}

#[test]
fn test_serialize_codec_failure_leaves_typed_storage() {
    let mut column = Column::int64s("n", vec![Some(1), Some(2)]);
    assert!(serialize(&mut column).is_err());
    assert_eq!(column.storage(), StorageType::Int64);
}

#[test]
fn test_observer_sees_monotonic_progress_ending_at_100() {
    let seen = RefCell::new(Vec::new());
    let observer = |name: &str, direction: Direction, percent: u8| {
        assert_eq!(name, "p");
        seen.borrow_mut().push((direction, percent));
    };
    let cells: Vec<Cell> = (0..40).map(|i| point(i, i)).collect();
    let mut column = Column::object("p", cells);

    serialize_column(&mut column, &PointCodec, Some(&observer), 10).unwrap();
    deserialize_column(&mut column, &PointCodec, Some(&observer), 10).unwrap();

    let seen = seen.into_inner();
    let forward: Vec<u8> = seen
        .iter()
        .filter(|(d, _)| *d == Direction::Serialize)
        .map(|(_, p)| *p)
        .collect();
    assert_eq!(forward, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    let backward: Vec<u8> = seen
        .iter()
        .filter(|(d, _)| *d == Direction::Deserialize)
        .map(|(_, p)| *p)
        .collect();
    assert_eq!(backward, forward);
}
