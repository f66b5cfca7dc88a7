// In: src/transport/arrow_impl.rs

//! DATA MARSHALLING between column cells and Arrow arrays.
//!
//! The Arrow type of a column is fully determined by its `SimpleType` (see
//! [`SimpleType::to_arrow_type`]). Missing cells become Arrow nulls, both at the
//! row level and inside list values. Sets are written with the list layout and
//! rebuilt as sets on the way back.

use arrow::array::{
    Array, ArrayRef, BinaryArray, BinaryBuilder, BooleanArray, BooleanBuilder, Float64Array,
    Float64Builder, Int32Array, Int32Builder, Int64Array, Int64Builder, ListArray, ListBuilder,
    StringArray, StringBuilder,
};
use std::sync::Arc;

use crate::error::TabwireError;
use crate::types::{Cell, SimpleType};

//==================================================================================
// 1. Cells -> Arrow
//==================================================================================

fn mismatch(column: &str, simple_type: SimpleType, cell: &Cell) -> TabwireError {
    TabwireError::StorageMismatch {
        column: column.to_string(),
        storage: simple_type.to_string(),
        found: cell.kind().map_or_else(|| "missing".into(), |k| k.to_string()),
    }
}

fn bool_of(column: &str, t: SimpleType, cell: &Cell) -> Result<bool, TabwireError> {
    match cell {
        Cell::Bool(v) => Ok(*v),
        other => Err(mismatch(column, t, other)),
    }
}

fn int32_of(column: &str, t: SimpleType, cell: &Cell) -> Result<i32, TabwireError> {
    cell.as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| mismatch(column, t, cell))
}

fn int64_of(column: &str, t: SimpleType, cell: &Cell) -> Result<i64, TabwireError> {
    cell.as_i64().ok_or_else(|| mismatch(column, t, cell))
}

fn double_of(column: &str, t: SimpleType, cell: &Cell) -> Result<f64, TabwireError> {
    match cell {
        Cell::Double(v) => Ok(*v),
        other => Err(mismatch(column, t, other)),
    }
}

fn str_of<'c>(column: &str, t: SimpleType, cell: &'c Cell) -> Result<&'c str, TabwireError> {
    match cell {
        Cell::Str(v) => Ok(v),
        other => Err(mismatch(column, t, other)),
    }
}

fn bytes_of<'c>(column: &str, t: SimpleType, cell: &'c Cell) -> Result<&'c [u8], TabwireError> {
    match cell {
        Cell::Bytes(v) => Ok(v),
        other => Err(mismatch(column, t, other)),
    }
}

/// Builds the Arrow array for one column of `simple_type`.
pub(crate) fn cells_to_array(
    column: &str,
    simple_type: SimpleType,
    cells: &[Cell],
) -> Result<ArrayRef, TabwireError> {
    macro_rules! build_array {
        ($builder:expr, $extract:ident) => {{
            if simple_type.is_collection() {
                let mut list = ListBuilder::new($builder);
                for cell in cells {
                    match cell {
                        c if c.is_missing() => list.append_null(),
                        Cell::List(items) | Cell::Set(items) => {
                            for item in items {
                                if item.is_missing() {
                                    list.values().append_null();
                                } else {
                                    list.values()
                                        .append_value($extract(column, simple_type, item)?);
                                }
                            }
                            list.append(true);
                        }
                        other => return Err(mismatch(column, simple_type, other)),
                    }
                }
                Arc::new(list.finish()) as ArrayRef
            } else {
                let mut builder = $builder;
                for cell in cells {
                    if cell.is_missing() {
                        builder.append_null();
                    } else {
                        builder.append_value($extract(column, simple_type, cell)?);
                    }
                }
                Arc::new(builder.finish()) as ArrayRef
            }
        }};
    }

    let array = match simple_type.element_type() {
        SimpleType::Boolean => build_array!(BooleanBuilder::new(), bool_of),
        SimpleType::Integer => build_array!(Int32Builder::new(), int32_of),
        SimpleType::Long => build_array!(Int64Builder::new(), int64_of),
        SimpleType::Double => build_array!(Float64Builder::new(), double_of),
        SimpleType::String => build_array!(StringBuilder::new(), str_of),
        _ => build_array!(BinaryBuilder::new(), bytes_of),
    };
    Ok(array)
}

//==================================================================================
// 2. Arrow -> Cells
//==================================================================================

fn unexpected_array(column: &str, simple_type: SimpleType, array: &dyn Array) -> TabwireError {
    TabwireError::FrameFormatError(format!(
        "Column {} is declared {} but carries an Arrow {} array",
        column,
        simple_type,
        array.data_type()
    ))
}

/// Reads a flat (non-list) array into cells, nulls becoming `Missing`.
fn scalar_cells(
    column: &str,
    simple_type: SimpleType,
    array: &dyn Array,
) -> Result<Vec<Cell>, TabwireError> {
    macro_rules! read_scalars {
        ($ArrayType:ty, $to_cell:expr) => {{
            let typed = array
                .as_any()
                .downcast_ref::<$ArrayType>()
                .ok_or_else(|| unexpected_array(column, simple_type, array))?;
            typed
                .iter()
                .map(|v| v.map_or(Cell::Missing, $to_cell))
                .collect::<Vec<Cell>>()
        }};
    }

    let cells = match simple_type.element_type() {
        SimpleType::Boolean => read_scalars!(BooleanArray, Cell::Bool),
        SimpleType::Integer => read_scalars!(Int32Array, Cell::Int32),
        SimpleType::Long => read_scalars!(Int64Array, Cell::Int64),
        SimpleType::Double => read_scalars!(Float64Array, Cell::Double),
        SimpleType::String => read_scalars!(StringArray, |s: &str| Cell::Str(s.to_string())),
        _ => read_scalars!(BinaryArray, |b: &[u8]| Cell::Bytes(b.to_vec())),
    };
    Ok(cells)
}

/// Reads the Arrow array of one column of `simple_type` back into cells.
pub(crate) fn array_to_cells(
    column: &str,
    simple_type: SimpleType,
    array: &dyn Array,
) -> Result<Vec<Cell>, TabwireError> {
    if !simple_type.is_collection() {
        return scalar_cells(column, simple_type, array);
    }

    let lists = array
        .as_any()
        .downcast_ref::<ListArray>()
        .ok_or_else(|| unexpected_array(column, simple_type, array))?;

    let mut cells = Vec::with_capacity(lists.len());
    for i in 0..lists.len() {
        if lists.is_null(i) {
            cells.push(Cell::Missing);
            continue;
        }
        let values = lists.value(i);
        let items = scalar_cells(column, simple_type, values.as_ref())?;
        cells.push(if simple_type.is_set() {
            Cell::set(items)
        } else {
            Cell::List(items)
        });
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_columns_map_to_their_arrow_types() {
        let cells = vec![Cell::from(1), Cell::Missing, Cell::from(-7)];
        let array = cells_to_array("i", SimpleType::Integer, &cells).unwrap();
        assert_eq!(array.data_type(), &SimpleType::Integer.to_arrow_type());
        assert_eq!(array.null_count(), 1);
        assert_eq!(
            array_to_cells("i", SimpleType::Integer, array.as_ref()).unwrap(),
            cells
        );
    }

    #[test]
    fn test_nan_is_written_as_null() {
        let cells = vec![Cell::from(1.5), Cell::Double(f64::NAN)];
        let array = cells_to_array("d", SimpleType::Double, &cells).unwrap();
        assert!(array.is_null(1));
    }

    #[test]
    fn test_list_and_set_columns_keep_inner_nulls() {
        let lists = vec![
            Cell::List(vec![Cell::from("a"), Cell::Missing]),
            Cell::Missing,
            Cell::List(vec![]),
        ];
        let array = cells_to_array("l", SimpleType::StringList, &lists).unwrap();
        assert_eq!(array.data_type(), &SimpleType::StringList.to_arrow_type());
        assert_eq!(
            array_to_cells("l", SimpleType::StringList, array.as_ref()).unwrap(),
            lists
        );

        let sets = vec![Cell::set(vec![Cell::from(3_i64), Cell::from(1_i64)])];
        let array = cells_to_array("s", SimpleType::LongSet, &sets).unwrap();
        let back = array_to_cells("s", SimpleType::LongSet, array.as_ref()).unwrap();
        assert!(matches!(back[0], Cell::Set(_)));
        assert_eq!(back, sets);
    }

    #[test]
    fn test_cell_of_wrong_type_is_rejected() {
        let cells = vec![Cell::from("x")];
        assert!(matches!(
            cells_to_array("b", SimpleType::Boolean, &cells),
            Err(TabwireError::StorageMismatch { .. })
        ));

        let too_big = vec![Cell::from(i64::MAX)];
        assert!(cells_to_array("i", SimpleType::Integer, &too_big).is_err());
    }

    #[test]
    fn test_array_of_wrong_type_is_rejected() {
        let array = cells_to_array("i", SimpleType::Integer, &[Cell::from(1)]).unwrap();
        assert!(matches!(
            array_to_cells("i", SimpleType::String, array.as_ref()),
            Err(TabwireError::FrameFormatError(_))
        ));
    }
}
