// In: src/transcoder/mod.rs

//! The cell transcoder.
//!
//! Rewrites a single column between host values and codec byte payloads. The
//! forward direction is only ever applied to columns classified as `BYTES`,
//! `BYTES_LIST` or `BYTES_SET`; the inverse to columns whose envelope names a
//! serializer.
//!
//! Both directions build a fresh cell vector and only swap it into the column once
//! every row has succeeded, so a failing codec never leaves a half-rewritten column.

mod progress;

pub use progress::{Direction, ProgressObserver};

use crate::codec::Codec;
use crate::error::TabwireError;
use crate::frame::Column;
use crate::types::Cell;
use progress::ProgressTracker;

//==================================================================================
// 1. Forward: values -> bytes
//==================================================================================

/// Serializes every non-missing value of `column` through `codec`.
///
/// Scalars become `Bytes`; lists are rewritten element-wise keeping order and
/// missing elements; sets are rewritten element-wise and rebuilt as sets.
pub fn serialize_column(
    column: &mut Column,
    codec: &dyn Codec,
    observer: Option<&dyn ProgressObserver>,
    step_percent: u8,
) -> Result<(), TabwireError> {
    log::debug!(
        "Serializing column '{}' ({} rows)",
        column.name(),
        column.len()
    );
    let mut tracker = ProgressTracker::new(
        observer,
        column.name(),
        Direction::Serialize,
        column.len(),
        step_percent,
    );

    let mut rewritten = Vec::with_capacity(column.len());
    for (i, cell) in column.cells().iter().enumerate() {
        rewritten.push(serialize_cell(cell, codec)?);
        tracker.advance(i + 1);
    }
    tracker.finish();
    drop(tracker);

    let rows = rewritten.len();
    column.replace_cells(rewritten)?;
    log_metric!("event" = "serialize_column", "column" = column.name(), "rows" = rows);
    Ok(())
}

fn serialize_cell(cell: &Cell, codec: &dyn Codec) -> Result<Cell, TabwireError> {
    if cell.is_missing() {
        return Ok(Cell::Missing);
    }
    match cell {
        Cell::List(items) => Ok(Cell::List(serialize_elements(items, codec)?)),
        Cell::Set(items) => Ok(Cell::set(serialize_elements(items, codec)?)),
        value => Ok(Cell::Bytes(codec.serialize(value)?)),
    }
}

fn serialize_elements(items: &[Cell], codec: &dyn Codec) -> Result<Vec<Cell>, TabwireError> {
    items
        .iter()
        .map(|item| {
            if item.is_missing() {
                Ok(Cell::Missing)
            } else {
                codec.serialize(item).map(Cell::Bytes)
            }
        })
        .collect()
}

//==================================================================================
// 2. Inverse: bytes -> values
//==================================================================================

/// Deserializes every byte payload of `column` through `codec`.
///
/// NaN doubles are normalized to missing first. Non-empty byte strings are decoded,
/// empty ones and missing values stay missing. Lists and sets follow the same rule
/// per element. Any other cell fails with `InvalidPayload`.
pub fn deserialize_column(
    column: &mut Column,
    codec: &dyn Codec,
    observer: Option<&dyn ProgressObserver>,
    step_percent: u8,
) -> Result<(), TabwireError> {
    log::debug!(
        "Deserializing column '{}' ({} rows)",
        column.name(),
        column.len()
    );
    let mut tracker = ProgressTracker::new(
        observer,
        column.name(),
        Direction::Deserialize,
        column.len(),
        step_percent,
    );

    let mut rewritten = Vec::with_capacity(column.len());
    for (i, cell) in column.cells().iter().enumerate() {
        rewritten.push(deserialize_cell(column.name(), cell, codec)?);
        tracker.advance(i + 1);
    }
    tracker.finish();
    drop(tracker);

    let rows = rewritten.len();
    column.replace_cells(rewritten)?;
    log_metric!("event" = "deserialize_column", "column" = column.name(), "rows" = rows);
    Ok(())
}

fn deserialize_cell(column: &str, cell: &Cell, codec: &dyn Codec) -> Result<Cell, TabwireError> {
    match cell {
        Cell::List(items) => Ok(Cell::List(deserialize_elements(column, items, codec)?)),
        Cell::Set(items) => Ok(Cell::set(deserialize_elements(column, items, codec)?)),
        scalar => deserialize_scalar(column, scalar, codec),
    }
}

fn deserialize_elements(
    column: &str,
    items: &[Cell],
    codec: &dyn Codec,
) -> Result<Vec<Cell>, TabwireError> {
    items
        .iter()
        .map(|item| deserialize_scalar(column, item, codec))
        .collect()
}

fn deserialize_scalar(column: &str, cell: &Cell, codec: &dyn Codec) -> Result<Cell, TabwireError> {
    if cell.is_missing() {
        return Ok(Cell::Missing);
    }
    match cell {
        Cell::Bytes(bytes) if bytes.is_empty() => Ok(Cell::Missing),
        Cell::Bytes(bytes) => codec.deserialize(bytes),
        other => Err(TabwireError::InvalidPayload {
            column: column.to_string(),
            found: other.kind().map_or_else(|| "missing".into(), |k| k.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests;
