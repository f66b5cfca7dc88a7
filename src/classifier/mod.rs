// In: src/classifier/mod.rs

//! The type classifier.
//!
//! Examines one column and deterministically assigns it a `SimpleType` plus, for
//! extension types, the id of the external codec that serializes its values.
//! Classification is recomputed on every forward pass because a column's contents
//! may have changed since the last one.
//!
//! Priority order:
//! 1. Zero rows -> `STRING`.
//! 2. Declared `Bool` storage -> `BOOLEAN`.
//! 3. Declared integer storage -> `INTEGER` or `LONG` by min/max, `STRING` if all missing.
//! 4. Declared `Float64` storage -> `DOUBLE`.
//! 5. `Object` storage -> uniform runtime type of the non-missing cells, recursing
//!    one level into lists and sets, falling back to a registry lookup.

mod scan;

use crate::codec::CodecRegistry;
use crate::error::TabwireError;
use crate::frame::{Column, StorageType};
use crate::types::{CellKind, SimpleType};
use scan::IntRange;

/// The outcome of classifying a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub simple_type: SimpleType,
    /// Only ever set for `BYTES`, `BYTES_LIST` and `BYTES_SET`.
    pub codec_id: Option<String>,
}

impl Classification {
    pub fn builtin(simple_type: SimpleType) -> Self {
        Self {
            simple_type,
            codec_id: None,
        }
    }

    pub fn with_codec(simple_type: SimpleType, codec_id: String) -> Self {
        Self {
            simple_type,
            codec_id: Some(codec_id),
        }
    }
}

/// Classifies `column`, consulting `registry` only for types with no built-in match.
pub fn classify(
    column: &Column,
    registry: &dyn CodecRegistry,
) -> Result<Classification, TabwireError> {
    let classification = classify_inner(column, registry)?;
    log::debug!(
        "Classified column '{}' ({} storage, {} rows) as {} (codec: {:?})",
        column.name(),
        column.storage(),
        column.len(),
        classification.simple_type,
        classification.codec_id
    );
    Ok(classification)
}

fn classify_inner(
    column: &Column,
    registry: &dyn CodecRegistry,
) -> Result<Classification, TabwireError> {
    // No data to infer from.
    if column.is_empty() {
        return Ok(Classification::builtin(SimpleType::String));
    }

    // Only missing values, whatever the declared storage.
    if column.valid_cells().next().is_none() {
        return Ok(Classification::builtin(SimpleType::String));
    }

    match column.storage() {
        StorageType::Bool => Ok(Classification::builtin(SimpleType::Boolean)),
        StorageType::Int32 | StorageType::Int64 => {
            let mut range = IntRange::empty();
            column.valid_cells().for_each(|c| range.observe_cell(c));
            if range.is_empty() {
                return Ok(Classification::builtin(SimpleType::String));
            }
            Ok(Classification::builtin(integer_type(&range)))
        }
        StorageType::Float64 => Ok(Classification::builtin(SimpleType::Double)),
        StorageType::Object => classify_object(column, registry),
    }
}

fn integer_type(range: &IntRange) -> SimpleType {
    if range.fits_int32() {
        SimpleType::Integer
    } else {
        SimpleType::Long
    }
}

fn classify_object(
    column: &Column,
    registry: &dyn CodecRegistry,
) -> Result<Classification, TabwireError> {
    let Some(kind) = scan::uniform_kind(column)? else {
        // Only missing values: make it a string column.
        return Ok(Classification::builtin(SimpleType::String));
    };

    let simple_type = match kind {
        CellKind::Bool => SimpleType::Boolean,
        CellKind::Int => {
            let mut range = IntRange::starting_at_zero();
            column.valid_cells().for_each(|c| range.observe_cell(c));
            integer_type(&range)
        }
        CellKind::Float => SimpleType::Double,
        CellKind::Str => SimpleType::String,
        // Raw byte strings pass through verbatim without a codec.
        CellKind::Bytes => SimpleType::Bytes,
        CellKind::List | CellKind::Set => {
            return classify_collection(column, registry, kind == CellKind::Set)
        }
        CellKind::Extension(_) => {
            let type_name = type_name_of(scan::first_valid(column));
            let codec_id = resolve_codec_id(column, registry, &type_name)?;
            return Ok(Classification::with_codec(SimpleType::Bytes, codec_id));
        }
    };
    Ok(Classification::builtin(simple_type))
}

fn classify_collection(
    column: &Column,
    registry: &dyn CodecRegistry,
    is_set: bool,
) -> Result<Classification, TabwireError> {
    let wrap = |t: SimpleType| if is_set { t.set_of() } else { t.list_of() };

    let element_type = match scan::uniform_element_kind(column)? {
        // Only missing elements: make it a string collection.
        None => SimpleType::String,
        Some(CellKind::Bool) => SimpleType::Boolean,
        Some(CellKind::Int) => {
            let mut range = IntRange::starting_at_zero();
            scan::elements(column).for_each(|c| range.observe_cell(c));
            integer_type(&range)
        }
        Some(CellKind::Float) => SimpleType::Double,
        Some(CellKind::Str) => SimpleType::String,
        Some(_) => {
            let type_name = type_name_of(scan::first_valid_element(column));
            let codec_id = resolve_codec_id(column, registry, &type_name)?;
            return Ok(Classification::with_codec(wrap(SimpleType::Bytes), codec_id));
        }
    };
    Ok(Classification::builtin(wrap(element_type)))
}

fn type_name_of(cell: Option<&crate::types::Cell>) -> String {
    cell.and_then(|c| c.kind())
        .map(|k| k.name().to_string())
        .unwrap_or_default()
}

fn resolve_codec_id(
    column: &Column,
    registry: &dyn CodecRegistry,
    type_name: &str,
) -> Result<String, TabwireError> {
    registry
        .codec_id_for_type(type_name)
        .ok_or_else(|| TabwireError::UnresolvedType {
            column: column.name().to_string(),
            storage: column.storage().to_string(),
            type_name: type_name.to_string(),
        })
}

#[cfg(test)]
mod tests;
