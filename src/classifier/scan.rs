//! Single-pass scans over a column's cells used by the classifier.
//!
//! Every scan visits cells in row order and skips missing values. The uniform-type
//! scans record the first runtime type they see and fail as soon as a later cell
//! is not equivalent to it.

use crate::error::TabwireError;
use crate::frame::Column;
use crate::types::{Cell, CellKind};
use num_traits::ToPrimitive;

pub(crate) const INT32_MIN: i64 = i32::MIN as i64;
pub(crate) const INT32_MAX: i64 = i32::MAX as i64;

//==================================================================================
// 1. Integer Range Tracking
//==================================================================================

/// Running min/max over integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IntRange {
    bounds: Option<(i64, i64)>,
}

impl IntRange {
    /// No values observed yet.
    pub(crate) fn empty() -> Self {
        Self { bounds: None }
    }

    /// Starts with min = max = 0, so that an empty scan still fits 32 bits.
    pub(crate) fn starting_at_zero() -> Self {
        Self {
            bounds: Some((0, 0)),
        }
    }

    pub(crate) fn observe<T: ToPrimitive>(&mut self, value: T) {
        // Anything that does not fit i64 is out of the 32-bit range anyway.
        let v = value.to_i64().unwrap_or(i64::MAX);
        self.bounds = Some(match self.bounds {
            Some((min, max)) => (min.min(v), max.max(v)),
            None => (v, v),
        });
    }

    pub(crate) fn observe_cell(&mut self, cell: &Cell) {
        if let Some(v) = cell.as_i64() {
            self.observe(v);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// `true` if every observed value lies in `[-2147483648, 2147483647]`.
    pub(crate) fn fits_int32(&self) -> bool {
        match self.bounds {
            Some((min, max)) => min >= INT32_MIN && max <= INT32_MAX,
            None => true,
        }
    }
}

//==================================================================================
// 2. Uniform Type Scans
//==================================================================================

fn check_equivalent(
    column: &Column,
    seen: &mut Option<CellKind>,
    kind: CellKind,
) -> Result<(), TabwireError> {
    match seen {
        Some(first) if *first != kind => Err(TabwireError::HeterogeneousColumn {
            column: column.name().to_string(),
            first: first.to_string(),
            second: kind.to_string(),
        }),
        Some(_) => Ok(()),
        None => {
            *seen = Some(kind);
            Ok(())
        }
    }
}

/// The runtime type shared by all non-missing cells, or `None` if every cell is missing.
pub(crate) fn uniform_kind(column: &Column) -> Result<Option<CellKind>, TabwireError> {
    let mut seen = None;
    for kind in column.cells().iter().filter_map(Cell::kind) {
        check_equivalent(column, &mut seen, kind)?;
    }
    Ok(seen)
}

/// The runtime type shared by all non-missing elements of all list/set cells, or
/// `None` if there are none. A collection element is rejected outright.
pub(crate) fn uniform_element_kind(column: &Column) -> Result<Option<CellKind>, TabwireError> {
    let mut seen = None;
    for element in elements(column) {
        let Some(kind) = element.kind() else {
            continue;
        };
        if kind.is_collection() {
            return Err(TabwireError::NestedCollection {
                column: column.name().to_string(),
            });
        }
        check_equivalent(column, &mut seen, kind)?;
    }
    Ok(seen)
}

//==================================================================================
// 3. Element Access
//==================================================================================

/// Every element of every non-missing collection cell, in row order.
pub(crate) fn elements(column: &Column) -> impl Iterator<Item = &Cell> {
    column
        .cells()
        .iter()
        .filter_map(Cell::elements)
        .flat_map(|items| items.iter())
}

pub(crate) fn first_valid(column: &Column) -> Option<&Cell> {
    column.valid_cells().next()
}

pub(crate) fn first_valid_element(column: &Column) -> Option<&Cell> {
    elements(column).find(|c| !c.is_missing())
}
