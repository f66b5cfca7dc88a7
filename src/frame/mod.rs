//! The in-memory columnar store that the classifier and transcoder operate on.
//!
//! A `Table` owns ordered, uniquely named `Column`s of equal length. Each column
//! carries a declared native `StorageType` (the equivalent of a dataframe dtype)
//! and its cells. Typed storages are validated on construction so that the
//! classifier can trust them; rewriting a column's cells always switches it to
//! `Object` storage.

use crate::error::TabwireError;
use crate::types::Cell;
use std::fmt;

//==================================================================================
// 1. Storage Types
//==================================================================================

/// The declared native storage of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageType {
    Bool,
    Int32,
    Int64,
    Float64,
    /// Dynamically typed cells; the classifier inspects them one by one.
    #[default]
    Object,
}

impl StorageType {
    /// Whether a cell may live in a column of this storage type.
    pub fn accepts(self, cell: &Cell) -> bool {
        match (self, cell) {
            (_, Cell::Missing) => true,
            (StorageType::Object, _) => true,
            (StorageType::Bool, Cell::Bool(_)) => true,
            (StorageType::Int32, Cell::Int32(_)) => true,
            (StorageType::Int64, Cell::Int32(_) | Cell::Int64(_)) => true,
            (StorageType::Float64, Cell::Double(_)) => true,
            _ => false,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, StorageType::Int32 | StorageType::Int64)
    }

    pub fn name(self) -> &'static str {
        match self {
            StorageType::Bool => "bool",
            StorageType::Int32 => "int32",
            StorageType::Int64 => "int64",
            StorageType::Float64 => "float64",
            StorageType::Object => "object",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//==================================================================================
// 2. Column
//==================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    storage: StorageType,
    cells: Vec<Cell>,
}

impl Column {
    /// Creates a column with typed storage, rejecting cells the storage cannot hold.
    pub fn typed(
        name: impl Into<String>,
        storage: StorageType,
        cells: Vec<Cell>,
    ) -> Result<Self, TabwireError> {
        let name = name.into();
        if let Some(bad) = cells.iter().find(|c| !storage.accepts(c)) {
            return Err(TabwireError::StorageMismatch {
                column: name,
                storage: storage.to_string(),
                found: bad.kind().map_or_else(|| "missing".into(), |k| k.to_string()),
            });
        }
        Ok(Self {
            name,
            storage,
            cells,
        })
    }

    /// Creates a column with dynamically typed `Object` storage.
    pub fn object(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            storage: StorageType::Object,
            cells,
        }
    }

    pub fn bools(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self::from_options(name, StorageType::Bool, values)
    }

    pub fn int32s(name: impl Into<String>, values: Vec<Option<i32>>) -> Self {
        Self::from_options(name, StorageType::Int32, values)
    }

    pub fn int64s(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::from_options(name, StorageType::Int64, values)
    }

    pub fn float64s(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::from_options(name, StorageType::Float64, values)
    }

    fn from_options<T: Into<Cell>>(
        name: impl Into<String>,
        storage: StorageType,
        values: Vec<Option<T>>,
    ) -> Self {
        Self {
            name: name.into(),
            storage,
            cells: values.into_iter().map(Cell::from).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> StorageType {
        self.storage
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over the non-missing cells.
    pub fn valid_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| !c.is_missing())
    }

    /// Replaces every cell at once. The column becomes `Object` storage, mirroring a
    /// dataframe column cast to `object` before its cells are rewritten.
    pub fn replace_cells(&mut self, cells: Vec<Cell>) -> Result<(), TabwireError> {
        if cells.len() != self.cells.len() {
            return Err(TabwireError::Table(format!(
                "column {} has {} rows, replacement has {}",
                self.name,
                self.cells.len(),
                cells.len()
            )));
        }
        self.cells = cells;
        self.storage = StorageType::Object;
        Ok(())
    }

    /// Re-declares the storage type after validating every cell.
    pub fn set_storage(&mut self, storage: StorageType) -> Result<(), TabwireError> {
        if let Some(bad) = self.cells.iter().find(|c| !storage.accepts(c)) {
            return Err(TabwireError::StorageMismatch {
                column: self.name.clone(),
                storage: storage.to_string(),
                found: bad.kind().map_or_else(|| "missing".into(), |k| k.to_string()),
            });
        }
        self.storage = storage;
        Ok(())
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

//==================================================================================
// 3. Table
//==================================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_keys: Option<Vec<String>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from columns, enforcing unique names and equal lengths.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TabwireError> {
        let mut table = Self::new();
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    pub fn add_column(&mut self, column: Column) -> Result<(), TabwireError> {
        if self.column(column.name()).is_some() {
            return Err(TabwireError::Table(format!(
                "duplicate column name '{}'",
                column.name()
            )));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(TabwireError::Table(format!(
                    "column {} has {} rows, table has {}",
                    column.name(),
                    column.len(),
                    first.len()
                )));
            }
        }
        if let Some(keys) = &self.row_keys {
            if keys.len() != column.len() {
                return Err(TabwireError::Table(format!(
                    "column {} has {} rows, table has {} row keys",
                    column.name(),
                    column.len(),
                    keys.len()
                )));
            }
        }
        self.columns.push(column);
        Ok(())
    }

    /// Sets explicit row keys; their count must match the row count.
    pub fn set_row_keys(&mut self, keys: Vec<String>) -> Result<(), TabwireError> {
        if !self.columns.is_empty() && keys.len() != self.num_rows() {
            return Err(TabwireError::Table(format!(
                "{} row keys for a table with {} rows",
                keys.len(),
                self.num_rows()
            )));
        }
        self.row_keys = Some(keys);
        Ok(())
    }

    pub fn row_keys(&self) -> Option<&[String]> {
        self.row_keys.as_deref()
    }

    pub fn num_rows(&self) -> usize {
        self.columns
            .first()
            .map(Column::len)
            .or_else(|| self.row_keys.as_ref().map(Vec::len))
            .unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name() == name)
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_column_rejects_foreign_cells() {
        let result = Column::typed(
            "a",
            StorageType::Int32,
            vec![Cell::from(1), Cell::from("x")],
        );
        match result {
            Err(TabwireError::StorageMismatch { column, found, .. }) => {
                assert_eq!(column, "a");
                assert_eq!(found, "str");
            }
            other => panic!("expected StorageMismatch, got {:?}", other),
        }
        assert!(Column::typed("b", StorageType::Int64, vec![Cell::from(1), Cell::Missing]).is_ok());
    }

    #[test]
    fn test_replace_cells_switches_to_object_storage() {
        let mut col = Column::int32s("a", vec![Some(1), None]);
        col.replace_cells(vec![Cell::from("x"), Cell::Missing]).unwrap();
        assert_eq!(col.storage(), StorageType::Object);
        assert!(col.replace_cells(vec![]).is_err());
        assert_eq!(col.valid_cells().count(), 1);
    }

    #[test]
    fn test_table_enforces_shape() {
        let mut table = Table::from_columns(vec![Column::int32s("a", vec![Some(1), Some(2)])]).unwrap();
        assert!(table.add_column(Column::int32s("a", vec![Some(1), Some(2)])).is_err());
        assert!(table.add_column(Column::int32s("b", vec![Some(1)])).is_err());
        assert!(table.set_row_keys(vec!["r0".into()]).is_err());
        table.set_row_keys(vec!["r0".into(), "r1".into()]).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column_names(), vec!["a"]);
    }
}
