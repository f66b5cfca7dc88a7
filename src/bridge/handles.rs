// In: src/bridge/handles.rs

//! The table handles exchanged with a `TableTransport`.
//!
//! * `OutgoingTable` owns a classified copy of the caller's table whose codec-backed
//!   columns have been serialized. The transport only reads it.
//! * `IncomingTable` starts as an empty-shaped table (names, types, serializer ids),
//!   is filled by the transport, and is finally turned into a `Table` by decoding
//!   codec-backed columns and restoring typed storage.

use hashbrown::HashMap;
use std::sync::Arc;

use crate::classifier::{classify, Classification};
use crate::codec::{Codec, CodecRegistry};
use crate::config::TranscoderConfig;
use crate::error::TabwireError;
use crate::frame::{Column, StorageType, Table};
use crate::transcoder::{deserialize_column, serialize_column, ProgressObserver};
use crate::types::{Cell, SimpleType};

//==================================================================================
// 1. Outgoing (table -> bytes)
//==================================================================================

/// One column of an `OutgoingTable`, as seen by the transport.
#[derive(Debug, Clone, Copy)]
pub struct OutgoingColumn<'a> {
    pub column: &'a Column,
    pub simple_type: SimpleType,
    pub serializer: Option<&'a str>,
}

#[derive(Debug)]
pub struct OutgoingTable {
    table: Table,
    classifications: Vec<Classification>,
    row_keys: Vec<String>,
}

impl OutgoingTable {
    /// Classifies every column of `table` and serializes the codec-backed ones into
    /// a private copy. The caller's table is never modified.
    ///
    /// Row keys are the table's own keys or, when it has none, `start_row_number + i`
    /// in decimal.
    pub fn prepare(
        table: &Table,
        registry: &dyn CodecRegistry,
        config: &TranscoderConfig,
        observer: Option<&dyn ProgressObserver>,
        start_row_number: u64,
    ) -> Result<Self, TabwireError> {
        let classifications = table
            .columns()
            .iter()
            .map(|column| classify(column, registry))
            .collect::<Result<Vec<_>, _>>()?;

        let row_keys = match table.row_keys() {
            Some(keys) => keys.to_vec(),
            None => generated_row_keys(start_row_number, table.num_rows())?,
        };

        let mut table = table.clone();
        for (column, classification) in table.columns_mut().iter_mut().zip(&classifications) {
            if let Some(codec_id) = &classification.codec_id {
                let codec = registry.codec_by_id(codec_id)?;
                serialize_column(column, codec.as_ref(), observer, config.progress_step_percent)?;
            }
        }

        Ok(Self {
            table,
            classifications,
            row_keys,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.row_keys.len()
    }

    pub fn num_columns(&self) -> usize {
        self.table.num_columns()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.table.column_names()
    }

    pub fn row_keys(&self) -> &[String] {
        &self.row_keys
    }

    pub fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    pub fn columns(&self) -> impl Iterator<Item = OutgoingColumn<'_>> {
        self.table
            .columns()
            .iter()
            .zip(&self.classifications)
            .map(|(column, c)| OutgoingColumn {
                column,
                simple_type: c.simple_type,
                serializer: c.codec_id.as_deref(),
            })
    }
}

//==================================================================================
// 2. Incoming (bytes -> table)
//==================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct IncomingTable {
    names: Vec<String>,
    types: Vec<SimpleType>,
    serializers: Vec<Option<String>>,
    columns: Vec<Option<Vec<Cell>>>,
    row_keys: Option<Vec<String>>,
}

impl IncomingTable {
    pub fn new(
        names: Vec<String>,
        types: Vec<SimpleType>,
        serializers: Vec<Option<String>>,
    ) -> Result<Self, TabwireError> {
        if names.len() != types.len() || names.len() != serializers.len() {
            return Err(TabwireError::FrameFormatError(format!(
                "Header mismatch: {} names, {} types, {} serializers",
                names.len(),
                types.len(),
                serializers.len()
            )));
        }
        let columns = vec![None; names.len()];
        Ok(Self {
            names,
            types,
            serializers,
            columns,
            row_keys: None,
        })
    }

    pub fn num_columns(&self) -> usize {
        self.names.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn simple_types(&self) -> &[SimpleType] {
        &self.types
    }

    pub fn serializers(&self) -> &[Option<String>] {
        &self.serializers
    }

    /// Stores the raw (still serialized) cells of column `index`.
    pub fn fill_column(&mut self, index: usize, cells: Vec<Cell>) -> Result<(), TabwireError> {
        let slot = self.columns.get_mut(index).ok_or_else(|| {
            TabwireError::Table(format!("column index {} is out of range", index))
        })?;
        *slot = Some(cells);
        Ok(())
    }

    pub fn set_row_keys(&mut self, keys: Vec<String>) {
        self.row_keys = Some(keys);
    }

    /// Decodes the codec-backed columns and assembles the final table.
    ///
    /// Each distinct serializer id is resolved once.
    pub fn into_table(
        self,
        registry: &dyn CodecRegistry,
        config: &TranscoderConfig,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<Table, TabwireError> {
        let mut codecs: HashMap<String, Arc<dyn Codec>> = HashMap::new();
        let mut columns = Vec::with_capacity(self.names.len());

        let parts = self
            .names
            .into_iter()
            .zip(self.types)
            .zip(self.serializers)
            .zip(self.columns);
        for (((name, simple_type), serializer), cells) in parts {
            let cells = cells.ok_or_else(|| {
                TabwireError::Table(format!("column {} was never filled", name))
            })?;
            let mut column = Column::object(name, cells);

            if let Some(codec_id) = serializer {
                let codec = match codecs.get(&codec_id) {
                    Some(codec) => codec.clone(),
                    None => {
                        let codec = registry.codec_by_id(&codec_id)?;
                        codecs.insert(codec_id, codec.clone());
                        codec
                    }
                };
                deserialize_column(
                    &mut column,
                    codec.as_ref(),
                    observer,
                    config.progress_step_percent,
                )?;
            } else if let Some(storage) = native_storage(simple_type) {
                column.set_storage(storage)?;
            }
            columns.push(column);
        }

        let mut table = Table::from_columns(columns)?;
        if let Some(keys) = self.row_keys {
            table.set_row_keys(keys)?;
        }
        Ok(table)
    }
}

/// Decimal keys `start, start + 1, ...` for `num_rows` rows.
fn generated_row_keys(start: u64, num_rows: usize) -> Result<Vec<String>, TabwireError> {
    (0..num_rows as u64)
        .map(|i| {
            start.checked_add(i).map(|n| n.to_string()).ok_or_else(|| {
                TabwireError::Table(format!(
                    "row numbers starting at {} overflow for {} rows",
                    start, num_rows
                ))
            })
        })
        .collect()
}

/// The typed storage restored for built-in scalar tags.
fn native_storage(simple_type: SimpleType) -> Option<StorageType> {
    match simple_type {
        SimpleType::Boolean => Some(StorageType::Bool),
        SimpleType::Integer => Some(StorageType::Int32),
        SimpleType::Long => Some(StorageType::Int64),
        SimpleType::Double => Some(StorageType::Float64),
        _ => None,
    }
}
