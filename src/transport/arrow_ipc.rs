// In: src/transport/arrow_ipc.rs

//! The reference `TableTransport`: an Arrow IPC stream inside a small envelope.
//!
//! The first schema field always holds the row keys (Utf8, non-null). Every other
//! field is a table column whose metadata records its `SimpleType` id and, for
//! codec-backed columns, the serializer id.

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::ipc::reader::StreamReader;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;
use std::collections::HashMap;
use std::io::{BufReader, Cursor};
use std::sync::Arc;

use super::arrow_impl::{array_to_cells, cells_to_array};
use super::format::{read_envelope, write_envelope, META_SERIALIZER, META_SIMPLE_TYPE};
use super::TableTransport;
use crate::bridge::{IncomingTable, OutgoingTable};
use crate::config::{PayloadCompression, TranscoderConfig};
use crate::error::TabwireError;
use crate::types::{Cell, SimpleType};

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowIpcTransport {
    compression: PayloadCompression,
    row_key_field: String,
}

impl Default for ArrowIpcTransport {
    fn default() -> Self {
        Self::new(&TranscoderConfig::default())
    }
}

impl ArrowIpcTransport {
    pub fn new(config: &TranscoderConfig) -> Self {
        Self {
            compression: config.compression,
            row_key_field: config.row_key_field.clone(),
        }
    }

    fn open_stream(
        &self,
        bytes: &[u8],
    ) -> Result<StreamReader<BufReader<Cursor<Vec<u8>>>>, TabwireError> {
        let body = read_envelope(bytes)?;
        let reader = StreamReader::try_new(Cursor::new(body), None)?;
        self.check_row_key_field(&reader.schema())?;
        Ok(reader)
    }

    fn read_schema(&self, bytes: &[u8]) -> Result<SchemaRef, TabwireError> {
        Ok(self.open_stream(bytes)?.schema())
    }

    fn check_row_key_field(&self, schema: &Schema) -> Result<(), TabwireError> {
        match schema.fields().first() {
            Some(field) if field.name() == &self.row_key_field => Ok(()),
            _ => Err(TabwireError::FrameFormatError(format!(
                "Payload does not start with the row key field '{}'",
                self.row_key_field
            ))),
        }
    }
}

fn simple_type_of(field: &Field) -> Result<SimpleType, TabwireError> {
    let raw = field.metadata().get(META_SIMPLE_TYPE).ok_or_else(|| {
        TabwireError::FrameFormatError(format!("Field {} has no type metadata", field.name()))
    })?;
    let id: u8 = raw.parse().map_err(|_| {
        TabwireError::FrameFormatError(format!(
            "Field {} has a malformed type id '{}'",
            field.name(),
            raw
        ))
    })?;
    SimpleType::from_id(id)
}

impl TableTransport for ArrowIpcTransport {
    fn column_names_from_bytes(&self, bytes: &[u8]) -> Result<Vec<String>, TabwireError> {
        let schema = self.read_schema(bytes)?;
        Ok(schema
            .fields()
            .iter()
            .skip(1)
            .map(|f| f.name().clone())
            .collect())
    }

    fn column_types_from_bytes(&self, bytes: &[u8]) -> Result<Vec<SimpleType>, TabwireError> {
        let schema = self.read_schema(bytes)?;
        schema
            .fields()
            .iter()
            .skip(1)
            .map(|f| simple_type_of(f))
            .collect()
    }

    fn column_serializers_from_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<Vec<Option<String>>, TabwireError> {
        let schema = self.read_schema(bytes)?;
        Ok(schema
            .fields()
            .iter()
            .skip(1)
            .map(|f| f.metadata().get(META_SERIALIZER).cloned())
            .collect())
    }

    fn bytes_into_table(
        &self,
        table: &mut IncomingTable,
        bytes: &[u8],
    ) -> Result<(), TabwireError> {
        let reader = self.open_stream(bytes)?;
        let schema = reader.schema();
        if schema.fields().len() != table.num_columns() + 1 {
            return Err(TabwireError::FrameFormatError(format!(
                "Payload has {} columns, expected {}",
                schema.fields().len().saturating_sub(1),
                table.num_columns()
            )));
        }

        let names = table.column_names().to_vec();
        let types = table.simple_types().to_vec();
        let mut row_keys: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];

        for batch in reader {
            let batch = batch?;
            let keys = batch
                .column(0)
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| {
                    TabwireError::FrameFormatError("Row key field is not Utf8".into())
                })?;
            for key in keys.iter() {
                let key = key.ok_or_else(|| {
                    TabwireError::FrameFormatError("Row key must not be null".into())
                })?;
                row_keys.push(key.to_string());
            }
            for (i, cells) in columns.iter_mut().enumerate() {
                cells.extend(array_to_cells(&names[i], types[i], batch.column(i + 1).as_ref())?);
            }
        }

        log::debug!(
            "Read {} rows x {} columns from a {} byte payload",
            row_keys.len(),
            names.len(),
            bytes.len()
        );
        table.set_row_keys(row_keys);
        for (i, cells) in columns.into_iter().enumerate() {
            table.fill_column(i, cells)?;
        }
        Ok(())
    }

    fn table_to_bytes(&self, table: &OutgoingTable) -> Result<Vec<u8>, TabwireError> {
        let mut fields = vec![Field::new(&self.row_key_field, DataType::Utf8, false)];
        let mut arrays: Vec<ArrayRef> =
            vec![Arc::new(StringArray::from_iter_values(table.row_keys()))];

        for out in table.columns() {
            let name = out.column.name();
            if name == self.row_key_field {
                return Err(TabwireError::Table(format!(
                    "column name '{}' is reserved for row keys",
                    name
                )));
            }
            let mut metadata = HashMap::new();
            metadata.insert(META_SIMPLE_TYPE.to_string(), out.simple_type.id().to_string());
            if let Some(serializer) = out.serializer {
                metadata.insert(META_SERIALIZER.to_string(), serializer.to_string());
            }
            fields.push(
                Field::new(name, out.simple_type.to_arrow_type(), true).with_metadata(metadata),
            );
            arrays.push(cells_to_array(name, out.simple_type, out.column.cells())?);
        }

        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays)?;

        let mut body = Vec::new();
        {
            let mut writer = StreamWriter::try_new(&mut body, &schema)?;
            writer.write(&batch)?;
            writer.finish()?;
        }
        let payload = write_envelope(&body, self.compression)?;
        log::debug!(
            "Wrote {} rows x {} columns as a {} byte payload ({:?})",
            batch.num_rows(),
            batch.num_columns() - 1,
            payload.len(),
            self.compression
        );
        Ok(payload)
    }
}
