// In: src/bridge/transcoder.rs

use std::sync::Arc;

use super::flow_variables::{self, FlowVariables};
use super::handles::{IncomingTable, OutgoingTable};
use crate::classifier::{self, Classification};
use crate::codec::CodecRegistry;
use crate::config::TranscoderConfig;
use crate::error::TabwireError;
use crate::frame::{Column, Table};
use crate::transcoder::{self, ProgressObserver};
use crate::transport::{ArrowIpcTransport, TableTransport};

/// The public entry point: a codec registry, a whole-table transport and a config.
///
/// A `Transcoder` holds no per-call state; share it behind an `Arc` if needed.
#[derive(Clone)]
pub struct Transcoder {
    registry: Arc<dyn CodecRegistry>,
    transport: Arc<dyn TableTransport>,
    config: Arc<TranscoderConfig>,
}

impl Transcoder {
    pub fn new(
        registry: Arc<dyn CodecRegistry>,
        transport: Arc<dyn TableTransport>,
        config: Arc<TranscoderConfig>,
    ) -> Result<Self, TabwireError> {
        config.validate()?;
        Ok(Self {
            registry,
            transport,
            config,
        })
    }

    /// A transcoder using the reference Arrow IPC transport configured from `config`.
    pub fn with_arrow_ipc(
        registry: Arc<dyn CodecRegistry>,
        config: Arc<TranscoderConfig>,
    ) -> Result<Self, TabwireError> {
        let transport = Arc::new(ArrowIpcTransport::new(&config));
        Self::new(registry, transport, config)
    }

    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    pub fn registry(&self) -> &dyn CodecRegistry {
        self.registry.as_ref()
    }

    //==============================================================================
    // Column-level operations
    //==============================================================================

    pub fn classify(&self, column: &Column) -> Result<Classification, TabwireError> {
        classifier::classify(column, self.registry.as_ref())
    }

    /// Serializes `column` in place with the codec registered under `codec_id`.
    pub fn serialize_column(
        &self,
        column: &mut Column,
        codec_id: &str,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<(), TabwireError> {
        let codec = self.registry.codec_by_id(codec_id)?;
        transcoder::serialize_column(
            column,
            codec.as_ref(),
            observer,
            self.config.progress_step_percent,
        )
    }

    /// Deserializes `column` in place with the codec registered under `codec_id`.
    pub fn deserialize_column(
        &self,
        column: &mut Column,
        codec_id: &str,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<(), TabwireError> {
        let codec = self.registry.codec_by_id(codec_id)?;
        transcoder::deserialize_column(
            column,
            codec.as_ref(),
            observer,
            self.config.progress_step_percent,
        )
    }

    //==============================================================================
    // Whole-table operations
    //==============================================================================

    /// Decodes a transport payload into a table. A payload without columns yields an
    /// empty table.
    pub fn bytes_to_data_frame(
        &self,
        bytes: &[u8],
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<Table, TabwireError> {
        let names = self.transport.column_names_from_bytes(bytes)?;
        if names.is_empty() {
            return Ok(Table::new());
        }
        let types = self.transport.column_types_from_bytes(bytes)?;
        let serializers = self.transport.column_serializers_from_bytes(bytes)?;

        let mut incoming = IncomingTable::new(names, types, serializers)?;
        self.transport.bytes_into_table(&mut incoming, bytes)?;
        let table = incoming.into_table(self.registry.as_ref(), &self.config, observer)?;

        log::info!(
            "Decoded table with {} columns and {} rows",
            table.num_columns(),
            table.num_rows()
        );
        Ok(table)
    }

    /// Encodes `table` into a transport payload.
    ///
    /// `table` itself is left unchanged. Without explicit row keys, rows are numbered from `start_row_number`, which lets a large table be
    /// sent in chunks with globally consistent numbering.
    pub fn data_frame_to_bytes(
        &self,
        table: &Table,
        start_row_number: u64,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<Vec<u8>, TabwireError> {
        let outgoing = OutgoingTable::prepare(
            table,
            self.registry.as_ref(),
            &self.config,
            observer,
            start_row_number,
        )?;
        let bytes = self.transport.table_to_bytes(&outgoing)?;
        log::info!(
            "Encoded table with {} columns and {} rows into {} bytes",
            outgoing.num_columns(),
            outgoing.num_rows(),
            bytes.len()
        );
        Ok(bytes)
    }

    //==============================================================================
    // Flow variables
    //==============================================================================

    pub fn flow_variables_from_table(&self, table: &Table) -> Result<FlowVariables, TabwireError> {
        flow_variables::flow_variables_from_table(table, self.registry.as_ref())
    }

    pub fn table_from_flow_variables(
        &self,
        variables: &FlowVariables,
    ) -> Result<Table, TabwireError> {
        flow_variables::table_from_flow_variables(variables)
    }
}
