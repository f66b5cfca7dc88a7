// In: src/transport/mod.rs

//! The whole-table transport boundary.
//!
//! A `TableTransport` owns the outer container format: it reads column names, types
//! and serializer ids out of a byte payload, fills an [`IncomingTable`] with the raw
//! column cells, and turns a prepared [`OutgoingTable`] into bytes. Classification
//! and codec transcoding happen on the handles, never inside the transport.
//!
//! [`ArrowIpcTransport`] is the reference implementation.

mod arrow_impl;
pub mod arrow_ipc;
pub mod format;

use crate::bridge::{IncomingTable, OutgoingTable};
use crate::error::TabwireError;
use crate::types::SimpleType;

pub use arrow_ipc::ArrowIpcTransport;

/// Encodes and decodes whole tables.
pub trait TableTransport: Send + Sync {
    /// The column names carried by `bytes`, in order.
    fn column_names_from_bytes(&self, bytes: &[u8]) -> Result<Vec<String>, TabwireError>;

    /// The `SimpleType` of every column, aligned with the names.
    fn column_types_from_bytes(&self, bytes: &[u8]) -> Result<Vec<SimpleType>, TabwireError>;

    /// The codec id of every column, `None` where the column has no codec.
    fn column_serializers_from_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<Vec<Option<String>>, TabwireError>;

    /// Fills every column and the row keys of `table` from `bytes`.
    fn bytes_into_table(&self, table: &mut IncomingTable, bytes: &[u8])
        -> Result<(), TabwireError>;

    /// Encodes a classified, serialized table.
    fn table_to_bytes(&self, table: &OutgoingTable) -> Result<Vec<u8>, TabwireError>;
}
