// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public-facing API of the tabwire library. It ties the pure
// column-level engine (`classifier`, `transcoder`) to an injected codec registry and
// an injected whole-table transport.
//
// Data Flow (Encoding):
//
//   1. [Facade (Transcoder::data_frame_to_bytes)] -> Receives `&Table`
//         |
//         `-> builds an `OutgoingTable` handle, which
//               a. classifies every column (`classifier::classify`)
//               b. resolves codec ids through the `CodecRegistry`
//               c. serializes codec-backed columns of its own copy (`transcoder`)
//         |
//   2. [Transport (TableTransport::table_to_bytes)] -> Returns `Vec<u8>`
//
//
// Data Flow (Decoding):
//
//   1. [Transport] -> reads column names, types and serializer ids from the header
//         |
//   2. [Facade (Transcoder::bytes_to_data_frame)] -> builds an empty `IncomingTable`
//         |
//         `-> the transport fills it (`bytes_into_table`)
//         |
//   3. [IncomingTable::into_table] -> deserializes codec-backed columns, restores
//      typed storage and yields the `Table`
//
// ====================================================================================
pub mod flow_variables;
pub mod handles;
pub mod transcoder;

pub use flow_variables::{FlowVariable, FlowVariables};
pub use handles::{IncomingTable, OutgoingColumn, OutgoingTable};
pub use transcoder::Transcoder;
