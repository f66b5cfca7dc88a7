//! The capability interfaces through which the core reaches external codecs.
//!
//! A `Codec` turns one opaque value type into bytes and back. A `CodecRegistry`
//! resolves codecs by their stable id and maps runtime type names to ids. The
//! registry is injected into the core and only ever read.

pub mod registry;

use crate::error::TabwireError;
use crate::types::Cell;
use std::sync::Arc;

pub use registry::InMemoryCodecRegistry;

/// Serializer/deserializer pair for a single extension value type.
pub trait Codec: Send + Sync {
    /// Serializes one non-missing scalar cell.
    fn serialize(&self, value: &Cell) -> Result<Vec<u8>, TabwireError>;

    /// Deserializes one non-empty byte payload.
    fn deserialize(&self, bytes: &[u8]) -> Result<Cell, TabwireError>;
}

/// Read-only lookup of codecs, owned by the host.
pub trait CodecRegistry: Send + Sync {
    /// Resolves the codec registered under `id`.
    fn codec_by_id(&self, id: &str) -> Result<Arc<dyn Codec>, TabwireError>;

    /// Returns the id of the codec able to handle values of `type_name`, if any.
    fn codec_id_for_type(&self, type_name: &str) -> Option<String>;
}
