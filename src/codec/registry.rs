// In: src/codec/registry.rs

use super::{Codec, CodecRegistry};
use crate::error::TabwireError;
use hashbrown::HashMap;
use std::sync::Arc;

/// A simple registry backed by two hash maps: codec id -> codec, and
/// runtime type name -> codec id.
#[derive(Default, Clone)]
pub struct InMemoryCodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
    ids_by_type: HashMap<String, String>,
}

impl InMemoryCodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `codec` under `id` as the handler for values whose runtime type is
    /// `type_name`. A later registration for the same id or type replaces the earlier one.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        type_name: impl Into<String>,
        codec: Arc<dyn Codec>,
    ) -> &mut Self {
        let id = id.into();
        self.ids_by_type.insert(type_name.into(), id.clone());
        self.codecs.insert(id, codec);
        self
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl CodecRegistry for InMemoryCodecRegistry {
    fn codec_by_id(&self, id: &str) -> Result<Arc<dyn Codec>, TabwireError> {
        self.codecs
            .get(id)
            .cloned()
            .ok_or_else(|| TabwireError::UnknownCodec(id.to_string()))
    }

    fn codec_id_for_type(&self, type_name: &str) -> Option<String> {
        self.ids_by_type.get(type_name).cloned()
    }
}

impl std::fmt::Debug for InMemoryCodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCodecRegistry")
            .field("ids_by_type", &self.ids_by_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    struct Utf8Codec;

    impl Codec for Utf8Codec {
        fn serialize(&self, value: &Cell) -> Result<Vec<u8>, TabwireError> {
            Ok(value.to_string().into_bytes())
        }
        fn deserialize(&self, bytes: &[u8]) -> Result<Cell, TabwireError> {
            Ok(Cell::Str(String::from_utf8_lossy(bytes).into_owned()))
        }
    }

    #[test]
    fn test_lookup_by_id_and_type() {
        let mut registry = InMemoryCodecRegistry::new();
        registry.register("ext.xml", "xml.Document", Arc::new(Utf8Codec));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.codec_id_for_type("xml.Document").as_deref(),
            Some("ext.xml")
        );
        assert_eq!(registry.codec_id_for_type("xml.Node"), None);

        let codec = registry.codec_by_id("ext.xml").unwrap();
        assert_eq!(codec.serialize(&Cell::from("<a/>")).unwrap(), b"<a/>".to_vec());
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let registry = InMemoryCodecRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.codec_by_id("missing"),
            Err(TabwireError::UnknownCodec(id)) if id == "missing"
        ));
    }
}
