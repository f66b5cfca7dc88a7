// In: src/transport/format.rs

//! Defines the on-wire envelope of the reference transport.
//!
//! ```text
//! magic "TBWR" (4) | version u16 LE (2) | compression u8 (1) | body
//! ```
//!
//! The body is an Arrow IPC stream, optionally wrapped in a single zstd frame.

use std::io::{Cursor, Read, Write};
use zstd::stream::{Decoder, Encoder};

use crate::config::PayloadCompression;
use crate::error::TabwireError;

//==================================================================================
// I. Constants
//==================================================================================

/// The magic number to identify a tabwire table envelope.
pub const ENVELOPE_MAGIC: &[u8; 4] = b"TBWR";
/// The current version of the envelope format.
pub const ENVELOPE_FORMAT_VERSION: u16 = 1;
/// magic(4) + ver(2) + compression(1)
pub const ENVELOPE_HEADER_SIZE: usize = 7;

const COMPRESSION_NONE: u8 = 0;
const COMPRESSION_ZSTD: u8 = 1;

/// Field metadata key holding the column's `SimpleType` wire id.
pub const META_SIMPLE_TYPE: &str = "tabwire.simple_type";
/// Field metadata key holding the codec id of a codec-backed column.
pub const META_SERIALIZER: &str = "tabwire.serializer";

//==================================================================================
// II. Envelope Encoding
//==================================================================================

/// Wraps an Arrow IPC stream body in the envelope header.
pub fn write_envelope(body: &[u8], compression: PayloadCompression) -> Result<Vec<u8>, TabwireError> {
    let mut out = Vec::with_capacity(ENVELOPE_HEADER_SIZE + body.len());
    out.extend_from_slice(ENVELOPE_MAGIC);
    out.extend_from_slice(&ENVELOPE_FORMAT_VERSION.to_le_bytes());

    match compression {
        PayloadCompression::None => {
            out.push(COMPRESSION_NONE);
            out.extend_from_slice(body);
        }
        PayloadCompression::Zstd { level } => {
            out.push(COMPRESSION_ZSTD);
            let mut encoder =
                Encoder::new(&mut out, level).map_err(|e| TabwireError::ZstdError(e.to_string()))?;
            encoder
                .write_all(body)
                .map_err(|e| TabwireError::ZstdError(e.to_string()))?;
            // `finish` is essential to finalize the Zstd frame.
            encoder
                .finish()
                .map_err(|e| TabwireError::ZstdError(e.to_string()))?;
        }
    }
    Ok(out)
}

/// Validates the envelope header and returns the (decompressed) Arrow IPC body.
pub fn read_envelope(bytes: &[u8]) -> Result<Vec<u8>, TabwireError> {
    if bytes.len() < ENVELOPE_HEADER_SIZE {
        return Err(TabwireError::FrameFormatError(format!(
            "Envelope is too small to be valid. Minimum size: {}, got: {}",
            ENVELOPE_HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut cursor = Cursor::new(bytes);
    let map_err = |e: std::io::Error| TabwireError::FrameFormatError(e.to_string());

    let mut magic_buf = [0u8; 4];
    cursor.read_exact(&mut magic_buf).map_err(map_err)?;
    if magic_buf != *ENVELOPE_MAGIC {
        return Err(TabwireError::FrameFormatError(
            "Invalid envelope magic number".into(),
        ));
    }

    let mut u16_buf = [0u8; 2];
    cursor.read_exact(&mut u16_buf).map_err(map_err)?;
    let version = u16::from_le_bytes(u16_buf);
    if version != ENVELOPE_FORMAT_VERSION {
        return Err(TabwireError::FrameFormatError(format!(
            "Unsupported envelope version: expected {}, got {}",
            ENVELOPE_FORMAT_VERSION, version
        )));
    }

    let mut flag = [0u8; 1];
    cursor.read_exact(&mut flag).map_err(map_err)?;
    let body = &bytes[ENVELOPE_HEADER_SIZE..];

    match flag[0] {
        COMPRESSION_NONE => Ok(body.to_vec()),
        COMPRESSION_ZSTD => {
            let mut out = Vec::new();
            let mut decoder =
                Decoder::new(body).map_err(|e| TabwireError::ZstdError(e.to_string()))?;
            std::io::copy(&mut decoder, &mut out)
                .map_err(|e| TabwireError::ZstdError(e.to_string()))?;
            Ok(out)
        }
        other => Err(TabwireError::FrameFormatError(format!(
            "Unknown envelope compression flag: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_zstd_envelopes_roundtrip() {
        let body = b"arrow ipc stream bytes, repeated repeated repeated".to_vec();

        let plain = write_envelope(&body, PayloadCompression::None).unwrap();
        assert_eq!(&plain[..4], ENVELOPE_MAGIC);
        assert_eq!(plain[6], COMPRESSION_NONE);
        assert_eq!(read_envelope(&plain).unwrap(), body);

        let packed = write_envelope(&body, PayloadCompression::Zstd { level: 3 }).unwrap();
        assert_eq!(packed[6], COMPRESSION_ZSTD);
        assert_eq!(read_envelope(&packed).unwrap(), body);
    }

    #[test]
    fn test_invalid_envelopes_are_rejected() {
        // Too short
        assert!(matches!(
            read_envelope(b"TBW"),
            Err(TabwireError::FrameFormatError(_))
        ));

        // Bad magic
        assert!(matches!(
            read_envelope(b"NOPE\x01\x00\x00body"),
            Err(TabwireError::FrameFormatError(_))
        ));

        // Future version
        let mut bytes = write_envelope(b"body", PayloadCompression::None).unwrap();
        bytes[4] = 9;
        let err = read_envelope(&bytes).unwrap_err();
        assert!(err.to_string().contains("Unsupported envelope version"));

        // Unknown compression flag
        let mut bytes = write_envelope(b"body", PayloadCompression::None).unwrap();
        bytes[6] = 42;
        assert!(matches!(
            read_envelope(&bytes),
            Err(TabwireError::FrameFormatError(_))
        ));

        // Corrupt zstd frame
        let mut bytes = write_envelope(b"", PayloadCompression::None).unwrap();
        bytes[6] = COMPRESSION_ZSTD;
        bytes.extend_from_slice(b"not zstd");
        assert!(matches!(read_envelope(&bytes), Err(TabwireError::ZstdError(_))));
    }
}
