// In: src/config.rs

//! The single source of truth for all tabwire transcoding configuration.
//!
//! `TranscoderConfig` is created once at the application boundary (e.g. from a
//! host's JSON options) and then shared through the system as a read-only
//! `Arc<TranscoderConfig>`.

use serde::{Deserialize, Serialize};

use crate::error::TabwireError;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// Compression applied to the whole-table envelope body by the reference transport.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(tag = "codec", rename_all = "snake_case")]
pub enum PayloadCompression {
    /// **Default:** the Arrow IPC stream is written as-is.
    #[default]
    None,

    /// The Arrow IPC stream is wrapped in a single Zstandard frame.
    Zstd {
        #[serde(default = "default_zstd_level")]
        level: i32,
    },
}

//==================================================================================
// II. The Unified TranscoderConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TranscoderConfig {
    /// Progress observers are notified each time this many percent of a column's
    /// rows have been transcoded. Must be in `1..=100`.
    #[serde(default = "default_progress_step_percent")]
    pub progress_step_percent: u8,

    /// Envelope compression used by `ArrowIpcTransport`.
    #[serde(default)]
    pub compression: PayloadCompression,

    /// Name of the reserved envelope field that carries row keys.
    #[serde(default = "default_row_key_field")]
    pub row_key_field: String,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            progress_step_percent: default_progress_step_percent(),
            compression: PayloadCompression::default(),
            row_key_field: default_row_key_field(),
        }
    }
}

impl TranscoderConfig {
    /// Parses a config from JSON, filling absent fields with defaults, and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, TabwireError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TabwireError> {
        if !(1..=100).contains(&self.progress_step_percent) {
            return Err(TabwireError::Config(format!(
                "progress_step_percent must be in 1..=100, got {}",
                self.progress_step_percent
            )));
        }
        if let PayloadCompression::Zstd { level } = self.compression {
            if !zstd::compression_level_range().contains(&level) {
                return Err(TabwireError::Config(format!(
                    "zstd level {} is out of range",
                    level
                )));
            }
        }
        if self.row_key_field.is_empty() {
            return Err(TabwireError::Config("row_key_field must not be empty".into()));
        }
        Ok(())
    }
}

/// Helper for `serde` to provide a default for `progress_step_percent`.
fn default_progress_step_percent() -> u8 {
    5
}

fn default_zstd_level() -> i32 {
    3
}

fn default_row_key_field() -> String {
    "__row_key".to_string()
}
