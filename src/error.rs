// In: src/error.rs

//! This module defines the single, unified error type for the entire tabwire library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant is terminal for the column or table being processed: nothing is
//! retried internally and there is no partial-success mode.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabwireError {
    // =========================================================================
    // === Classification Errors
    // =========================================================================
    /// Two non-equivalent runtime types were found among the non-missing cells.
    #[error(
        "More than one type in column {column}. Found {first} and {second}; \
         the column must be homogeneous apart from missing values"
    )]
    HeterogeneousColumn {
        column: String,
        first: String,
        second: String,
    },

    #[error("Column {column} contains a nested collection. Nested collections are not supported")]
    NestedCollection { column: String },

    /// No built-in type matched and the registry has no codec for the observed type.
    #[error(
        "Column {column} has storage type \"{storage}\" although the first non-missing \
         element has type \"{type_name}\", and no codec is registered for it"
    )]
    UnresolvedType {
        column: String,
        storage: String,
        type_name: String,
    },

    #[error("Column {column} has type {simple_type}, which cannot be used as a flow variable")]
    InvalidFlowVariableType { column: String, simple_type: String },

    // =========================================================================
    // === Transcoding Errors
    // =========================================================================
    #[error("No codec registered under id '{0}'")]
    UnknownCodec(String),

    #[error("Codec '{codec_id}' failed: {message}")]
    Codec { codec_id: String, message: String },

    #[error("Column {column} holds a {found} cell where a byte payload was expected")]
    InvalidPayload { column: String, found: String },

    #[error("Column {column} declares {storage} storage but holds a {found} cell")]
    StorageMismatch {
        column: String,
        storage: String,
        found: String,
    },

    #[error("Invalid table: {0}")]
    Table(String),

    // =========================================================================
    // === Transport Errors
    // =========================================================================
    #[error("Table envelope serialization/deserialization failed: {0}")]
    FrameFormatError(String),

    #[error("Zstd operation failed: {0}")]
    ZstdError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while parsing a config.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error for Python FFI (Foreign Function Interface) operations.
    #[error("FFI operation failed: {0}")]
    FfiError(String), // PyErr doesn't impl Error, so we can't use #[from] here.
}

pub type Result<T> = std::result::Result<T, TabwireError>;

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for TabwireError {
    fn from(err: pyo3::PyErr) -> Self {
        TabwireError::FfiError(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<TabwireError> for pyo3::PyErr {
    fn from(err: TabwireError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
