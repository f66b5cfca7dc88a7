//! This file is the root of the `tabwire` Rust crate.
//!
//! tabwire classifies the columns of an in-memory table into a closed set of
//! transport types (`SimpleType`), rewrites extension-typed columns to and from byte
//! payloads through pluggable codecs, and hands whole tables to a transport.
//!
//! Its responsibilities here are strictly limited to:
//! 1.  Declaring all the top-level modules of the library.
//! 2.  Re-exporting the public API.
//! 3.  Defining the `#[pymodule]` entry point when built with the `python` feature.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod classifier;
pub mod codec;
pub mod config;
pub mod error;
pub mod frame;
pub mod transcoder;
pub mod transport;
pub mod types;

#[cfg(feature = "python")]
mod ffi;

#[cfg(test)]
mod test_util;

pub use bridge::{FlowVariable, FlowVariables, IncomingTable, OutgoingTable, Transcoder};
pub use classifier::{classify, Classification};
pub use codec::{Codec, CodecRegistry, InMemoryCodecRegistry};
pub use config::{PayloadCompression, TranscoderConfig};
pub use error::{Result, TabwireError};
pub use frame::{Column, StorageType, Table};
pub use transcoder::{deserialize_column, serialize_column, Direction, ProgressObserver};
pub use transport::{ArrowIpcTransport, TableTransport};
pub use types::{Cell, CellKind, ExtensionObject, ExtensionValue, SimpleType};

//==================================================================================
// 2. Python Module Definition
//==================================================================================
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `tabwire` Python module, containing all exposed Rust functions.
#[cfg(feature = "python")]
#[pymodule]
fn tabwire(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // --- Column-level API ---
    m.add_function(wrap_pyfunction!(ffi::classify_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::serialize_column_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::deserialize_column_py, m)?)?;

    // --- Expose the custom error type ---
    m.add(
        "TabwireError",
        m.py().get_type_bound::<pyo3::exceptions::PyValueError>(),
    )?;

    // --- Expose version string as a module attribute ---
    m.add("__version__", VERSION)?;

    // --- Turn on classification/transcoding logging ---
    m.add_function(wrap_pyfunction!(ffi::enable_verbose_logging_py, m)?)?;

    Ok(())
}
