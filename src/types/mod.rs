//! This module defines the core, strongly-typed data representations used
//! throughout tabwire.
//!
//! It includes the closed `SimpleType` wire tag and the dynamically typed `Cell`
//! that host values are converted into before classification.

pub mod cell;
pub mod simple_type;

// Re-export the main type(s) for easier access.
pub use cell::{Cell, CellKind, ExtensionObject, ExtensionValue};
pub use simple_type::SimpleType;
