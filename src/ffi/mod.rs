pub mod python;

pub use python::{
    classify_py, deserialize_column_py, enable_verbose_logging_py, serialize_column_py,
};
