// In: src/ffi/python.rs

//! Python bindings.
//!
//! Python values are converted to `Cell`s at the boundary. NumPy booleans and any
//! `numbers.Integral`/`numbers.Real` scalar count as their built-in counterparts.
//! Objects of any other type (tuples included) become extension cells whose type
//! name is `"<module>.<qualname>"`. Codecs come from a Python-side extension manager that
//! exposes `get_serializer_id_by_type(type_name)`, `get_serializer_by_id(id)` and
//! `get_deserializer_by_id(id)`; serializers have `serialize(value) -> bytes` and
//! deserializers `deserialize(bytes) -> value`.

use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyFloat, PyFrozenSet, PyList, PyLong, PySet, PyString};
use std::any::Any;
use std::sync::Arc;

use crate::classifier::classify;
use crate::codec::{Codec, CodecRegistry, InMemoryCodecRegistry};
use crate::config::TranscoderConfig;
use crate::error::TabwireError;
use crate::frame::Column;
use crate::observability;
use crate::transcoder::{deserialize_column, serialize_column, Direction};
use crate::types::{Cell, ExtensionObject};

//==================================================================================
// I. Value Conversion
//==================================================================================

/// An arbitrary Python object carried through the core as an extension cell.
#[derive(Debug)]
pub struct PyObjectValue {
    obj: PyObject,
    type_name: String,
}

impl ExtensionObject for PyObjectValue {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn ExtensionObject) -> bool {
        match other.as_any().downcast_ref::<PyObjectValue>() {
            Some(o) => Python::with_gil(|py| {
                self.obj.bind(py).eq(o.obj.bind(py)).unwrap_or(false)
            }),
            None => false,
        }
    }
}

fn qualified_type_name(obj: &Bound<'_, PyAny>) -> PyResult<String> {
    let ty = obj.get_type();
    let module: String = ty.getattr("__module__")?.extract()?;
    Ok(format!("{}.{}", module, ty.qualname()?))
}

/// Converts a Python value into a cell. `None` and float NaN are missing.
pub fn cell_from_py(obj: &Bound<'_, PyAny>) -> PyResult<Cell> {
    if obj.is_none() {
        return Ok(Cell::Missing);
    }
    // bool is a subclass of int, so it must be checked first.
    if obj.is_instance_of::<PyBool>() {
        return Ok(Cell::Bool(obj.extract()?));
    }
    if obj.is_instance_of::<PyLong>() {
        return Ok(Cell::Int64(obj.extract()?));
    }
    if obj.is_instance_of::<PyFloat>() {
        return Ok(Cell::Double(obj.extract()?));
    }
    if obj.is_instance_of::<PyString>() {
        return Ok(Cell::Str(obj.extract()?));
    }
    if obj.is_instance_of::<PyBytes>() {
        return Ok(Cell::Bytes(obj.extract()?));
    }
    if obj.is_instance_of::<PyList>() {
        let items = obj
            .iter()?
            .map(|item| cell_from_py(&item?))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Cell::List(items));
    }
    if obj.is_instance_of::<PySet>() || obj.is_instance_of::<PyFrozenSet>() {
        let items = obj
            .iter()?
            .map(|item| cell_from_py(&item?))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Cell::set(items));
    }
    let type_name = qualified_type_name(obj)?;
    if let Some(cell) = numeric_scalar(obj, &type_name)? {
        return Ok(cell);
    }
    Ok(Cell::extension(PyObjectValue {
        type_name,
        obj: obj.clone().unbind(),
    }))
}

/// NumPy-style scalars that are not subclasses of `bool`, `int` or `float`.
fn numeric_scalar(obj: &Bound<'_, PyAny>, type_name: &str) -> PyResult<Option<Cell>> {
    if matches!(type_name, "numpy.bool_" | "numpy.bool") {
        return Ok(Some(Cell::Bool(obj.is_truthy()?)));
    }
    let numbers = obj.py().import_bound("numbers")?;
    if obj.is_instance(&numbers.getattr("Integral")?)? {
        return Ok(Some(Cell::Int64(obj.extract()?)));
    }
    if obj.is_instance(&numbers.getattr("Real")?)? {
        return Ok(Some(Cell::Double(obj.extract()?)));
    }
    Ok(None)
}

/// Converts a cell back into a Python value. Missing becomes `None`.
pub fn cell_to_py(py: Python<'_>, cell: &Cell) -> PyResult<PyObject> {
    let obj = match cell {
        Cell::Missing => py.None(),
        Cell::Double(v) if v.is_nan() => py.None(),
        Cell::Bool(v) => (*v).into_py(py),
        Cell::Int32(v) => (*v).into_py(py),
        Cell::Int64(v) => (*v).into_py(py),
        Cell::Double(v) => (*v).into_py(py),
        Cell::Str(v) => v.as_str().into_py(py),
        Cell::Bytes(v) => PyBytes::new_bound(py, v).into_py(py),
        Cell::List(items) => {
            let items = items
                .iter()
                .map(|c| cell_to_py(py, c))
                .collect::<PyResult<Vec<_>>>()?;
            PyList::new_bound(py, items).into_py(py)
        }
        Cell::Set(items) => {
            let items = items
                .iter()
                .map(|c| cell_to_py(py, c))
                .collect::<PyResult<Vec<_>>>()?;
            PySet::new_bound(py, &items)?.into_py(py)
        }
        Cell::Extension(ext) => match ext.downcast_ref::<PyObjectValue>() {
            Some(value) => value.obj.clone_ref(py),
            None => format!("{:?}", ext).into_py(py),
        },
    };
    Ok(obj)
}

fn cells_from_py(values: &Bound<'_, PyAny>) -> PyResult<Vec<Cell>> {
    values
        .iter()?
        .map(|item| cell_from_py(&item?))
        .collect()
}

fn cells_to_py(py: Python<'_>, cells: &[Cell]) -> PyResult<PyObject> {
    let items = cells
        .iter()
        .map(|c| cell_to_py(py, c))
        .collect::<PyResult<Vec<_>>>()?;
    Ok(PyList::new_bound(py, items).into_py(py))
}

//==================================================================================
// II. Extension-Manager Backed Codecs
//==================================================================================

struct PyCodec {
    id: String,
    serializer: PyObject,
    deserializer: PyObject,
}

impl PyCodec {
    fn codec_error(&self, err: PyErr) -> TabwireError {
        TabwireError::Codec {
            codec_id: self.id.clone(),
            message: err.to_string(),
        }
    }
}

impl Codec for PyCodec {
    fn serialize(&self, value: &Cell) -> Result<Vec<u8>, TabwireError> {
        Python::with_gil(|py| {
            let obj = cell_to_py(py, value)?;
            self.serializer
                .bind(py)
                .call_method1("serialize", (obj,))?
                .extract::<Vec<u8>>()
        })
        .map_err(|e| self.codec_error(e))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Cell, TabwireError> {
        Python::with_gil(|py| {
            let payload = PyBytes::new_bound(py, bytes);
            let value = self
                .deserializer
                .bind(py)
                .call_method1("deserialize", (payload,))?;
            cell_from_py(&value)
        })
        .map_err(|e| self.codec_error(e))
    }
}

/// A `CodecRegistry` that delegates to a Python extension manager.
struct PyExtensionRegistry {
    manager: PyObject,
}

impl CodecRegistry for PyExtensionRegistry {
    fn codec_by_id(&self, id: &str) -> Result<Arc<dyn Codec>, TabwireError> {
        Python::with_gil(|py| {
            let manager = self.manager.bind(py);
            let serializer = manager.call_method1("get_serializer_by_id", (id,))?;
            let deserializer = manager.call_method1("get_deserializer_by_id", (id,))?;
            if serializer.is_none() || deserializer.is_none() {
                return Err(TabwireError::UnknownCodec(id.to_string()));
            }
            Ok(Arc::new(PyCodec {
                id: id.to_string(),
                serializer: serializer.unbind(),
                deserializer: deserializer.unbind(),
            }) as Arc<dyn Codec>)
        })
    }

    fn codec_id_for_type(&self, type_name: &str) -> Option<String> {
        Python::with_gil(|py| {
            self.manager
                .bind(py)
                .call_method1("get_serializer_id_by_type", (type_name,))
                .and_then(|id| id.extract::<Option<String>>())
                .unwrap_or_else(|e| {
                    log::warn!("Serializer lookup for type {} failed: {}", type_name, e);
                    None
                })
        })
    }
}

fn registry_for(extension_manager: Option<PyObject>) -> Box<dyn CodecRegistry> {
    match extension_manager {
        Some(manager) => Box::new(PyExtensionRegistry { manager }),
        None => Box::new(InMemoryCodecRegistry::new()),
    }
}

/// Forwards progress to an optional Python callable `(column, direction, percent)`.
fn progress_callback(callback: Option<PyObject>) -> impl Fn(&str, Direction, u8) {
    move |column: &str, direction: Direction, percent: u8| {
        if let Some(cb) = &callback {
            Python::with_gil(|py| {
                if let Err(e) = cb.call1(py, (column, direction.to_string(), percent)) {
                    log::warn!("Progress callback failed: {}", e);
                }
            });
        }
    }
}

//==================================================================================
// III. Python Functions
//==================================================================================

/// Classifies a column given as any Python iterable.
///
/// Returns `(simple_type, serializer_id)`.
#[pyfunction]
#[pyo3(name = "classify", signature = (name, values, extension_manager = None))]
pub fn classify_py(
    name: &str,
    values: &Bound<'_, PyAny>,
    extension_manager: Option<PyObject>,
) -> PyResult<(String, Option<String>)> {
    let column = Column::object(name, cells_from_py(values)?);
    let registry = registry_for(extension_manager);
    let classification = classify(&column, registry.as_ref())?;
    Ok((classification.simple_type.to_string(), classification.codec_id))
}

/// Serializes a column through the codec registered under `serializer_id` and
/// returns the rewritten values as a new list.
#[pyfunction]
#[pyo3(
    name = "serialize_column",
    signature = (name, values, extension_manager, serializer_id, progress = None, progress_step_percent = 5)
)]
pub fn serialize_column_py(
    py: Python<'_>,
    name: &str,
    values: &Bound<'_, PyAny>,
    extension_manager: PyObject,
    serializer_id: &str,
    progress: Option<PyObject>,
    progress_step_percent: u8,
) -> PyResult<PyObject> {
    let config = TranscoderConfig {
        progress_step_percent,
        ..Default::default()
    };
    config.validate()?;
    let mut column = Column::object(name, cells_from_py(values)?);
    let codec = registry_for(Some(extension_manager)).codec_by_id(serializer_id)?;
    let observer = progress_callback(progress);
    serialize_column(
        &mut column,
        codec.as_ref(),
        Some(&observer),
        config.progress_step_percent,
    )?;
    cells_to_py(py, column.cells())
}

/// Deserializes a column of byte payloads through the codec registered under
/// `serializer_id` and returns the decoded values as a new list.
#[pyfunction]
#[pyo3(
    name = "deserialize_column",
    signature = (name, values, extension_manager, serializer_id, progress = None, progress_step_percent = 5)
)]
pub fn deserialize_column_py(
    py: Python<'_>,
    name: &str,
    values: &Bound<'_, PyAny>,
    extension_manager: PyObject,
    serializer_id: &str,
    progress: Option<PyObject>,
    progress_step_percent: u8,
) -> PyResult<PyObject> {
    let config = TranscoderConfig {
        progress_step_percent,
        ..Default::default()
    };
    config.validate()?;
    let mut column = Column::object(name, cells_from_py(values)?);
    let codec = registry_for(Some(extension_manager)).codec_by_id(serializer_id)?;
    let observer = progress_callback(progress);
    deserialize_column(
        &mut column,
        codec.as_ref(),
        Some(&observer),
        config.progress_step_percent,
    )?;
    cells_to_py(py, column.cells())
}

#[pyfunction]
#[pyo3(name = "enable_verbose_logging", signature = (log_file = None))]
pub fn enable_verbose_logging_py(log_file: Option<String>) -> PyResult<()> {
    observability::enable_verbose_logging(log_file.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyo3::types::PyDict;

    #[test]
    fn test_abstract_numeric_scalars_become_builtin_cells() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let locals = PyDict::new_bound(py);
            py.run_bound(
                r#"
import fractions, numbers

class Index:
    def __index__(self):
        return 7

numbers.Integral.register(Index)
integral = Index()
real = fractions.Fraction(1, 2)
pair = (1, 2)
"#,
                None,
                Some(&locals),
            )
            .unwrap();
            let get = |name: &str| locals.get_item(name).unwrap().unwrap();

            assert_eq!(cell_from_py(&get("integral")).unwrap(), Cell::Int64(7));
            assert_eq!(cell_from_py(&get("real")).unwrap(), Cell::Double(0.5));
            match cell_from_py(&get("pair")).unwrap() {
                Cell::Extension(ext) => assert_eq!(ext.type_name(), "builtins.tuple"),
                other => panic!("expected an extension cell, got {:?}", other),
            }
        });
    }
}
