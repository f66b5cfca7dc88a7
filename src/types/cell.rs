//! The dynamically typed cell value held by every column before classification.
//!
//! A `Cell` is the boundary representation of a host value: a missing sentinel, a
//! built-in scalar, a one-level collection, or an opaque extension object that only
//! an external codec knows how to turn into bytes.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

//==================================================================================
// 1. Extension Objects
//==================================================================================

/// A host value of a type the core does not know. Classification looks it up in the
/// codec registry by `type_name`.
pub trait ExtensionObject: fmt::Debug + Send + Sync + 'static {
    /// The stable runtime type name used as the registry key (e.g. `"geo.Point"`).
    fn type_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    /// Equality against another extension object, usually via downcasting.
    fn dyn_eq(&self, other: &dyn ExtensionObject) -> bool;
}

/// A cheaply clonable handle to an `ExtensionObject`.
#[derive(Clone, Debug)]
pub struct ExtensionValue(Arc<dyn ExtensionObject>);

impl ExtensionValue {
    pub fn new<T: ExtensionObject>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn type_name(&self) -> &str {
        self.0.type_name()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for ExtensionValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }
}

//==================================================================================
// 2. Cell Kinds (runtime type descriptions)
//==================================================================================

/// The runtime type of a non-missing cell. Two cells are "equivalent" when their
/// kinds are equal; both integer widths share `Int`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKind {
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
    Set,
    Extension(String),
}

impl CellKind {
    pub fn name(&self) -> &str {
        match self {
            CellKind::Bool => "bool",
            CellKind::Int => "int",
            CellKind::Float => "float",
            CellKind::Str => "str",
            CellKind::Bytes => "bytes",
            CellKind::List => "list",
            CellKind::Set => "set",
            CellKind::Extension(name) => name,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, CellKind::List | CellKind::Set)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//==================================================================================
// 3. Cell
//==================================================================================

#[derive(Debug, Clone, Default)]
pub enum Cell {
    #[default]
    Missing,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Cell>),
    /// Unordered; build through [`Cell::set`] to drop duplicates.
    Set(Vec<Cell>),
    Extension(ExtensionValue),
}

impl Cell {
    /// Builds a set cell, dropping duplicate elements (first occurrence wins).
    pub fn set<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut unique: Vec<Cell> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Cell::Set(unique)
    }

    pub fn extension<T: ExtensionObject>(value: T) -> Self {
        Cell::Extension(ExtensionValue::new(value))
    }

    /// `Missing` and NaN doubles are both missing values.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Double(v) => v.is_nan(),
            _ => false,
        }
    }

    /// The runtime type of this cell, or `None` for a missing value.
    pub fn kind(&self) -> Option<CellKind> {
        match self {
            Cell::Missing => None,
            Cell::Double(v) if v.is_nan() => None,
            Cell::Bool(_) => Some(CellKind::Bool),
            Cell::Int32(_) | Cell::Int64(_) => Some(CellKind::Int),
            Cell::Double(_) => Some(CellKind::Float),
            Cell::Str(_) => Some(CellKind::Str),
            Cell::Bytes(_) => Some(CellKind::Bytes),
            Cell::List(_) => Some(CellKind::List),
            Cell::Set(_) => Some(CellKind::Set),
            Cell::Extension(ext) => Some(CellKind::Extension(ext.type_name().to_string())),
        }
    }

    /// The integer value of an `Int32`/`Int64` cell.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int32(v) => Some(i64::from(*v)),
            Cell::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// The elements of a list or set cell.
    pub fn elements(&self) -> Option<&[Cell]> {
        match self {
            Cell::List(items) | Cell::Set(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        if self.is_missing() || other.is_missing() {
            return self.is_missing() && other.is_missing();
        }
        match (self, other) {
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::Double(a), Cell::Double(b)) => a == b,
            (Cell::Str(a), Cell::Str(b)) => a == b,
            (Cell::Bytes(a), Cell::Bytes(b)) => a == b,
            (Cell::List(a), Cell::List(b)) => a == b,
            (Cell::Set(a), Cell::Set(b)) => {
                a.len() == b.len()
                    && a.iter().all(|x| b.contains(x))
                    && b.iter().all(|x| a.contains(x))
            }
            (Cell::Extension(a), Cell::Extension(b)) => a == b,
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Cell]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => f.write_str("?"),
            Cell::Double(v) if v.is_nan() => f.write_str("?"),
            Cell::Bool(v) => write!(f, "{}", v),
            Cell::Int32(v) => write!(f, "{}", v),
            Cell::Int64(v) => write!(f, "{}", v),
            Cell::Double(v) => write!(f, "{}", v),
            Cell::Str(v) => f.write_str(v),
            Cell::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Cell::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Cell::Set(items) => {
                f.write_str("{")?;
                write_joined(f, items)?;
                f.write_str("}")
            }
            Cell::Extension(ext) => write!(f, "{:?}", ext.0),
        }
    }
}

//==================================================================================
// 4. Conversions
//==================================================================================

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Int32(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int64(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Double(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Str(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Str(v)
    }
}

impl From<Vec<u8>> for Cell {
    fn from(v: Vec<u8>) -> Self {
        Cell::Bytes(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Missing, Into::into)
    }
}
