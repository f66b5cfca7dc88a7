// In: src/bridge/flow_variables.rs

//! Conversion between single-row tables and flow-variable maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::classifier::classify;
use crate::codec::CodecRegistry;
use crate::error::TabwireError;
use crate::frame::{Column, Table};
use crate::types::{Cell, SimpleType};

/// A scalar flow-variable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowVariable {
    Int(i64),
    Double(f64),
    Str(String),
}

impl fmt::Display for FlowVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowVariable::Int(v) => write!(f, "{}", v),
            FlowVariable::Double(v) => write!(f, "{}", v),
            FlowVariable::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for FlowVariable {
    fn from(v: i64) -> Self {
        FlowVariable::Int(v)
    }
}

impl From<f64> for FlowVariable {
    fn from(v: f64) -> Self {
        FlowVariable::Double(v)
    }
}

impl From<&str> for FlowVariable {
    fn from(v: &str) -> Self {
        FlowVariable::Str(v.to_string())
    }
}

/// Flow variables keyed by name, in name order.
pub type FlowVariables = BTreeMap<String, FlowVariable>;

fn invalid(column: &Column, simple_type: impl fmt::Display) -> TabwireError {
    TabwireError::InvalidFlowVariableType {
        column: column.name().to_string(),
        simple_type: simple_type.to_string(),
    }
}

/// Reads the first row of `table` into a flow-variable map.
///
/// Every column is classified. Integer columns become `Int`, double columns
/// `Double`, and string or boolean columns their display text. Collections,
/// byte columns and a missing first-row value are rejected. A table without
/// columns yields an empty map.
pub fn flow_variables_from_table(
    table: &Table,
    registry: &dyn CodecRegistry,
) -> Result<FlowVariables, TabwireError> {
    if table.num_columns() > 0 && table.num_rows() == 0 {
        return Err(TabwireError::Table(
            "cannot read flow variables from a table without rows".into(),
        ));
    }

    let mut variables = FlowVariables::new();
    for column in table.columns() {
        let simple_type = classify(column, registry)?.simple_type;
        let first = &column.cells()[0];
        if first.is_missing() {
            return Err(invalid(column, format_args!("{} (missing value)", simple_type)));
        }
        let value = match (simple_type, first) {
            (SimpleType::Integer | SimpleType::Long, cell) => {
                FlowVariable::Int(cell.as_i64().ok_or_else(|| invalid(column, simple_type))?)
            }
            (SimpleType::Double, Cell::Double(v)) => FlowVariable::Double(*v),
            (SimpleType::String | SimpleType::Boolean, cell) => FlowVariable::Str(cell.to_string()),
            _ => return Err(invalid(column, simple_type)),
        };
        variables.insert(column.name().to_string(), value);
    }
    Ok(variables)
}

/// Builds a single-row table with one column per flow variable.
///
/// Integers get `Int64` storage, doubles `Float64`, and anything else is stored as
/// its display string in an `Object` column.
pub fn table_from_flow_variables(variables: &FlowVariables) -> Result<Table, TabwireError> {
    let columns = variables
        .iter()
        .map(|(name, value)| match value {
            FlowVariable::Int(v) => Column::int64s(name.as_str(), vec![Some(*v)]),
            FlowVariable::Double(v) => Column::float64s(name.as_str(), vec![Some(*v)]),
            FlowVariable::Str(v) => Column::object(name.as_str(), vec![Cell::from(v.as_str())]),
        })
        .collect();
    Table::from_columns(columns)
}
