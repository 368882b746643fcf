//! Result types for sqlserver-executor.
//!
//! Defines the structures used to represent statement results from the
//! database.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A row of data, keyed by column name in result-set order.
pub type Row = IndexMap<String, Value>;

/// Represents a single value from a result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value (`bit`).
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Exact numeric (`decimal`, `numeric`, `money`) in its textual form.
    Decimal(String),

    /// Text/string value.
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),

    /// Date and/or time value in its textual form.
    DateTime(String),
}

impl Value {
    /// Converts the value to the text shown in table and CSV output.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Decimal(s) | Value::String(s) | Value::DateTime(s) => s.clone(),
            Value::Bytes(b) => hex_string(b),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{b:02X}"));
    }
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

// JSON keeps primitives native; everything else is its display string.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Decimal(_) | Value::Bytes(_) | Value::DateTime(_) => {
                serializer.serialize_str(&self.to_display_string())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Raw output of one submitted batch, as reported by the driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementOutput {
    /// Column names of the first result set that has columns.
    pub columns: Vec<String>,

    /// Rows of that result set, positionally aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl StatementOutput {
    /// Returns true if the server described any result columns.
    pub fn has_result_columns(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// A named, ordered row set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    /// Column names, unique, in result-set order.
    pub columns: Vec<String>,

    /// Rows keyed by column name.
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Builds a row set from positional driver output.
    ///
    /// Empty column names become `column<N>` and repeated names get a
    /// `_<N>` suffix so every row can be keyed by name.
    pub fn from_output(output: StatementOutput) -> Self {
        let columns = unique_column_names(output.columns);
        let rows = output
            .rows
            .into_iter()
            .map(|values| columns.iter().cloned().zip(values).collect())
            .collect();
        Self { columns, rows }
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn unique_column_names(raw: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("column{}", i + 1)
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 2;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        names.push(candidate);
    }

    names
}
