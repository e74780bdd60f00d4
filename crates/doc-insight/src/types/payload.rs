//! Extracted content: plain text or named tables

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single tabular value
#[derive(Debug, Clone, Default)]
pub enum Cell {
    /// Missing value
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Type a raw text field the way a CSV reader would: int, float, or text
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Cell::Empty;
        }
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Cell::Float(f);
            }
        }
        Cell::Text(raw.to_string())
    }

    /// Missing value (not a blank string; see the cleaner for that)
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Empty, or text made only of whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// Exact equality: floats compare by bit pattern so rows can be hashed
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Empty, Cell::Empty) => true,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => a.to_bits() == b.to_bits(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Empty => {}
            Cell::Bool(b) => b.hash(state),
            Cell::Int(i) => i.hash(state),
            Cell::Float(f) => f.to_bits().hash(state),
            Cell::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Bool(b) => serializer.serialize_bool(*b),
            Cell::Int(i) => serializer.serialize_i64(*i),
            Cell::Float(f) => serializer.serialize_f64(*f),
            Cell::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

/// A named table: header plus rows of cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Sheet or table name
    pub name: String,
    /// Column headers
    pub columns: Vec<String>,
    /// Data rows
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Create an empty table with the given header
    pub fn empty(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self::new(name, columns, Vec::new())
    }

    /// Index of a column by exact name
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// First row whose width differs from the header, if any
    pub fn first_ragged_row(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.len() != self.columns.len())
    }
}

/// Content produced by an extractor (raw) or the cleaner (cleaned)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Payload {
    /// Unstructured text
    Text(String),
    /// Named tables in the order they were encountered
    Tables(Vec<Table>),
}

impl Payload {
    /// Shape name as shown to users
    pub fn shape(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Tables(_) => "structured",
        }
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        match self {
            Payload::Tables(tables) => tables.iter().find(|t| t.name == name),
            Payload::Text(_) => None,
        }
    }

    /// Table names in order (empty for text)
    pub fn table_names(&self) -> Vec<&str> {
        match self {
            Payload::Tables(tables) => tables.iter().map(|t| t.name.as_str()).collect(),
            Payload::Text(_) => Vec::new(),
        }
    }
}

/// Payload before cleaning
pub type RawPayload = Payload;

/// Payload after cleaning; same shape as the raw payload
pub type CleanedPayload = Payload;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_infer() {
        assert_eq!(Cell::infer(""), Cell::Empty);
        assert_eq!(Cell::infer("42"), Cell::Int(42));
        assert_eq!(Cell::infer("3.5"), Cell::Float(3.5));
        assert_eq!(Cell::infer("+1 555 0100"), Cell::Text("+1 555 0100".into()));
        assert_eq!(Cell::infer("NaN"), Cell::Text("NaN".into()));
        assert_eq!(Cell::infer("  "), Cell::Text("  ".into()));
    }

    #[test]
    fn test_cell_blank() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::Text(" \t".into()).is_blank());
        assert!(!Cell::Int(0).is_blank());
        assert!(!Cell::Text("x".into()).is_blank());
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = Payload::Tables(vec![Table::new(
            "Sheet1",
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Int(1), Cell::Empty]],
        )]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "tables");
        assert_eq!(json["data"][0]["name"], "Sheet1");
        assert_eq!(json["data"][0]["rows"][0][1], serde_json::Value::Null);
    }
}
