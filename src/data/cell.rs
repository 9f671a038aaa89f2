use serde::ser::{Serialize, SerializeMap, Serializer};

/// A non-empty spreadsheet cell. Empty cells are never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Numeric reading of the cell, used wherever a renderer needs a magnitude.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) => None,
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }

    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

/// Shortest decimal text for a number; integral values print without `.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// One spreadsheet row keyed by column name, in sheet column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    cells: Vec<(String, CellValue)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell. Keys are unique per record; a repeated key replaces the
    /// earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        let key = key.into();
        if let Some(slot) = self.cells.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.cells.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (k, v) in &self.cells {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Rows decoded from the first sheet of an uploaded workbook.
///
/// Column names are taken from the first record only. Columns that appear
/// later but are empty in the first data row cannot be selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<RowRecord>,
    columns: Vec<String>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<RowRecord>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.keys().map(str::to_string).collect())
            .unwrap_or_default();
        Self { rows, columns }
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}
