// 📄 Import Rows - one spreadsheet record exposed to rule conditions as named fields

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;

/// Field holding the row's position among the kept rows
pub const INDEX_FIELD: &str = "index";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells named by column letter (`A`, `B`, ... `Z`, `AA`, ...) plus `index`
    pub fn from_cells<I, T>(index: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut row = Row::new();
        for (col, cell) in cells.into_iter().enumerate() {
            row.insert(column_name(col), Value::String(cell.into()));
        }
        row.insert(INDEX_FIELD, Value::from(index));
        row
    }

    /// Builder: set a field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field as text, if it is a string
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Spreadsheet column letter for a zero-based column number
pub fn column_name(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Read headerless CSV into rows, skipping empty lines.
///
/// Delimiter-only lines such as `,,` are kept and take an index.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<Row>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        // blank lines never reach here; a lone empty field (`""`) is one too
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        rows.push(Row::from_cells(rows.len(), record.iter()));
    }

    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================
