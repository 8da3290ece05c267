use serde::{Deserialize, Serialize};

/// Largest integer magnitude a worksheet number stores without rounding.
pub const MAX_EXACT_INTEGER: i64 = 1 << 53;

/// A single typed value at a row/column position within a sheet.
///
/// The serde representation is untagged so that JSON strings, integers,
/// floats, booleans and `null` map onto the matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Text literal, possibly empty.
    Text(String),
    /// Whole number stored with integer semantics.
    Integer(i64),
    /// Real number, kept real even when its value is integral.
    Real(f64),
    /// Boolean literal.
    Boolean(bool),
    /// Absent cell.
    Empty,
}

impl CellValue {
    /// Returns the type tag of the value.
    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Text(_) => CellKind::Text,
            CellValue::Integer(_) => CellKind::Integer,
            CellValue::Real(_) => CellKind::Real,
            CellValue::Boolean(_) => CellKind::Boolean,
            CellValue::Empty => CellKind::Empty,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Real(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

/// Type tag of a [`CellValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Text,
    Integer,
    Real,
    Boolean,
    Empty,
}

impl CellKind {
    /// One-character code stored in the cell-type sheet.
    pub fn code(self) -> char {
        match self {
            CellKind::Text => 's',
            CellKind::Integer => 'i',
            CellKind::Real => 'r',
            CellKind::Boolean => 'b',
            CellKind::Empty => '-',
        }
    }

    /// Parses a code produced by [`CellKind::code`].
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            's' => Some(CellKind::Text),
            'i' => Some(CellKind::Integer),
            'r' => Some(CellKind::Real),
            'b' => Some(CellKind::Boolean),
            '-' => Some(CellKind::Empty),
            _ => None,
        }
    }
}

/// Rows of a sheet. Rows need not share a length.
pub type Rows = Vec<Vec<CellValue>>;

/// A named, ordered collection of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Rows,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Rows) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Ordered mapping from sheet name to rows.
///
/// Iteration follows insertion order. Re-inserting an existing name replaces
/// its rows but keeps its position, mirroring an ordered dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookContent {
    sheets: Vec<Sheet>,
}

impl WorkbookContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the rows stored under `name`, returning the rows
    /// that were replaced.
    pub fn insert(&mut self, name: impl Into<String>, rows: Rows) -> Option<Rows> {
        let name = name.into();
        match self.sheets.iter_mut().find(|sheet| sheet.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.rows, rows)),
            None => {
                self.sheets.push(Sheet::new(name, rows));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rows> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .map(|sheet| &sheet.rows)
    }

    /// Sheet names in mapping order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str())
    }

    /// Sheets in mapping order.
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Rows)> for WorkbookContent {
    fn from_iter<I: IntoIterator<Item = (N, Rows)>>(iter: I) -> Self {
        let mut content = WorkbookContent::new();
        for (name, rows) in iter {
            content.insert(name, rows);
        }
        content
    }
}

impl IntoIterator for WorkbookContent {
    type Item = Sheet;
    type IntoIter = std::vec::IntoIter<Sheet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.into_iter()
    }
}
