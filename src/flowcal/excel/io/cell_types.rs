//! Conversions between [`CellValue`] and worksheet cells.
//!
//! Worksheets store every number as a double, so the integer/real distinction
//! of a [`CellValue`] cannot survive the file on its own. The writer records
//! the kind of every cell in a hidden sheet ([`CELL_TYPES_SHEET`]), one row per
//! written row, and the reader coerces each cell back through that layout.
//! Workbooks without the sheet fall back to [`coerce_cell`] without a hint.

use std::collections::HashMap;

use calamine::{DataType, Range};

use crate::flowcal::excel::error::{ExcelError, Result};
use crate::flowcal::excel::model::{CellKind, CellValue, MAX_EXACT_INTEGER};

/// Name of the hidden sheet holding the per-row cell kinds.
pub const CELL_TYPES_SHEET: &str = "__cell_types__";
/// Header row of [`CELL_TYPES_SHEET`].
pub const CELL_TYPES_HEADER: [&str; 3] = ["sheet", "row", "types"];

/// Recorded kinds for one row of a data sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub row: u32,
    pub kinds: Vec<CellKind>,
}

/// Per-sheet row layouts, keyed by sheet name.
pub type SheetLayouts = HashMap<String, Vec<RowLayout>>;

/// Encodes a row as its string of kind codes.
pub fn encode_kinds(row: &[CellValue]) -> String {
    row.iter().map(|cell| cell.kind().code()).collect()
}

/// Decodes a string of kind codes.
pub fn decode_kinds(codes: &str) -> Result<Vec<CellKind>> {
    codes
        .chars()
        .map(|code| {
            CellKind::from_code(code).ok_or_else(|| {
                ExcelError::InvalidWorkbook(format!("unknown cell type code '{code}'"))
            })
        })
        .collect()
}

/// Parses the cell-type sheet into row layouts.
///
/// Rows of each sheet must be listed in order starting at zero.
pub fn parse_layouts(range: &Range<DataType>) -> Result<SheetLayouts> {
    let mut layouts = SheetLayouts::new();

    for row in range.rows().skip(1) {
        let sheet = match row.first() {
            Some(DataType::String(name)) => unescape_text(name),
            Some(DataType::Empty) | None => continue,
            Some(other) => other.to_string(),
        };
        let index = match row.get(1) {
            Some(DataType::Float(value)) if value.fract() == 0.0 && *value >= 0.0 => {
                *value as u32
            }
            Some(DataType::Int(value)) if *value >= 0 => *value as u32,
            other => {
                return Err(ExcelError::InvalidWorkbook(format!(
                    "invalid row index {other:?} for sheet '{sheet}'"
                )));
            }
        };
        let kinds = match row.get(2) {
            Some(DataType::String(codes)) => decode_kinds(codes)?,
            Some(DataType::Empty) | None => Vec::new(),
            Some(other) => {
                return Err(ExcelError::InvalidWorkbook(format!(
                    "invalid cell types {other:?} for sheet '{sheet}'"
                )));
            }
        };

        let rows = layouts.entry(sheet.clone()).or_default();
        if index as usize != rows.len() {
            return Err(ExcelError::InvalidWorkbook(format!(
                "row {index} of sheet '{sheet}' is out of sequence"
            )));
        }
        rows.push(RowLayout { row: index, kinds });
    }

    Ok(layouts)
}

/// Converts a worksheet cell into a [`CellValue`].
///
/// `hint` is the kind recorded by the writer, when known. A hint only steers
/// numeric subtype and empty text; the stored cell wins whenever the two
/// disagree.
pub fn coerce_cell(cell: Option<&DataType>, hint: Option<CellKind>) -> CellValue {
    match cell {
        Some(DataType::String(value)) => CellValue::Text(unescape_text(value)),
        Some(DataType::Float(value)) => coerce_number(*value, hint),
        Some(DataType::Int(value)) => match hint {
            Some(CellKind::Real) => CellValue::Real(*value as f64),
            _ => CellValue::Integer(*value),
        },
        Some(DataType::Bool(value)) => CellValue::Boolean(*value),
        Some(DataType::DateTime(serial)) => CellValue::Real(*serial),
        Some(DataType::Empty) | None => match hint {
            Some(CellKind::Text) => CellValue::Text(String::new()),
            _ => CellValue::Empty,
        },
        Some(other) => CellValue::Text(other.to_string()),
    }
}

/// Decodes the `_xHHHH_` escapes xlsx uses for characters XML cannot carry.
///
/// `_x005F_` is a literal underscore, so an escaped escape such as
/// `_x005F_x000D_` decodes to the plain text `_x000D_`.
pub fn unescape_text(value: &str) -> String {
    if !value.contains("_x") {
        return value.to_string();
    }

    let mut decoded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find("_x") {
        decoded.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match decode_escape(candidate) {
            Some(ch) => {
                decoded.push(ch);
                rest = &candidate[7..];
            }
            None => {
                decoded.push('_');
                rest = &candidate[1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

fn decode_escape(candidate: &str) -> Option<char> {
    if candidate.as_bytes().get(6) != Some(&b'_') {
        return None;
    }
    let hex = candidate.get(2..6)?;
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

fn coerce_number(value: f64, hint: Option<CellKind>) -> CellValue {
    match hint {
        Some(CellKind::Real) => CellValue::Real(value),
        _ => as_exact_integer(value)
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Real(value)),
    }
}

/// Returns the integer held by `value` when it is whole and stored exactly.
pub fn as_exact_integer(value: f64) -> Option<i64> {
    let limit = MAX_EXACT_INTEGER as f64;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= limit {
        Some(value as i64)
    } else {
        None
    }
}

/// Returns why `value` cannot be stored as a worksheet number, if it cannot.
pub fn numeric_problem(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Integer(number) if number.unsigned_abs() > MAX_EXACT_INTEGER as u64 => Some(
            format!("integer {number} cannot be stored exactly as a worksheet number"),
        ),
        CellValue::Real(number) if !number.is_finite() => {
            Some(format!("{number} is not a finite number"))
        }
        _ => None,
    }
}
