use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::flowcal::excel::error::{ExcelError, Result};
use crate::flowcal::excel::model::{CellValue, Rows, WorkbookContent};

/// Parses a JSON object mapping sheet names to arrays of rows.
///
/// Key order of the object is kept as sheet order. Any other shape, such as a
/// top-level array, is rejected with [`ExcelError::Shape`].
pub fn parse_content(document: &Value) -> Result<WorkbookContent> {
    let object = match document {
        Value::Object(object) => object,
        other => return Err(ExcelError::Shape(describe(other).into())),
    };

    let mut content = WorkbookContent::new();
    for (name, rows) in object {
        let rows = parse_rows(rows)
            .map_err(|err| ExcelError::Shape(format!("{err} in sheet '{name}'")))?;
        content.insert(name.clone(), rows);
    }
    Ok(content)
}

fn parse_rows(value: &Value) -> std::result::Result<Rows, String> {
    let Value::Array(rows) = value else {
        return Err(format!("{} instead of a list of rows", describe(value)));
    };

    rows.iter()
        .map(|row| match row {
            Value::Array(cells) => cells.iter().map(parse_cell).collect(),
            other => Err(format!("{} instead of a row", describe(other))),
        })
        .collect()
}

fn parse_cell(value: &Value) -> std::result::Result<CellValue, String> {
    match value {
        Value::Null => Ok(CellValue::Empty),
        Value::Bool(value) => Ok(CellValue::Boolean(*value)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => Ok(CellValue::Integer(integer)),
            None => number
                .as_f64()
                .map(CellValue::Real)
                .ok_or_else(|| format!("invalid number literal {number}")),
        },
        Value::String(value) => Ok(CellValue::Text(value.clone())),
        other => Err(format!("{} instead of a cell value", describe(other))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Renders content as a JSON object whose key order follows sheet order.
pub fn content_to_json(content: &WorkbookContent) -> Result<Value> {
    let mut object = Map::new();
    for sheet in content.sheets() {
        object.insert(sheet.name.clone(), serde_json::to_value(&sheet.rows)?);
    }
    Ok(Value::Object(object))
}

/// Loads workbook content from a JSON file.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_content(path: &Path) -> Result<WorkbookContent> {
    let source = fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&source)?;
    let content = parse_content(&json)?;
    debug!(sheet_count = content.len(), "content parsed from JSON");
    Ok(content)
}

/// Stores workbook content as pretty-printed JSON.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn write_content(path: &Path, content: &WorkbookContent) -> Result<()> {
    let json = content_to_json(content)?;
    let json_string = serde_json::to_string_pretty(&json)?;
    fs::write(path, json_string)?;
    Ok(())
}
