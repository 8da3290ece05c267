use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rust_xlsxwriter::{ColNum, RowNum, Workbook, Worksheet};
use tracing::{debug, instrument};

use crate::flowcal::excel::error::{ExcelError, Result};
use crate::flowcal::excel::io::cell_types::{
    CELL_TYPES_HEADER, CELL_TYPES_SHEET, encode_kinds, numeric_problem,
};
use crate::flowcal::excel::model::{CellValue, Sheet, WorkbookContent};

/// Number of rows available in a worksheet.
const MAX_ROWS: usize = 1_048_576;
/// Number of columns available in a worksheet.
const MAX_COLUMNS: usize = 16_384;

/// Writes the provided content to the given path, one sheet per entry in
/// mapping order.
///
/// The workbook is validated and serialised in memory before the file is
/// created, so a failed call leaves no file behind unless the final write
/// itself fails.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn write_workbook(path: &Path, content: &WorkbookContent) -> Result<()> {
    validate_content(content)?;

    let mut workbook_writer = Workbook::new();

    for sheet in content.sheets() {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_rows(worksheet, sheet)?;
        worksheet.autofit();
        debug!(sheet = %sheet.name, row_count = sheet.rows.len(), "sheet written");
    }

    let layout_sheet = workbook_writer.add_worksheet();
    layout_sheet.set_name(CELL_TYPES_SHEET)?;
    layout_sheet.set_hidden(true);
    write_layout(layout_sheet, content)?;

    let buffer = workbook_writer.save_to_buffer()?;
    fs::write(path, buffer)?;
    debug!(sheet_count = content.len(), "workbook saved");
    Ok(())
}

fn validate_content(content: &WorkbookContent) -> Result<()> {
    if content.is_empty() {
        return Err(ExcelError::EmptyWorkbook);
    }

    let mut seen = HashSet::new();
    let mut layout_rows = 1;
    for sheet in content.sheets() {
        if sheet.name.to_lowercase() == CELL_TYPES_SHEET {
            return Err(ExcelError::ReservedSheetName(sheet.name.clone()));
        }
        // Excel compares sheet names case-insensitively.
        if !seen.insert(sheet.name.to_lowercase()) {
            return Err(ExcelError::DuplicateSheet(sheet.name.clone()));
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            if row_idx >= MAX_ROWS {
                return Err(out_of_bounds(sheet, row_idx, 0));
            }
            if row.len() > MAX_COLUMNS {
                return Err(out_of_bounds(sheet, row_idx, MAX_COLUMNS));
            }
            for (col_idx, cell) in row.iter().enumerate() {
                if let Some(reason) = numeric_problem(cell) {
                    return Err(ExcelError::InvalidCell {
                        sheet: sheet.name.clone(),
                        row: row_idx,
                        column: col_idx,
                        reason,
                    });
                }
            }
        }

        layout_rows += sheet.rows.len();
        if layout_rows > MAX_ROWS {
            return Err(ExcelError::OutOfBounds {
                sheet: CELL_TYPES_SHEET.to_string(),
                row: layout_rows,
                column: 0,
            });
        }
    }

    Ok(())
}

fn out_of_bounds(sheet: &Sheet, row: usize, column: usize) -> ExcelError {
    ExcelError::OutOfBounds {
        sheet: sheet.name.clone(),
        row,
        column,
    }
}

fn write_rows(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_idx as RowNum, col_idx as ColNum, cell)?;
        }
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    cell: &CellValue,
) -> Result<()> {
    match cell {
        CellValue::Text(value) => {
            worksheet.write_string(row, col, value)?;
        }
        CellValue::Integer(value) => {
            worksheet.write_number(row, col, *value as f64)?;
        }
        CellValue::Real(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        CellValue::Boolean(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}

fn write_layout(worksheet: &mut Worksheet, content: &WorkbookContent) -> Result<()> {
    for (col_idx, header) in CELL_TYPES_HEADER.iter().enumerate() {
        worksheet.write_string(0, col_idx as ColNum, *header)?;
    }

    let mut layout_row: RowNum = 1;
    for sheet in content.sheets() {
        for (row_idx, row) in sheet.rows.iter().enumerate() {
            worksheet.write_string(layout_row, 0, &sheet.name)?;
            worksheet.write_number(layout_row, 1, row_idx as f64)?;
            worksheet.write_string(layout_row, 2, encode_kinds(row))?;
            layout_row += 1;
        }
    }
    Ok(())
}
