use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx};
use tracing::{debug, instrument};

use crate::flowcal::excel::error::{ExcelError, Result};
use crate::flowcal::excel::io::cell_types::{
    CELL_TYPES_SHEET, RowLayout, SheetLayouts, coerce_cell, parse_layouts,
};
use crate::flowcal::excel::model::{CellValue, Rows, WorkbookContent};

/// Reads every sheet of the workbook at `path`, in file order.
///
/// Workbooks produced by [`write_workbook`](crate::io::excel_write::write_workbook)
/// come back exactly as written, including the integer/real subtype of every
/// number. Other workbooks are read from cell A1 to the end of the used range
/// with whole numbers typed as integers.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_workbook(path: &Path) -> Result<WorkbookContent> {
    let file = File::open(path)?;
    let mut workbook: Xlsx<_> = Xlsx::new(BufReader::new(file))?;

    let sheet_names = workbook.sheet_names().to_owned();
    let layouts = if sheet_names.iter().any(|name| name == CELL_TYPES_SHEET) {
        let range = read_required_sheet(&mut workbook, CELL_TYPES_SHEET)?;
        Some(parse_layouts(&range)?)
    } else {
        None
    };

    let mut content = WorkbookContent::new();
    for name in sheet_names.iter().filter(|name| *name != CELL_TYPES_SHEET) {
        let range = read_required_sheet(&mut workbook, name)?;
        let rows = match &layouts {
            Some(layouts) => rows_from_layout(&range, layouts, name)?,
            None => rows_from_range(&range),
        };
        debug!(sheet = %name, row_count = rows.len(), "sheet read");
        content.insert(name.clone(), rows);
    }

    debug!(
        sheet_count = content.len(),
        typed = layouts.is_some(),
        "workbook read"
    );
    Ok(content)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ExcelError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ExcelError::from)?;
    Ok(range)
}

fn rows_from_layout(
    range: &Range<DataType>,
    layouts: &SheetLayouts,
    name: &str,
) -> Result<Rows> {
    let rows = layouts.get(name).map(Vec::as_slice).unwrap_or_default();
    check_layout_covers(range, rows, name)?;
    Ok(rows
        .iter()
        .map(|layout| row_from_layout(range, layout))
        .collect())
}

/// Every populated cell must fall inside its recorded row.
fn check_layout_covers(range: &Range<DataType>, rows: &[RowLayout], name: &str) -> Result<()> {
    let Some((start_row, start_col)) = range.start() else {
        return Ok(());
    };

    for (row_offset, col_offset, _) in range.used_cells() {
        let row_idx = start_row as usize + row_offset;
        let col_idx = start_col as usize + col_offset;
        let covered = rows
            .get(row_idx)
            .is_some_and(|layout| col_idx < layout.kinds.len());
        if !covered {
            return Err(ExcelError::InvalidWorkbook(format!(
                "no recorded cell type for row {row_idx}, column {col_idx} of sheet '{name}'"
            )));
        }
    }
    Ok(())
}

fn row_from_layout(range: &Range<DataType>, layout: &RowLayout) -> Vec<CellValue> {
    layout
        .kinds
        .iter()
        .enumerate()
        .map(|(col_idx, kind)| {
            let cell = range.get_value((layout.row, col_idx as u32));
            coerce_cell(cell, Some(*kind))
        })
        .collect()
}

fn rows_from_range(range: &Range<DataType>) -> Rows {
    let Some((last_row, last_col)) = range.end() else {
        return Rows::new();
    };

    (0..=last_row)
        .map(|row_idx| {
            (0..=last_col)
                .map(|col_idx| coerce_cell(range.get_value((row_idx, col_idx)), None))
                .collect()
        })
        .collect()
}
