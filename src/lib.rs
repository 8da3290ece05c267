//! Workbook serialization layer for the flowcal tools.
//!
//! A workbook is exposed as a [`WorkbookContent`]: an ordered mapping from
//! sheet name to rows of typed [`CellValue`]s. [`read_workbook`] and
//! [`write_workbook`] convert between that mapping and `.xlsx` files so that
//! writing content and reading it back yields the same sheets, rows, cells
//! and cell types. Interpreting sheets as instruments, beads or samples is
//! left to callers.
//!
//! IO adapters live under [`flowcal::excel::io`], the data representation in
//! [`flowcal::excel::model`], and file-to-file conversions in
//! [`flowcal::excel::sync`].

pub mod flowcal;

pub use flowcal::excel::{ErrorCategory, ExcelError, Result, error, io, model, sync};
pub use flowcal::excel::io::excel_read::read_workbook;
pub use flowcal::excel::io::excel_write::write_workbook;
pub use flowcal::excel::model::{CellKind, CellValue, Rows, Sheet, WorkbookContent};
