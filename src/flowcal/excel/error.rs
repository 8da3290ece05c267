use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ExcelError>;

/// Broad failure classes a caller can branch on without matching every
/// variant of [`ExcelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The content handed to the writer is not a mapping of sheet names to rows.
    Shape,
    /// The content has the right shape but holds values a workbook cannot store.
    Value,
    /// A file could not be opened, created, or written.
    Io,
    /// A file exists but is not a readable workbook.
    Format,
}

/// Error type covering the different failure cases that can occur when a
/// workbook is read, written, or converted.
#[derive(Debug, Error)]
pub enum ExcelError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when content is not a mapping of sheet names to rows.
    #[error("workbook content must map sheet names to rows, found {0}")]
    Shape(String),

    /// Raised when asked to write a workbook without any sheet.
    #[error("workbook content must contain at least one sheet")]
    EmptyWorkbook,

    /// Raised when two sheets share a name.
    #[error("duplicate sheet name '{0}'")]
    DuplicateSheet(String),

    /// Raised when content uses the name of the hidden cell-type sheet.
    #[error("sheet name '{0}' is reserved")]
    ReservedSheetName(String),

    /// Raised when a cell holds a value the file format cannot store exactly.
    #[error("invalid value in sheet '{sheet}' at row {row}, column {column}: {reason}")]
    InvalidCell {
        sheet: String,
        row: usize,
        column: usize,
        reason: String,
    },

    /// Raised when a sheet has more rows or columns than a worksheet allows.
    #[error("sheet '{sheet}' exceeds worksheet limits at row {row}, column {column}")]
    OutOfBounds {
        sheet: String,
        row: usize,
        column: usize,
    },

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the CLI receives an unsupported conversion request.
    #[error("unsupported conversion from {from:?} to {to:?}")]
    UnsupportedConversion { from: String, to: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ExcelError {
    /// Classifies the error into one of the [`ErrorCategory`] buckets.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExcelError::Shape(_) | ExcelError::Json(_) => ErrorCategory::Shape,
            ExcelError::EmptyWorkbook
            | ExcelError::DuplicateSheet(_)
            | ExcelError::ReservedSheetName(_)
            | ExcelError::InvalidCell { .. }
            | ExcelError::OutOfBounds { .. }
            | ExcelError::UnsupportedConversion { .. }
            | ExcelError::Logging(_) => ErrorCategory::Value,
            ExcelError::ExcelWrite(_) => ErrorCategory::Value,
            ExcelError::Io(_) | ExcelError::MissingInput(_) => ErrorCategory::Io,
            ExcelError::ExcelRead(_) | ExcelError::InvalidWorkbook(_) => ErrorCategory::Format,
        }
    }
}
