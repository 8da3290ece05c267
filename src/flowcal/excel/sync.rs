use std::path::Path;

use tracing::{info, instrument};

use crate::flowcal::excel::error::Result;
use crate::flowcal::excel::io::{excel_read, excel_write, json};

/// Converts a JSON content document into an Excel workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn json_to_excel(input: &Path, output: &Path) -> Result<()> {
    let content = json::read_content(input)?;
    info!(sheet_count = content.len(), "parsed sheets from JSON source");
    excel_write::write_workbook(output, &content)
}

/// Dumps every sheet of an Excel workbook into a JSON content document.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn excel_to_json(input: &Path, output: &Path) -> Result<()> {
    let content = excel_read::read_workbook(input)?;
    info!(sheet_count = content.len(), "read sheets from workbook");
    json::write_content(output, &content)
}
