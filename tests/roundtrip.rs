use flowcal_excel::io::cell_types::CELL_TYPES_SHEET;
use flowcal_excel::io::json;
use flowcal_excel::sync;
use flowcal_excel::{
    CellValue, ErrorCategory, ExcelError, Rows, WorkbookContent, read_workbook, write_workbook,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

fn int(value: i64) -> CellValue {
    CellValue::Integer(value)
}

fn real(value: f64) -> CellValue {
    CellValue::Real(value)
}

fn write_content() -> WorkbookContent {
    let mut content = WorkbookContent::new();
    content.insert(
        "sheet_1",
        vec![
            vec![text("row1"), text("row2")],
            vec![int(1), int(2)],
            vec![int(3), int(5)],
        ],
    );
    content.insert(
        "sheet 2",
        vec![
            vec![text("abcd"), text("efg"), text("hijkl")],
            vec![int(0), int(1), int(2)],
            vec![int(1), int(4), int(9)],
            vec![int(27), int(8), int(1)],
        ],
    );
    content
}

fn reference_content() -> WorkbookContent {
    let fl1_mef = "0, 792, 2079, 6588, 16471, 47497, 137049, 271647";
    let mut content = WorkbookContent::new();

    content.insert(
        "Instruments",
        vec![
            vec![
                text("ID"),
                text("Description"),
                text("Forward Scatter Channel"),
                text("Side Scatter Channel"),
                text("Fluorescence Channels"),
                text("Time Channel"),
            ],
            vec![
                text("FC001"),
                text("Moake's Flow Cytometer"),
                text("FSC-H"),
                text("SSC-H"),
                text("FL1-H, FL2-H, FL3-H"),
                text("Time"),
            ],
            vec![
                text("FC002"),
                text("Moake's Flow Cytometer (new acquisition card)"),
                text("FSC"),
                text("SSC"),
                text("FL1, FL2, FL3"),
                text("TIME"),
            ],
        ],
    );

    let mut beads: Rows = vec![vec![
        text("ID"),
        text("Instrument ID"),
        text("File Path"),
        text("Lot"),
        text("FL1 MEF Values"),
        text("Gate Fraction"),
        text("Clustering Method"),
        text("Clustering Channels"),
    ]];
    for (id, instrument, path, channels) in [
        ("B0001", "FC001", "FCFiles/fc001/Beads.001", "FL1-H"),
        ("B0002", "FC002", "FCFiles/fc002/Beads001.fcs", "FL1, FL3"),
        ("B0003", "FC002", "FCFiles/fc002/Beads002.fcs", "FL1, FL3"),
    ] {
        beads.push(vec![
            text(id),
            text(instrument),
            text(path),
            text("AF02"),
            text(fl1_mef),
            real(0.3),
            text("gmm"),
            text(channels),
        ]);
    }
    content.insert("Beads", beads);

    let mut samples: Rows = vec![vec![
        text("ID"),
        text("Instrument ID"),
        text("Beads ID"),
        text("File Path"),
        text("FL1 Units"),
        text("Gate Fraction"),
        text("Strain name"),
        text("IPTG (\u{b5}M)"),
    ]];
    for (id, instrument, beads_id, path, units, gate, iptg) in [
        ("S0001", "FC001", "", "FCFiles/fc001/data.001", "", 0.3, 0.0),
        ("S0002", "FC002", "", "FCFiles/fc002/Data001.fcs", "Channel", 0.3, 0.0),
        ("S0003", "FC002", "", "FCFiles/fc002/Data002.fcs", "Arbitrary", 0.3, 0.0),
        ("S0004", "FC002", "B0003", "FCFiles/fc002/Data003.fcs", "MEF", 0.3, 1.0),
        ("S0005", "FC002", "B0003", "FCFiles/fc002/Data004.fcs", "MEF", 0.3, 5.0),
        ("S0006", "FC002", "B0003", "FCFiles/fc002/Data004.fcs", "MEF", 0.5, 5.0),
    ] {
        samples.push(vec![
            text(id),
            text(instrument),
            text(beads_id),
            text(path),
            text(units),
            real(gate),
            text("sSC0001"),
            real(iptg),
        ]);
    }
    content.insert("Samples", samples);

    content
}

#[test]
fn written_workbook_reads_back_unchanged() {
    let content = write_content();
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("test_write_workbook.xlsx");

    write_workbook(&xlsx_path, &content).expect("workbook written");
    let read_content = read_workbook(&xlsx_path).expect("workbook read");

    assert_eq!(content, read_content);
    assert_eq!(read_content.get("sheet 2").unwrap()[3][0], int(27));
}

#[test]
fn reference_workbook_keeps_cell_types() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("test_excel_ui.xlsx");
    write_workbook(&xlsx_path, &reference_content()).expect("reference workbook written");

    let content = read_workbook(&xlsx_path).expect("workbook read");

    assert_eq!(content, reference_content());
    assert_eq!(
        content.sheet_names().collect::<Vec<_>>(),
        vec!["Instruments", "Beads", "Samples"]
    );
    let samples = content.get("Samples").expect("Samples sheet");
    assert_eq!(samples[1][2], text(""));
    assert_eq!(samples[1][5], real(0.3));
    assert_eq!(samples[5][7], real(5.0));
    assert!(matches!(samples[1][7], CellValue::Real(value) if value == 0.0));
}

#[test]
fn sheet_order_is_preserved_both_ways() {
    let temp_dir = tempdir().expect("temporary directory");

    for names in [["A", "B"], ["B", "A"]] {
        let content: WorkbookContent = names
            .iter()
            .map(|name| (*name, vec![vec![text(name)]]))
            .collect();
        let xlsx_path = temp_dir.path().join(format!("{}{}.xlsx", names[0], names[1]));

        write_workbook(&xlsx_path, &content).expect("workbook written");
        let read_content = read_workbook(&xlsx_path).expect("workbook read");

        assert_eq!(read_content.sheet_names().collect::<Vec<_>>(), names);
    }
}

#[test]
fn ragged_rows_and_empty_cells_survive() {
    let content: WorkbookContent = [
        (
            "ragged",
            vec![
                vec![text("a")],
                Vec::new(),
                vec![CellValue::Empty, int(-4), CellValue::Empty],
                vec![CellValue::Boolean(true), real(1e-9), text(""), int(1 << 40)],
            ],
        ),
        ("blank", Rows::new()),
    ]
    .into_iter()
    .collect();
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("ragged.xlsx");

    write_workbook(&xlsx_path, &content).expect("workbook written");
    let read_content = read_workbook(&xlsx_path).expect("workbook read");

    assert_eq!(content, read_content);
}

#[test]
fn empty_content_is_rejected_before_io() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("empty.xlsx");

    let error = write_workbook(&xlsx_path, &WorkbookContent::new()).expect_err("empty rejected");

    assert!(matches!(error, ExcelError::EmptyWorkbook));
    assert_eq!(error.category(), ErrorCategory::Value);
    assert!(!xlsx_path.exists());
}

#[test]
fn list_content_is_a_shape_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let json_path = temp_dir.path().join("content.json");
    let xlsx_path = temp_dir.path().join("content.xlsx");
    fs::write(&json_path, r#"["Item 1", "Item 2"]"#).expect("JSON input written");

    let error = sync::json_to_excel(&json_path, &xlsx_path).expect_err("list rejected");

    assert_eq!(error.category(), ErrorCategory::Shape);
    assert!(!xlsx_path.exists());
}

#[test]
fn blank_path_is_an_io_error() {
    let error = write_workbook(Path::new(""), &write_content()).expect_err("blank path rejected");

    assert!(matches!(error, ExcelError::Io(_)));
    assert_eq!(error.category(), ErrorCategory::Io);
}

#[test]
fn unwritable_directory_is_an_io_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("missing").join("book.xlsx");

    let error = write_workbook(&xlsx_path, &write_content()).expect_err("missing directory");

    assert_eq!(error.category(), ErrorCategory::Io);
}

#[test]
fn unreadable_sources_are_classified() {
    let temp_dir = tempdir().expect("temporary directory");

    let missing = read_workbook(&temp_dir.path().join("missing.xlsx")).expect_err("missing file");
    assert_eq!(missing.category(), ErrorCategory::Io);

    let bogus_path = temp_dir.path().join("bogus.xlsx");
    fs::write(&bogus_path, "not a workbook").expect("bogus file written");
    let bogus = read_workbook(&bogus_path).expect_err("bogus file");
    assert_eq!(bogus.category(), ErrorCategory::Format);
}

#[test]
fn invalid_content_is_rejected_before_io() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("invalid.xlsx");

    let cases: Vec<WorkbookContent> = vec![
        [("Data", Rows::new()), ("data", Rows::new())]
            .into_iter()
            .collect(),
        [(CELL_TYPES_SHEET, Rows::new())].into_iter().collect(),
        [("Data", vec![vec![real(f64::NAN)]])].into_iter().collect(),
        [("Data", vec![vec![int(i64::MAX)]])].into_iter().collect(),
        [("bad/name", Rows::new())].into_iter().collect(),
    ];

    for content in cases {
        let error = write_workbook(&xlsx_path, &content).expect_err("content rejected");
        assert_eq!(error.category(), ErrorCategory::Value, "{error}");
        assert!(!xlsx_path.exists());
    }
}

#[test]
fn foreign_workbook_is_read_from_a1() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("foreign.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Data").expect("sheet named");
    worksheet.write_string(1, 1, "ID").expect("cell written");
    worksheet.write_number(1, 2, 27.0).expect("cell written");
    worksheet.write_boolean(2, 1, true).expect("cell written");
    worksheet.write_number(2, 2, 0.5).expect("cell written");
    workbook.save(&xlsx_path).expect("foreign workbook saved");

    let content = read_workbook(&xlsx_path).expect("workbook read");

    assert_eq!(
        content.get("Data"),
        Some(&vec![
            vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
            vec![CellValue::Empty, text("ID"), int(27)],
            vec![CellValue::Empty, CellValue::Boolean(true), real(0.5)],
        ])
    );
}

#[test]
fn excel_json_excel_roundtrip_preserves_content() {
    let temp_dir = tempdir().expect("temporary directory");
    let first_xlsx = temp_dir.path().join("first.xlsx");
    let json_path = temp_dir.path().join("content.json");
    let second_xlsx = temp_dir.path().join("second.xlsx");

    write_workbook(&first_xlsx, &reference_content()).expect("workbook written");
    sync::excel_to_json(&first_xlsx, &json_path).expect("Excel to JSON conversion");
    sync::json_to_excel(&json_path, &second_xlsx).expect("JSON to Excel conversion");

    let from_json = json::read_content(&json_path).expect("JSON content read");
    let restored = read_workbook(&second_xlsx).expect("workbook read");

    assert_eq!(from_json, reference_content());
    assert_eq!(restored, reference_content());

    let written = fs::read_to_string(&json_path).expect("JSON file read");
    let instruments = written.find("\"Instruments\"").expect("Instruments key");
    let samples = written.find("\"Samples\"").expect("Samples key");
    assert!(instruments < samples);
}

#[test]
fn escaped_text_and_sheet_names_round_trip() {
    let content: WorkbookContent = [
        ("run_x0041_", vec![vec![int(7), real(5.0)]]),
        (
            "notes",
            vec![
                vec![text("a\r\nb"), text("_x000D_"), text("tab\there")],
                vec![text("_x005F_"), text("x_x"), text("IPTG (\u{b5}M)")],
            ],
        ),
    ]
    .into_iter()
    .collect();
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("escaped.xlsx");

    write_workbook(&xlsx_path, &content).expect("workbook written");
    let read_content = read_workbook(&xlsx_path).expect("workbook read");

    assert_eq!(content, read_content);
}

#[test]
fn reserved_name_is_rejected_in_any_case() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("reserved.xlsx");
    let content: WorkbookContent = [("__CELL_TYPES__", Rows::new())].into_iter().collect();

    let error = write_workbook(&xlsx_path, &content).expect_err("reserved name rejected");

    assert!(matches!(error, ExcelError::ReservedSheetName(ref name) if name == "__CELL_TYPES__"));
    assert!(!xlsx_path.exists());
}

enum LayoutTypes {
    Codes(&'static str),
    Number(f64),
}

/// Builds a workbook whose "Data" sheet holds `1` in A1 and `"x"` in B1, with
/// a cell-type sheet made of the given `(sheet, row, types)` rows.
fn read_with_layout(
    file_name: &str,
    layout_rows: &[(&str, f64, LayoutTypes)],
) -> flowcal_excel::Result<WorkbookContent> {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join(file_name);

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let data = workbook.add_worksheet();
    data.set_name("Data").expect("sheet named");
    data.write_number(0, 0, 1.0).expect("cell written");
    data.write_string(0, 1, "x").expect("cell written");

    let layout = workbook.add_worksheet();
    layout.set_name(CELL_TYPES_SHEET).expect("layout sheet named");
    for (col, header) in ["sheet", "row", "types"].iter().enumerate() {
        layout.write_string(0, col as u16, *header).expect("header written");
    }
    for (offset, (sheet, index, types)) in layout_rows.iter().enumerate() {
        let row = offset as u32 + 1;
        layout.write_string(row, 0, *sheet).expect("layout cell written");
        layout.write_number(row, 1, *index).expect("layout cell written");
        let written = match types {
            LayoutTypes::Codes(codes) => layout.write_string(row, 2, *codes),
            LayoutTypes::Number(value) => layout.write_number(row, 2, *value),
        };
        written.expect("layout cell written");
    }
    workbook.save(&xlsx_path).expect("workbook saved");

    read_workbook(&xlsx_path)
}

#[test]
fn hand_written_layout_is_honoured() {
    let content = read_with_layout("valid.xlsx", &[("Data", 0.0, LayoutTypes::Codes("rs"))])
        .expect("workbook read");

    assert_eq!(content.get("Data"), Some(&vec![vec![real(1.0), text("x")]]));
}

#[test]
fn malformed_layouts_are_format_errors() {
    let cases: Vec<(&str, Vec<(&str, f64, LayoutTypes)>)> = vec![
        (
            "out_of_sequence.xlsx",
            vec![("Data", 1.0, LayoutTypes::Codes("is"))],
        ),
        (
            "unknown_code.xlsx",
            vec![("Data", 0.0, LayoutTypes::Codes("iq"))],
        ),
        (
            "numeric_types.xlsx",
            vec![("Data", 0.0, LayoutTypes::Number(5.0))],
        ),
        ("missing_entry.xlsx", Vec::new()),
        (
            "short_row.xlsx",
            vec![("Data", 0.0, LayoutTypes::Codes("i"))],
        ),
    ];

    for (file_name, layout_rows) in cases {
        let error = read_with_layout(file_name, &layout_rows).expect_err(file_name);
        assert!(matches!(error, ExcelError::InvalidWorkbook(_)), "{file_name}: {error}");
        assert_eq!(error.category(), ErrorCategory::Format);
    }
}
