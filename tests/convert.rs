//! End-to-end conversion tests.
//!
//! Each test builds a small survey tree in a temporary directory, runs the
//! converter over it, and reads the produced workbooks back.

use std::fs;
use std::path::Path;
use surveyx::xlsx::XlsxReader;
use surveyx::{CellValue, ConvertOptions, Converter, Error, NoopObserver};

/// A typical instrument export: preamble, header one label ahead of the data,
/// and a trailing empty field on every data row.
const EXPORT: &str = "\
Geosense survey export
Site,North dam
Operator,J. Park

ID,Station,Depth,Reading
P-01,0.5,12.25,
P-02,1.0,12.50,
P-03,1.5,,
";

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn converts_export_and_realigns_headers() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("survey1.csv");
    write(&input, EXPORT);

    let report = surveyx::convert_file(&input).unwrap();
    assert_eq!(report.output, dir.path().join("out").join("survey1.xlsx"));
    assert_eq!(report.header_line, 4);

    let dataset = XlsxReader::open(&report.output)
        .unwrap()
        .read_dataset()
        .unwrap();

    assert_eq!(dataset.columns(), &["Station", "Depth", "Reading"]);
    assert_eq!(dataset.row_count(), 3);
    assert_eq!(
        dataset.rows()[0],
        vec![
            CellValue::text("P-01"),
            CellValue::Number(0.5),
            CellValue::Number(12.25)
        ]
    );
    assert_eq!(
        dataset.rows()[2],
        vec![
            CellValue::text("P-03"),
            CellValue::Number(1.5),
            CellValue::Empty
        ]
    );
}

#[test]
fn workbook_has_no_index_column() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("s.csv");
    write(&input, "ID,A,B\nx,1,\ny,2,\n");

    let report = surveyx::convert_file(&input).unwrap();
    let sheet = XlsxReader::open(&report.output)
        .unwrap()
        .read_sheet(0)
        .unwrap();

    assert_eq!(sheet.name, "Sheet1");
    assert_eq!(sheet.rows[0], vec![CellValue::text("A"), CellValue::text("B")]);
    assert_eq!(sheet.rows[1], vec![CellValue::text("x"), CellValue::Number(1.0)]);
    assert!(sheet.rows.iter().all(|row| row.len() <= 2));
}

#[test]
fn rerun_overwrites_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("s.csv");
    write(&input, "ID,A,B\nx,1,\n");
    surveyx::convert_file(&input).unwrap();

    write(&input, "ID,A,B\nx,1,\ny,2,\nz,3,\n");
    let report = surveyx::convert_file(&input).unwrap();

    let dataset = XlsxReader::open(&report.output)
        .unwrap()
        .read_dataset()
        .unwrap();
    assert_eq!(dataset.row_count(), 3);
}

#[test]
fn directory_mode_only_touches_csv_files() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("a.csv"), EXPORT);
    write(&dir.path().join("b").join("b.csv"), EXPORT);
    write(&dir.path().join("c.txt"), EXPORT);

    let report = surveyx::convert_directory(dir.path()).unwrap();

    assert_eq!(report.converted.len(), 2);
    assert!(report.is_success());
    assert!(dir.path().join("out").join("a.xlsx").is_file());
    assert!(dir.path().join("b").join("out").join("b.xlsx").is_file());
    assert!(!dir.path().join("out").join("c.xlsx").exists());
}

#[test]
fn directory_mode_skips_outputs_of_previous_runs() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("a.csv"), EXPORT);

    surveyx::convert_directory(dir.path()).unwrap();
    let second = surveyx::convert_directory(dir.path()).unwrap();

    assert_eq!(second.total(), 1);
}

#[test]
fn custom_options_flow_through() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("semi.csv");
    write(&input, "meta\nStation;A;B\nS1;4;\n");

    let converter = Converter::new(
        ConvertOptions::new()
            .with_header_marker("Station")
            .with_delimiter(b';')
            .with_output_dir_name("xlsx")
            .with_sheet_name("Survey"),
    );
    let report = converter.convert_file(&input, &mut NoopObserver).unwrap();
    assert_eq!(report.output, dir.path().join("xlsx").join("semi.xlsx"));

    let reader = XlsxReader::open(&report.output).unwrap();
    assert_eq!(reader.sheet_names(), vec!["Survey"]);
    let dataset = reader.read_dataset().unwrap();
    assert_eq!(dataset.columns(), &["A", "B"]);
}

#[test]
fn missing_input_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.csv");

    let err = surveyx::convert_file(&input).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
    assert_eq!(err.to_string(), format!("File {} not found.", input.display()));
}

#[test]
fn control_characters_stay_well_formed() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ctrl.csv");
    write(&input, "ID,A,B\nx\u{1}y,1,\n");

    let report = surveyx::convert_file(&input).unwrap();
    let reader = XlsxReader::open(&report.output).unwrap();

    let shared = reader.package().read_xml("xl/sharedStrings.xml").unwrap();
    assert!(!shared.contains('\u{1}'));
    assert!(shared.contains("x_x0001_y"));

    let dataset = reader.read_dataset().unwrap();
    assert_eq!(dataset.rows()[0][0], CellValue::text("x\u{1}y"));
}

#[test]
fn missing_directory_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nothing-here");

    let report = surveyx::convert_directory(&missing).unwrap();
    assert_eq!(report.total(), 0);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(
        report.warnings[0].to_string(),
        format!("Not a directory: {}", missing.display())
    );
}
