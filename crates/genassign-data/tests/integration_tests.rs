//! Integration tests for genassign-data

use std::fs;
use std::io::{Cursor, Write};

use genassign_data::{load, load_generic, load_roster, DataError, WorksheetMode};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_moodle_grading_worksheet() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "students.csv",
        "Identifier,Full name,ID number,Email address,Status,Grade\n\
         Participant 5,Ann Lee,S100,ann@example.edu,No submission,\n\
         Participant 6,\"Smith, Jo\",S101,jo@example.edu,No submission,\n",
    );

    let records = load_roster(&path).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records.width(), 3);
    assert_eq!(records.records()[0].values, vec!["5", "Ann Lee", "S100"]);
    assert_eq!(records.records()[1].values, vec!["6", "Smith, Jo", "S101"]);
}

#[test]
fn test_generic_worksheet() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "addresses.csv", "ID,Name,Street\n7,Bob,1 Main St\n8,Eve,2 High St\n");

    let records = load_generic(&path).unwrap();

    assert_eq!(records.keys(), &["ID", "Name", "Street"]);
    assert_eq!(records.records()[1].values, vec!["8", "Eve", "2 High St"]);
}

#[test]
fn test_generic_worksheet_tsv() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "addresses.tsv", "ID\tName\n7\tBob\n");

    let records = load(&path, WorksheetMode::Generic).unwrap();

    assert_eq!(records.records()[0].values, vec!["7", "Bob"]);
}

#[test]
fn test_generic_worksheet_with_underscore_header() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.csv", "ID,Last_Name\n7,Bob\n");

    assert!(matches!(load_generic(&path), Err(DataError::Record(_))));
}

#[test]
fn test_roster_with_generic_columns_fails() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "addresses.csv", "ID,Name\n7,Bob\n");

    assert!(matches!(
        load_roster(&path),
        Err(DataError::MissingColumn(_))
    ));
}

#[test]
fn test_header_only_worksheet_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "empty.csv", "Identifier,Full name,ID number\n");

    let records = load_roster(&path).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_missing_worksheet() {
    assert!(matches!(
        load_roster("/nonexistent/students.csv"),
        Err(DataError::FileNotFound(_))
    ));
}

/// One worksheet row: text cells are inline strings, numbers are plain values
enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

fn sheet_xml(rows: &[&[Cell]]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            match cell {
                Cell::Text(text) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference, text
                )),
                Cell::Number(value) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value))
                }
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Create a minimal XLSX workbook; sheets are written in the given order
fn create_workbook(sheets: &[(&str, String)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut overrides = String::new();
    let mut entries = String::new();
    let mut rels = String::new();
    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        ));
        entries.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            name, n, n
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));
    }

    zip.start_file("[Content_Types].xml", options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  {}
</Types>"#,
        overrides
    )
    .unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#).unwrap();

    zip.start_file("xl/workbook.xml", options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
        entries
    )
    .unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    )
    .unwrap();

    for (i, (_, xml)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
    buffer.into_inner()
}

#[test]
fn test_moodle_grading_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grades.xlsx");
    let grades = sheet_xml(&[
        &[
            Cell::Text("Identifier"),
            Cell::Text("Full name"),
            Cell::Text("ID number"),
            Cell::Text("Grade"),
        ],
        &[
            Cell::Text("Participant 5"),
            Cell::Text("Ann Lee"),
            Cell::Number(31000123.0),
            Cell::Number(7.5),
        ],
        &[
            Cell::Text("Participant 6"),
            Cell::Text("Jo Smith"),
            Cell::Text("S101"),
            Cell::Number(9.0),
        ],
    ]);
    let notes = sheet_xml(&[&[Cell::Text("Identifier"), Cell::Text("Note")]]);
    fs::write(
        &path,
        create_workbook(&[("Grades", grades), ("Notes", notes)]),
    )
    .unwrap();

    let records = load_roster(&path).unwrap();

    // the first sheet is read and whole numbers lose their ".0"
    assert_eq!(records.len(), 2);
    assert_eq!(records.records()[0].values, vec!["5", "Ann Lee", "31000123"]);
    assert_eq!(records.records()[1].values, vec!["6", "Jo Smith", "S101"]);
}

#[test]
fn test_generic_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    let people = sheet_xml(&[
        &[Cell::Text("ID"), Cell::Text("Name"), Cell::Text("Score")],
        &[Cell::Number(5.0), Cell::Text("Bob"), Cell::Number(2.5)],
    ]);
    fs::write(&path, create_workbook(&[("Sheet1", people)])).unwrap();

    let records = load(&path, WorksheetMode::Generic).unwrap();

    assert_eq!(records.keys(), &["ID", "Name", "Score"]);
    assert_eq!(records.records()[0].values, vec!["5", "Bob", "2.5"]);
}
