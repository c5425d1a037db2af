use menu_audit::adapters::spreadsheet::{read_grid, SourceFormat};
use menu_audit::config::CliConfig;
use menu_audit::domain::model::CellValue;
use menu_audit::domain::settings::{ComparisonMode, Grouping, Layout, OutputFormat};
use menu_audit::{AuditEngine, AuditError, AuditPipeline, LocalStorage};
use std::io::Write;
use tempfile::TempDir;
use zip::write::{SimpleFileOptions, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Menus" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

enum Value<'a> {
    Text(&'a str),
    Number(f64),
}

fn column_letter(col: usize) -> char {
    (b'A' + col as u8) as char
}

/// Smallest workbook calamine accepts: one sheet of inline strings and numbers.
fn build_xlsx(rows: &[&[(usize, Value)]]) -> Vec<u8> {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, cells) in rows.iter().enumerate() {
        let row_num = r + 1;
        sheet.push_str(&format!(r#"<row r="{}">"#, row_num));
        for (col, value) in cells.iter() {
            let reference = format!("{}{}", column_letter(*col), row_num);
            match value {
                Value::Text(text) => sheet.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference, text
                )),
                Value::Number(n) => {
                    sheet.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n))
                }
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn scenario_workbook() -> Vec<u8> {
    use Value::*;
    build_xlsx(&[
        &[(1, Text("Food Outlets:")), (2, Number(101.0))],
        &[(1, Text("Screen A"))],
        &[(1, Text("Burger")), (2, Number(12.0))],
        &[(1, Text("Screen B"))],
        &[(1, Text("Burger")), (2, Number(12.0))],
        &[(1, Text("Screen C"))],
        &[(1, Text("Burger")), (2, Number(14.5))],
    ])
}

#[test]
fn test_read_grid_from_xlsx() {
    let grid = read_grid(scenario_workbook(), SourceFormat::Xlsx, None).unwrap();

    assert_eq!(grid.len(), 7);
    assert_eq!(grid.cell(0, 1), Some(&CellValue::text("Food Outlets:")));
    assert_eq!(grid.cell(0, 2), Some(&CellValue::Number(101.0)));
    assert_eq!(grid.cell(0, 0), None);
}

#[test]
fn test_read_grid_by_sheet_name() {
    assert!(read_grid(scenario_workbook(), SourceFormat::Xlsx, Some("Menus")).is_ok());

    let err = read_grid(scenario_workbook(), SourceFormat::Xlsx, Some("Round 9")).unwrap_err();
    assert!(matches!(err, AuditError::ReadError { .. }));
}

#[tokio::test]
async fn test_xlsx_audit_formats_numeric_prices() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("menus.xlsx");
    std::fs::write(&input, scenario_workbook()).unwrap();

    let config = CliConfig {
        input: input.to_str().unwrap().to_string(),
        sheet: None,
        output_path: temp_dir.path().join("out").to_str().unwrap().to_string(),
        formats: vec![OutputFormat::Json],
        bundle: None,
        mode: ComparisonMode::Positional,
        group_by: Grouping::VenueKind,
        layout: Layout::Rows,
        label_column: 1,
        value_column: 2,
        skip_closed: false,
        include_empty: false,
        verbose: false,
        monitor: false,
        log_json: false,
    };

    let run = AuditEngine::new(AuditPipeline::new(LocalStorage::default(), config))
        .run()
        .await
        .unwrap();

    assert_eq!(run.report.venues[0].number, "101");
    let group = run.report.group("FOOD 101 / internal").unwrap();
    assert_eq!(group.standard_items[0].price, "12");
    assert_eq!(group.discrepancies.len(), 1);
}
