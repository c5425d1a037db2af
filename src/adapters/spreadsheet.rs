//! Cell-reading primitive: decodes workbook bytes into a [`Grid`].
//!
//! Workbooks go through `calamine`; CSV through the `csv` crate. Only one
//! sheet is read, the first unless a name is given. Absolute cell positions
//! are preserved, so column B is always index 1 even when the used range
//! starts further right or down.

use crate::domain::model::{Cell, CellValue, Grid, Row};
pub use crate::domain::settings::SourceFormat;
use crate::utils::error::{AuditError, Result};
use calamine::{Data, Ods, Range, Reader, Xls, Xlsx};
use std::io::Cursor;

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        other => Some(CellValue::Text(other.to_string())),
    }
}

fn range_to_grid(range: &Range<Data>) -> Grid {
    let (top, left) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Row> = vec![Vec::new(); top];
    rows.extend(range.rows().map(|cells| {
        let mut row: Row = vec![None; left];
        row.extend(cells.iter().map(convert));
        row
    }));
    Grid::new(rows)
}

fn read_workbook<R>(mut workbook: R, sheet: Option<&str>) -> Result<Grid>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::fmt::Display,
{
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| AuditError::read(format!("sheet '{}' not found", wanted)))?,
        None => names.first().cloned().ok_or(AuditError::NoSheets)?,
    };

    tracing::debug!("Reading sheet '{}' ({} sheets in workbook)", name, names.len());
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| AuditError::read(e.to_string()))?;
    Ok(range_to_grid(&range))
}

pub fn read_csv(bytes: &[u8]) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AuditError::read(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        None
                    } else {
                        Some(CellValue::text(field))
                    }
                })
                .collect(),
        );
    }
    Ok(Grid::new(rows))
}

/// Decodes `bytes` as `format`. Open failures surface as [`AuditError::ReadError`].
pub fn read_grid(bytes: Vec<u8>, format: SourceFormat, sheet: Option<&str>) -> Result<Grid> {
    match format {
        SourceFormat::Csv => read_csv(&bytes),
        SourceFormat::Xlsx => {
            let workbook = Xlsx::new(Cursor::new(bytes)).map_err(|e| AuditError::read(e.to_string()))?;
            read_workbook(workbook, sheet)
        }
        SourceFormat::Xls => {
            let workbook = Xls::new(Cursor::new(bytes)).map_err(|e| AuditError::read(e.to_string()))?;
            read_workbook(workbook, sheet)
        }
        SourceFormat::Ods => {
            let workbook = Ods::new(Cursor::new(bytes)).map_err(|e| AuditError::read(e.to_string()))?;
            read_workbook(workbook, sheet)
        }
    }
}
