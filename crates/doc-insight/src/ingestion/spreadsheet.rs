//! Spreadsheet extractor: every sheet of a workbook as a table

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};

use super::{run_blocking, Extractor};
use crate::error::{Error, Result};
use crate::types::{Cell, Payload, SourceKind, Table};

/// Reads xlsx/xls/xlsm/ods workbooks through calamine
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetExtractor;

#[async_trait]
impl Extractor for SpreadsheetExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Spreadsheet
    }

    async fn extract(&self, location: &str) -> Result<Payload> {
        let path = PathBuf::from(location);
        let origin = format!("spreadsheet '{}'", path.display());
        run_blocking(origin.clone(), move || read_workbook(&path, &origin)).await
    }
}

fn read_workbook(path: &Path, origin: &str) -> Result<Payload> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::extraction(origin, e))?;

    let mut tables = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| Error::extraction(origin, format!("sheet '{}': {}", sheet_name, e)))?;

        let table = rows_to_table(&sheet_name, range.rows());
        tracing::debug!(
            "Sheet '{}': {} rows x {} columns",
            sheet_name,
            table.row_count(),
            table.column_count()
        );
        tables.push(table);
    }

    tracing::info!("Read {} sheet(s) from {}", tables.len(), path.display());
    Ok(Payload::Tables(tables))
}

/// Build a table from sheet rows; the first row is the header
fn rows_to_table<'a>(name: &str, mut rows: impl Iterator<Item = &'a [Data]>) -> Table {
    let header: Vec<Cell> = rows
        .next()
        .map(|r| r.iter().map(data_to_cell).collect())
        .unwrap_or_default();

    let mut body: Vec<Vec<Cell>> = rows
        .map(|r| r.iter().map(data_to_cell).collect())
        .collect();

    let width = body.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);

    let columns = (0..width)
        .map(|i| match header.get(i) {
            Some(cell) if !cell.is_blank() => cell.to_string().trim().to_string(),
            _ => format!("column_{}", i + 1),
        })
        .collect();

    for row in &mut body {
        row.resize(width, Cell::Empty);
    }

    Table::new(name, columns, body)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Float(*f),
        Data::Int(i) => Cell::Int(*i),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Text(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        // #N/A, #DIV/0! and friends read as missing
        _ => Cell::Empty,
    }
}
