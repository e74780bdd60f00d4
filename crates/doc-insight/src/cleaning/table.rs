//! Table normalization: invalid call rows, duplicates, missing values

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::ingestion::{parse_timestamp, CALL_TIME_COLUMN};
use crate::types::{Cell, Table};

/// Clean one table.
///
/// Steps run in order: drop rows with an unparseable call time (call records
/// only), drop exact duplicate rows keeping the first, turn blank text into
/// missing values, then fill missing values with the column mode.
pub fn clean_table(mut table: Table, call_records: bool) -> Result<Table> {
    if let Some(row) = table.first_ragged_row() {
        return Err(Error::cleaning(format!(
            "table '{}' row {} has {} cells but the header has {} columns",
            table.name,
            row + 1,
            table.rows[row].len(),
            table.column_count()
        )));
    }

    let before = table.row_count();

    if call_records {
        drop_invalid_call_times(&mut table)?;
    }
    drop_duplicate_rows(&mut table);
    blank_to_missing(&mut table);
    impute_mode(&mut table);

    let dropped = before - table.row_count();
    if dropped > 0 {
        tracing::debug!("Dropped {} row(s) from table '{}'", dropped, table.name);
    }

    Ok(table)
}

fn drop_invalid_call_times(table: &mut Table) -> Result<()> {
    let index = table.column_index(CALL_TIME_COLUMN).ok_or_else(|| {
        Error::cleaning(format!(
            "call records table '{}' has no '{}' column",
            table.name, CALL_TIME_COLUMN
        ))
    })?;
    table
        .rows
        .retain(|row| parse_timestamp(&row[index].to_string()).is_some());
    Ok(())
}

fn drop_duplicate_rows(table: &mut Table) {
    let mut seen = HashSet::new();
    table.rows.retain(|row| seen.insert(row.clone()));
}

fn blank_to_missing(table: &mut Table) {
    for cell in table.rows.iter_mut().flatten() {
        if cell.is_blank() {
            *cell = Cell::Empty;
        }
    }
}

/// Fill missing cells with each column's most frequent value.
///
/// Ties go to the value seen first; a column with no values stays missing.
pub fn impute_mode(table: &mut Table) {
    let modes: Vec<Option<Cell>> = (0..table.column_count())
        .map(|col| column_mode(table.rows.iter().map(|row| &row[col])))
        .collect();

    for row in &mut table.rows {
        for (cell, mode) in row.iter_mut().zip(&modes) {
            match mode {
                Some(mode) if cell.is_empty() => *cell = mode.clone(),
                _ => {}
            }
        }
    }
}

fn column_mode<'a>(cells: impl Iterator<Item = &'a Cell>) -> Option<Cell> {
    // value -> (count, first position)
    let mut counts: HashMap<&Cell, (usize, usize)> = HashMap::new();
    for (position, cell) in cells.enumerate().filter(|(_, c)| !c.is_empty()) {
        counts.entry(cell).or_insert((0, position)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(cell, _)| cell.clone())
}
