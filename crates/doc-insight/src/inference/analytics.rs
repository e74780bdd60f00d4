//! Descriptive statistics for tabular payloads

use serde_json::{Map, Value};

use crate::types::{ColumnMissing, Table, TableSummary};

/// Summarize each table: counts, missing values per column, leading sample rows
pub fn summarize(tables: &[Table], sample_rows: usize) -> Vec<TableSummary> {
    tables.iter().map(|t| summarize_table(t, sample_rows)).collect()
}

fn summarize_table(table: &Table, sample_rows: usize) -> TableSummary {
    let missing_values = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| ColumnMissing {
            column: column.clone(),
            missing: table
                .rows
                .iter()
                .filter(|row| row.get(i).map_or(true, |c| c.is_empty()))
                .count(),
        })
        .collect();

    let samples = table
        .rows
        .iter()
        .take(sample_rows)
        .map(|row| {
            table
                .columns
                .iter()
                .zip(row)
                .map(|(column, cell)| (column.clone(), serde_json::to_value(cell).unwrap_or(Value::Null)))
                .collect::<Map<String, Value>>()
        })
        .collect();

    TableSummary {
        table: table.name.clone(),
        row_count: table.row_count(),
        column_count: table.column_count(),
        columns: table.columns.clone(),
        missing_values,
        sample_rows: samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    #[test]
    fn test_counts_and_missing() {
        let table = Table::new(
            "calls",
            vec!["caller".into(), "duration".into()],
            vec![
                vec![Cell::from("ann"), Cell::Empty],
                vec![Cell::Empty, Cell::Float(2.5)],
                vec![Cell::from("cy"), Cell::Empty],
            ],
        );
        let summary = &summarize(&[table], 2)[0];

        assert_eq!(summary.table, "calls");
        assert_eq!(summary.row_count, 3);
        assert_eq!(summary.column_count, 2);
        assert_eq!(
            summary.missing_values,
            vec![
                ColumnMissing { column: "caller".into(), missing: 1 },
                ColumnMissing { column: "duration".into(), missing: 2 },
            ]
        );
        assert_eq!(summary.sample_rows.len(), 2);
        assert_eq!(summary.sample_rows[0]["caller"], "ann");
        assert_eq!(summary.sample_rows[1]["duration"], 2.5);
        assert_eq!(summary.sample_rows[0]["duration"], Value::Null);
    }

    #[test]
    fn test_empty_table() {
        let summary = &summarize(&[Table::empty("blank", vec!["a".into()])], 5)[0];
        assert_eq!(summary.row_count, 0);
        assert_eq!(summary.missing_values[0].missing, 0);
        assert!(summary.sample_rows.is_empty());
    }
}
