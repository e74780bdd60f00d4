//! Terminal pipeline output: generated text or an analytics summary

use serde::Serialize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, settings::Style};

/// Missing-value count for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

/// Descriptive statistics for one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    /// Table or sheet name
    pub table: String,
    pub row_count: usize,
    pub column_count: usize,
    /// Columns in header order
    pub columns: Vec<String>,
    /// Missing cells per column, in header order
    pub missing_values: Vec<ColumnMissing>,
    /// Leading rows as column -> value records
    pub sample_rows: Vec<Map<String, Value>>,
}

/// Result of the inference/analytics stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "output", rename_all = "lowercase")]
pub enum InsightResult {
    /// Text produced by the inference backend
    Text(String),
    /// Per-table statistics, no model involved
    Analytics(Vec<TableSummary>),
}

impl InsightResult {
    /// Console rendering
    pub fn render(&self) -> String {
        match self {
            InsightResult::Text(text) => format!("Text Inference:\n{}", text),
            InsightResult::Analytics(summaries) => summaries
                .iter()
                .map(TableSummary::render)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// First `max_chars` characters of the rendering
    pub fn truncated(&self, max_chars: usize) -> String {
        match self {
            InsightResult::Text(text) => text.chars().take(max_chars).collect(),
            other => other.render().chars().take(max_chars).collect(),
        }
    }
}

impl TableSummary {
    /// Console rendering of one table's statistics
    pub fn render(&self) -> String {
        let mut missing = Builder::default();
        missing.push_record(["Column".to_string(), "Missing Values".to_string()]);
        for entry in &self.missing_values {
            missing.push_record([entry.column.clone(), entry.missing.to_string()]);
        }
        let mut missing = missing.build();
        missing.with(Style::psql());

        let mut sample = Builder::default();
        sample.push_record(self.columns.clone());
        for record in &self.sample_rows {
            sample.push_record(self.columns.iter().map(|c| match record.get(c) {
                Some(Value::Null) | None => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            }));
        }
        let mut sample = sample.build();
        sample.with(Style::ascii());

        format!(
            "--- Analytics for {} ---\nRow Count: {}\nColumn Count: {}\nMissing Values:\n{}\nSample Data:\n{}\n",
            self.table, self.row_count, self.column_count, missing, sample
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_truncation_counts_chars() {
        let result = InsightResult::Text("héllo wörld".to_string());
        assert_eq!(result.truncated(5), "héllo");
        assert_eq!(result.truncated(100), "héllo wörld");
    }

    #[test]
    fn test_analytics_render_mentions_table() {
        let mut record = Map::new();
        record.insert("caller".into(), Value::String("alice".into()));
        let result = InsightResult::Analytics(vec![TableSummary {
            table: "day_calls".into(),
            row_count: 1,
            column_count: 1,
            columns: vec!["caller".into()],
            missing_values: vec![ColumnMissing {
                column: "caller".into(),
                missing: 0,
            }],
            sample_rows: vec![record],
        }]);

        let rendered = result.render();
        assert!(rendered.contains("--- Analytics for day_calls ---"));
        assert!(rendered.contains("Row Count: 1"));
        assert!(rendered.contains("alice"));
    }
}
