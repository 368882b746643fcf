//! Result rendering.
//!
//! Turns an [`ExecutionResult`] into the text written to stdout, as an
//! aligned table, pretty JSON, or plain CSV.

use crate::db::RowSet;
use crate::query::ExecutionResult;
use clap::ValueEnum;
use std::fmt;

/// Output format for row sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// Pretty-printed JSON array of row objects.
    Json,
    /// Comma-separated values with a header line.
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Renders an execution result in the requested format.
///
/// Failures and affected-row counts render the same way in every format.
pub fn render(result: &ExecutionResult, format: OutputFormat) -> String {
    match result {
        ExecutionResult::Failure(message) => format!("错误: {message}"),
        ExecutionResult::Affected(count) => format!("执行成功，影响行数: {count}"),
        ExecutionResult::Rows(set) if set.is_empty() => "查询成功，无数据返回".to_string(),
        ExecutionResult::Rows(set) => match format {
            OutputFormat::Table => render_table(set),
            OutputFormat::Json => render_json(set),
            OutputFormat::Csv => render_csv(set),
        },
    }
}

fn cell(set: &RowSet, row: usize, column: &str) -> String {
    set.rows[row]
        .get(column)
        .map(|v| v.to_display_string())
        .unwrap_or_default()
}

fn render_json(set: &RowSet) -> String {
    serde_json::to_string_pretty(&set.rows).unwrap_or_else(|e| format!("错误: {e}"))
}

// Values are not quoted or escaped; embedded commas shift fields.
fn render_csv(set: &RowSet) -> String {
    let mut lines = Vec::with_capacity(set.row_count() + 1);
    lines.push(set.columns.join(","));
    for i in 0..set.row_count() {
        let line: Vec<String> = set.columns.iter().map(|c| cell(set, i, c)).collect();
        lines.push(line.join(","));
    }
    lines.join("\n")
}

fn render_table(set: &RowSet) -> String {
    let cells: Vec<Vec<String>> = (0..set.row_count())
        .map(|i| set.columns.iter().map(|c| cell(set, i, c)).collect())
        .collect();

    let widths: Vec<usize> = set
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            cells
                .iter()
                .map(|row| row[col].chars().count())
                .fold(name.chars().count(), usize::max)
        })
        .collect();

    let pad_row = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut lines = Vec::with_capacity(cells.len() + 3);
    lines.push(pad_row(set.columns.as_slice()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(cells.iter().map(|row| pad_row(row.as_slice())));
    lines.push(format!("\n共 {} 行", set.row_count()));
    lines.join("\n")
}
