//! Dense grid read model.
//!
//! The aggregation result is sparse; a grid pairs it with the axis sets so
//! every (row key, column key) combination has a cell, with totals on both
//! axes.

use serde::Serialize;
use std::fmt;

use super::aggregate::AggregationResult;
use super::axes::AxisSets;
use super::spec::PivotSpec;
use crate::model::format_number;

/// Header shown for the single column produced by an empty column key.
pub const ALL_COLUMNS_LABEL: &str = "(all)";
const TOTAL_LABEL: &str = "Total";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub key: String,
    pub cells: Vec<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotGrid {
    /// Row axis label, the row dimension names joined by the key separator.
    pub header: String,
    pub column_keys: Vec<String>,
    pub rows: Vec<GridRow>,
    pub column_totals: Vec<f64>,
    pub grand_total: f64,
}

impl PivotGrid {
    /// Zero-fill `result` over the full axes.
    pub fn build(spec: &PivotSpec, result: &AggregationResult, axes: &AxisSets) -> Self {
        let mut column_totals = vec![0.0; axes.column_keys.len()];
        let rows: Vec<GridRow> = axes
            .row_keys
            .iter()
            .map(|row_key| {
                let cells: Vec<f64> = axes
                    .column_keys
                    .iter()
                    .map(|column_key| result.value(row_key, column_key))
                    .collect();
                for (total, cell) in column_totals.iter_mut().zip(&cells) {
                    *total += cell;
                }
                GridRow {
                    key: row_key.clone(),
                    total: cells.iter().sum(),
                    cells,
                }
            })
            .collect();
        let grand_total = column_totals.iter().sum();

        Self {
            header: spec.row_label(),
            column_keys: axes.column_keys.clone(),
            rows,
            column_totals,
            grand_total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row_key: &str, column_key: &str) -> Option<f64> {
        let column = self.column_keys.iter().position(|k| k == column_key)?;
        let row = self.rows.iter().find(|r| r.key == row_key)?;
        row.cells.get(column).copied()
    }

    /// Plain-text table: first column left aligned, numbers right aligned,
    /// a trailing `Total` column and row.
    pub fn render_text(&self) -> String {
        let mut table: Vec<Vec<String>> = Vec::with_capacity(self.rows.len() + 2);

        let mut header = vec![self.header.clone()];
        header.extend(self.column_keys.iter().map(|key| column_label(key)));
        header.push(TOTAL_LABEL.to_string());
        table.push(header);

        for row in &self.rows {
            let mut line = vec![row.key.clone()];
            line.extend(row.cells.iter().map(|v| format_number(*v)));
            line.push(format_number(row.total));
            table.push(line);
        }

        let mut footer = vec![TOTAL_LABEL.to_string()];
        footer.extend(self.column_totals.iter().map(|v| format_number(*v)));
        footer.push(format_number(self.grand_total));
        table.push(footer);

        let columns = table[0].len();
        let widths: Vec<usize> = (0..columns)
            .map(|i| {
                table
                    .iter()
                    .map(|line| line[i].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let rule = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ");

        let last = table.len() - 1;
        let mut out = String::new();
        for (i, line) in table.iter().enumerate() {
            if i == 1 || i == last {
                out.push_str(&rule);
                out.push('\n');
            }
            let cells: Vec<String> = line
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(j, (cell, &width))| {
                    if j == 0 {
                        format!("{cell:<width$}")
                    } else {
                        format!("{cell:>width$}")
                    }
                })
                .collect();
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for PivotGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_text())
    }
}

fn column_label(key: &str) -> String {
    if key.is_empty() {
        ALL_COLUMNS_LABEL.to_string()
    } else {
        key.to_string()
    }
}
