//! Per-column numeric aggregation over the currently displayed rows.

/// Sum and average of the cells in one column that parse as numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSummary {
    pub sum: f64,
    pub average: f64,
}

/// Numeric reading of a cell. Surrounding whitespace is tolerated; empty
/// cells and cells parsing to NaN are not numbers. Nothing is ever stored —
/// cells stay text and are re-read on demand.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Aggregate one column. Non-numeric cells are excluded from both the sum
/// and the count; a column with no numeric cell at all has no summary.
pub fn summarize<'a>(cells: impl Iterator<Item = &'a str>) -> Option<ColumnSummary> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for cell in cells {
        if let Some(value) = parse_number(cell) {
            sum += value;
            count += 1;
        }
    }
    (count > 0).then(|| ColumnSummary {
        sum,
        average: sum / count as f64,
    })
}
