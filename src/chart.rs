use tracing::debug;

use crate::domain::FvError;
use crate::stats;

/// A (labels, values) series handed to an external chart renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Translate the current row projection into a plottable series. A row
/// contributes only if its label cell exists and its value cell parses as a
/// finite number; a series with no values at all is an `EmptySeries`, which
/// callers surface as an informational message rather than a chart.
pub fn build_series(
    rows: &[Vec<String>],
    label_col: usize,
    value_col: usize,
) -> Result<ChartSeries, FvError> {
    let mut labels = Vec::new();
    let mut values = Vec::new();

    for row in rows {
        let Some(label) = row.get(label_col) else {
            continue;
        };
        let Some(value) = row.get(value_col).and_then(|cell| stats::parse_number(cell)) else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        labels.push(label.clone());
        values.push(value);
    }

    if values.is_empty() {
        return Err(FvError::EmptySeries);
    }
    debug!("Built chart series with {} points", values.len());
    Ok(ChartSeries { labels, values })
}
