//! Fixed-width text rendering of a table snapshot, used by the console host.

use crate::domain::FvConfig;
use crate::host::TableSnapshot;
use crate::stats::ColumnSummary;

const COLUMN_SPACING: &str = "  ";
const COLUMN_WIDTH_MIN: usize = 3;

pub fn render_table(snapshot: &TableSnapshot, config: &FvConfig) -> String {
    let projection = &snapshot.projection;
    if projection.headers.is_empty() {
        return format!("{}\n(empty table)", snapshot.name);
    }

    let shown = projection.rows.len().min(config.max_render_rows);
    let footer_cells: Vec<String> = snapshot
        .footer
        .iter()
        .map(|(_, summary)| match summary {
            Some(s) => format_summary(s),
            None => String::new(),
        })
        .collect();

    // Column width is the widest of header, body and footer cells, capped.
    let widths: Vec<usize> = projection
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let mut width = header.chars().count();
            for row in &projection.rows[..shown] {
                width = width.max(row[col].chars().count());
            }
            if let Some(cell) = footer_cells.get(col) {
                width = width.max(cell.chars().count());
            }
            width.min(config.max_column_width).max(COLUMN_WIDTH_MIN)
        })
        .collect();

    let mut lines = Vec::with_capacity(shown + 4);
    lines.push(snapshot.name.clone());
    lines.push(render_line(&projection.headers, &widths));
    lines.push(rule(&widths));
    for row in &projection.rows[..shown] {
        lines.push(render_line(row, &widths));
    }
    if projection.rows.len() > shown {
        lines.push(format!("({} more rows)", projection.rows.len() - shown));
    }
    if footer_cells.iter().any(|cell| !cell.is_empty()) {
        lines.push(rule(&widths));
        lines.push(render_line(&footer_cells, &widths));
    }
    lines.join("\n")
}

fn format_summary(summary: &ColumnSummary) -> String {
    format!("sum {} avg {}", trim_float(summary.sum), trim_float(summary.average))
}

// Two decimals, with trailing zeros and a trailing dot stripped.
fn trim_float(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn rule(widths: &[usize]) -> String {
    widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join(COLUMN_SPACING)
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| fit(cell, width))
        .collect::<Vec<_>>()
        .join(COLUMN_SPACING)
        .trim_end()
        .to_string()
}

// Pad to the column width, truncating over-long values with an ellipsis.
fn fit(value: &str, width: usize) -> String {
    let length = value.chars().count();
    if length > width {
        let kept: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        format!("{value:<width$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableView;
    use crate::parser::parse;

    fn snapshot(text: &str) -> TableSnapshot {
        let view = TableView::new(parse(text));
        TableSnapshot {
            name: "test.csv".to_string(),
            projection: view.project(),
            footer: view.footer(),
        }
    }

    #[test]
    fn renders_headers_rows_and_footer() {
        let out = render_table(&snapshot("name,n\nfirst,1\nsecond,3\n"), &FvConfig::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "test.csv");
        assert!(lines[1].starts_with("name"));
        assert!(lines[3].starts_with("first"));
        assert!(out.contains("sum 4 avg 2"));
    }

    #[test]
    fn empty_table_is_reported() {
        let out = render_table(&snapshot(""), &FvConfig::default());
        assert!(out.contains("(empty table)"));
    }

    #[test]
    fn no_footer_rule_without_numeric_columns() {
        let out = render_table(&snapshot("a,b\nx,y\n"), &FvConfig::default());
        assert_eq!(out.lines().filter(|l| l.starts_with('-')).count(), 1);
    }

    #[test]
    fn long_values_are_truncated() {
        let config = FvConfig::default().max_column_width(8);
        let out = render_table(
            &snapshot("h\nan unreasonably long cell value\n"),
            &config,
        );
        assert!(out.contains("an un..."));
        assert!(!out.contains("unreasonably"));
    }

    #[test]
    fn rows_beyond_the_cap_are_elided() {
        let config = FvConfig::default().max_render_rows(2);
        let out = render_table(&snapshot("h\n1\n2\n3\n4\n"), &config);
        assert!(out.contains("(2 more rows)"));
        assert!(!out.contains("\n4"));
    }

    #[test]
    fn float_formatting_drops_trailing_zeros() {
        assert_eq!(trim_float(2.0), "2");
        assert_eq!(trim_float(2.5), "2.5");
        assert_eq!(trim_float(2.517), "2.52");
    }
}
