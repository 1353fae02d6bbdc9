use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::domain::{Message, SortDirection};
use crate::parser::Grid;
use crate::stats::{self, ColumnSummary};

/// The header/body subset actually handed to rendering: padded to the full
/// column count, then restricted to the visible columns in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The mutable view over one parsed grid: filter, sort and column
/// visibility state plus the derived displayed-row set. One instance lives
/// for exactly one preview session; source cells are never mutated.
pub struct TableView {
    headers: Vec<String>,
    original_rows: Vec<Vec<String>>,
    column_count: usize,
    filter_query: Option<String>,
    sort_column: Option<usize>,
    sort_direction: SortDirection,
    visible_columns: BTreeSet<usize>,
    // Mapping of displayed row position to original_rows index. Filtering
    // rebuilds this from scratch; sorting reorders it in place.
    displayed: Vec<usize>,
}

impl TableView {
    /// The first grid row becomes the header row, the rest the immutable
    /// baseline every filter derives from. All columns start visible.
    pub fn new(grid: Grid) -> Self {
        let Grid {
            mut rows,
            column_count,
        } = grid;
        let headers = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0)
        };
        let displayed = (0..rows.len()).collect();
        let visible_columns = (0..column_count).collect();
        debug!(
            "New table view: {} columns, {} data rows",
            column_count,
            rows.len()
        );
        Self {
            headers,
            original_rows: rows,
            column_count,
            filter_query: None,
            sort_column: None,
            sort_direction: SortDirection::Ascending,
            visible_columns,
            displayed,
        }
    }

    /// Dispatch one view-mutating action. Read-only actions (`Export`,
    /// `Chart`) belong to the session and are ignored here.
    pub fn update(&mut self, message: &Message) {
        match message {
            Message::Filter(query) => self.set_filter(query),
            Message::Sort(col) => self.sort(*col),
            Message::ToggleColumn(col, visible) => self.toggle_column(*col, *visible),
            _ => (),
        }
    }

    /// Keep the rows where at least one cell contains `query`
    /// case-insensitively; an empty query restores all rows. Filtering
    /// always restarts from the full baseline, never from a previous
    /// filter's result.
    pub fn set_filter(&mut self, query: &str) {
        let start_time = Instant::now();
        if query.is_empty() {
            self.filter_query = None;
            self.displayed = (0..self.original_rows.len()).collect();
        } else {
            let needle = query.to_lowercase();
            self.displayed = self
                .original_rows
                .par_iter()
                .enumerate()
                .filter(|(_, row)| {
                    row.iter()
                        .any(|cell| cell.to_lowercase().contains(&needle))
                })
                .map(|(idx, _)| idx)
                .collect();
            self.filter_query = Some(query.to_string());
        }

        // An active sort is re-derived from the new filtered set so sort and
        // filter stay consistent. The direction is untouched.
        if let Some(col) = self.sort_column {
            self.apply_sort(col, self.sort_direction);
        }
        debug!(
            "Filter {:?} kept {}/{} rows in {}ms",
            query,
            self.displayed.len(),
            self.original_rows.len(),
            start_time.elapsed().as_millis()
        );
    }

    /// Sort by a column. Selecting the active sort column flips the
    /// direction; any other column starts a fresh ascending sort.
    pub fn sort(&mut self, col_index: usize) {
        let direction = match self.sort_column {
            Some(current) if current == col_index => self.sort_direction.flip(),
            _ => SortDirection::Ascending,
        };
        self.sort_column = Some(col_index);
        self.sort_direction = direction;
        self.apply_sort(col_index, direction);
    }

    fn apply_sort(&mut self, col_index: usize, direction: SortDirection) {
        let start_time = Instant::now();
        let rows = &self.original_rows;
        // Stable, so rows with equal keys keep their current relative order.
        self.displayed.sort_by(|&a, &b| {
            let left = cell_at(&rows[a], col_index);
            let right = cell_at(&rows[b], col_index);
            let ordering = compare_cells(left, right);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        trace!(
            "Sorted column {} {:?} over {} rows in {}ms",
            col_index,
            direction,
            self.displayed.len(),
            start_time.elapsed().as_millis()
        );
    }

    /// Show or hide a column. Affects projection, footer and chart-axis
    /// choices only; the displayed row set and export stay untouched.
    pub fn toggle_column(&mut self, col_index: usize, visible: bool) {
        if col_index >= self.column_count {
            warn!("Ignoring visibility toggle for unknown column {col_index}");
            return;
        }
        if visible {
            self.visible_columns.insert(col_index);
        } else {
            self.visible_columns.remove(&col_index);
        }
    }

    pub fn project(&self) -> Projection {
        let headers = self.project_row(&self.headers);
        let rows = self
            .displayed
            .iter()
            .map(|&idx| self.project_row(&self.original_rows[idx]))
            .collect();
        Projection { headers, rows }
    }

    fn project_row(&self, row: &[String]) -> Vec<String> {
        self.visible_columns
            .iter()
            .map(|&col| row.get(col).cloned().unwrap_or_default())
            .collect()
    }

    /// Numeric summaries for the visible columns over the displayed rows,
    /// recomputed fresh on every call.
    pub fn footer(&self) -> Vec<(usize, Option<ColumnSummary>)> {
        self.visible_columns
            .iter()
            .map(|&col| {
                let summary = stats::summarize(
                    self.displayed
                        .iter()
                        .map(|&idx| cell_at(&self.original_rows[idx], col)),
                );
                (col, summary)
            })
            .collect()
    }

    /// Serialize headers plus the displayed rows back to delimited text.
    /// Reflects the current filter and sort; hidden columns are included at
    /// their original position.
    pub fn export_text(&self) -> String {
        let mut records = Vec::with_capacity(self.displayed.len() + 1);
        records.push(self.encode_record(&self.headers));
        for &idx in &self.displayed {
            records.push(self.encode_record(&self.original_rows[idx]));
        }
        records.join("\n")
    }

    fn encode_record(&self, row: &[String]) -> String {
        (0..self.column_count)
            .map(|col| encode_field(cell_at(row, col)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The displayed rows padded to the full column count, visibility
    /// ignored. This is what export and the chart bridge read.
    pub fn displayed_rows(&self) -> Vec<Vec<String>> {
        self.displayed
            .iter()
            .map(|&idx| {
                let row = &self.original_rows[idx];
                (0..self.column_count)
                    .map(|col| row.get(col).cloned().unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row_count(&self) -> usize {
        self.displayed.len()
    }

    pub fn filter_query(&self) -> Option<&str> {
        self.filter_query.as_deref()
    }

    pub fn sort_state(&self) -> Option<(usize, SortDirection)> {
        self.sort_column.map(|col| (col, self.sort_direction))
    }

    pub fn is_column_visible(&self, col_index: usize) -> bool {
        self.visible_columns.contains(&col_index)
    }
}

fn cell_at(row: &[String], col_index: usize) -> &str {
    row.get(col_index).map(String::as_str).unwrap_or("")
}

// Numeric when both sides read as numbers, lexicographic otherwise. Ties are
// Equal so the stable sort preserves the existing order.
fn compare_cells(left: &str, right: &str) -> Ordering {
    match (stats::parse_number(left), stats::parse_number(right)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => left.cmp(right),
    }
}

fn encode_field(cell: &str) -> String {
    let needs_quoting = cell.chars().any(|c| matches!(c, ',' | '"' | '\r' | '\n'));
    if needs_quoting {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn view(text: &str) -> TableView {
        TableView::new(parse(text))
    }

    fn body(view: &TableView) -> Vec<Vec<String>> {
        view.project().rows
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn first_row_becomes_headers() {
        let v = view("a,b\n1,2\n3,x\n");
        assert_eq!(v.headers(), &["a", "b"]);
        assert_eq!(body(&v), vec![row(&["1", "2"]), row(&["3", "x"])]);
    }

    #[test]
    fn empty_grid_makes_an_empty_view() {
        let v = view("");
        assert!(v.headers().is_empty());
        assert_eq!(v.row_count(), 0);
        assert_eq!(v.project().headers.len(), 0);
        assert!(v.footer().is_empty());
        assert_eq!(v.export_text(), "");
    }

    #[test]
    fn projection_pads_short_rows() {
        let v = view("a,b,c\n1\n2,3\n");
        assert_eq!(
            body(&v),
            vec![row(&["1", "", ""]), row(&["2", "3", ""])]
        );
    }

    #[test]
    fn numeric_cell_against_text_falls_back_to_lexicographic() {
        // "2" parses, "x" does not, so the pair compares as text and the
        // order is unchanged.
        let mut v = view("a,b\n1,2\n3,x\n");
        v.sort(1);
        assert_eq!(body(&v), vec![row(&["1", "2"]), row(&["3", "x"])]);
        let footer = v.footer();
        assert_eq!(footer[1].0, 1);
        let summary = footer[1].1.unwrap();
        assert_eq!(summary.sum, 2.0);
        assert_eq!(summary.average, 2.0);
    }

    #[test]
    fn numeric_sort_compares_by_value() {
        let mut v = view("n\n10\n9\n100\n");
        v.sort(0);
        assert_eq!(body(&v), vec![row(&["9"]), row(&["10"]), row(&["100"])]);
    }

    #[test]
    fn sorting_the_same_column_flips_direction() {
        let mut v = view("n\n2\n1\n3\n");
        v.sort(0);
        assert_eq!(v.sort_state(), Some((0, SortDirection::Ascending)));
        let ascending = body(&v);
        v.sort(0);
        assert_eq!(v.sort_state(), Some((0, SortDirection::Descending)));
        assert_eq!(
            body(&v),
            ascending.iter().rev().cloned().collect::<Vec<_>>()
        );
        // A third press lands back on the single ascending sort.
        v.sort(0);
        assert_eq!(body(&v), ascending);
    }

    #[test]
    fn sorting_a_new_column_starts_ascending() {
        let mut v = view("a,b\n1,9\n2,8\n");
        v.sort(0);
        v.sort(0);
        assert_eq!(v.sort_state(), Some((0, SortDirection::Descending)));
        v.sort(1);
        assert_eq!(v.sort_state(), Some((1, SortDirection::Ascending)));
        assert_eq!(body(&v), vec![row(&["2", "8"]), row(&["1", "9"])]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut v = view("k,tag\n1,first\n1,second\n0,third\n1,fourth\n");
        v.sort(0);
        assert_eq!(
            body(&v),
            vec![
                row(&["0", "third"]),
                row(&["1", "first"]),
                row(&["1", "second"]),
                row(&["1", "fourth"]),
            ]
        );
    }

    #[test]
    fn missing_cells_sort_as_empty_text() {
        let mut v = view("a,b\nz,1\ny\nx,2\n");
        v.sort(1);
        // "" < "1" < "2" lexicographically once one side fails to parse.
        assert_eq!(
            body(&v),
            vec![row(&["y", ""]), row(&["z", "1"]), row(&["x", "2"])]
        );
    }

    #[test]
    fn filter_matches_any_cell_case_insensitively() {
        let mut v = view("name,place\nAlice,Vienna\nBob,Graz\nCarol,VIENNA\n");
        v.set_filter("vienna");
        assert_eq!(
            body(&v),
            vec![row(&["Alice", "Vienna"]), row(&["Carol", "VIENNA"])]
        );
    }

    #[test]
    fn filter_restarts_from_the_baseline() {
        let mut v = view("x\napple\nbanana\ncherry\n");
        v.set_filter("an");
        assert_eq!(body(&v), vec![row(&["banana"])]);
        // Not a refinement of the previous result.
        v.set_filter("err");
        assert_eq!(body(&v), vec![row(&["cherry"])]);
    }

    #[test]
    fn empty_filter_restores_all_rows() {
        let mut v = view("x\nb\na\nc\n");
        v.set_filter("a");
        v.set_filter("");
        assert_eq!(v.filter_query(), None);
        assert_eq!(body(&v), vec![row(&["b"]), row(&["a"]), row(&["c"])]);
    }

    #[test]
    fn empty_filter_keeps_an_active_sort() {
        let mut v = view("x\nb\na\nc\n");
        v.sort(0);
        v.set_filter("zzz");
        assert_eq!(v.row_count(), 0);
        v.set_filter("");
        assert_eq!(body(&v), vec![row(&["a"]), row(&["b"]), row(&["c"])]);
    }

    #[test]
    fn active_sort_is_reapplied_after_filtering() {
        let mut v = view("name,n\nc,3\na,1\nd,4\nb,2\n");
        v.sort(1);
        v.sort(1); // descending
        v.set_filter("a");
        // The direction survives the re-derived sort.
        assert_eq!(v.sort_state(), Some((1, SortDirection::Descending)));
        assert_eq!(body(&v), vec![row(&["a", "1"])]);
        v.set_filter("");
        assert_eq!(
            body(&v),
            vec![
                row(&["d", "4"]),
                row(&["c", "3"]),
                row(&["b", "2"]),
                row(&["a", "1"]),
            ]
        );
    }

    #[test]
    fn toggling_a_column_changes_only_the_projection() {
        let mut v = view("a,b,c\n1,2,3\n4,5,6\n");
        v.sort(0);
        v.set_filter("");
        let before_rows = v.displayed_rows();
        let before_sort = v.sort_state();

        v.toggle_column(1, false);
        assert!(!v.is_column_visible(1));
        assert_eq!(v.project().headers, row(&["a", "c"]));
        assert_eq!(body(&v), vec![row(&["1", "3"]), row(&["4", "6"])]);
        assert_eq!(v.displayed_rows(), before_rows);
        assert_eq!(v.sort_state(), before_sort);

        v.toggle_column(1, true);
        assert_eq!(v.project().headers, row(&["a", "b", "c"]));
        assert_eq!(v.displayed_rows(), before_rows);
    }

    #[test]
    fn toggling_an_unknown_column_is_ignored() {
        let mut v = view("a,b\n1,2\n");
        v.toggle_column(9, true);
        assert_eq!(v.project().headers.len(), 2);
    }

    #[test]
    fn footer_covers_visible_columns_only() {
        let mut v = view("a,b\n1,2\n3,4\n");
        v.toggle_column(0, false);
        let footer = v.footer();
        assert_eq!(footer.len(), 1);
        assert_eq!(footer[0].0, 1);
        assert_eq!(footer[0].1.unwrap().sum, 6.0);
    }

    #[test]
    fn footer_follows_the_filter() {
        let mut v = view("name,n\na,1\nb,2\na,4\n");
        v.set_filter("a");
        let footer = v.footer();
        let summary = footer[1].1.unwrap();
        assert_eq!(summary.sum, 5.0);
        assert_eq!(summary.average, 2.5);
    }

    #[test]
    fn export_reflects_filter_and_sort_but_not_visibility() {
        let mut v = view("name,n\nc,3\na,1\nb,2\n");
        v.sort(1);
        v.sort(1);
        v.set_filter("");
        v.toggle_column(0, false);
        assert_eq!(v.export_text(), "name,n\nc,3\nb,2\na,1");
    }

    #[test]
    fn export_pads_ragged_rows() {
        let v = view("a,b,c\n1\n");
        assert_eq!(v.export_text(), "a,b,c\n1,,");
    }

    #[test]
    fn export_quotes_only_where_needed() {
        let grid = Grid {
            rows: vec![
                row(&["plain", "with,comma"]),
                row(&["with \"quote\"", "two\nlines"]),
            ],
            column_count: 2,
        };
        let v = TableView::new(grid);
        assert_eq!(
            v.export_text(),
            "plain,\"with,comma\"\n\"with \"\"quote\"\"\",\"two\nlines\""
        );
    }

    #[test]
    fn export_round_trips_through_the_parser() {
        let mut v = view("name,n\nc,3\na,1\nb,2\n");
        v.sort(1);
        v.set_filter("");
        let reparsed = parse(&v.export_text());
        assert_eq!(reparsed.column_count, 2);
        assert_eq!(reparsed.rows[0], row(&["name", "n"]));
        assert_eq!(&reparsed.rows[1..], v.displayed_rows().as_slice());
    }

    #[test]
    fn update_dispatches_view_actions() {
        let mut v = view("a,b\nfoo,1\nbar,2\n");
        v.update(&Message::Filter("foo".into()));
        assert_eq!(v.row_count(), 1);
        v.update(&Message::Filter(String::new()));
        v.update(&Message::Sort(1));
        assert_eq!(v.sort_state(), Some((1, SortDirection::Ascending)));
        v.update(&Message::ToggleColumn(0, false));
        assert!(!v.is_column_visible(0));
        // Read-only actions leave the state alone.
        v.update(&Message::Export);
        v.update(&Message::Chart(0, 1));
        assert_eq!(v.row_count(), 2);
        assert_eq!(v.sort_state(), Some((1, SortDirection::Ascending)));
    }
}
