//! Bounded table preview of the active dataset

use pb_data::Dataset;

/// Hard cap on displayed data rows. Display-only: the dataset itself is
/// never truncated.
pub const MAX_PREVIEW_ROWS: usize = 500;

/// A bounded, display-ready view of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum TablePreview {
    /// Explicit placeholder; an empty dataset never renders a table shell.
    Empty { title: String },
    Table {
        title: String,
        /// Column headings, taken from the first record only. Later records
        /// with differing keys are not reconciled.
        columns: Vec<String>,
        /// Up to `MAX_PREVIEW_ROWS` rows of display strings.
        rows: Vec<Vec<String>>,
        /// True dataset size, not the truncated count shown.
        total_rows: usize,
        /// Records whose field set differs from the first record's.
        mismatched_records: usize,
    },
}

impl TablePreview {
    /// Build a preview. Pure read: never alters the dataset.
    pub fn build(dataset: &Dataset, title: &str) -> TablePreview {
        let first = match dataset.first() {
            Some(first) => first,
            None => {
                return TablePreview::Empty {
                    title: title.to_string(),
                }
            }
        };

        let columns: Vec<String> = first.field_names().map(str::to_string).collect();
        let rows = dataset
            .iter()
            .take(MAX_PREVIEW_ROWS)
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        let mismatched_records = dataset
            .iter()
            .filter(|record| !record.field_names().eq(columns.iter().map(String::as_str)))
            .count();

        TablePreview::Table {
            title: title.to_string(),
            columns,
            rows,
            total_rows: dataset.len(),
            mismatched_records,
        }
    }

    pub fn total_rows(&self) -> usize {
        match self {
            TablePreview::Empty { .. } => 0,
            TablePreview::Table { total_rows, .. } => *total_rows,
        }
    }

    pub fn mismatched_records(&self) -> usize {
        match self {
            TablePreview::Empty { .. } => 0,
            TablePreview::Table {
                mismatched_records, ..
            } => *mismatched_records,
        }
    }

    /// Render as aligned plain text.
    pub fn render_text(&self) -> String {
        let (title, columns, rows, total_rows) = match self {
            TablePreview::Empty { title } => {
                return format!("{title}\nNo data to display.");
            }
            TablePreview::Table {
                title,
                columns,
                rows,
                total_rows,
                ..
            } => (title, columns, rows, total_rows),
        };

        let headings: Vec<String> = columns.iter().map(|c| display_heading(c)).collect();
        let mut widths: Vec<usize> = headings.iter().map(String::len).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        let mut out = format!("{title}  ({total_rows} rows)\n");
        out.push_str(&format_row(&headings, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&format_row(&rule, &widths));
        for row in rows {
            out.push_str(&format_row(row, &widths));
        }
        out
    }
}

/// Column headings display underscores as spaces.
fn display_heading(name: &str) -> String {
    name.replace('_', " ")
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        if i + 1 < cells.len() {
            for _ in cell.len()..widths[i] {
                line.push(' ');
            }
        }
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_data::parse_delimited;

    #[test]
    fn empty_dataset_renders_placeholder() {
        let preview = TablePreview::build(&Dataset::empty(), "Preview");
        assert!(matches!(preview, TablePreview::Empty { .. }));
        let text = preview.render_text();
        assert!(text.contains("No data to display."));
        assert!(!text.contains('-'));
    }

    #[test]
    fn caps_rows_but_reports_true_total() {
        let mut text = String::from("n\n");
        for i in 0..600 {
            text.push_str(&format!("{i}\n"));
        }
        let ds = parse_delimited(&text);
        assert_eq!(ds.len(), 600);

        let preview = TablePreview::build(&ds, "Big");
        match &preview {
            TablePreview::Table {
                rows, total_rows, ..
            } => {
                assert_eq!(rows.len(), 500);
                assert_eq!(*total_rows, 600);
            }
            TablePreview::Empty { .. } => panic!("expected a table"),
        }
        assert!(preview.render_text().contains("(600 rows)"));
        // Building a preview does not touch the dataset
        assert_eq!(ds.len(), 600);
    }

    #[test]
    fn columns_come_from_first_record() {
        let ds = parse_delimited("a,b\n1,2\n3,4");
        let preview = TablePreview::build(&ds, "T");
        match preview {
            TablePreview::Table {
                columns,
                mismatched_records,
                ..
            } => {
                assert_eq!(columns, vec!["a", "b"]);
                assert_eq!(mismatched_records, 0);
            }
            TablePreview::Empty { .. } => panic!("expected a table"),
        }
    }

    #[test]
    fn later_records_with_differing_keys_are_counted() {
        let head = parse_delimited("a,b\n1,2");
        let tail = parse_delimited("c\n3");
        let mut records = head.records().to_vec();
        records.extend_from_slice(tail.records());
        let ds = Dataset::from_records(records);

        let preview = TablePreview::build(&ds, "Mixed");
        assert_eq!(preview.mismatched_records(), 1);
    }

    #[test]
    fn headings_display_underscores_as_spaces() {
        let ds = parse_delimited("sepal_length\n5.1");
        let text = TablePreview::build(&ds, "Iris").render_text();
        assert!(text.contains("sepal length"));
        assert!(!text.contains("sepal_length"));
    }

    #[test]
    fn numbers_render_without_trailing_fraction() {
        let ds = parse_delimited("a\n2\n2.5");
        let text = TablePreview::build(&ds, "T").render_text();
        assert!(text.contains("2\n"));
        assert!(text.contains("2.5"));
    }
}
