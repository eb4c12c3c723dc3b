//! Delimited text parser with per-cell type inference

use indexmap::IndexMap;
use tracing::debug;

use crate::dataset::{Dataset, Record};
use crate::value::Value;

/// Parse delimited text into a dataset.
///
/// The first line is the header; the delimiter is tab if the header contains
/// a tab character, otherwise comma. The choice is made once and applied to
/// every row regardless of what later rows contain. Rows with fewer tokens
/// than headers get empty strings for the missing positions; surplus tokens
/// are ignored. No quoting or escaping is supported.
///
/// Malformed or too-short input degrades to an empty dataset rather than
/// failing.
pub fn parse_delimited(text: &str) -> Dataset {
    let lines: Vec<&str> = split_lines(text.trim());
    if lines.len() < 2 {
        return Dataset::empty();
    }

    let delimiter = if lines[0].contains('\t') { '\t' } else { ',' };
    let headers: Vec<String> = lines[0]
        .split(delimiter)
        .map(|h| h.trim().to_string())
        .collect();
    debug!(
        delimiter = if delimiter == '\t' { "tab" } else { "comma" },
        columns = headers.len(),
        rows = lines.len() - 1,
        "parsing delimited text"
    );

    let records = lines[1..]
        .iter()
        .map(|line| {
            let tokens: Vec<&str> = line.split(delimiter).collect();
            let fields: IndexMap<String, Value> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let raw = tokens.get(i).copied().unwrap_or("");
                    (h.clone(), Value::coerce(raw))
                })
                .collect();
            Record::new(fields)
        })
        .collect();

    Dataset::from_records(records)
}

/// Split on `\r?\n`. An empty input yields one empty line, matching how the
/// parser counts lines before deciding it has no data.
fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_count_is_line_count_minus_one() {
        let ds = parse_delimited("a,b\n1,2\n3,4\n5,6");
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn infers_numbers_and_text_per_cell() {
        let ds = parse_delimited("a,b\n1,2\n3,x");
        assert_eq!(ds.len(), 2);

        let first = &ds.records()[0];
        assert_eq!(first.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(first.get("b"), Some(&Value::Number(2.0)));

        let second = &ds.records()[1];
        assert_eq!(second.get("a"), Some(&Value::Number(3.0)));
        assert_eq!(second.get("b"), Some(&Value::Text("x".to_string())));
    }

    #[test]
    fn delimiter_comes_from_header_only() {
        // Header says tab, so the comma row is one malformed token for the
        // first column and an empty string for the second.
        let ds = parse_delimited("a\tb\n1,2");
        assert_eq!(ds.len(), 1);
        let row = &ds.records()[0];
        assert_eq!(row.get("a"), Some(&Value::Text("1,2".to_string())));
        assert_eq!(row.get("b"), Some(&Value::Text(String::new())));
    }

    #[test]
    fn too_short_input_degrades_to_empty() {
        assert!(parse_delimited("").is_empty());
        assert!(parse_delimited("onlyheader").is_empty());
        assert!(parse_delimited("   \n  ").is_empty());
    }

    #[test]
    fn short_rows_pad_with_empty_strings() {
        let ds = parse_delimited("a,b,c\n1");
        let row = &ds.records()[0];
        assert_eq!(row.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(row.get("b"), Some(&Value::Text(String::new())));
        assert_eq!(row.get("c"), Some(&Value::Text(String::new())));
    }

    #[test]
    fn surplus_tokens_are_ignored() {
        // Delimiters inside values are undefined behavior upstream; this
        // documents what actually happens without promising it.
        let ds = parse_delimited("a,b\n1,2,3");
        let row = &ds.records()[0];
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("b"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn blank_interior_lines_still_produce_records() {
        let ds = parse_delimited("a,b\n\n1,2");
        assert_eq!(ds.len(), 2);
        let blank = &ds.records()[0];
        assert_eq!(blank.get("a"), Some(&Value::Text(String::new())));
    }

    #[test]
    fn crlf_line_endings() {
        let ds = parse_delimited("a,b\r\n1,2\r\n3,4");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].get("b"), Some(&Value::Number(4.0)));
    }

    #[test]
    fn header_and_cells_are_trimmed() {
        let ds = parse_delimited(" a , b \n 1 , x ");
        let row = &ds.records()[0];
        assert_eq!(row.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(row.get("b"), Some(&Value::Text("x".to_string())));
    }

    #[test]
    fn tab_delimited_input() {
        let ds = parse_delimited("a\tb\n1\t2");
        let row = &ds.records()[0];
        assert_eq!(row.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(row.get("b"), Some(&Value::Number(2.0)));
    }
}
