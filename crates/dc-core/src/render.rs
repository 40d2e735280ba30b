//! Pure formatting of query result payloads into display tables.

use dc_rest_api_contract::{CellValue, Row};

/// A result set ready for display.
///
/// `columns` keeps the raw keys for programmatic use; `headers` carries the
/// display labels. `cells` is row-major and rectangular: every row has one
/// cell per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub columns: Vec<String>,
    pub headers: Vec<String>,
    pub cells: Vec<Vec<String>>,
}

impl RenderedTable {
    /// Number of rendered rows, for the "Total rows" footer.
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }
}

/// Column order is the key order of the first row; later rows are assumed
/// uniform and read through that lens.
pub fn columns_of(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Display label for a column key: underscores to spaces, then upper-cased.
/// Display-only; the raw key stays untouched.
pub fn header_label(column: &str) -> String {
    column.replace('_', " ").to_uppercase()
}

/// Format one cell. Numbers with a fractional part render as currency with
/// exactly two decimals; integral numbers render plain; null renders blank;
/// text passes through unchanged.
pub fn format_value(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Number(number) => format_number(number),
        CellValue::Text(text) => text.clone(),
    }
}

fn format_number(number: &serde_json::Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        // 5.0 prints as "5", matching the plain-integer rule
        Some(f) if f.fract() == 0.0 => format!("{f}"),
        Some(f) => format!("${f:.2}"),
        None => number.to_string(),
    }
}

/// Materialize a result set, or nothing at all when there are no rows.
pub fn render_table(rows: &[Row]) -> Option<RenderedTable> {
    if rows.is_empty() {
        return None;
    }

    let columns = columns_of(rows);
    let headers = columns.iter().map(|c| header_label(c)).collect();
    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).map(format_value).unwrap_or_default())
                .collect()
        })
        .collect();

    Some(RenderedTable {
        columns,
        headers,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(json: &str) -> Vec<Row> {
        serde_json::from_str(json).expect("test rows should parse")
    }

    #[test]
    fn fractional_numbers_render_as_currency() {
        let table = render_table(&rows(r#"[{"total_sales": 1234.5}]"#)).unwrap();

        assert_eq!(table.headers, ["TOTAL SALES"]);
        assert_eq!(table.cells, [["$1234.50"]]);
    }

    #[test]
    fn integral_numbers_render_plain() {
        let table = render_table(&rows(r#"[{"count": 5}, {"count": 5.0}]"#)).unwrap();

        assert_eq!(table.cells, [["5"], ["5"]]);
    }

    #[test]
    fn null_renders_blank_and_text_passes_through() {
        let table =
            render_table(&rows(r#"[{"region": "North", "manager": null}]"#)).unwrap();

        assert_eq!(table.cells, [["North", ""]]);
    }

    #[test]
    fn no_rows_means_no_table_at_all() {
        assert_eq!(render_table(&[]), None);
    }

    #[test]
    fn column_order_comes_from_the_first_row() {
        let table = render_table(&rows(
            r#"[{"z_last": 1, "a_first": 2}, {"a_first": 4, "z_last": 3}]"#,
        ))
        .unwrap();

        assert_eq!(table.columns, ["z_last", "a_first"]);
        assert_eq!(table.headers, ["Z LAST", "A FIRST"]);
        assert_eq!(table.cells, [["1", "2"], ["3", "4"]]);
    }

    #[test]
    fn a_key_missing_from_a_later_row_renders_blank() {
        let table = render_table(&rows(r#"[{"region": "North"}, {}]"#)).unwrap();

        assert_eq!(table.cells, [vec!["North".to_string()], vec![String::new()]]);
    }

    #[test]
    fn negative_fractions_keep_the_currency_form() {
        let table = render_table(&rows(r#"[{"delta": -2.5}]"#)).unwrap();

        assert_eq!(table.cells, [["$-2.50"]]);
    }
}
