//! Row-oriented table built from API responses.

use serde::Serialize;
use serde_json::{Map, Value};

/// One table row: column name -> cell value.
///
/// Backed by an insertion-ordered map, so a row keeps the key order of the
/// JSON object it came from.
pub type Row = Map<String, Value>;

/// Ordered rows plus the union of their column names.
///
/// Columns are kept in first-seen order across rows. A row may lack some
/// columns; missing cells read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// The empty table (zero rows, zero columns).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from rows, collecting the column union.
    ///
    /// Rows that contribute no columns at all collapse to the empty table.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        if columns.is_empty() {
            return Self::empty();
        }

        Self { columns, rows }
    }

    /// Column names in first-seen order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// A table is empty when either axis has length zero.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Exact (case-sensitive) column lookup.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cells of one column, top to bottom. `None` where a row lacks the key.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Option<&'a Value>> {
        self.rows.iter().map(move |row| row.get(column))
    }

    /// Cell of `column` in the last row.
    pub fn last_value(&self, column: &str) -> Option<&Value> {
        self.rows.last().and_then(|row| row.get(column))
    }

    /// Last `n` rows, all columns.
    pub fn tail(&self, n: usize) -> Table {
        let skip = self.rows.len().saturating_sub(n);
        Self {
            columns: self.columns.clone(),
            rows: self.rows[skip..].to_vec(),
        }
    }

    /// Project onto the `preferred` columns that exist, in `preferred` order.
    ///
    /// Matching is exact. When none of them exist the table is returned
    /// unchanged.
    pub fn select(&self, preferred: &[&str]) -> Table {
        let columns: Vec<String> = preferred
            .iter()
            .filter(|name| self.has_column(name))
            .map(|name| name.to_string())
            .collect();

        if columns.is_empty() {
            return self.clone();
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect::<Row>()
            })
            .collect();

        Self { columns, rows }
    }
}

/// Plain string form of a cell, as shown in a table or matched against
/// status markers. Strings are unquoted; null is blank.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_column_union_first_seen_order() {
        let table = Table::from_rows(vec![
            row(json!({"id": 1, "side": "buy"})),
            row(json!({"price": 10.5, "id": 2})),
        ]);

        assert_eq!(table.columns(), &["id", "side", "price"]);
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_keyless_rows_collapse_to_empty() {
        let table = Table::from_rows(vec![Row::new(), Row::new()]);
        assert!(table.is_empty());
        assert_eq!(table, Table::empty());
    }

    #[test]
    fn test_last_value_and_tail() {
        let rows = (0..5).map(|i| row(json!({"pnl": i}))).collect();
        let table = Table::from_rows(rows);

        assert_eq!(table.last_value("pnl"), Some(&json!(4)));
        assert_eq!(table.last_value("missing"), None);

        let tail = table.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.rows()[0].get("pnl"), Some(&json!(3)));
        assert_eq!(table.tail(50).len(), 5);
    }

    #[test]
    fn test_select_keeps_preferred_order() {
        let table = Table::from_rows(vec![row(
            json!({"status": "open", "extra": true, "price": 1, "id": "a"}),
        )]);

        let selected = table.select(&["id", "pair", "price", "status"]);
        assert_eq!(selected.columns(), &["id", "price", "status"]);
        assert!(selected.rows()[0].get("extra").is_none());
    }

    #[test]
    fn test_select_without_matches_returns_all_columns() {
        let table = Table::from_rows(vec![row(json!({"foo": 1, "bar": 2}))]);
        let selected = table.select(&["id", "price"]);
        assert_eq!(selected, table);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("RUNNING")), "RUNNING");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&json!(1.5)), "1.5");
        assert_eq!(cell_text(&Value::Null), "");
    }
}
