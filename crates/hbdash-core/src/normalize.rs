//! JSON response normalization.
//!
//! Backends answer with bare arrays, enveloped arrays (`{"data": [...]}`) or a
//! single flat object. All of them reduce to a `Table`; anything else reduces
//! to the empty table. Nothing here returns an error.

use serde_json::Value;

use crate::table::{Row, Table};

/// Envelope keys checked on object responses, in priority order.
pub const ENVELOPE_KEYS: [&str; 3] = ["data", "result", "items"];

/// Normalize a raw response into a table.
///
/// `None` stands for a response that never arrived.
pub fn normalize(raw: Option<&Value>) -> Table {
    match raw {
        None | Some(Value::Null) => Table::empty(),
        Some(Value::Array(items)) => from_array(items),
        Some(Value::Object(object)) => {
            for key in ENVELOPE_KEYS {
                if let Some(Value::Array(items)) = object.get(key) {
                    return from_array(items);
                }
            }
            Table::from_rows(vec![object.clone()])
        }
        Some(Value::Bool(_) | Value::Number(_) | Value::String(_)) => Table::empty(),
    }
}

/// One row per object element. Non-object elements have no columns to
/// contribute and are dropped.
fn from_array(items: &[Value]) -> Table {
    let rows: Vec<Row> = items
        .iter()
        .filter_map(|item| item.as_object().cloned())
        .collect();
    Table::from_rows(rows)
}
