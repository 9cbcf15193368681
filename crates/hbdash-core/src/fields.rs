//! Field resolution over unknown column naming schemes.
//!
//! A logical field such as "pnl" may show up as `pnl`, `net_pnl`, `profit` or
//! `netProfit` depending on the backend. Resolution walks an ordered alias
//! list and returns the first alias present among the table's columns.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::table::{cell_text, Table};

/// Column names that carry run state, in priority order.
pub const STATUS_ALIASES: [&str; 3] = ["status", "state", "running"];

/// Substrings that mark a status value as running.
const RUNNING_MARKERS: [&str; 4] = ["run", "true", "active", "online"];

/// Semantic fields looked up in PnL-style tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Timestamp,
    Pnl,
    Fees,
    Volume,
    Equity,
}

impl LogicalField {
    pub const ALL: [LogicalField; 5] = [
        LogicalField::Timestamp,
        LogicalField::Pnl,
        LogicalField::Fees,
        LogicalField::Volume,
        LogicalField::Equity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogicalField::Timestamp => "timestamp",
            LogicalField::Pnl => "pnl",
            LogicalField::Fees => "fees",
            LogicalField::Volume => "volume",
            LogicalField::Equity => "equity",
        }
    }

    /// Built-in aliases, highest priority first.
    pub fn default_aliases(self) -> &'static [&'static str] {
        match self {
            LogicalField::Timestamp => &["timestamp", "time", "ts", "date"],
            LogicalField::Pnl => &["pnl", "net_pnl", "profit", "netProfit"],
            LogicalField::Fees => &["fees", "fee", "commission"],
            LogicalField::Volume => &["volume", "quote_volume", "turnover"],
            LogicalField::Equity => &["equity", "balance", "net_worth"],
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

/// Logical field -> ordered column aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliasSet {
    aliases: HashMap<LogicalField, Vec<String>>,
}

impl Default for FieldAliasSet {
    fn default() -> Self {
        let aliases = LogicalField::ALL
            .into_iter()
            .map(|field| {
                let names = field
                    .default_aliases()
                    .iter()
                    .map(|s| s.to_string())
                    .collect();
                (field, names)
            })
            .collect();
        Self { aliases }
    }
}

impl FieldAliasSet {
    /// Defaults with some fields replaced, keyed by field name.
    pub fn with_overrides<I, K>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: AsRef<str>,
    {
        let mut set = Self::default();
        for (name, aliases) in overrides {
            let field: LogicalField = name.as_ref().parse()?;
            set.set(field, aliases)?;
        }
        Ok(set)
    }

    /// Replace the alias list of one field.
    pub fn set(&mut self, field: LogicalField, aliases: Vec<String>) -> Result<()> {
        if aliases.is_empty() {
            return Err(CoreError::EmptyAliases(field.to_string()));
        }
        self.aliases.insert(field, aliases);
        Ok(())
    }

    pub fn aliases(&self, field: LogicalField) -> &[String] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a logical field against a table's columns.
    pub fn resolve<'t>(&self, table: &'t Table, field: LogicalField) -> Option<&'t str> {
        resolve_field(table, self.aliases(field))
    }
}

/// First alias (in alias order) that names a column, compared
/// case-insensitively. Returns the column as spelled in the table.
pub fn resolve_field<'t, S: AsRef<str>>(table: &'t Table, aliases: &[S]) -> Option<&'t str> {
    aliases.iter().find_map(|alias| {
        let alias = alias.as_ref().to_lowercase();
        table
            .columns()
            .iter()
            .find(|column| column.to_lowercase() == alias)
            .map(String::as_str)
    })
}

/// Column holding run state, if any.
pub fn resolve_status_column(table: &Table) -> Option<&str> {
    resolve_field(table, &STATUS_ALIASES)
}

/// Substring match on the lowercased string form: `"RUNNING"`, `"true"`,
/// `"ACTIVE_TRADING"` and `"online"` all count.
pub fn is_running_value(value: &Value) -> bool {
    let text = cell_text(value).to_lowercase();
    RUNNING_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Rows considered running.
///
/// Without a status column every listed row counts as running.
// TODO: revisit once backends report status consistently; this overcounts
// fleets whose listing omits a status field.
pub fn running_count(table: &Table) -> usize {
    match resolve_status_column(table) {
        Some(column) => table
            .column_values(column)
            .filter(|cell| cell.is_some_and(is_running_value))
            .count(),
        None => table.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    fn table(raw: Value) -> Table {
        normalize(Some(&raw))
    }

    #[test]
    fn test_resolve_none_when_no_alias_matches() {
        let t = table(json!([{"foo": 1, "bar": 2}]));
        assert_eq!(resolve_field(&t, &["pnl", "profit"]), None);
        assert_eq!(FieldAliasSet::default().resolve(&t, LogicalField::Pnl), None);
    }

    #[test]
    fn test_alias_priority_beats_column_order() {
        // profit appears before pnl in the table, but pnl is the higher alias.
        let t = table(json!([{"profit": 1, "net_pnl": 2, "pnl": 3}]));
        assert_eq!(
            FieldAliasSet::default().resolve(&t, LogicalField::Pnl),
            Some("pnl")
        );

        let t = table(json!([{"profit": 1, "net_pnl": 2}]));
        assert_eq!(resolve_field(&t, &["pnl", "net_pnl", "profit"]), Some("net_pnl"));
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_exact() {
        let t = table(json!([{"NetProfit": 5, "Timestamp_ms": 1}]));
        let aliases = FieldAliasSet::default();

        assert_eq!(aliases.resolve(&t, LogicalField::Pnl), Some("NetProfit"));
        // "timestamp" is a prefix of the column, not equal to it.
        assert_eq!(aliases.resolve(&t, LogicalField::Timestamp), None);
    }

    #[test]
    fn test_status_column_priority() {
        let t = table(json!([{"running": true, "State": "up", "name": "x"}]));
        assert_eq!(resolve_status_column(&t), Some("State"));

        let t = table(json!([{"name": "x"}]));
        assert_eq!(resolve_status_column(&t), None);
    }

    #[test]
    fn test_is_running_value() {
        assert!(is_running_value(&json!("RUNNING")));
        assert!(is_running_value(&json!("ACTIVE_TRADING")));
        assert!(is_running_value(&json!("online")));
        assert!(is_running_value(&json!(true)));
        assert!(is_running_value(&json!("True")));
        assert!(!is_running_value(&json!("stopped")));
        assert!(!is_running_value(&json!(false)));
        assert!(!is_running_value(&json!(0)));
        assert!(!is_running_value(&Value::Null));
    }

    #[test]
    fn test_running_count_with_status_column() {
        let t = table(json!([
            {"id": 1, "status": "RUNNING"},
            {"id": 2, "status": "stopped"},
            {"id": 3, "status": "ACTIVE_now"},
            {"id": 4, "status": "0"}
        ]));
        assert_eq!(running_count(&t), 2);
    }

    #[test]
    fn test_running_count_missing_cells_are_not_running() {
        let t = table(json!([{"id": 1, "status": "running"}, {"id": 2}]));
        assert_eq!(running_count(&t), 1);
    }

    #[test]
    fn test_running_count_without_status_column_counts_all() {
        let rows: Vec<Value> = (0..5).map(|i| json!({"id": i})).collect();
        let t = table(Value::Array(rows));
        assert_eq!(running_count(&t), 5);
        assert_eq!(running_count(&Table::empty()), 0);
    }

    #[test]
    fn test_overrides() {
        let set = FieldAliasSet::with_overrides([(
            "volume",
            vec!["notional".to_string(), "volume".to_string()],
        )])
        .unwrap();

        let t = table(json!([{"volume": 1, "notional": 2}]));
        assert_eq!(set.resolve(&t, LogicalField::Volume), Some("notional"));
        assert_eq!(set.aliases(LogicalField::Fees), &["fees", "fee", "commission"]);
    }

    #[test]
    fn test_override_errors() {
        let err = FieldAliasSet::with_overrides([("slippage", vec!["slip".to_string()])]);
        assert!(matches!(err, Err(CoreError::UnknownField(_))));

        let err = FieldAliasSet::with_overrides([("pnl", Vec::new())]);
        assert!(matches!(err, Err(CoreError::EmptyAliases(_))));
    }

    #[test]
    fn test_logical_field_parse() {
        assert_eq!("PnL".parse::<LogicalField>().unwrap(), LogicalField::Pnl);
        assert_eq!(" equity ".parse::<LogicalField>().unwrap(), LogicalField::Equity);
    }
}
