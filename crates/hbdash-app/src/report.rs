//! Plain-text rendering of a snapshot, printed by `--once`.

use std::fmt::Write;

use chrono::{TimeZone, Utc};
use hbdash_core::{cell_text, Table};
use hbdash_dashboard::{DashboardSnapshot, TablePanel};

/// Rows printed per table.
const REPORT_ROWS: usize = 20;
/// Widest column printed before truncation.
const MAX_CELL_WIDTH: usize = 24;

/// Render `snapshot` as a terminal report.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    let updated = Utc
        .timestamp_millis_opt(snapshot.timestamp_ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default();

    let _ = writeln!(out, "Trading bots: live status");
    let _ = writeln!(out, "API: {}  updated: {updated}", snapshot.api_base);
    let _ = writeln!(out, "API Health: {}", snapshot.health.label);

    if let Some(error) = &snapshot.fatal_error {
        let _ = writeln!(out, "\nAPI health check failed: {error}");
        return out;
    }

    let Some(panels) = &snapshot.panels else {
        return out;
    };

    let fleet = &panels.fleet;
    let pnl = &panels.pnl;
    let _ = writeln!(out, "{}: {}", fleet.label, fleet.running);
    if let Some(notice) = &fleet.notice {
        let _ = writeln!(out, "  {notice}");
    }
    let _ = writeln!(out, "Latest PnL: {}", pnl.latest_pnl);
    let _ = writeln!(out, "Turnover: {}", pnl.turnover);
    let _ = writeln!(out, "Fees: {}", pnl.fees);
    let _ = writeln!(out, "Equity: {}", pnl.equity);
    if let Some(ts) = &pnl.latest_timestamp {
        let _ = writeln!(out, "As of: {ts}");
    }

    render_panel(&mut out, "PnL history", &pnl.history);
    render_panel(&mut out, "Open orders", &panels.orders);
    render_panel(&mut out, "Recent trades", &panels.trades);
    render_panel(&mut out, "Bots", &fleet.bots);
    render_panel(&mut out, "Instances", &fleet.instances);

    out
}

fn render_panel(out: &mut String, title: &str, panel: &TablePanel) {
    let _ = writeln!(out, "\n== {title} ==");
    if let Some(path) = &panel.source_path {
        let _ = writeln!(out, "source: {path} ({} rows)", panel.total_rows);
    }
    if let Some(error) = &panel.error {
        let _ = writeln!(out, "error: {error}");
    }
    if panel.is_empty() {
        if let Some(notice) = &panel.notice {
            let _ = writeln!(out, "{notice}");
        }
        return;
    }
    render_table(out, &panel.table.tail(REPORT_ROWS));
    if panel.table.len() > REPORT_ROWS {
        let _ = writeln!(out, "... {} earlier rows", panel.table.len() - REPORT_ROWS);
    }
}

fn render_table(out: &mut String, table: &Table) {
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            table
                .columns()
                .iter()
                .map(|c| truncate(&row.get(c).map(cell_text).unwrap_or_default()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(truncate(c).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = table.columns().iter().map(|c| truncate(c)).collect();
    write_line(out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(out, &rule, &widths);
    for row in &cells {
        write_line(out, row, &widths);
    }
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        cut.push('~');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbdash_dashboard::HealthStatus;

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            timestamp_ms: 1_706_400_000_000,
            api_base: "http://localhost:8000".to_string(),
            refresh_secs: 10,
            health: HealthStatus::error(),
            fatal_error: Some("Request failed: http://localhost:8000/health -> refused".to_string()),
            panels: None,
        }
    }

    #[test]
    fn test_fatal_report_has_no_panels() {
        let text = render_text(&snapshot());
        assert!(text.contains("API Health: ERROR"));
        assert!(text.contains("API health check failed: Request failed"));
        assert!(!text.contains("Latest PnL"));
        assert!(text.contains("2024-01-28"));
    }

    #[test]
    fn test_truncate_long_cells() {
        let long = "x".repeat(40);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), MAX_CELL_WIDTH);
        assert!(cut.ends_with('~'));
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_table_alignment() {
        let mut row = hbdash_core::Row::new();
        row.insert("id".to_string(), serde_json::json!("order-1"));
        row.insert("side".to_string(), serde_json::json!("buy"));
        let table = Table::from_rows(vec![row]);

        let mut out = String::new();
        render_table(&mut out, &table);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "id       side");
        assert_eq!(lines[1], "-------  ----");
        assert_eq!(lines[2], "order-1  buy");
    }
}
