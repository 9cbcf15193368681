//! Core data handling for the hbdash live dashboard.
//!
//! The management API behind the dashboard has no fixed schema, so this crate
//! turns whatever JSON comes back into something uniform:
//! - `Table`: row-oriented table with first-seen column order
//! - `normalize`: JSON value (array, envelope object, flat object) -> `Table`
//! - `FieldAliasSet` / `resolve_field`: locate logical fields by column alias
//! - `format_metric`: compact magnitude strings (`1.50M`, `2.50K`, `42.00`)

pub mod error;
pub mod fields;
pub mod format;
pub mod normalize;
pub mod table;

pub use error::{CoreError, Result};
pub use fields::{
    is_running_value, resolve_field, resolve_status_column, running_count, FieldAliasSet,
    LogicalField, STATUS_ALIASES,
};
pub use format::{format_metric, format_number, PLACEHOLDER};
pub use normalize::{normalize, ENVELOPE_KEYS};
pub use table::{cell_text, Row, Table};
