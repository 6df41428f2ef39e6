//! Presentation tables: the master-data browser and the damage-challenge report.

pub mod browse;
pub mod damage;
pub mod table;

pub use browse::{browse, BrowseKind};
pub use damage::{action_log_table, unit_table};
pub use table::{ReportError, Table};
