//! Game master-data browser and damage-challenge battle log viewer.

pub mod battle;
pub mod cli;
pub mod config;
pub mod data;
pub mod report;
pub mod session;

pub use battle::{analyze, Attribution, BattleActionBatch, DamageChallengeLog, Diagnostics};
pub use config::{Config, Labels, Locale, OutputFormat};
pub use data::{load_master_data, MasterData, MasterDataSet};
pub use session::{Session, SessionError};
