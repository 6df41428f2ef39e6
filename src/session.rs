//! In-memory viewer session: the loaded master data plus configuration, and
//! the entry points that feed files through the pipeline.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::battle::diagnostics::Diagnostics;
use crate::battle::dmglog::{analyze, DamageReport};
use crate::config::Config;
use crate::data::{load_master_data, MasterDataError, MasterDataSet};
use crate::report::{action_log_table, browse, unit_table, BrowseKind, Table};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("master data is not loaded; load master data before opening a battle log")]
    NoMasterData,

    #[error(transparent)]
    MasterData(#[from] MasterDataError),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
pub struct Session {
    pub config: Config,
    master: Option<MasterDataSet>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            master: None,
        }
    }

    pub fn master(&self) -> Option<&MasterDataSet> {
        self.master.as_ref()
    }

    fn require_master(&self) -> Result<&MasterDataSet, SessionError> {
        self.master.as_ref().ok_or(SessionError::NoMasterData)
    }

    pub fn set_master_data(&mut self, master: MasterDataSet) -> &MasterDataSet {
        self.master.insert(master)
    }

    /// Load master data from `path`, replacing whatever was loaded before.
    pub fn load_master_data(&mut self, path: impl AsRef<Path>) -> Result<&MasterDataSet, SessionError> {
        let master = load_master_data(path)?;
        Ok(self.set_master_data(master))
    }

    /// Load master data from the configured path.
    pub fn load_configured_master_data(&mut self) -> Result<&MasterDataSet, SessionError> {
        let path = self.config.master_data.clone();
        self.load_master_data(path)
    }

    /// Run a battle log through the damage-challenge pipeline.
    pub fn load_damage_log(
        &self,
        text: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<DamageReport, SessionError> {
        let master = self.require_master()?;
        Ok(analyze(text, master, self.config.attribution, diagnostics))
    }

    pub fn read_damage_log(
        &self,
        path: impl AsRef<Path>,
        diagnostics: &mut Diagnostics,
    ) -> Result<DamageReport, SessionError> {
        // Checked before touching the file so the notice wins over I/O errors.
        self.require_master()?;
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_damage_log(&text, diagnostics)
    }

    /// Action log table and per-unit table for a report.
    pub fn damage_tables(&self, report: &DamageReport) -> Result<(Table, Table), SessionError> {
        let master = self.require_master()?;
        let labels = self.config.labels();
        Ok((
            action_log_table(&report.action_log, &labels),
            unit_table(&report.identities, &report.aggregates, master, &labels),
        ))
    }

    pub fn browse(&self, kind: BrowseKind) -> Result<Table, SessionError> {
        Ok(browse(self.require_master()?, kind))
    }
}
