use std::path::PathBuf;

use thiserror::Error;

/// Errors while loading a master-data document.
#[derive(Debug, Error)]
pub enum MasterDataError {
    #[error("failed to read master data {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse master data JSON")]
    Parse(#[source] serde_json::Error),

    #[error("failed to parse master data XML: {0}")]
    Xml(#[source] roxmltree::Error),

    #[error("master data XML root must be <{expected}>, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    #[error("master data must be a JSON object keyed by element tag, found {found}")]
    NotAnObject { found: &'static str },
}
