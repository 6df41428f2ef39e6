//! Error types for battle log decoding

use thiserror::Error;

use crate::battle::diagnostics::DiagnosticKind;

/// A log line that cannot become a batch. The line is skipped; the rest of
/// the file is still processed.
#[derive(Debug, Error)]
pub enum LineDecodeError {
    #[error("line {line}: invalid JSON: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: missing `BActionS` action array")]
    MalformedBatch { line: usize },
}

impl LineDecodeError {
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidJson { line, .. } | Self::MalformedBatch { line } => *line,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::InvalidJson { .. } => DiagnosticKind::LineDecode,
            Self::MalformedBatch { .. } => DiagnosticKind::MalformedBatch,
        }
    }
}
