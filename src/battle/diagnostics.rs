//! Per-invocation diagnostic sink for battle log parsing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::battle::error::LineDecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Line is not valid JSON.
    LineDecode,
    /// Line is JSON but has no action array.
    MalformedBatch,
    /// Action tag outside the known vocabulary; the action is dropped.
    UnrecognizedTag,
    /// Known tag whose payload could not be decoded; the action is dropped.
    EventDecode,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineDecode => "line_decode",
            Self::MalformedBatch => "malformed_batch",
            Self::UnrecognizedTag => "unrecognized_tag",
            Self::EventDecode => "event_decode",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based source line.
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub entries: Vec<Diagnostic>,
    /// Payload keys seen under each action tag, for exploring undocumented shapes.
    pub observed_keys: BTreeMap<String, BTreeSet<String>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: usize, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(line, kind = %kind, "{message}");
        self.entries.push(Diagnostic {
            line,
            kind,
            message,
        });
    }

    pub fn line_error(&mut self, err: &LineDecodeError) {
        self.push(err.line(), err.kind(), err.to_string());
    }

    pub fn unrecognized_tag(&mut self, line: usize, tag: &str) {
        self.push(
            line,
            DiagnosticKind::UnrecognizedTag,
            format!("{tag} is not handled"),
        );
    }

    pub fn observe_keys<'a, I>(&mut self, tag: &str, keys: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.observed_keys
            .entry(tag.to_string())
            .or_default()
            .extend(keys.into_iter().cloned());
    }

    /// Append another collector's entries after this one's.
    pub fn absorb(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
        for (tag, keys) in other.observed_keys {
            self.observed_keys.entry(tag).or_default().extend(keys);
        }
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn summary(&self) -> BTreeMap<DiagnosticKind, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_keeps_order_and_merges_keys() {
        let mut first = Diagnostics::new();
        first.unrecognized_tag(1, "BAction_A");
        first.observe_keys("BAction_A", &["x".to_string()]);

        let mut second = Diagnostics::new();
        second.push(2, DiagnosticKind::EventDecode, "bad payload");
        second.observe_keys("BAction_A", &["y".to_string()]);

        first.absorb(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.entries[1].line, 2);
        assert_eq!(first.observed_keys["BAction_A"].len(), 2);
        assert_eq!(first.count(DiagnosticKind::UnrecognizedTag), 1);
        assert_eq!(first.summary()[&DiagnosticKind::EventDecode], 1);
    }
}
