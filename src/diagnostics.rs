//! Non-fatal diagnostics raised during fit/transform
//!
//! Diagnostics never abort the operation that produced them. They are kept in
//! an owned collector so callers can assert on them, and each one is also
//! forwarded to the `log` facade at warn level.

use serde::Serialize;
use std::fmt;

/// Category of a non-fatal diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// `fit` was called on a transformer that has nothing to learn
    FitIgnored,
    /// Mapping keys that never occur in the column
    UnusedMappingKeys,
    /// Column values with no mapping entry (passed through unchanged)
    UnmappedValues,
    /// Columns listed for dropping that are not in the dataset
    MissingDropColumns,
    /// Imputer neighbor count exceeds the number of fit rows
    NeighborsExceedRows,
    /// A random-state trial was discarded for low training F1
    SkippedSeed,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::FitIgnored => "fit ignored",
            DiagnosticKind::UnusedMappingKeys => "unused mapping keys",
            DiagnosticKind::UnmappedValues => "unmapped values",
            DiagnosticKind::MissingDropColumns => "missing drop columns",
            DiagnosticKind::NeighborsExceedRows => "neighbors exceed rows",
            DiagnosticKind::SkippedSeed => "skipped seed",
        };
        write!(f, "{}", label)
    }
}

/// A single diagnostic record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Transformer or stage that raised it
    pub source: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// Ordered collector of diagnostics
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and forward it to the log facade.
    pub fn warn(
        &mut self,
        source: impl Into<String>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            source: source.into(),
            kind,
            message: message.into(),
        };
        log::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    /// Append diagnostics collected elsewhere, keeping their order.
    /// They were already logged when first recorded.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any diagnostic of `kind` was recorded
    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
