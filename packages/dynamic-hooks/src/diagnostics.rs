// Diagnostics
//
// Non-fatal problems found during a pass. Each entry is emitted through `tracing`
// when recorded and kept so callers can inspect what was dropped and why.

use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Debug = 0,
    Warn = 1,
    Error = 2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.level {
            DiagnosticLevel::Debug => "DEBUG",
            DiagnosticLevel::Warn => "WARN",
            DiagnosticLevel::Error => "ERROR",
        };
        write!(f, "[{}] {}", label, self.message)
    }
}

/// Collector for the diagnostics of one operation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(&mut self, msg: impl Into<String>) {
        let message = msg.into();
        tracing::debug!("{}", message);
        self.push(DiagnosticLevel::Debug, message);
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        let message = msg.into();
        tracing::warn!("{}", message);
        self.push(DiagnosticLevel::Warn, message);
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        let message = msg.into();
        tracing::error!("{}", message);
        self.push(DiagnosticLevel::Error, message);
    }

    fn push(&mut self, level: DiagnosticLevel, message: String) {
        self.entries.push(Diagnostic { level, message });
    }

    /// Moves all entries of `other` into `self` without logging them again.
    pub fn append(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.level >= DiagnosticLevel::Warn)
    }

    /// True if any warning or error message contains `needle`.
    pub fn has_warning_containing(&self, needle: &str) -> bool {
        self.warnings().any(|d| d.message.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
