use log::{error, info, warn};
use std::fmt;

/// Exit code used when at least one Error was recorded.
pub const EXIT_ERROR: u8 = 1;
/// Exit code used when there were Warnings but no Errors (EX_CONFIG).
pub const EXIT_WARNING: u8 = 78;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Ok => "ok",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Ordered log of everything that happened while processing a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn ok(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Ok, message));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Info, message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Warning, message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Error, message));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
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

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// 0 when clean, [`EXIT_ERROR`] on any Error, [`EXIT_WARNING`] on Warnings only.
    pub fn exit_code(&self) -> u8 {
        if self.has_errors() {
            EXIT_ERROR
        } else if self.warning_count() > 0 {
            EXIT_WARNING
        } else {
            0
        }
    }

    /// Writes every entry through the logger at the level matching its severity.
    pub fn log(&self) {
        for diagnostic in &self.entries {
            match diagnostic.severity {
                Severity::Ok | Severity::Info => info!("\t{}", diagnostic.message),
                Severity::Warning => warn!("\t{}", diagnostic.message),
                Severity::Error => error!("\t{}", diagnostic.message),
            }
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Output of a processor run: the diagnostics plus the (possibly edited) payload.
#[derive(Debug)]
pub struct PatchResult<T> {
    pub diagnostics: Diagnostics,
    payload: T,
}

impl<T> PatchResult<T> {
    pub fn new(diagnostics: Diagnostics, payload: T) -> Self {
        Self {
            diagnostics,
            payload,
        }
    }

    /// The edited payload, for inspection only. Use [`PatchResult::into_persistable`] to save it.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Splits the result, yielding the payload only when no Error was recorded.
    pub fn into_persistable(self) -> (Diagnostics, Option<T>) {
        if self.diagnostics.has_errors() {
            (self.diagnostics, None)
        } else {
            (self.diagnostics, Some(self.payload))
        }
    }
}
