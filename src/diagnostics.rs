use std::fmt;
use tracing::{debug, warn};

/// How bad a logged condition is. Ordered from harmless to fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    NoError,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::NoError => "No Error",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal Error",
        };
        f.write_str(label)
    }
}

/// One logged message with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub uri: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}.{}: {}: {}",
            self.uri, self.line, self.column, self.severity, self.message
        )
    }
}

/// Accumulates the diagnostics of one decode.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    unknown_elements_skipped: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything logged so far
    pub fn reset(&mut self) {
        self.entries.clear();
        self.error_count = 0;
        self.warning_count = 0;
        self.unknown_elements_skipped = 0;
    }

    /// Record one diagnostic
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::NoError => return,
            Severity::Warning => self.warning_count += 1,
            Severity::Error | Severity::Fatal => self.error_count += 1,
        }
        if diagnostic.severity == Severity::Fatal {
            warn!(
                uri = %diagnostic.uri,
                line = diagnostic.line,
                column = diagnostic.column,
                "{}",
                diagnostic.message
            );
        } else {
            debug!(
                uri = %diagnostic.uri,
                line = diagnostic.line,
                column = diagnostic.column,
                severity = %diagnostic.severity,
                "{}",
                diagnostic.message
            );
        }
        self.entries.push(diagnostic);
    }

    /// Errors and fatal errors logged
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Highest severity logged
    pub fn severity(&self) -> Severity {
        self.entries
            .iter()
            .map(|d| d.severity)
            .max()
            .unwrap_or(Severity::NoError)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// All messages, one per line
    pub fn logged_messages(&self) -> String {
        self.entries
            .iter()
            .map(|d| format!("{d}\n"))
            .collect()
    }

    pub fn unknown_elements_skipped(&self) -> usize {
        self.unknown_elements_skipped
    }

    pub fn set_unknown_elements_skipped(&mut self, count: usize) {
        self.unknown_elements_skipped = count;
    }

    pub fn note_unknown_element(&mut self) {
        self.unknown_elements_skipped += 1;
    }
}
