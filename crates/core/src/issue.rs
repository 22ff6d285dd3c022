//! Discovery issues: diagnostics produced while resolving selection criteria
//!
//! Issues never mutate the tree. They are write-once values attached to the
//! engine that produced them; only [`Severity::Critical`] issues can abort a
//! configured launcher phase.

use std::fmt;

/// Where a test node or discovery issue originated in user code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file (or module) the entity was declared in
    pub file: String,
    /// Optional line number within the file
    pub line: Option<u32>,
}

impl SourceLocation {
    /// Create a location referring to a whole file.
    pub fn file(file: impl Into<String>) -> Self {
        SourceLocation {
            file: file.into(),
            line: None,
        }
    }

    /// Create a location referring to a specific line.
    pub fn line(file: impl Into<String>, line: u32) -> Self {
        SourceLocation {
            file: file.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => f.write_str(&self.file),
        }
    }
}

/// Severity of a [`DiscoveryIssue`], ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Purely informational
    Info,
    /// Potentially problematic, discovery continues
    Warning,
    /// A problem that likely hides tests, discovery continues
    Error,
    /// Aborts a configured phase after all engines finish discovery
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// A diagnostic reported during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveryIssue {
    severity: Severity,
    message: String,
    source: Option<SourceLocation>,
}

impl DiscoveryIssue {
    /// Create a new issue with the given severity and message.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        DiscoveryIssue {
            severity,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source location.
    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    /// The issue's severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The issue's message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The source location, if known.
    pub fn source(&self) -> Option<&SourceLocation> {
        self.source.as_ref()
    }

    /// Whether this issue aborts a phase configured to fail on critical
    /// issues.
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for DiscoveryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(source) = &self.source {
            write!(f, " (at {source})")?;
        }
        Ok(())
    }
}
