//! Per-node execution results and failure aggregation types
//!
//! A node's result is node-local: failures never propagate upward as
//! structural errors, only as a FAILED result on the node itself and a
//! "contains a failed descendant" failure on its ancestors.

use std::fmt;

/// A failure produced while running a node's lifecycle.
///
/// Additional failures observed after a primary failure exists (e.g. an
/// after-callback that fails during teardown) are attached as suppressed
/// failures rather than replacing the primary cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    message: String,
    suppressed: Vec<TestFailure>,
}

impl TestFailure {
    /// Create a new failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        TestFailure {
            message: message.into(),
            suppressed: Vec::new(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Failures suppressed behind this one.
    pub fn suppressed(&self) -> &[TestFailure] {
        &self.suppressed
    }

    /// Attach a suppressed failure.
    pub fn add_suppressed(&mut self, failure: TestFailure) {
        self.suppressed.push(failure);
    }
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.suppressed.is_empty() {
            write!(f, " (+{} suppressed)", self.suppressed.len())?;
        }
        Ok(())
    }
}

/// Terminal outcome of one node's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    /// All phases completed without failure
    Successful,
    /// A skip was signalled before BEFORE ran
    Skipped(Option<String>),
    /// PREPARE, BEFORE, EXECUTE, or AFTER produced an unhandled failure
    Failed(TestFailure),
    /// Cancellation was requested before or during the node's run.
    /// Not a failure: a distinct terminal outcome.
    Aborted,
}

impl TestResult {
    /// Whether this result is [`TestResult::Successful`].
    pub fn is_successful(&self) -> bool {
        matches!(self, TestResult::Successful)
    }

    /// Whether this result is [`TestResult::Failed`].
    pub fn is_failure(&self) -> bool {
        matches!(self, TestResult::Failed(_))
    }

    /// The failure, if this result is [`TestResult::Failed`].
    pub fn failure(&self) -> Option<&TestFailure> {
        match self {
            TestResult::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Successful => f.write_str("SUCCESSFUL"),
            TestResult::Skipped(Some(reason)) => write!(f, "SKIPPED: {reason}"),
            TestResult::Skipped(None) => f.write_str("SKIPPED"),
            TestResult::Failed(failure) => write!(f, "FAILED: {failure}"),
            TestResult::Aborted => f.write_str("ABORTED"),
        }
    }
}

/// Outcome of a node's skip check, evaluated before BEFORE runs.
///
/// Explicit variants instead of error-based control flow: a skip is an
/// expected outcome, not an exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipDecision {
    /// Continue with BEFORE/EXECUTE/AFTER
    Proceed,
    /// Skip the node, with an optional human-readable reason
    Skip(Option<String>),
}

impl SkipDecision {
    /// Skip with a reason.
    pub fn because(reason: impl Into<String>) -> Self {
        SkipDecision::Skip(Some(reason.into()))
    }
}
