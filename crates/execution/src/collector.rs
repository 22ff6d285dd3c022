//! Failure aggregation for one node's lifecycle
//!
//! The first unhandled failure becomes the node's primary failure; later
//! failures (typically from after-callbacks running during teardown) are
//! attached as suppressed failures rather than replacing the primary
//! cause.

use gantry_core::TestFailure;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run a fallible step, converting panics into failures.
pub fn run_protected<T, F>(step: F) -> Result<T, TestFailure>
where
    F: FnOnce() -> Result<T, TestFailure>,
{
    match catch_unwind(AssertUnwindSafe(step)) {
        Ok(result) => result,
        Err(payload) => Err(TestFailure::new(panic_message(&payload))),
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "node panicked".to_string()
    }
}

/// Accumulates failures across the phases of one node's lifecycle.
#[derive(Debug, Default)]
pub struct FailureCollector {
    primary: Option<TestFailure>,
}

impl FailureCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        FailureCollector::default()
    }

    /// Record a failure: the first becomes primary, the rest suppressed.
    pub fn record(&mut self, failure: TestFailure) {
        match &mut self.primary {
            None => self.primary = Some(failure),
            Some(primary) => primary.add_suppressed(failure),
        }
    }

    /// Run a step, recording its failure (or panic). Returns `true` when
    /// the step completed without failure.
    pub fn execute<F>(&mut self, step: F) -> bool
    where
        F: FnOnce() -> Result<(), TestFailure>,
    {
        match run_protected(step) {
            Ok(()) => true,
            Err(failure) => {
                self.record(failure);
                false
            }
        }
    }

    /// Whether any failure has been recorded.
    pub fn has_failure(&self) -> bool {
        self.primary.is_some()
    }

    /// Consume the collector, yielding the aggregated failure, if any.
    pub fn into_failure(self) -> Option<TestFailure> {
        self.primary
    }
}
