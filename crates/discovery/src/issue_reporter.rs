//! Issue reporters: where resolvers send their diagnostics
//!
//! Reporters either collect issues for later attachment to an engine's
//! result, forward them to a discovery listener as they occur, or wrap
//! another reporter to drop duplicates.

use gantry_core::{DiscoveryIssue, DiscoveryListener, NodePath};
use rustc_hash::FxHashSet;

/// Sink for discovery issues.
pub trait IssueReporter {
    /// Report one issue.
    fn report(&mut self, issue: DiscoveryIssue);
}

/// Collects reported issues into a vector.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    issues: Vec<DiscoveryIssue>,
}

impl CollectingReporter {
    /// Create an empty collector.
    pub fn new() -> Self {
        CollectingReporter::default()
    }

    /// Issues reported so far.
    pub fn issues(&self) -> &[DiscoveryIssue] {
        &self.issues
    }

    /// Consume the collector, yielding all issues.
    pub fn into_issues(self) -> Vec<DiscoveryIssue> {
        self.issues
    }
}

impl IssueReporter for CollectingReporter {
    fn report(&mut self, issue: DiscoveryIssue) {
        self.issues.push(issue);
    }
}

/// Forwards issues to a [`DiscoveryListener`] under a fixed engine path.
pub struct ForwardingReporter<'a> {
    listener: &'a dyn DiscoveryListener,
    engine_path: NodePath,
}

impl<'a> ForwardingReporter<'a> {
    /// Create a reporter forwarding to `listener` for the given engine.
    pub fn new(listener: &'a dyn DiscoveryListener, engine_path: NodePath) -> Self {
        ForwardingReporter {
            listener,
            engine_path,
        }
    }
}

impl IssueReporter for ForwardingReporter<'_> {
    fn report(&mut self, issue: DiscoveryIssue) {
        self.listener.issue_encountered(&self.engine_path, &issue);
    }
}

/// Wraps another reporter and drops issues already seen.
pub struct DeduplicatingReporter<R> {
    delegate: R,
    seen: FxHashSet<DiscoveryIssue>,
}

impl<R: IssueReporter> DeduplicatingReporter<R> {
    /// Wrap `delegate`.
    pub fn new(delegate: R) -> Self {
        DeduplicatingReporter {
            delegate,
            seen: FxHashSet::default(),
        }
    }

    /// Unwrap the inner reporter.
    pub fn into_inner(self) -> R {
        self.delegate
    }
}

impl<R: IssueReporter> IssueReporter for DeduplicatingReporter<R> {
    fn report(&mut self, issue: DiscoveryIssue) {
        if self.seen.insert(issue.clone()) {
            self.delegate.report(issue);
        }
    }
}
