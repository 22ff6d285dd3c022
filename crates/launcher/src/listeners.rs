//! Composite listeners with per-listener failure isolation
//!
//! The launcher fans every event out to all registered listeners in
//! registration order. A panicking listener is logged and dropped from
//! that event only; it keeps receiving later events and never affects
//! test outcomes or its peers.

use gantry_core::{
    DiscoveryIssue, DiscoveryListener, ExecutionListener, NodePath, ReportEntry, TestResult,
};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

fn isolated(what: &str, path: Option<&NodePath>, call: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(call)).is_err() {
        match path {
            Some(path) => warn!(%path, "{what} listener panicked"),
            None => warn!("{what} listener panicked"),
        }
    }
}

/// Fans execution events out to a list of listeners.
#[derive(Default)]
pub struct CompositeExecutionListener {
    delegates: Vec<Arc<dyn ExecutionListener>>,
}

impl CompositeExecutionListener {
    /// Compose the given listeners, invoked in order.
    pub fn new(delegates: Vec<Arc<dyn ExecutionListener>>) -> Self {
        CompositeExecutionListener { delegates }
    }
}

impl ExecutionListener for CompositeExecutionListener {
    fn node_started(&self, path: &NodePath) {
        for delegate in &self.delegates {
            isolated("node_started", Some(path), || delegate.node_started(path));
        }
    }

    fn node_finished(&self, path: &NodePath, result: &TestResult) {
        for delegate in &self.delegates {
            isolated("node_finished", Some(path), || {
                delegate.node_finished(path, result)
            });
        }
    }

    fn dynamic_node_registered(&self, path: &NodePath) {
        for delegate in &self.delegates {
            isolated("dynamic_node_registered", Some(path), || {
                delegate.dynamic_node_registered(path)
            });
        }
    }

    fn reporting_entry_published(&self, path: &NodePath, entry: &ReportEntry) {
        for delegate in &self.delegates {
            isolated("reporting_entry_published", Some(path), || {
                delegate.reporting_entry_published(path, entry)
            });
        }
    }
}

/// Fans discovery events out to a list of listeners.
#[derive(Default)]
pub struct CompositeDiscoveryListener {
    delegates: Vec<Arc<dyn DiscoveryListener>>,
}

impl CompositeDiscoveryListener {
    /// Compose the given listeners, invoked in order.
    pub fn new(delegates: Vec<Arc<dyn DiscoveryListener>>) -> Self {
        CompositeDiscoveryListener { delegates }
    }
}

impl DiscoveryListener for CompositeDiscoveryListener {
    fn discovery_started(&self) {
        for delegate in &self.delegates {
            isolated("discovery_started", None, || delegate.discovery_started());
        }
    }

    fn issue_encountered(&self, engine_path: &NodePath, issue: &DiscoveryIssue) {
        for delegate in &self.delegates {
            isolated("issue_encountered", Some(engine_path), || {
                delegate.issue_encountered(engine_path, issue)
            });
        }
    }

    fn discovery_finished(&self) {
        for delegate in &self.delegates {
            isolated("discovery_finished", None, || delegate.discovery_finished());
        }
    }
}

/// Discovery listener collecting every reported issue, used by the
/// orchestrator for critical-issue detection.
#[derive(Default)]
pub struct IssueCollectingListener {
    issues: Mutex<Vec<(NodePath, DiscoveryIssue)>>,
}

impl IssueCollectingListener {
    /// Create an empty collector.
    pub fn new() -> Self {
        IssueCollectingListener::default()
    }

    /// Snapshot of the issues collected so far.
    pub fn issues(&self) -> Vec<(NodePath, DiscoveryIssue)> {
        self.issues.lock().clone()
    }
}

impl DiscoveryListener for IssueCollectingListener {
    fn issue_encountered(&self, engine_path: &NodePath, issue: &DiscoveryIssue) {
        self.issues
            .lock()
            .push((engine_path.clone(), issue.clone()));
    }
}
