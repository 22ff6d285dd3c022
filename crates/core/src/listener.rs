//! Listener interfaces consumed by the core and implemented by reporting
//! collaborators
//!
//! For a given node, calls arrive in the order START -> (DYNAMIC
//! registrations, if any) -> FINISH, and FINISH is called exactly once per
//! node that produced a result. Listener failures are swallowed at the
//! boundary where they occur and never affect test outcomes.

use crate::issue::DiscoveryIssue;
use crate::path::NodePath;
use crate::result::TestResult;

/// Key/value data published by a running node for reporting purposes.
pub type ReportEntry = Vec<(String, String)>;

/// Receives execution events for every node of an engine's tree.
pub trait ExecutionListener: Send + Sync {
    /// A node is about to run its lifecycle.
    fn node_started(&self, path: &NodePath) {
        let _ = path;
    }

    /// A node produced its terminal result.
    fn node_finished(&self, path: &NodePath, result: &TestResult) {
        let _ = (path, result);
    }

    /// A dynamic child was registered during its parent's execute phase.
    fn dynamic_node_registered(&self, path: &NodePath) {
        let _ = path;
    }

    /// A running node published a reporting entry.
    fn reporting_entry_published(&self, path: &NodePath, entry: &ReportEntry) {
        let _ = (path, entry);
    }
}

/// Receives discovery-phase events.
pub trait DiscoveryListener: Send + Sync {
    /// Discovery is starting for a request.
    fn discovery_started(&self) {}

    /// An engine reported a discovery issue.
    fn issue_encountered(&self, engine_path: &NodePath, issue: &DiscoveryIssue) {
        let _ = (engine_path, issue);
    }

    /// Discovery finished for a request.
    fn discovery_finished(&self) {}
}

/// Execution listener that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExecutionListener;

impl ExecutionListener for NoopExecutionListener {}

/// Discovery listener that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiscoveryListener;

impl DiscoveryListener for NoopDiscoveryListener {}
