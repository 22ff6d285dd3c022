//! Per-engine discovery orchestration
//!
//! Runs every registered engine's discovery in registration order, each
//! one isolated: a failing or panicking engine contributes an errored
//! placeholder root instead of taking the whole request down. Post
//! filters and pruning run per engine tree; CRITICAL issues abort the
//! request afterwards when so configured.

use crate::engine_filter::EngineFilterer;
use crate::launcher::LauncherRequest;
use crate::listeners::{CompositeDiscoveryListener, IssueCollectingListener};
use gantry_core::{
    compose_filters, DiscoveryListener, DiscoveryRequest, Error, FilterResult, NodePath,
    PostDiscoveryFilter, Result, TestEngine, TestNode, TestTree,
};
use rustc_hash::FxHashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One engine's contribution to a test plan.
pub struct EngineRun {
    engine: Arc<dyn TestEngine>,
    tree: TestTree,
    error: Option<String>,
}

impl EngineRun {
    /// The engine that produced this run.
    pub fn engine_id(&self) -> &str {
        self.engine.id()
    }

    /// The discovered (filtered, pruned) tree.
    pub fn tree(&self) -> &TestTree {
        &self.tree
    }

    /// Whether discovery failed for this engine.
    pub fn errored(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn into_parts(self) -> (Arc<dyn TestEngine>, TestTree, Option<String>) {
        (self.engine, self.tree, self.error)
    }
}

/// The outcome of a discovery request across all engines.
pub struct TestPlan {
    runs: Vec<EngineRun>,
}

impl TestPlan {
    /// Per-engine runs in registration order.
    pub fn runs(&self) -> &[EngineRun] {
        &self.runs
    }

    /// Whether any engine discovered at least one test.
    pub fn contains_tests(&self) -> bool {
        self.runs
            .iter()
            .any(|run| run.tree.contains_tests(run.tree.root()))
    }

    /// All discovered paths across engines, pre-order per engine.
    pub fn paths(&self) -> Vec<NodePath> {
        self.runs.iter().flat_map(|run| run.tree.paths()).collect()
    }

    pub(crate) fn into_runs(self) -> Vec<EngineRun> {
        self.runs
    }
}

/// Drives discovery for a launcher request.
pub struct DiscoveryOrchestrator;

impl DiscoveryOrchestrator {
    /// Discover across `engines`, honoring the request's engine filters,
    /// post filters, and critical-issue configuration.
    pub fn discover(
        engines: &[Arc<dyn TestEngine>],
        request: &LauncherRequest,
    ) -> Result<TestPlan> {
        let filterer = EngineFilterer::new(request.engine_filters().to_vec());
        let engines = filterer.apply(engines);

        let collector = Arc::new(IssueCollectingListener::new());
        let mut delegates = request.discovery_listeners().to_vec();
        delegates.push(Arc::clone(&collector) as Arc<dyn DiscoveryListener>);
        let listener: Arc<dyn DiscoveryListener> =
            Arc::new(CompositeDiscoveryListener::new(delegates));

        listener.discovery_started();
        let mut runs = Vec::with_capacity(engines.len());
        for engine in engines {
            runs.push(discover_one(engine, request, &listener)?);
        }
        listener.discovery_finished();

        if request.config().fail_on_critical_issues() {
            let mut engine_ids: Vec<String> = Vec::new();
            for (engine_path, issue) in collector.issues() {
                if issue.is_critical() {
                    let id = engine_path.last_segment().value().to_string();
                    if !engine_ids.contains(&id) {
                        engine_ids.push(id);
                    }
                }
            }
            if !engine_ids.is_empty() {
                return Err(Error::CriticalIssues { engine_ids });
            }
        }
        Ok(TestPlan { runs })
    }
}

fn discover_one(
    engine: Arc<dyn TestEngine>,
    request: &LauncherRequest,
    listener: &Arc<dyn DiscoveryListener>,
) -> Result<EngineRun> {
    let engine_id = engine.id().to_string();
    let root_path = NodePath::for_engine(&engine_id)?;
    let discovery_request = DiscoveryRequest {
        selectors: request.selectors().to_vec(),
        config: request.config().clone(),
        listener: Arc::clone(listener),
    };

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        engine.discover(&discovery_request, root_path.clone())
    }));
    let (mut tree, error) = match outcome {
        Ok(Ok(tree)) => {
            let actual = tree.get(tree.root()).path().clone();
            if actual == root_path {
                debug!(engine_id, nodes = tree.len(), "engine discovery finished");
                (tree, None)
            } else {
                let err = Error::EngineRootMismatch {
                    engine_id: engine_id.clone(),
                    expected: root_path.clone(),
                    actual,
                };
                warn!(%err, "discarding engine discovery result");
                (errored_placeholder(root_path, &engine_id), Some(err.to_string()))
            }
        }
        Ok(Err(e)) => {
            let err = Error::EngineDiscovery {
                engine_id: engine_id.clone(),
                message: e.to_string(),
            };
            warn!(%err, "engine discovery failed");
            (errored_placeholder(root_path, &engine_id), Some(err.to_string()))
        }
        Err(payload) => {
            let message = panic_message(payload);
            warn!(engine_id, message, "engine discovery panicked");
            let err = Error::EngineDiscovery {
                engine_id: engine_id.clone(),
                message,
            };
            (errored_placeholder(root_path, &engine_id), Some(err.to_string()))
        }
    };
    if error.is_none() {
        apply_post_filters(&mut tree, request.post_filters());
        tree.prune();
    }
    Ok(EngineRun { engine, tree, error })
}

fn errored_placeholder(root_path: NodePath, engine_id: &str) -> TestTree {
    TestTree::new(TestNode::container(
        root_path,
        format!("{engine_id} (discovery failed)"),
    ))
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "engine panicked during discovery".to_string()
    }
}

/// Remove excluded test nodes (and excluded childless containers),
/// logging exclusions grouped by reason.
fn apply_post_filters(tree: &mut TestTree, filters: &[Arc<dyn PostDiscoveryFilter>]) {
    if filters.is_empty() {
        return;
    }
    let root = tree.root();
    let mut excluded = Vec::new();
    tree.accept(&mut |id, node| {
        if id == root {
            return;
        }
        if let FilterResult::Excluded(reason) = compose_filters(filters, node) {
            // Containers with children stay; their descendants decide
            if node.is_test() || node.children().is_empty() {
                excluded.push((id, reason));
            }
        }
    });
    let mut by_reason: FxHashMap<String, usize> = FxHashMap::default();
    for (id, reason) in excluded {
        *by_reason.entry(reason).or_insert(0) += 1;
        if let Err(e) = tree.remove_subtree(id) {
            warn!(%e, "failed to remove excluded node");
        }
    }
    for (reason, count) in by_reason {
        info!(count, reason, "nodes excluded by post-discovery filters");
    }
}
