//! The hierarchical runner: one state machine per node, applied depth-first
//!
//! Every node passes through PREPARE, SKIP_CHECK, BEFORE, EXECUTE, AFTER
//! and CLEANUP in that order. Failures in any phase before CLEANUP become
//! the node's FAILED result; CLEANUP failures are logged only. Containers
//! execute by dispatching their children and fail with an aggregate
//! failure when any descendant fails.
//!
//! ## Contract
//!
//! - `node_started`/`node_finished` fire exactly once per node, including
//!   nodes that were skipped, aborted, or never reached.
//! - Resource locks are acquired before PREPARE and held through CLEANUP.
//! - The cancellation token is polled before each node, before BEFORE and
//!   before EXECUTE; a cancelled node and its unreached descendants
//!   finish as ABORTED.
//! - Children of a container run in parallel only when the container opts
//!   in, parallelism is enabled, and the children's lock sets are
//!   pairwise compatible.

use crate::behavior::{ActionFn, BehaviorRegistry, ContextBackend, NodeBehavior, TestContext};
use crate::collector::{run_protected, FailureCollector};
use crate::extension::{ExtensionRegistry, Invocation};
use crate::locks::{LockSet, ResourceLockCoordinator};
use crate::store::ContextStore;
use gantry_core::{
    CancellationToken, Error, ExecutionListener, ExecutionRequest, NodeId, NodePath, ReportEntry,
    Result, SkipDecision, TestFailure, TestNode, TestResult, TestTree,
};
use parking_lot::RwLock;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes a discovered tree against registered behaviors.
pub struct HierarchicalRunner {
    behaviors: Arc<BehaviorRegistry>,
    locks: Arc<ResourceLockCoordinator>,
}

impl HierarchicalRunner {
    /// Create a runner over the given behavior registry.
    pub fn new(behaviors: Arc<BehaviorRegistry>) -> Self {
        HierarchicalRunner {
            behaviors,
            locks: Arc::new(ResourceLockCoordinator::new()),
        }
    }

    /// Share a lock coordinator with other runners, so resource claims
    /// hold across engines.
    pub fn with_lock_coordinator(mut self, locks: Arc<ResourceLockCoordinator>) -> Self {
        self.locks = locks;
        self
    }

    /// Run the whole tree. Node failures become results, not errors; an
    /// `Err` here means the run could not be set up at all.
    pub fn execute(&self, request: ExecutionRequest) -> Result<()> {
        let ExecutionRequest {
            tree,
            listener,
            token,
            config,
        } = request;
        let pool = match config.max_workers() {
            0 => None,
            workers => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|index| format!("gantry-worker-{index}"))
                    .build()
                    .map_err(|e| {
                        Error::InvalidOperation(format!("failed to build worker pool: {e}"))
                    })?,
            ),
        };
        let state = ExecutionState {
            tree: RwLock::new(tree),
            behaviors: Arc::clone(&self.behaviors),
            locks: Arc::clone(&self.locks),
            listener,
            token,
            parallel_enabled: config.parallel_enabled(),
            pool,
        };
        let root = state.tree.read().root();
        let result = run_node(&state, root, &ExtensionRegistry::root(), &ContextStore::root());
        debug!(%result, "tree execution finished");
        Ok(())
    }
}

struct ExecutionState {
    tree: RwLock<TestTree>,
    behaviors: Arc<BehaviorRegistry>,
    locks: Arc<ResourceLockCoordinator>,
    listener: Arc<dyn ExecutionListener>,
    token: CancellationToken,
    parallel_enabled: bool,
    pool: Option<rayon::ThreadPool>,
}

impl ContextBackend for ExecutionState {
    fn register_dynamic_test(
        &self,
        parent: &NodePath,
        name: &str,
        action: ActionFn,
    ) -> Result<NodePath> {
        let path = {
            let mut tree = self.tree.write();
            let parent_id = tree
                .find(parent)
                .ok_or_else(|| Error::UnknownNode(parent.clone()))?;
            if !tree.get(parent_id).supports_dynamic_children() {
                return Err(Error::InvalidOperation(format!(
                    "node '{parent}' does not support dynamic children"
                )));
            }
            let path = parent.append("dynamic", name)?;
            tree.add_child(parent_id, TestNode::test(path.clone(), name))?;
            path
        };
        let mut behavior = NodeBehavior::new();
        behavior.action = Some(action);
        self.behaviors.register(path.clone(), behavior);
        self.listener.dynamic_node_registered(&path);
        Ok(path)
    }

    fn publish_entry(&self, path: &NodePath, entry: &ReportEntry) {
        self.listener.reporting_entry_published(path, entry);
    }
}

/// Report a subtree that will never run, one START/FINISH pair per node.
fn report_unreached(state: &ExecutionState, id: NodeId, result: &TestResult) {
    let (path, children) = {
        let tree = state.tree.read();
        let node = tree.get(id);
        (node.path().clone(), node.children().to_vec())
    };
    state.listener.node_started(&path);
    for child in children {
        report_unreached(state, child, result);
    }
    state.listener.node_finished(&path, result);
}

fn run_node(
    state: &ExecutionState,
    id: NodeId,
    parent_registry: &Arc<ExtensionRegistry>,
    parent_store: &Arc<ContextStore>,
) -> TestResult {
    if state.token.is_cancellation_requested() {
        report_unreached(state, id, &TestResult::Aborted);
        return TestResult::Aborted;
    }

    let (path, display_name, tags, is_container, concurrent, initial_children, lock_set) = {
        let tree = state.tree.read();
        let node = tree.get(id);
        (
            node.path().clone(),
            node.display_name().to_string(),
            node.tags().clone(),
            node.is_container(),
            node.allows_concurrent_children(),
            node.children().to_vec(),
            // Keys an ancestor already holds are inherited, not re-acquired
            LockSet::effective(&tree, id)
                .minus_keys_of(&LockSet::held_by_ancestors(&tree, id)),
        )
    };

    state.listener.node_started(&path);
    let behavior = state.behaviors.get(&path);
    let store = ContextStore::child_of(parent_store);
    let registry = ExtensionRegistry::child_of(parent_registry, behavior.extensions.clone());
    let extensions = registry.ancestors_first();
    let context = TestContext::new(
        path.clone(),
        display_name,
        tags,
        Arc::clone(&store),
        state.token.clone(),
        state,
    );
    let guards = state.locks.acquire(&lock_set);
    let mut collector = FailureCollector::new();

    // PREPARE
    if let Some(prepare) = &behavior.prepare {
        collector.execute(|| prepare(&context));
    }

    // SKIP_CHECK
    let mut skipped: Option<Option<String>> = None;
    if !collector.has_failure() {
        if let Some(skip) = &behavior.skip {
            match run_protected(|| skip(&context)) {
                Ok(SkipDecision::Proceed) => {}
                Ok(SkipDecision::Skip(reason)) => skipped = Some(reason),
                Err(failure) => collector.record(failure),
            }
        }
    }
    if let Some(reason) = &skipped {
        // Descendants of a skipped container inherit its reason
        let child_result = TestResult::Skipped(reason.clone());
        for child in &initial_children {
            report_unreached(state, *child, &child_result);
        }
    }

    // BEFORE: ancestors first; a failure stops the chain but keeps its
    // position so the paired after still runs
    let mut aborted = false;
    let mut invoked = 0;
    if skipped.is_none() && !collector.has_failure() {
        if state.token.is_cancellation_requested() {
            aborted = true;
        } else {
            for (index, extension) in extensions.iter().enumerate() {
                invoked = index + 1;
                if let Some(before) = extension.as_before() {
                    if !collector.execute(|| before.before(&context)) {
                        break;
                    }
                }
            }
        }
    }

    // EXECUTE
    let mut children_dispatched = false;
    if skipped.is_none() && !collector.has_failure() && !aborted {
        if state.token.is_cancellation_requested() {
            aborted = true;
        } else {
            let mut failed_children = 0;
            if is_container {
                children_dispatched = true;
                let results =
                    dispatch_children(state, &initial_children, concurrent, &registry, &store);
                failed_children += results.iter().filter(|r| r.is_failure()).count();
            } else if let Some(action) = &behavior.action {
                collector.execute(|| Invocation::new(&extensions, action).proceed(&context));
            }
            // Children registered during the execute phase run now,
            // sequentially, after the phase that produced them
            let mut seen = initial_children.len();
            loop {
                let pending: Vec<NodeId> = {
                    let tree = state.tree.read();
                    tree.get(id)
                        .children()
                        .get(seen..)
                        .map(<[NodeId]>::to_vec)
                        .unwrap_or_default()
                };
                if pending.is_empty() {
                    break;
                }
                seen += pending.len();
                for child in pending {
                    let result = run_node(state, child, &registry, &store);
                    if result.is_failure() {
                        failed_children += 1;
                    }
                }
            }
            if failed_children > 0 {
                collector.record(TestFailure::new(format!(
                    "{failed_children} descendant node(s) failed"
                )));
            }
        }
    }

    // A container that never reached EXECUTE still owes its children a
    // START/FINISH pair
    if is_container && skipped.is_none() && !children_dispatched {
        for child in &initial_children {
            report_unreached(state, *child, &TestResult::Aborted);
        }
    }

    // AFTER: reverse order over the positions BEFORE actually reached
    for extension in extensions[..invoked].iter().rev() {
        if let Some(after) = extension.as_after() {
            collector.execute(|| after.after(&context));
        }
    }

    let result = if let Some(reason) = skipped {
        TestResult::Skipped(reason)
    } else if let Some(failure) = collector.into_failure() {
        TestResult::Failed(failure)
    } else if aborted {
        TestResult::Aborted
    } else {
        TestResult::Successful
    };

    // Watchers observe the final result; their panics never change it
    for extension in extensions.iter().rev() {
        if let Some(watcher) = extension.as_watcher() {
            if catch_unwind(AssertUnwindSafe(|| watcher.on_result(&context, &result))).is_err() {
                warn!(%path, "result watcher panicked");
            }
        }
    }

    // CLEANUP
    if let Some(cleanup) = &behavior.cleanup {
        if let Err(failure) = run_protected(|| cleanup(&context)) {
            warn!(%path, %failure, "cleanup failed");
        }
    }
    store.clear_local();
    drop(guards);
    state.listener.node_finished(&path, &result);
    result
}

fn dispatch_children(
    state: &ExecutionState,
    children: &[NodeId],
    concurrent: bool,
    registry: &Arc<ExtensionRegistry>,
    store: &Arc<ContextStore>,
) -> Vec<TestResult> {
    let parallel = concurrent && state.parallel_enabled && children.len() > 1 && {
        let tree = state.tree.read();
        let sets: Vec<LockSet> = children
            .iter()
            .map(|&child| LockSet::effective(&tree, child))
            .collect();
        pairwise_compatible(&sets)
    };
    if parallel {
        debug!(count = children.len(), "dispatching children in parallel");
        let run = || {
            children
                .par_iter()
                .map(|&child| run_node(state, child, registry, store))
                .collect()
        };
        match &state.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    } else {
        children
            .iter()
            .map(|&child| run_node(state, child, registry, store))
            .collect()
    }
}

fn pairwise_compatible(sets: &[LockSet]) -> bool {
    sets.iter().enumerate().all(|(i, set)| {
        sets[i + 1..]
            .iter()
            .all(|other| set.is_compatible_with(other))
    })
}
