//! Node behaviors: the code attached to discovered test nodes
//!
//! Discovery produces structure; behaviors supply the lifecycle callbacks
//! the runner invokes for each node. They are registered per path so that
//! the tree stays a plain data structure.

use crate::extension::Extension;
use crate::store::ContextStore;
use gantry_core::{
    CancellationToken, NodePath, ReportEntry, Result, SkipDecision, TestFailure,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// The leaf action of a test node.
pub type ActionFn = Arc<dyn Fn(&TestContext<'_>) -> std::result::Result<(), TestFailure> + Send + Sync>;

/// Skip check, evaluated after PREPARE and before BEFORE.
pub type SkipFn =
    Arc<dyn Fn(&TestContext<'_>) -> std::result::Result<SkipDecision, TestFailure> + Send + Sync>;

/// Per-node preparation, the first phase of the lifecycle.
pub type PrepareFn =
    Arc<dyn Fn(&TestContext<'_>) -> std::result::Result<(), TestFailure> + Send + Sync>;

/// Per-node cleanup; failures here are logged, never reported as results.
pub type CleanupFn =
    Arc<dyn Fn(&TestContext<'_>) -> std::result::Result<(), TestFailure> + Send + Sync>;

/// Lifecycle callbacks and extensions for one node.
#[derive(Clone, Default)]
pub struct NodeBehavior {
    pub(crate) prepare: Option<PrepareFn>,
    pub(crate) skip: Option<SkipFn>,
    pub(crate) action: Option<ActionFn>,
    pub(crate) cleanup: Option<CleanupFn>,
    pub(crate) extensions: Vec<Arc<dyn Extension>>,
}

impl NodeBehavior {
    /// A behavior with no callbacks: every phase is a no-op.
    pub fn new() -> Self {
        NodeBehavior::default()
    }

    /// Set the preparation callback.
    pub fn with_prepare<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&TestContext<'_>) -> std::result::Result<(), TestFailure> + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(prepare));
        self
    }

    /// Set the skip check.
    pub fn with_skip<F>(mut self, skip: F) -> Self
    where
        F: Fn(&TestContext<'_>) -> std::result::Result<SkipDecision, TestFailure>
            + Send
            + Sync
            + 'static,
    {
        self.skip = Some(Arc::new(skip));
        self
    }

    /// Set the leaf action.
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&TestContext<'_>) -> std::result::Result<(), TestFailure> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Set the cleanup callback.
    pub fn with_cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: Fn(&TestContext<'_>) -> std::result::Result<(), TestFailure> + Send + Sync + 'static,
    {
        self.cleanup = Some(Arc::new(cleanup));
        self
    }

    /// Register an extension on this node.
    pub fn with_extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }
}

/// Thread-safe map from node path to behavior.
#[derive(Default)]
pub struct BehaviorRegistry {
    map: RwLock<FxHashMap<NodePath, NodeBehavior>>,
}

impl BehaviorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BehaviorRegistry::default()
    }

    /// Register the behavior for `path`, replacing any previous one.
    pub fn register(&self, path: NodePath, behavior: NodeBehavior) {
        self.map.write().insert(path, behavior);
    }

    /// The behavior for `path`; a no-op behavior when none is registered.
    pub fn get(&self, path: &NodePath) -> NodeBehavior {
        self.map.read().get(path).cloned().unwrap_or_default()
    }
}

/// Interface the runner exposes to running callbacks.
pub(crate) trait ContextBackend: Sync {
    /// Register a dynamic child under `parent`, returning its path.
    fn register_dynamic_test(
        &self,
        parent: &NodePath,
        name: &str,
        action: ActionFn,
    ) -> Result<NodePath>;

    /// Publish a reporting entry on behalf of `path`.
    fn publish_entry(&self, path: &NodePath, entry: &ReportEntry);
}

/// Everything a callback may see and do while its node runs.
pub struct TestContext<'a> {
    path: NodePath,
    display_name: String,
    tags: BTreeSet<String>,
    store: Arc<ContextStore>,
    token: CancellationToken,
    backend: &'a dyn ContextBackend,
}

impl<'a> TestContext<'a> {
    pub(crate) fn new(
        path: NodePath,
        display_name: String,
        tags: BTreeSet<String>,
        store: Arc<ContextStore>,
        token: CancellationToken,
        backend: &'a dyn ContextBackend,
    ) -> Self {
        TestContext {
            path,
            display_name,
            tags,
            store,
            token,
            backend,
        }
    }

    /// The running node's path.
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// The running node's display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The running node's tags.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// The node's layered key/value store.
    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// The run's cancellation token, for long actions that want to poll.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Publish key/value reporting data for this node.
    pub fn publish_report_entry(&self, entry: ReportEntry) {
        self.backend.publish_entry(&self.path, &entry);
    }

    /// Register a dynamic test under the running node.
    ///
    /// Fails unless the node was discovered with dynamic-children support.
    /// The child runs after the current execute phase returns.
    pub fn register_dynamic_test<F>(&self, name: &str, action: F) -> Result<NodePath>
    where
        F: Fn(&TestContext<'_>) -> std::result::Result<(), TestFailure> + Send + Sync + 'static,
    {
        self.backend
            .register_dynamic_test(&self.path, name, Arc::new(action))
    }
}
