//! The test-node tree: immutable identity, mutable shape
//!
//! Nodes live in an arena indexed by [`NodeId`] with parent/child relations
//! stored as index pairs and a path index for O(1) re-identification. This
//! avoids ownership cycles between parents and children.
//!
//! ## Invariants
//!
//! - The parent/child relation forms a rooted tree: no cycles, at most one
//!   parent per node.
//! - No two nodes share a [`NodePath`]; `add_child` fails with
//!   [`Error::DuplicateIdentity`] otherwise.
//! - Child order is insertion order and is preserved through filtering and
//!   pruning; pruning removes nodes, never reorders survivors.
//! - Structural mutation is only legal before execution starts, except for
//!   dynamic nodes appending children from within their own execute phase.

use crate::error::{Error, Result};
use crate::issue::SourceLocation;
use crate::path::NodePath;
use crate::resource::ResourceClaim;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Index of a node within a [`TestTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Kind of a test node. The set is closed and exhaustively handled by the
/// execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// May have children; produces no result of its own beyond aggregation
    Container,
    /// Leaf that produces a pass/fail/skip outcome
    Test,
}

/// A node in the test tree.
#[derive(Debug, Clone)]
pub struct TestNode {
    path: NodePath,
    display_name: String,
    kind: NodeKind,
    source: Option<SourceLocation>,
    tags: BTreeSet<String>,
    resources: Vec<ResourceClaim>,
    concurrent_children: bool,
    supports_dynamic: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TestNode {
    /// Create a container node.
    pub fn container(path: NodePath, display_name: impl Into<String>) -> Self {
        TestNode::new(path, display_name, NodeKind::Container)
    }

    /// Create a test (leaf) node.
    pub fn test(path: NodePath, display_name: impl Into<String>) -> Self {
        TestNode::new(path, display_name, NodeKind::Test)
    }

    fn new(path: NodePath, display_name: impl Into<String>, kind: NodeKind) -> Self {
        TestNode {
            path,
            display_name: display_name.into(),
            kind,
            source: None,
            tags: BTreeSet::new(),
            resources: Vec::new(),
            concurrent_children: false,
            supports_dynamic: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Attach a source location.
    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    /// Add tags to the node.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Declare a resource claim.
    pub fn with_resource(mut self, claim: ResourceClaim) -> Self {
        self.resources.push(claim);
        self
    }

    /// Allow this node's children to run concurrently.
    pub fn with_concurrent_children(mut self) -> Self {
        self.concurrent_children = true;
        self
    }

    /// Allow this node to register children during its own execute phase.
    pub fn with_dynamic_children(mut self) -> Self {
        self.supports_dynamic = true;
        self
    }

    /// The node's unique path.
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Container or test.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Source location, if known.
    pub fn source(&self) -> Option<&SourceLocation> {
        self.source.as_ref()
    }

    /// The node's tag set.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Resource claims declared on this node.
    pub fn resources(&self) -> &[ResourceClaim] {
        &self.resources
    }

    /// Whether children may run concurrently.
    pub fn allows_concurrent_children(&self) -> bool {
        self.concurrent_children
    }

    /// Whether the node may register children at run time.
    pub fn supports_dynamic_children(&self) -> bool {
        self.supports_dynamic
    }

    /// Parent id; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node is a leaf test.
    pub fn is_test(&self) -> bool {
        self.kind == NodeKind::Test
    }

    /// Whether this node is a container.
    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }
}

/// Arena-backed tree of test nodes with a path index.
#[derive(Debug, Clone)]
pub struct TestTree {
    // Tombstoned arena: removed nodes leave a None slot so NodeIds stay stable
    nodes: Vec<Option<TestNode>>,
    index: FxHashMap<NodePath, NodeId>,
    root: NodeId,
}

impl TestTree {
    /// Create a tree containing only the given root node.
    pub fn new(root: TestNode) -> Self {
        let root_id = NodeId(0);
        let mut index = FxHashMap::default();
        index.insert(root.path().clone(), root_id);
        TestTree {
            nodes: vec![Some(root)],
            index,
            root: root_id,
        }
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node by id. Panics on a removed id; callers hold ids
    /// obtained from this tree.
    pub fn get(&self, id: NodeId) -> &TestNode {
        self.nodes[id.0].as_ref().expect("node was removed")
    }

    fn get_mut(&mut self, id: NodeId) -> &mut TestNode {
        self.nodes[id.0].as_mut().expect("node was removed")
    }

    /// Look up a node id by path.
    pub fn find(&self, path: &NodePath) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// A tree always contains at least the root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Add `child` under `parent`.
    ///
    /// The child's path must extend the parent's path by exactly one
    /// segment. Fails with [`Error::DuplicateIdentity`] if a node with the
    /// same path already exists.
    pub fn add_child(&mut self, parent: NodeId, child: TestNode) -> Result<NodeId> {
        let parent_path = self.get(parent).path().clone();
        match child.path().parent() {
            Some(ref p) if *p == parent_path => {}
            _ => {
                return Err(Error::InvalidOperation(format!(
                    "child path '{}' does not extend parent path '{}'",
                    child.path(),
                    parent_path
                )))
            }
        }
        if self.index.contains_key(child.path()) {
            return Err(Error::DuplicateIdentity {
                parent: parent_path,
                child: child.path().clone(),
            });
        }
        let id = NodeId(self.nodes.len());
        self.index.insert(child.path().clone(), id);
        let mut child = child;
        child.parent = Some(parent);
        self.nodes.push(Some(child));
        self.get_mut(parent).children.push(id);
        Ok(id)
    }

    /// Pre-order traversal over live nodes, deterministic in child order.
    pub fn accept(&self, visitor: &mut dyn FnMut(NodeId, &TestNode)) {
        self.accept_from(self.root, visitor);
    }

    fn accept_from(&self, id: NodeId, visitor: &mut dyn FnMut(NodeId, &TestNode)) {
        let node = self.get(id);
        visitor(id, node);
        for child in node.children().to_vec() {
            self.accept_from(child, visitor);
        }
    }

    /// Whether the subtree rooted at `id` contains at least one test node.
    pub fn contains_tests(&self, id: NodeId) -> bool {
        let node = self.get(id);
        if node.is_test() {
            return true;
        }
        node.children().iter().any(|&child| self.contains_tests(child))
    }

    /// Remove the subtree rooted at `id` from the tree.
    ///
    /// The root cannot be removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::InvalidOperation(
                "cannot remove the root node".to_string(),
            ));
        }
        let parent = self.get(id).parent;
        if let Some(parent) = parent {
            self.get_mut(parent).children.retain(|&c| c != id);
        }
        self.tombstone(id);
        Ok(())
    }

    fn tombstone(&mut self, id: NodeId) {
        let node = self.nodes[id.0].take().expect("node was removed");
        self.index.remove(node.path());
        for child in node.children {
            self.tombstone(child);
        }
    }

    /// Remove, bottom-up, every container with zero descendant tests.
    ///
    /// The root is never removed, even if it ends up with no children.
    pub fn prune(&mut self) {
        self.prune_from(self.root);
    }

    // Post-order: prune children first so emptied containers are caught
    fn prune_from(&mut self, id: NodeId) {
        for child in self.get(id).children().to_vec() {
            self.prune_from(child);
        }
        let node = self.get(id);
        if id != self.root && node.is_container() && node.children().is_empty() {
            let parent = node.parent;
            if let Some(parent) = parent {
                self.get_mut(parent).children.retain(|&c| c != id);
            }
            self.tombstone(id);
        }
    }

    /// Paths of all live nodes in pre-order.
    pub fn paths(&self) -> Vec<NodePath> {
        let mut paths = Vec::with_capacity(self.len());
        self.accept(&mut |_, node| paths.push(node.path().clone()));
        paths
    }
}
