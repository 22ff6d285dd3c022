//! Resolution context: the mutable state threaded through one discovery call
//!
//! The context memoizes already-resolved selectors so that resolving the
//! same parent selector twice yields the same node, and tracks selectors
//! currently being resolved so that a self-referential or cyclic chain
//! aborts that branch instead of looping. All of this state is scoped to a
//! single discovery invocation; concurrent discovery calls never interfere.

use crate::issue_reporter::IssueReporter;
use crate::resolver::{Resolution, SelectorResolver};
use gantry_core::{DiscoveryIssue, DiscoverySelector, NodeId, Result, TestNode, TestTree};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

/// Per-invocation resolution state: the tree under construction plus the
/// selector memo.
pub struct ResolutionState {
    tree: TestTree,
    memo: FxHashMap<DiscoverySelector, Option<NodeId>>,
    in_flight: FxHashSet<DiscoverySelector>,
}

impl ResolutionState {
    /// Start resolving into `tree` (usually containing only the engine
    /// root).
    pub fn new(tree: TestTree) -> Self {
        ResolutionState {
            tree,
            memo: FxHashMap::default(),
            in_flight: FxHashSet::default(),
        }
    }

    /// Finish resolution, yielding the built tree.
    pub fn into_tree(self) -> TestTree {
        self.tree
    }
}

/// The context handed to [`SelectorResolver::resolve`].
pub struct ResolutionContext<'a> {
    resolvers: &'a [Box<dyn SelectorResolver>],
    state: &'a mut ResolutionState,
    reporter: &'a mut dyn IssueReporter,
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn new(
        resolvers: &'a [Box<dyn SelectorResolver>],
        state: &'a mut ResolutionState,
        reporter: &'a mut dyn IssueReporter,
    ) -> Self {
        ResolutionContext {
            resolvers,
            state,
            reporter,
        }
    }

    /// The tree built so far.
    pub fn tree(&self) -> &TestTree {
        &self.state.tree
    }

    /// Report a discovery issue.
    pub fn report_issue(&mut self, issue: DiscoveryIssue) {
        self.reporter.report(issue);
    }

    /// Add a node produced by `factory` under the node the parent selector
    /// resolves to (the engine root when `parent` is `None`).
    ///
    /// The parent selector is resolved lazily and memoized: resolving the
    /// same selector twice returns the same node rather than rebuilding
    /// it. The factory may decline by returning `Ok(None)`. If a node with
    /// the factory's path already exists, the existing node is returned
    /// unchanged.
    pub fn add_to_parent<F>(
        &mut self,
        parent: Option<&DiscoverySelector>,
        factory: F,
    ) -> Result<Option<NodeId>>
    where
        F: FnOnce(&TestTree, NodeId) -> Result<Option<TestNode>>,
    {
        let parent_id = match parent {
            None => self.state.tree.root(),
            Some(selector) => match self.resolve_parent(selector)? {
                Some(id) => id,
                None => return Ok(None),
            },
        };
        match factory(&self.state.tree, parent_id)? {
            None => Ok(None),
            Some(node) => {
                if let Some(existing) = self.state.tree.find(node.path()) {
                    return Ok(Some(existing));
                }
                let id = self.state.tree.add_child(parent_id, node)?;
                Ok(Some(id))
            }
        }
    }

    /// Resolve a selector to at most one node for use as a parent.
    ///
    /// Expansion callbacks of matches resolved here are dropped: an
    /// ancestor materialized on the way to another node must not fan out
    /// its siblings.
    fn resolve_parent(&mut self, selector: &DiscoverySelector) -> Result<Option<NodeId>> {
        if let Some(cached) = self.state.memo.get(selector) {
            return Ok(*cached);
        }
        let resolution = self.resolve_selector(selector)?;
        let node = match resolution {
            Resolution::Match(m) => Some(m.node()),
            Resolution::Matches(ms) if ms.len() == 1 => Some(ms[0].node()),
            Resolution::Matches(_) => {
                warn!(%selector, "parent selector resolved to multiple nodes");
                None
            }
            Resolution::Unresolved => None,
        };
        self.state.memo.insert(selector.clone(), node);
        Ok(node)
    }

    /// Offer a selector to each resolver in order until one claims it.
    ///
    /// Re-resolving a selector already under active resolution aborts that
    /// branch: the selector resolves as unresolved instead of looping.
    pub(crate) fn resolve_selector(
        &mut self,
        selector: &DiscoverySelector,
    ) -> Result<Resolution> {
        if !self.state.in_flight.insert(selector.clone()) {
            debug!(%selector, "aborting cyclic resolution branch");
            return Ok(Resolution::Unresolved);
        }
        let resolvers = self.resolvers;
        let mut outcome = Resolution::Unresolved;
        for resolver in resolvers {
            let resolution = resolver.resolve(selector, self);
            match resolution {
                Ok(Resolution::Unresolved) => continue,
                Ok(resolved) => {
                    outcome = resolved;
                    break;
                }
                Err(e) => {
                    self.state.in_flight.remove(selector);
                    return Err(e);
                }
            }
        }
        self.state.in_flight.remove(selector);
        Ok(outcome)
    }
}
