//! The selector-resolver protocol
//!
//! Each resolver accepts the selection-criterion variants it recognizes and
//! maps them onto tree nodes through the [`ResolutionContext`]. A resolver
//! must treat malformed structural relationships as unresolved rather than
//! raising; structural validity is a precondition, not an error condition.

use crate::context::ResolutionContext;
use gantry_core::{DiscoverySelector, NodeId, Result};

/// Lazily-evaluated callback yielding further selectors for a match's
/// descendants. Invoked only when the match was resolved exactly, so that a
/// subtree is not expanded eagerly when only its root is needed as an
/// ancestor.
pub type ExpansionCallback = Box<dyn FnOnce() -> Vec<DiscoverySelector> + Send>;

/// One concrete node produced by resolving a selector.
pub struct ResolverMatch {
    node: NodeId,
    exact: bool,
    expansion: Option<ExpansionCallback>,
}

impl ResolverMatch {
    /// A match for the selector itself; its expansion will be enqueued.
    pub fn exact(node: NodeId) -> Self {
        ResolverMatch {
            node,
            exact: true,
            expansion: None,
        }
    }

    /// A match materialized only as an ancestor on the way to another
    /// node; its expansion is never invoked.
    pub fn partial(node: NodeId) -> Self {
        ResolverMatch {
            node,
            exact: false,
            expansion: None,
        }
    }

    /// Attach an expansion callback.
    pub fn with_expansion<F>(mut self, expansion: F) -> Self
    where
        F: FnOnce() -> Vec<DiscoverySelector> + Send + 'static,
    {
        self.expansion = Some(Box::new(expansion));
        self
    }

    /// The matched node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Whether the selector matched this node exactly.
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Consume the match, yielding the expansion selectors (empty when no
    /// expansion was attached).
    pub fn expand(self) -> Vec<DiscoverySelector> {
        match self.expansion {
            Some(expansion) => expansion(),
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for ResolverMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverMatch")
            .field("node", &self.node)
            .field("exact", &self.exact)
            .field("has_expansion", &self.expansion.is_some())
            .finish()
    }
}

/// Outcome of offering a selector to one resolver.
#[derive(Debug)]
pub enum Resolution {
    /// The criterion was not recognized by this resolver
    Unresolved,
    /// One concrete node
    Match(ResolverMatch),
    /// Several independent nodes, e.g. multiple iterations of a templated
    /// container
    Matches(Vec<ResolverMatch>),
}

impl Resolution {
    /// Whether any node was produced.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }
}

/// A pure mapping from selection criteria onto tree nodes.
///
/// Resolvers are tried in registration order; the first one returning a
/// resolved [`Resolution`] claims the selector.
pub trait SelectorResolver: Send + Sync {
    /// Resolve one selector, creating nodes through `context` as needed.
    fn resolve(
        &self,
        selector: &DiscoverySelector,
        context: &mut ResolutionContext<'_>,
    ) -> Result<Resolution>;
}
