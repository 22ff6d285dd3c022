//! Callback extensions: crosscutting behavior around node execution
//!
//! Extensions are registered per node and inherited by descendants. One
//! extension may implement several capabilities; the engine queries each
//! capability explicitly rather than downcasting.
//!
//! ## Contract
//!
//! - Before-callbacks run ancestors-first in registration order.
//! - After-callbacks run in exact reverse order of the before-callbacks
//!   that actually ran, including the one paired with a failed before.
//! - Interceptors wrap the leaf action innermost-last: the first
//!   registered interceptor is the outermost.
//! - Watchers observe the node's final result exactly once, newest-first;
//!   a panicking watcher is logged and never changes the result.

use crate::behavior::{ActionFn, TestContext};
use gantry_core::TestFailure;
use std::sync::Arc;

/// Runs before a node's execute phase.
pub trait BeforeCallback: Send + Sync {
    /// Called ancestors-first before the node executes.
    fn before(&self, context: &TestContext<'_>) -> Result<(), TestFailure>;
}

/// Runs after a node's execute phase, paired positionally with a
/// before-callback.
pub trait AfterCallback: Send + Sync {
    /// Called in reverse registration order during teardown.
    fn after(&self, context: &TestContext<'_>) -> Result<(), TestFailure>;
}

/// Wraps the leaf action of a test node.
pub trait Interceptor: Send + Sync {
    /// Called with the remaining invocation chain; must call
    /// [`Invocation::proceed`] to continue, or fail without doing so to
    /// short-circuit.
    fn intercept(
        &self,
        invocation: Invocation<'_>,
        context: &TestContext<'_>,
    ) -> Result<(), TestFailure>;
}

/// Observes terminal results without influencing them.
pub trait Watcher: Send + Sync {
    /// Called exactly once with the node's final result.
    fn on_result(&self, context: &TestContext<'_>, result: &gantry_core::TestResult);
}

/// A registered extension exposing zero or more capabilities.
///
/// Default implementations expose nothing; implementors override the
/// accessors for the capabilities they provide.
pub trait Extension: Send + Sync {
    /// Before-callback capability, if provided.
    fn as_before(&self) -> Option<&dyn BeforeCallback> {
        None
    }

    /// After-callback capability, if provided.
    fn as_after(&self) -> Option<&dyn AfterCallback> {
        None
    }

    /// Interceptor capability, if provided.
    fn as_interceptor(&self) -> Option<&dyn Interceptor> {
        None
    }

    /// Watcher capability, if provided.
    fn as_watcher(&self) -> Option<&dyn Watcher> {
        None
    }
}

/// The remaining chain of interceptors around a leaf action.
pub struct Invocation<'a> {
    extensions: &'a [Arc<dyn Extension>],
    action: &'a ActionFn,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(extensions: &'a [Arc<dyn Extension>], action: &'a ActionFn) -> Self {
        Invocation { extensions, action }
    }

    /// Continue with the next interceptor in the chain, or run the leaf
    /// action when the chain is exhausted.
    pub fn proceed(self, context: &TestContext<'_>) -> Result<(), TestFailure> {
        let mut rest = self.extensions;
        while let Some((head, tail)) = rest.split_first() {
            rest = tail;
            if let Some(interceptor) = head.as_interceptor() {
                return interceptor.intercept(Invocation::new(rest, self.action), context);
            }
        }
        (self.action)(context)
    }
}

/// Per-node registry of extensions with ancestor inheritance.
///
/// A node's effective extensions are its ancestors' extensions followed by
/// its own, preserving registration order within each level.
#[derive(Default)]
pub struct ExtensionRegistry {
    parent: Option<Arc<ExtensionRegistry>>,
    local: Vec<Arc<dyn Extension>>,
}

impl ExtensionRegistry {
    /// An empty root registry.
    pub fn root() -> Arc<Self> {
        Arc::new(ExtensionRegistry::default())
    }

    /// A child registry inheriting everything from `parent` plus the
    /// node's own extensions.
    pub fn child_of(parent: &Arc<ExtensionRegistry>, local: Vec<Arc<dyn Extension>>) -> Arc<Self> {
        Arc::new(ExtensionRegistry {
            parent: Some(Arc::clone(parent)),
            local,
        })
    }

    /// All effective extensions, ancestors first.
    pub fn ancestors_first(&self) -> Vec<Arc<dyn Extension>> {
        let mut all = match &self.parent {
            Some(parent) => parent.ancestors_first(),
            None => Vec::new(),
        };
        all.extend(self.local.iter().cloned());
        all
    }
}
