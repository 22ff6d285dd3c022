//! Queue-driven resolution of a whole discovery request
//!
//! Seeds a work queue with the request's selectors, offers each one to the
//! registered resolvers in order, and enqueues the expansion selectors of
//! exact matches until the queue drains. Unresolved selectors are logged
//! and skipped; they are not errors.

use crate::context::{ResolutionContext, ResolutionState};
use crate::issue_reporter::IssueReporter;
use crate::resolver::{Resolution, ResolverMatch, SelectorResolver};
use gantry_core::{DiscoveryRequest, DiscoverySelector, Result, TestTree};
use std::collections::VecDeque;
use tracing::debug;

/// Drives the selector-resolution protocol for one engine's discovery.
#[derive(Default)]
pub struct DiscoveryRequestResolver {
    resolvers: Vec<Box<dyn SelectorResolver>>,
}

impl DiscoveryRequestResolver {
    /// Create a resolver with no registered selector resolvers.
    pub fn new() -> Self {
        DiscoveryRequestResolver::default()
    }

    /// Register a selector resolver. Resolvers are tried in registration
    /// order.
    pub fn with_resolver(mut self, resolver: impl SelectorResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Resolve every selector of `request` into `tree`, reporting issues
    /// through `reporter`.
    pub fn resolve(
        &self,
        request: &DiscoveryRequest,
        tree: TestTree,
        reporter: &mut dyn IssueReporter,
    ) -> Result<TestTree> {
        let mut state = ResolutionState::new(tree);
        let mut queue: VecDeque<DiscoverySelector> =
            request.selectors.iter().cloned().collect();

        while let Some(selector) = queue.pop_front() {
            let resolution = {
                let mut context = ResolutionContext::new(&self.resolvers, &mut state, reporter);
                context.resolve_selector(&selector)?
            };
            match resolution {
                Resolution::Unresolved => {
                    debug!(%selector, "selector did not resolve to any node");
                }
                Resolution::Match(m) => enqueue_expansion(&mut queue, m),
                Resolution::Matches(ms) => {
                    for m in ms {
                        enqueue_expansion(&mut queue, m);
                    }
                }
            }
        }
        Ok(state.into_tree())
    }
}

// Only exact matches fan out into their descendants
fn enqueue_expansion(queue: &mut VecDeque<DiscoverySelector>, m: ResolverMatch) {
    if m.is_exact() {
        queue.extend(m.expand());
    }
}
