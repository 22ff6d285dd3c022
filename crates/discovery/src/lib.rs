//! Selector-resolution protocol for the gantry test platform
//!
//! This crate turns selection criteria into test-node trees:
//! - SelectorResolver: per-criterion resolution implemented by engines
//! - Resolution/ResolverMatch: match results with lazy expansion
//! - ResolutionContext: memoized `add_to_parent` with cycle-abort
//! - DiscoveryRequestResolver: the queue-driven resolution loop
//! - IssueReporter: collecting/forwarding/deduplicating issue sinks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod issue_reporter;
pub mod request_resolver;
pub mod resolver;

pub use context::{ResolutionContext, ResolutionState};
pub use issue_reporter::{
    CollectingReporter, DeduplicatingReporter, ForwardingReporter, IssueReporter,
};
pub use request_resolver::DiscoveryRequestResolver;
pub use resolver::{ExpansionCallback, Resolution, ResolverMatch, SelectorResolver};
