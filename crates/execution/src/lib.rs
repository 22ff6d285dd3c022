//! Hierarchical execution engine for the gantry test platform
//!
//! Runs a discovered test tree depth-first, one lifecycle state machine
//! per node:
//! - NodeBehavior/BehaviorRegistry: the code attached to nodes
//! - Extension and its capabilities: before/after callbacks,
//!   interceptors, result watchers
//! - ContextStore: lifecycle-scoped key/value state
//! - LockSet/ResourceLockCoordinator: resource-claim locking
//! - FailureCollector: primary/suppressed failure aggregation
//! - HierarchicalRunner: the runner itself
//! - invoke_with_timeout: running a step on a worker thread with a
//!   deadline

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod behavior;
pub mod collector;
pub mod extension;
pub mod locks;
pub mod runner;
pub mod store;
pub mod timeout;

pub use behavior::{
    ActionFn, BehaviorRegistry, CleanupFn, NodeBehavior, PrepareFn, SkipFn, TestContext,
};
pub use collector::{run_protected, FailureCollector};
pub use extension::{
    AfterCallback, BeforeCallback, Extension, ExtensionRegistry, Interceptor, Invocation, Watcher,
};
pub use locks::{LockGuards, LockSet, ResourceLockCoordinator};
pub use runner::HierarchicalRunner;
pub use store::ContextStore;
pub use timeout::invoke_with_timeout;
