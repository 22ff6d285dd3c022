//! Gantry - hierarchical test discovery and execution platform
//!
//! Gantry turns selection criteria into trees of test nodes and runs them
//! through a per-node lifecycle state machine, across any number of
//! independent backend engines.
//!
//! # Quick Start
//!
//! ```ignore
//! use gantry::{DiscoverySelector, Launcher, LauncherRequest};
//!
//! let launcher = Launcher::builder()
//!     .with_engine(my_engine)
//!     .build();
//!
//! let request = LauncherRequest::new()
//!     .with_selector(DiscoverySelector::group("smoke"))
//!     .with_execution_listener(my_listener);
//!
//! launcher.execute(&request)?;
//! ```
//!
//! # Architecture
//!
//! The [`Launcher`] orchestrates discovery and execution across engines.
//! Engines build their trees through the selector-resolution protocol in
//! `gantry_discovery` and run them with the hierarchical runner in
//! `gantry_execution`; `gantry_core` holds the shared data model.

// Re-export the public API surface
pub use gantry_core::*;
pub use gantry_discovery::{
    CollectingReporter, DeduplicatingReporter, DiscoveryRequestResolver, ForwardingReporter,
    IssueReporter, Resolution, ResolutionContext, ResolverMatch, SelectorResolver,
};
pub use gantry_execution::{
    invoke_with_timeout, AfterCallback, BeforeCallback, BehaviorRegistry, ContextStore, Extension,
    ExtensionRegistry, HierarchicalRunner, Interceptor, Invocation, NodeBehavior,
    ResourceLockCoordinator, TestContext, Watcher,
};
pub use gantry_launcher::{
    DiscoveryOrchestrator, EngineFilterer, ExecutionOrchestrator, Launcher, LauncherBuilder,
    LauncherRequest, TestPlan,
};
