//! Multi-engine orchestration for the gantry test platform
//!
//! The launcher is the platform's front door:
//! - Launcher/LauncherBuilder/LauncherRequest: engine registration and
//!   request assembly
//! - DiscoveryOrchestrator/TestPlan: per-engine discovery with isolation,
//!   filtering, pruning, and critical-issue abort
//! - ExecutionOrchestrator: per-engine execution with isolation and
//!   cancellation
//! - Composite listeners with per-listener panic containment

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod discovery;
pub mod engine_filter;
pub mod execution;
pub mod launcher;
pub mod listeners;

pub use discovery::{DiscoveryOrchestrator, EngineRun, TestPlan};
pub use engine_filter::EngineFilterer;
pub use execution::ExecutionOrchestrator;
pub use launcher::{Launcher, LauncherBuilder, LauncherRequest};
pub use listeners::{
    CompositeDiscoveryListener, CompositeExecutionListener, IssueCollectingListener,
};
