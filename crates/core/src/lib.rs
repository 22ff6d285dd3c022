//! Core types and traits for the gantry test platform
//!
//! This crate defines the foundational data model used throughout the
//! system:
//! - NodePath/Segment: stable node identity
//! - TestTree/TestNode: the discovered test-node tree
//! - DiscoveryIssue/Severity: discovery diagnostics
//! - DiscoverySelector: selection criteria
//! - FilterResult and engine/post-discovery filters
//! - TestResult/TestFailure/SkipDecision: per-node outcomes
//! - ExecutionListener/DiscoveryListener: reporting interfaces
//! - TestEngine: the backend engine contract
//! - CancellationToken, ConfigParameters, Error

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancellation;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod issue;
pub mod listener;
pub mod path;
pub mod resource;
pub mod result;
pub mod selector;
pub mod tree;

// Re-export commonly used types at the crate root
pub use cancellation::CancellationToken;
pub use config::{
    ConfigParameters, FAIL_ON_CRITICAL_ISSUES_KEY, MAX_WORKERS_KEY, PARALLEL_ENABLED_KEY,
};
pub use engine::{DiscoveryRequest, ExecutionRequest, TestEngine};
pub use error::{Error, Result};
pub use filter::{
    compose_filters, EngineFilter, FilterResult, PostDiscoveryFilter, RequireAnyTagFilter,
};
pub use issue::{DiscoveryIssue, Severity, SourceLocation};
pub use listener::{
    DiscoveryListener, ExecutionListener, NoopDiscoveryListener, NoopExecutionListener,
    ReportEntry,
};
pub use path::{NodePath, PathParseError, Segment};
pub use resource::{AccessMode, ClaimScope, ResourceClaim};
pub use result::{SkipDecision, TestFailure, TestResult};
pub use selector::DiscoverySelector;
pub use tree::{NodeId, NodeKind, TestNode, TestTree};
