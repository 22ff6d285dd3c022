//! Error types for the gantry platform
//!
//! This module defines the error taxonomy shared across the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Failures raised while running an individual test node are NOT errors in
//! this sense: they become that node's [`crate::TestResult`] and never
//! propagate structurally. The variants here cover structural bugs and
//! per-engine discovery/execution breakage.

use crate::path::{NodePath, PathParseError};
use thiserror::Error;

/// Result type alias for gantry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the gantry platform
#[derive(Debug, Error)]
pub enum Error {
    /// Two children of one parent share a node path (structural bug,
    /// fatal to the discovery call that caused it)
    #[error("duplicate node identity under '{parent}': '{child}'")]
    DuplicateIdentity {
        /// Path of the parent node
        parent: NodePath,
        /// Conflicting child path
        child: NodePath,
    },

    /// A path referenced a node that does not exist in the tree
    #[error("unknown node: '{0}'")]
    UnknownNode(NodePath),

    /// A node path could not be constructed or parsed
    #[error("invalid node path: {0}")]
    InvalidPath(#[from] PathParseError),

    /// One engine's discovery raised; isolated to that engine
    #[error("engine '{engine_id}' failed to discover tests: {message}")]
    EngineDiscovery {
        /// Identifier of the failing engine
        engine_id: String,
        /// Description of the underlying failure
        message: String,
    },

    /// The root returned by an engine does not carry its assigned path
    #[error("engine '{engine_id}' returned root '{actual}' but was assigned '{expected}'")]
    EngineRootMismatch {
        /// Identifier of the misbehaving engine
        engine_id: String,
        /// Path the orchestrator assigned
        expected: NodePath,
        /// Path the engine actually used
        actual: NodePath,
    },

    /// One engine's execution raised; isolated to that engine
    #[error("engine '{engine_id}' failed during execution: {message}")]
    EngineExecution {
        /// Identifier of the failing engine
        engine_id: String,
        /// Description of the underlying failure
        message: String,
    },

    /// One or more engines reported CRITICAL discovery issues and the
    /// launcher is configured to abort on them
    #[error("critical discovery issues reported by engine(s): {}", engine_ids.join(", "))]
    CriticalIssues {
        /// Engines that reported at least one CRITICAL issue
        engine_ids: Vec<String>,
    },

    /// Invalid operation or state (e.g. dynamic registration on a node
    /// that does not support it)
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}
