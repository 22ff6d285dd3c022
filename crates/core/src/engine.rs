//! The backend engine contract and the requests handed to engines
//!
//! Engines are external collaborators: each one knows how to turn selection
//! criteria into a tree of test nodes and how to drive the execution engine
//! over that tree. The launcher isolates engines from each other; a
//! misbehaving engine fails only itself.

use crate::cancellation::CancellationToken;
use crate::config::ConfigParameters;
use crate::error::Result;
use crate::listener::{DiscoveryListener, ExecutionListener};
use crate::path::NodePath;
use crate::selector::DiscoverySelector;
use crate::tree::TestTree;
use std::sync::Arc;

/// Request handed to [`TestEngine::discover`].
#[derive(Clone)]
pub struct DiscoveryRequest {
    /// Selection criteria to resolve
    pub selectors: Vec<DiscoverySelector>,
    /// Configuration parameters for this discovery
    pub config: ConfigParameters,
    /// Listener for discovery events; engines report issues through it
    pub listener: Arc<dyn DiscoveryListener>,
}

impl DiscoveryRequest {
    /// Create a request with the given selectors and default configuration.
    pub fn new(selectors: Vec<DiscoverySelector>) -> Self {
        DiscoveryRequest {
            selectors,
            config: ConfigParameters::new(),
            listener: Arc::new(crate::listener::NoopDiscoveryListener),
        }
    }
}

/// Request handed to [`TestEngine::execute`].
pub struct ExecutionRequest {
    /// The engine's previously discovered tree
    pub tree: TestTree,
    /// Listener receiving one START/FINISH pair per node
    pub listener: Arc<dyn ExecutionListener>,
    /// Cancellation token polled at node-transition boundaries
    pub token: CancellationToken,
    /// Configuration parameters for this execution
    pub config: ConfigParameters,
}

/// A backend test engine: one independent discovery/execution backend
/// registered with the launcher.
pub trait TestEngine: Send + Sync {
    /// Stable identifier; the launcher derives the engine's root path from
    /// it.
    fn id(&self) -> &str;

    /// Discover tests for the request. The returned tree's root must carry
    /// `root_path`; failures are isolated per engine by the launcher.
    fn discover(&self, request: &DiscoveryRequest, root_path: NodePath) -> Result<TestTree>;

    /// Execute the previously discovered tree, reporting results through
    /// the request's listener.
    fn execute(&self, request: ExecutionRequest) -> Result<()>;
}
