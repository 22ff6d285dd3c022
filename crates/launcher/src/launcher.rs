//! The launcher: the single entry point tying engines, requests, and
//! orchestration together
//!
//! A launcher owns the registered engines. `discover` produces a
//! [`TestPlan`]; `execute` always re-discovers before running so that the
//! executed tree reflects the request it was given, never a stale plan.

use crate::discovery::{DiscoveryOrchestrator, TestPlan};
use crate::execution::ExecutionOrchestrator;
use gantry_core::{
    CancellationToken, ConfigParameters, DiscoveryListener, DiscoverySelector, EngineFilter,
    ExecutionListener, PostDiscoveryFilter, Result, TestEngine,
};
use std::sync::Arc;
use tracing::warn;

/// Everything one discovery/execution request carries.
#[derive(Default, Clone)]
pub struct LauncherRequest {
    selectors: Vec<DiscoverySelector>,
    config: ConfigParameters,
    engine_filters: Vec<EngineFilter>,
    post_filters: Vec<Arc<dyn PostDiscoveryFilter>>,
    discovery_listeners: Vec<Arc<dyn DiscoveryListener>>,
    execution_listeners: Vec<Arc<dyn ExecutionListener>>,
    token: CancellationToken,
}

impl LauncherRequest {
    /// An empty request: no selectors, default configuration, disabled
    /// cancellation.
    pub fn new() -> Self {
        LauncherRequest::default()
    }

    /// Add a selector.
    pub fn with_selector(mut self, selector: DiscoverySelector) -> Self {
        self.selectors.push(selector);
        self
    }

    /// Add several selectors.
    pub fn with_selectors(mut self, selectors: impl IntoIterator<Item = DiscoverySelector>) -> Self {
        self.selectors.extend(selectors);
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: ConfigParameters) -> Self {
        self.config = config;
        self
    }

    /// Set one configuration parameter.
    pub fn with_config_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.config.set(key, value);
        self
    }

    /// Add an engine include/exclude filter.
    pub fn with_engine_filter(mut self, filter: EngineFilter) -> Self {
        self.engine_filters.push(filter);
        self
    }

    /// Add a post-discovery filter.
    pub fn with_post_filter(mut self, filter: Arc<dyn PostDiscoveryFilter>) -> Self {
        self.post_filters.push(filter);
        self
    }

    /// Register a discovery listener.
    pub fn with_discovery_listener(mut self, listener: Arc<dyn DiscoveryListener>) -> Self {
        self.discovery_listeners.push(listener);
        self
    }

    /// Register an execution listener.
    pub fn with_execution_listener(mut self, listener: Arc<dyn ExecutionListener>) -> Self {
        self.execution_listeners.push(listener);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// The request's selectors.
    pub fn selectors(&self) -> &[DiscoverySelector] {
        &self.selectors
    }

    /// The request's configuration.
    pub fn config(&self) -> &ConfigParameters {
        &self.config
    }

    /// The engine filters.
    pub fn engine_filters(&self) -> &[EngineFilter] {
        &self.engine_filters
    }

    /// The post-discovery filters.
    pub fn post_filters(&self) -> &[Arc<dyn PostDiscoveryFilter>] {
        &self.post_filters
    }

    /// The registered discovery listeners.
    pub fn discovery_listeners(&self) -> &[Arc<dyn DiscoveryListener>] {
        &self.discovery_listeners
    }

    /// The registered execution listeners.
    pub fn execution_listeners(&self) -> &[Arc<dyn ExecutionListener>] {
        &self.execution_listeners
    }

    /// The cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Builds a [`Launcher`] from registered engines.
#[derive(Default)]
pub struct LauncherBuilder {
    engines: Vec<Arc<dyn TestEngine>>,
}

impl LauncherBuilder {
    /// Start with no engines.
    pub fn new() -> Self {
        LauncherBuilder::default()
    }

    /// Register an engine. Order matters: discovery and execution follow
    /// registration order.
    pub fn with_engine(mut self, engine: Arc<dyn TestEngine>) -> Self {
        self.engines.push(engine);
        self
    }

    /// Finish building.
    pub fn build(self) -> Launcher {
        if self.engines.is_empty() {
            warn!("launcher built without any registered engines");
        }
        Launcher {
            engines: self.engines,
        }
    }
}

/// The multi-engine front door.
pub struct Launcher {
    engines: Vec<Arc<dyn TestEngine>>,
}

impl Launcher {
    /// Start building a launcher.
    pub fn builder() -> LauncherBuilder {
        LauncherBuilder::new()
    }

    /// Discover across all registered engines.
    pub fn discover(&self, request: &LauncherRequest) -> Result<TestPlan> {
        DiscoveryOrchestrator::discover(&self.engines, request)
    }

    /// Discover and execute. Discovery always runs fresh here.
    pub fn execute(&self, request: &LauncherRequest) -> Result<()> {
        let plan = self.discover(request)?;
        ExecutionOrchestrator::execute(plan, request)
    }
}
