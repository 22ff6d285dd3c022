//! Applying engine include/exclude filters before discovery

use gantry_core::{EngineFilter, TestEngine};
use std::sync::Arc;
use tracing::{info, warn};

/// Applies a set of engine filters to the registered engines.
pub struct EngineFilterer {
    filters: Vec<EngineFilter>,
}

impl EngineFilterer {
    /// Create a filterer over the given filters.
    pub fn new(filters: Vec<EngineFilter>) -> Self {
        EngineFilterer { filters }
    }

    /// The engines that pass every filter, in registration order.
    ///
    /// Excluded engines are logged with the first exclusion reason. When
    /// filters exclude every registered engine, a warning points at a
    /// probable misconfiguration.
    pub fn apply(&self, engines: &[Arc<dyn TestEngine>]) -> Vec<Arc<dyn TestEngine>> {
        let included: Vec<Arc<dyn TestEngine>> = engines
            .iter()
            .filter(|engine| {
                let exclusion = self
                    .filters
                    .iter()
                    .find_map(|filter| filter.apply(engine.id()).reason().map(String::from));
                match exclusion {
                    Some(reason) => {
                        info!(engine_id = engine.id(), reason, "engine excluded");
                        false
                    }
                    None => true,
                }
            })
            .cloned()
            .collect();
        if included.is_empty() && !engines.is_empty() {
            warn!(
                total = engines.len(),
                "engine filters excluded every registered engine; check the filter configuration"
            );
        }
        included
    }
}
