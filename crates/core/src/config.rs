//! Configuration parameters for discovery and execution
//!
//! A flat string map with typed accessors and frozen defaults, carried on
//! every discovery/execution request. Unknown keys are ignored; malformed
//! values fall back to the default with a warning.

use rustc_hash::FxHashMap;
use tracing::warn;

/// Enables parallel execution of container children that opt in.
pub const PARALLEL_ENABLED_KEY: &str = "gantry.execution.parallel.enabled";

/// Upper bound on worker threads used for parallel children.
pub const MAX_WORKERS_KEY: &str = "gantry.execution.parallel.max_workers";

/// Aborts discovery with an aggregate error when any engine reports a
/// CRITICAL issue.
pub const FAIL_ON_CRITICAL_ISSUES_KEY: &str = "gantry.discovery.fail_on_critical_issues";

/// String-keyed configuration with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct ConfigParameters {
    values: FxHashMap<String, String>,
}

impl ConfigParameters {
    /// Create an empty configuration (all defaults).
    pub fn new() -> Self {
        ConfigParameters::default()
    }

    /// Set a parameter.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Raw string lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Boolean lookup with a default for missing or malformed values.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(raw) => match raw.parse() {
                Ok(value) => value,
                Err(_) => {
                    warn!(key, value = raw, "ignoring malformed boolean config value");
                    default
                }
            },
        }
    }

    /// Integer lookup with a default for missing or malformed values.
    pub fn get_usize(&self, key: &str, default: usize) -> usize {
        match self.get(key) {
            None => default,
            Some(raw) => match raw.parse() {
                Ok(value) => value,
                Err(_) => {
                    warn!(key, value = raw, "ignoring malformed integer config value");
                    default
                }
            },
        }
    }

    /// Whether parallel execution of opted-in containers is enabled
    /// (default: true).
    pub fn parallel_enabled(&self) -> bool {
        self.get_bool(PARALLEL_ENABLED_KEY, true)
    }

    /// Worker bound for parallel children (default: 0, meaning the
    /// scheduler's own default).
    pub fn max_workers(&self) -> usize {
        self.get_usize(MAX_WORKERS_KEY, 0)
    }

    /// Whether discovery aborts on CRITICAL issues (default: true).
    pub fn fail_on_critical_issues(&self) -> bool {
        self.get_bool(FAIL_ON_CRITICAL_ISSUES_KEY, true)
    }
}
