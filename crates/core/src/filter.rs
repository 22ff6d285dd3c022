//! Inclusion/exclusion filters over engines and discovered nodes
//!
//! Filter outcomes are explicit values, not errors: a node is either
//! included or excluded with a human-readable reason. Engine filters apply
//! only at the top level (whole engines); post-discovery filters apply to
//! any node.

use crate::tree::TestNode;
use std::sync::Arc;

/// Outcome of applying a filter to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterResult {
    /// The node passes the filter
    Included,
    /// The node is excluded, with a reason for diagnostics
    Excluded(String),
}

impl FilterResult {
    /// Exclude with a reason.
    pub fn excluded(reason: impl Into<String>) -> Self {
        FilterResult::Excluded(reason.into())
    }

    /// Whether the node was excluded.
    pub fn is_excluded(&self) -> bool {
        matches!(self, FilterResult::Excluded(_))
    }

    /// The exclusion reason, if excluded.
    pub fn reason(&self) -> Option<&str> {
        match self {
            FilterResult::Excluded(reason) => Some(reason),
            FilterResult::Included => None,
        }
    }
}

/// A predicate over discovered nodes, applied after all engines finish
/// discovery.
pub trait PostDiscoveryFilter: Send + Sync {
    /// Apply the filter to a node.
    fn apply(&self, node: &TestNode) -> FilterResult;
}

impl<F> PostDiscoveryFilter for F
where
    F: Fn(&TestNode) -> FilterResult + Send + Sync,
{
    fn apply(&self, node: &TestNode) -> FilterResult {
        self(node)
    }
}

/// Compose filters into a single predicate: a node is excluded as soon as
/// any filter excludes it, and the first exclusion reason wins.
pub fn compose_filters(
    filters: &[Arc<dyn PostDiscoveryFilter>],
    node: &TestNode,
) -> FilterResult {
    for filter in filters {
        if let FilterResult::Excluded(reason) = filter.apply(node) {
            return FilterResult::Excluded(reason);
        }
    }
    FilterResult::Included
}

/// Filter over whole engines by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFilter {
    /// Only engines with one of these ids take part in discovery
    Include(Vec<String>),
    /// Engines with one of these ids are excluded from discovery
    Exclude(Vec<String>),
}

impl EngineFilter {
    /// Include only the named engines.
    pub fn include<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EngineFilter::Include(ids.into_iter().map(Into::into).collect())
    }

    /// Exclude the named engines.
    pub fn exclude<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EngineFilter::Exclude(ids.into_iter().map(Into::into).collect())
    }

    /// Apply the filter to an engine id.
    pub fn apply(&self, engine_id: &str) -> FilterResult {
        match self {
            EngineFilter::Include(ids) => {
                if ids.iter().any(|id| id == engine_id) {
                    FilterResult::Included
                } else {
                    FilterResult::Excluded(format!(
                        "engine '{engine_id}' is not in the include list"
                    ))
                }
            }
            EngineFilter::Exclude(ids) => {
                if ids.iter().any(|id| id == engine_id) {
                    FilterResult::Excluded(format!("engine '{engine_id}' is excluded"))
                } else {
                    FilterResult::Included
                }
            }
        }
    }
}

/// Post-discovery filter excluding test nodes that carry none of the
/// required tags. Containers are always included so that filtering decides
/// on leaves and pruning cleans up emptied branches.
pub struct RequireAnyTagFilter {
    tags: Vec<String>,
}

impl RequireAnyTagFilter {
    /// Require at least one of the given tags on every test node.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RequireAnyTagFilter {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl PostDiscoveryFilter for RequireAnyTagFilter {
    fn apply(&self, node: &TestNode) -> FilterResult {
        if node.is_container() {
            return FilterResult::Included;
        }
        if self.tags.iter().any(|tag| node.tags().contains(tag)) {
            FilterResult::Included
        } else {
            FilterResult::Excluded(format!(
                "excluded because it carries none of the tags [{}]",
                self.tags.join(", ")
            ))
        }
    }
}
