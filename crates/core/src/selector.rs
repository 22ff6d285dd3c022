//! Selection criteria: opaque descriptions of what to discover
//!
//! The core treats selectors as data, not code. Each backend engine's
//! resolvers decide which variants they recognize; unrecognized selectors
//! simply resolve as unresolved.

use crate::path::NodePath;
use std::fmt;

/// A selection criterion handed to discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiscoverySelector {
    /// Select a named group of tests (a class-like grouping). `enclosing`
    /// lists outer groups for nested groupings, outermost first.
    Group {
        /// Name of the group
        name: String,
        /// Enclosing group names, outermost first; empty for top-level groups
        enclosing: Vec<String>,
    },

    /// Select a single named test item within a group (a method-like unit).
    Item {
        /// Name of the containing group
        group: String,
        /// Name of the item
        name: String,
    },

    /// Select a node by its unique path.
    Path(NodePath),

    /// Select specific iterations of a templated parent.
    Iteration {
        /// Criterion selecting the templated parent
        parent: Box<DiscoverySelector>,
        /// Zero-based iteration indices to select
        indices: Vec<usize>,
    },
}

impl DiscoverySelector {
    /// Select a top-level group by name.
    pub fn group(name: impl Into<String>) -> Self {
        DiscoverySelector::Group {
            name: name.into(),
            enclosing: Vec::new(),
        }
    }

    /// Select a nested group by name with its enclosing chain.
    pub fn nested_group<I, S>(name: impl Into<String>, enclosing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DiscoverySelector::Group {
            name: name.into(),
            enclosing: enclosing.into_iter().map(Into::into).collect(),
        }
    }

    /// Select a single item by group and name.
    pub fn item(group: impl Into<String>, name: impl Into<String>) -> Self {
        DiscoverySelector::Item {
            group: group.into(),
            name: name.into(),
        }
    }

    /// Select a node by path.
    pub fn path(path: NodePath) -> Self {
        DiscoverySelector::Path(path)
    }

    /// Select iterations of a templated parent.
    pub fn iterations(parent: DiscoverySelector, indices: Vec<usize>) -> Self {
        DiscoverySelector::Iteration {
            parent: Box::new(parent),
            indices,
        }
    }
}

impl fmt::Display for DiscoverySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoverySelector::Group { name, enclosing } if enclosing.is_empty() => {
                write!(f, "group:{name}")
            }
            DiscoverySelector::Group { name, enclosing } => {
                write!(f, "group:{}${name}", enclosing.join("$"))
            }
            DiscoverySelector::Item { group, name } => write!(f, "item:{group}#{name}"),
            DiscoverySelector::Path(path) => write!(f, "path:{path}"),
            DiscoverySelector::Iteration { parent, indices } => {
                write!(f, "iterations:{parent}@{indices:?}")
            }
        }
    }
}
