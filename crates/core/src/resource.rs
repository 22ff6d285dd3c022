//! Resource claims: exclusivity declarations attached to test nodes
//!
//! A node declares the shared resources it touches; the execution engine's
//! lock coordinator turns these claims into actual locks before the node
//! runs. READ claims are compatible with each other; any combination
//! involving READ_WRITE is incompatible.

use std::fmt;

/// Access mode of a resource claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessMode {
    /// Shared access; compatible with other readers
    Read,
    /// Exclusive access; incompatible with everything
    ReadWrite,
}

impl AccessMode {
    /// Whether two accesses to the same resource may proceed concurrently.
    pub fn is_compatible_with(self, other: AccessMode) -> bool {
        self == AccessMode::Read && other == AccessMode::Read
    }

    /// The stronger of two modes.
    pub fn strongest(self, other: AccessMode) -> AccessMode {
        self.max(other)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => f.write_str("READ"),
            AccessMode::ReadWrite => f.write_str("READ_WRITE"),
        }
    }
}

/// Which nodes a claim applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimScope {
    /// The declaring node only
    SelfOnly,
    /// The declaring node and every descendant
    SelfAndDescendants,
}

/// Declaration that a node requires access to a named resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceClaim {
    /// Resource key; claims on the same key are checked for compatibility
    pub key: String,
    /// Required access mode
    pub mode: AccessMode,
    /// Which nodes inherit the claim
    pub scope: ClaimScope,
}

impl ResourceClaim {
    /// Shared claim on the declaring node only.
    pub fn read(key: impl Into<String>) -> Self {
        ResourceClaim {
            key: key.into(),
            mode: AccessMode::Read,
            scope: ClaimScope::SelfOnly,
        }
    }

    /// Exclusive claim on the declaring node only.
    pub fn read_write(key: impl Into<String>) -> Self {
        ResourceClaim {
            key: key.into(),
            mode: AccessMode::ReadWrite,
            scope: ClaimScope::SelfOnly,
        }
    }

    /// Extend the claim to all descendants of the declaring node.
    pub fn for_descendants(mut self) -> Self {
        self.scope = ClaimScope::SelfAndDescendants;
        self
    }
}
