//! Resource lock coordination for nodes with exclusivity claims
//!
//! Claims declared on test nodes are flattened into a [`LockSet`] per node
//! and acquired through a process-wide coordinator before the node's skip
//! check runs. Locks are held across the whole lifecycle, teardown
//! included, and always acquired in lexicographic key order so that two
//! nodes contending for overlapping sets cannot deadlock. A key is
//! acquired once at the node that declares it; descendants running under
//! that guard never re-acquire it, they only carry it in their effective
//! set for sibling compatibility checks.

use gantry_core::{AccessMode, ClaimScope, NodeId, TestTree};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tracing::debug;

/// The flattened, ordered set of locks one node must hold.
///
/// Keys are unique and sorted; when a node claims the same key twice, the
/// strongest mode wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockSet {
    entries: Vec<(String, AccessMode)>,
}

impl LockSet {
    /// An empty set; acquiring it is free.
    pub fn empty() -> Self {
        LockSet::default()
    }

    /// Build a set from raw `(key, mode)` pairs, deduplicating and
    /// sorting.
    pub fn from_claims<I>(claims: I) -> Self
    where
        I: IntoIterator<Item = (String, AccessMode)>,
    {
        let mut entries: Vec<(String, AccessMode)> = Vec::new();
        for (key, mode) in claims {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => *existing = existing.strongest(mode),
                None => entries.push((key, mode)),
            }
        }
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        LockSet { entries }
    }

    /// The effective lock set for `node`: its own claims plus every
    /// ancestor claim scoped to descendants.
    pub fn effective(tree: &TestTree, node: NodeId) -> Self {
        let mut claims = Vec::new();
        for claim in tree.get(node).resources() {
            claims.push((claim.key.clone(), claim.mode));
        }
        let mut current = tree.get(node).parent();
        while let Some(ancestor) = current {
            for claim in tree.get(ancestor).resources() {
                if claim.scope == ClaimScope::SelfAndDescendants {
                    claims.push((claim.key.clone(), claim.mode));
                }
            }
            current = tree.get(ancestor).parent();
        }
        LockSet::from_claims(claims)
    }

    /// Every key `node`'s ancestors hold while it runs.
    ///
    /// Locks are held across a node's whole lifecycle, so each ancestor's
    /// claims stay live through its descendants' runs regardless of
    /// scope.
    pub fn held_by_ancestors(tree: &TestTree, node: NodeId) -> Self {
        let mut claims = Vec::new();
        let mut current = tree.get(node).parent();
        while let Some(ancestor) = current {
            for claim in tree.get(ancestor).resources() {
                claims.push((claim.key.clone(), claim.mode));
            }
            current = tree.get(ancestor).parent();
        }
        LockSet::from_claims(claims)
    }

    /// The entries whose keys `held` does not cover.
    ///
    /// A key an ancestor already holds must not be re-acquired: the
    /// ancestor's guard covers its whole subtree, and re-acquiring a
    /// writer key would block forever on the holder's own descendant.
    pub fn minus_keys_of(&self, held: &LockSet) -> LockSet {
        LockSet {
            entries: self
                .entries
                .iter()
                .filter(|(key, _)| !held.entries.iter().any(|(held_key, _)| held_key == key))
                .cloned()
                .collect(),
        }
    }

    /// The `(key, mode)` entries in acquisition order.
    pub fn entries(&self) -> &[(String, AccessMode)] {
        &self.entries
    }

    /// Whether the set claims nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether two sets may be held concurrently: every key common to
    /// both must be claimed for reading on both sides.
    pub fn is_compatible_with(&self, other: &LockSet) -> bool {
        self.entries.iter().all(|(key, mode)| {
            other
                .entries
                .iter()
                .filter(|(other_key, _)| other_key == key)
                .all(|(_, other_mode)| mode.is_compatible_with(*other_mode))
        })
    }
}

#[derive(Default)]
struct LockState {
    readers: usize,
    writer: bool,
}

/// One named resource's reader/writer state.
#[derive(Default)]
struct ResourceLock {
    state: Mutex<LockState>,
    ready: Condvar,
}

impl ResourceLock {
    fn acquire(&self, mode: AccessMode) {
        let mut state = self.state.lock();
        match mode {
            AccessMode::Read => {
                while state.writer {
                    self.ready.wait(&mut state);
                }
                state.readers += 1;
            }
            AccessMode::ReadWrite => {
                while state.writer || state.readers > 0 {
                    self.ready.wait(&mut state);
                }
                state.writer = true;
            }
        }
    }

    fn release(&self, mode: AccessMode) {
        let mut state = self.state.lock();
        match mode {
            AccessMode::Read => state.readers -= 1,
            AccessMode::ReadWrite => state.writer = false,
        }
        drop(state);
        self.ready.notify_all();
    }
}

/// Process-wide table of resource locks keyed by resource name.
#[derive(Default)]
pub struct ResourceLockCoordinator {
    table: DashMap<String, Arc<ResourceLock>>,
}

impl ResourceLockCoordinator {
    /// Create an empty coordinator.
    pub fn new() -> Self {
        ResourceLockCoordinator::default()
    }

    /// The process-wide coordinator. Engines sharing resource keys must
    /// share a coordinator for their claims to mean anything.
    pub fn global() -> Arc<Self> {
        static GLOBAL: Lazy<Arc<ResourceLockCoordinator>> =
            Lazy::new(|| Arc::new(ResourceLockCoordinator::new()));
        Arc::clone(&GLOBAL)
    }

    /// Acquire every lock in `set`, blocking until all are held.
    ///
    /// Acquisition follows the set's lexicographic key order.
    pub fn acquire(self: &Arc<Self>, set: &LockSet) -> LockGuards {
        let mut held = Vec::with_capacity(set.entries().len());
        for (key, mode) in set.entries() {
            let lock = self
                .table
                .entry(key.clone())
                .or_insert_with(|| Arc::new(ResourceLock::default()))
                .clone();
            debug!(key, %mode, "acquiring resource lock");
            lock.acquire(*mode);
            held.push((lock, *mode));
        }
        LockGuards { held }
    }
}

/// Holds a node's acquired locks; releasing happens on drop, after the
/// node's cleanup phase.
pub struct LockGuards {
    held: Vec<(Arc<ResourceLock>, AccessMode)>,
}

impl Drop for LockGuards {
    fn drop(&mut self) {
        // Release in reverse acquisition order
        while let Some((lock, mode)) = self.held.pop() {
            lock.release(mode);
        }
    }
}
