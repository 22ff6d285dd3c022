//! Hierarchical key/value store scoped to node lifecycles
//!
//! Each node gets a store layered over its parent's: reads fall through to
//! ancestors, writes stay local, and local values are dropped during the
//! node's cleanup phase. Values are type-erased; readers name the concrete
//! type they expect.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::sync::Arc;

/// Layered store handed to callbacks through the test context.
#[derive(Default)]
pub struct ContextStore {
    parent: Option<Arc<ContextStore>>,
    values: RwLock<FxHashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl ContextStore {
    /// The root store with no parent layer.
    pub fn root() -> Arc<Self> {
        Arc::new(ContextStore::default())
    }

    /// A child layer over `parent`.
    pub fn child_of(parent: &Arc<ContextStore>) -> Arc<Self> {
        Arc::new(ContextStore {
            parent: Some(Arc::clone(parent)),
            values: RwLock::default(),
        })
    }

    /// Store a value in this layer.
    pub fn put<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.values.write().insert(key.into(), Arc::new(value));
    }

    /// Read a value, falling through to ancestor layers.
    ///
    /// Returns `None` when the key is absent everywhere or holds a value
    /// of a different type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        if let Some(value) = self.values.read().get(key) {
            return Arc::clone(value).downcast::<T>().ok();
        }
        self.parent.as_ref().and_then(|parent| parent.get(key))
    }

    /// Drop every value stored in this layer. Ancestor layers are
    /// untouched.
    pub fn clear_local(&self) {
        self.values.write().clear();
    }
}
