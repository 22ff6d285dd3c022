//! Cooperative cancellation token
//!
//! Polled at node-transition boundaries by the execution engine and before
//! each child dispatch. A disabled token never reports cancellation and
//! ignores requests, so callers that do not care about cancellation pay
//! nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag requesting cooperative cancellation of a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Option<Arc<AtomicBool>>,
}

impl CancellationToken {
    /// Create an active token.
    pub fn new() -> Self {
        CancellationToken {
            flag: Some(Arc::new(AtomicBool::new(false))),
        }
    }

    /// Create a token that never reports cancellation.
    pub fn disabled() -> Self {
        CancellationToken { flag: None }
    }

    /// Request cancellation. No-op on a disabled token.
    pub fn request_cancellation(&self) {
        if let Some(flag) = &self.flag {
            flag.store(true, Ordering::SeqCst);
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancellation_requested(&self) -> bool {
        self.flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}
