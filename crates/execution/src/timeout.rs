//! Bounded invocation: running a step on a separate thread with a deadline
//!
//! The step runs on a detached worker thread while the caller waits with a
//! deadline. On timeout the caller requests cancellation, reports a
//! timeout failure, and moves on; the worker's eventual result is
//! discarded. The worker thread is not killed, so the step should poll the
//! cancellation token if it can.

use crate::collector::run_protected;
use gantry_core::{CancellationToken, TestFailure};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Default)]
struct Slot {
    result: Mutex<Option<Result<(), TestFailure>>>,
    done: Condvar,
}

/// Run `step` with a deadline of `timeout`.
///
/// Panics in the step are converted to failures as usual. When the
/// deadline passes first, cancellation is requested on `token` and a
/// timeout failure is returned.
pub fn invoke_with_timeout<F>(
    step: F,
    timeout: Duration,
    token: &CancellationToken,
) -> Result<(), TestFailure>
where
    F: FnOnce() -> Result<(), TestFailure> + Send + 'static,
{
    let slot = Arc::new(Slot::default());
    let worker_slot = Arc::clone(&slot);
    let spawned = thread::Builder::new()
        .name("gantry-timeout-worker".to_string())
        .spawn(move || {
            let outcome = run_protected(step);
            *worker_slot.result.lock() = Some(outcome);
            worker_slot.done.notify_all();
        });
    if let Err(e) = spawned {
        return Err(TestFailure::new(format!(
            "failed to spawn timeout worker thread: {e}"
        )));
    }

    let deadline = Instant::now() + timeout;
    let mut result = slot.result.lock();
    while result.is_none() {
        if slot.done.wait_until(&mut result, deadline).timed_out() {
            break;
        }
    }
    match result.take() {
        Some(outcome) => outcome,
        None => {
            warn!(?timeout, "step exceeded its timeout; requesting cancellation");
            token.request_cancellation();
            Err(TestFailure::new(format!(
                "execution timed out after {timeout:?}"
            )))
        }
    }
}
