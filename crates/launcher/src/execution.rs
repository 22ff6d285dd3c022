//! Per-engine execution orchestration
//!
//! Drives each engine's `execute` over its discovered tree, in
//! registration order. Engine failures stay with that engine: a run whose
//! discovery already errored reports a failed root instead of executing,
//! and an execution error or panic is reported the same way without
//! touching later engines. Once cancellation is requested, remaining
//! engines report their whole trees as ABORTED without running.

use crate::discovery::TestPlan;
use crate::launcher::LauncherRequest;
use crate::listeners::CompositeExecutionListener;
use gantry_core::{
    Error, ExecutionListener, ExecutionRequest, NodeId, Result, TestFailure, TestResult, TestTree,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Drives execution for a discovered test plan.
pub struct ExecutionOrchestrator;

impl ExecutionOrchestrator {
    /// Execute every run of `plan`, reporting through the request's
    /// execution listeners.
    pub fn execute(plan: TestPlan, request: &LauncherRequest) -> Result<()> {
        let listener: Arc<dyn ExecutionListener> = Arc::new(CompositeExecutionListener::new(
            request.execution_listeners().to_vec(),
        ));
        for run in plan.into_runs() {
            let (engine, tree, error) = run.into_parts();
            let engine_id = engine.id().to_string();
            let root_path = tree.get(tree.root()).path().clone();

            if let Some(message) = error {
                // Discovery already failed; the root carries the failure
                listener.node_started(&root_path);
                listener.node_finished(&root_path, &TestResult::Failed(TestFailure::new(message)));
                continue;
            }
            if request.token().is_cancellation_requested() {
                report_tree_aborted(&tree, &listener);
                continue;
            }

            debug!(engine_id, nodes = tree.len(), "executing engine tree");
            let exec_request = ExecutionRequest {
                tree,
                listener: Arc::clone(&listener),
                token: request.token().clone(),
                config: request.config().clone(),
            };
            let outcome = catch_unwind(AssertUnwindSafe(|| engine.execute(exec_request)));
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(payload) => Some(panic_message(payload)),
            };
            if let Some(message) = failure {
                let err = Error::EngineExecution {
                    engine_id,
                    message,
                };
                warn!(%err, "engine execution failed");
                listener.node_started(&root_path);
                listener
                    .node_finished(&root_path, &TestResult::Failed(TestFailure::new(err.to_string())));
            }
        }
        Ok(())
    }
}

fn report_tree_aborted(tree: &TestTree, listener: &Arc<dyn ExecutionListener>) {
    fn walk(tree: &TestTree, id: NodeId, listener: &Arc<dyn ExecutionListener>) {
        let node = tree.get(id);
        listener.node_started(node.path());
        for &child in node.children() {
            walk(tree, child, listener);
        }
        listener.node_finished(node.path(), &TestResult::Aborted);
    }
    walk(tree, tree.root(), listener);
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "engine panicked during execution".to_string()
    }
}
