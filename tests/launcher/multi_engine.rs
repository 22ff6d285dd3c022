//! Several engines behind one launcher, each isolated from the others.

use crate::common::{self, FixtureEngine, RecordingListener};
use gantry::{
    DiscoverySelector, ExecutionListener, ExecutionRequest, Launcher, LauncherRequest, Result,
    TestResult,
};
use gantry::{DiscoveryRequest, NodePath, TestEngine, TestNode, TestTree};
use std::sync::Arc;

struct ExplodingExecutionEngine;

impl TestEngine for ExplodingExecutionEngine {
    fn id(&self) -> &str {
        "exploding"
    }

    fn discover(&self, _: &DiscoveryRequest, root_path: NodePath) -> Result<TestTree> {
        let mut tree = TestTree::new(TestNode::container(root_path.clone(), "exploding"));
        tree.add_child(
            tree.root(),
            TestNode::test(root_path.append("test", "doomed")?, "doomed"),
        )?;
        Ok(tree)
    }

    fn execute(&self, _: ExecutionRequest) -> Result<()> {
        panic!("execution bug")
    }
}

#[test]
fn test_engines_run_in_registration_order() {
    common::init_tracing();
    let listener = RecordingListener::new();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::standard("first"))
        .with_engine(FixtureEngine::standard("second"))
        .build();
    let request = LauncherRequest::new()
        .with_selector(DiscoverySelector::group("alpha"))
        .with_execution_listener(Arc::clone(&listener) as Arc<dyn ExecutionListener>);
    launcher.execute(&request).unwrap();

    let events = listener.events();
    let first_finish = events
        .iter()
        .position(|e| e == "finish [engine:first]")
        .unwrap();
    let second_start = events
        .iter()
        .position(|e| e == "start [engine:second]")
        .unwrap();
    assert!(first_finish < second_start);
    assert_eq!(
        listener.result_of("[engine:first]/[group:alpha]/[item:one]"),
        TestResult::Successful
    );
    assert_eq!(
        listener.result_of("[engine:second]/[group:alpha]/[item:one]"),
        TestResult::Successful
    );
}

#[test]
fn test_panicking_engine_fails_alone() {
    common::init_tracing();
    let listener = RecordingListener::new();
    let launcher = Launcher::builder()
        .with_engine(Arc::new(ExplodingExecutionEngine))
        .with_engine(FixtureEngine::standard("healthy"))
        .build();
    let request = LauncherRequest::new()
        .with_selector(DiscoverySelector::group("alpha"))
        .with_execution_listener(Arc::clone(&listener) as Arc<dyn ExecutionListener>);
    launcher.execute(&request).unwrap();

    let exploded = listener.result_of("[engine:exploding]");
    assert!(exploded
        .failure()
        .unwrap()
        .message()
        .contains("execution bug"));
    assert_eq!(
        listener.result_of("[engine:healthy]/[group:alpha]/[item:one]"),
        TestResult::Successful
    );
}

#[test]
fn test_results_from_different_engines_do_not_mix() {
    common::init_tracing();
    let listener = RecordingListener::new();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::standard("a"))
        .with_engine(FixtureEngine::standard("b"))
        .build();
    let request = LauncherRequest::new()
        .with_selector(DiscoverySelector::item("beta", "three"))
        .with_execution_listener(Arc::clone(&listener) as Arc<dyn ExecutionListener>);
    launcher.execute(&request).unwrap();

    assert!(listener
        .result_of("[engine:a]/[group:beta]/[item:three]")
        .is_failure());
    assert!(listener
        .result_of("[engine:b]/[group:beta]/[item:three]")
        .is_failure());
    // 2 engines x (root + group + item)
    assert_eq!(listener.finished_count(), 6);
}
