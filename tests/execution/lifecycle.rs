//! End-to-end lifecycle behavior: results, ordering, skips, and panics.

use crate::common::{self, FixtureEngine, GroupSpec, ItemOutcome, ItemSpec, RecordingListener};
use gantry::{DiscoverySelector, ExecutionListener, Launcher, LauncherRequest, TestResult};
use std::sync::Arc;

fn run(groups: Vec<GroupSpec>, selectors: Vec<DiscoverySelector>) -> Arc<RecordingListener> {
    common::init_tracing();
    let listener = RecordingListener::new();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::new("fx", groups))
        .build();
    let request = LauncherRequest::new()
        .with_selectors(selectors)
        .with_execution_listener(Arc::clone(&listener) as Arc<dyn ExecutionListener>);
    launcher.execute(&request).unwrap();
    listener
}

fn all_groups() -> Vec<DiscoverySelector> {
    vec![
        DiscoverySelector::group("alpha"),
        DiscoverySelector::group("beta"),
    ]
}

#[test]
fn test_results_follow_item_outcomes() {
    let listener = run(common::standard_groups(), all_groups());

    assert_eq!(
        listener.result_of("[engine:fx]/[group:alpha]/[item:one]"),
        TestResult::Successful
    );
    assert_eq!(
        listener.result_of("[engine:fx]/[group:alpha]/[item:two]"),
        TestResult::Successful
    );
    let three = listener.result_of("[engine:fx]/[group:beta]/[item:three]");
    assert!(three.is_failure());
    assert_eq!(three.failure().unwrap().message(), "three is broken");
}

#[test]
fn test_container_results_aggregate_descendant_failures() {
    let listener = run(common::standard_groups(), all_groups());

    assert_eq!(
        listener.result_of("[engine:fx]/[group:alpha]"),
        TestResult::Successful
    );
    let beta = listener.result_of("[engine:fx]/[group:beta]");
    assert!(beta
        .failure()
        .unwrap()
        .message()
        .contains("1 descendant node(s) failed"));
    assert!(listener.result_of("[engine:fx]").is_failure());
}

#[test]
fn test_containers_start_before_and_finish_after_their_children() {
    let listener = run(
        vec![GroupSpec::new("alpha").with_item(ItemSpec::passing("one"))],
        vec![DiscoverySelector::group("alpha")],
    );
    let events = listener.events();
    let group_start = events
        .iter()
        .position(|e| e == "start [engine:fx]/[group:alpha]")
        .unwrap();
    let item_start = events
        .iter()
        .position(|e| e == "start [engine:fx]/[group:alpha]/[item:one]")
        .unwrap();
    let item_finish = events
        .iter()
        .position(|e| e == "finish [engine:fx]/[group:alpha]/[item:one]")
        .unwrap();
    let group_finish = events
        .iter()
        .position(|e| e == "finish [engine:fx]/[group:alpha]")
        .unwrap();
    assert!(group_start < item_start);
    assert!(item_start < item_finish);
    assert!(item_finish < group_finish);
}

#[test]
fn test_skipped_item_reports_its_reason_and_spares_the_group() {
    let groups = vec![GroupSpec::new("alpha")
        .with_item(ItemSpec::new("flaky", ItemOutcome::Skip("not on CI")))
        .with_item(ItemSpec::passing("steady"))];
    let listener = run(groups, vec![DiscoverySelector::group("alpha")]);

    assert_eq!(
        listener.result_of("[engine:fx]/[group:alpha]/[item:flaky]"),
        TestResult::Skipped(Some("not on CI".to_string()))
    );
    assert_eq!(
        listener.result_of("[engine:fx]/[group:alpha]/[item:steady]"),
        TestResult::Successful
    );
    assert_eq!(
        listener.result_of("[engine:fx]/[group:alpha]"),
        TestResult::Successful
    );
}

#[test]
fn test_panicking_item_fails_without_stopping_siblings() {
    let groups = vec![GroupSpec::new("alpha")
        .with_item(ItemSpec::new("boom", ItemOutcome::Panic("kaboom")))
        .with_item(ItemSpec::passing("steady"))];
    let listener = run(groups, vec![DiscoverySelector::group("alpha")]);

    let boom = listener.result_of("[engine:fx]/[group:alpha]/[item:boom]");
    assert!(boom.failure().unwrap().message().contains("kaboom"));
    assert_eq!(
        listener.result_of("[engine:fx]/[group:alpha]/[item:steady]"),
        TestResult::Successful
    );
}

#[test]
fn test_every_started_node_finishes() {
    let listener = run(common::standard_groups(), all_groups());
    let events = listener.events();
    let starts = events.iter().filter(|e| e.starts_with("start ")).count();
    let finishes = events.iter().filter(|e| e.starts_with("finish ")).count();
    assert_eq!(starts, finishes);
    // root + 2 groups + 3 items
    assert_eq!(listener.finished_count(), 6);
}
