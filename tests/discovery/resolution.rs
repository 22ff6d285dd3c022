//! Selector resolution through a full launcher discovery pass.

use crate::common::{self, FixtureEngine, GroupSpec};
use gantry::{DiscoverySelector, Launcher, LauncherRequest, NodePath, TestPlan};

fn discover(selectors: Vec<DiscoverySelector>) -> TestPlan {
    common::init_tracing();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::standard("fx"))
        .build();
    let request = LauncherRequest::new().with_selectors(selectors);
    launcher.discover(&request).unwrap()
}

fn path_strings(plan: &TestPlan) -> Vec<String> {
    plan.paths().iter().map(|p| p.to_string()).collect()
}

#[test]
fn test_group_selector_expands_into_all_items() {
    let plan = discover(vec![DiscoverySelector::group("alpha")]);
    let paths = path_strings(&plan);
    assert_eq!(paths.len(), 4);
    assert!(paths.contains(&"[engine:fx]/[group:alpha]/[item:one]".to_string()));
    assert!(paths.contains(&"[engine:fx]/[group:alpha]/[item:two]".to_string()));
}

#[test]
fn test_item_selector_builds_only_the_ancestor_chain() {
    let plan = discover(vec![DiscoverySelector::item("alpha", "one")]);
    let paths = path_strings(&plan);
    assert_eq!(paths.len(), 3);
    assert!(paths.contains(&"[engine:fx]/[group:alpha]/[item:one]".to_string()));
    assert!(!paths.contains(&"[engine:fx]/[group:alpha]/[item:two]".to_string()));
}

#[test]
fn test_path_selector_is_lazy() {
    let target = NodePath::parse("[engine:fx]/[group:alpha]/[item:one]").unwrap();
    let plan = discover(vec![DiscoverySelector::path(target.clone())]);
    let paths = path_strings(&plan);
    assert_eq!(paths.len(), 3);
    assert!(paths.contains(&target.to_string()));
}

#[test]
fn test_duplicate_selectors_resolve_to_one_node_each() {
    let plan = discover(vec![
        DiscoverySelector::group("alpha"),
        DiscoverySelector::group("alpha"),
        DiscoverySelector::item("alpha", "one"),
    ]);
    assert_eq!(plan.paths().len(), 4);
}

#[test]
fn test_unknown_selector_leaves_a_bare_root() {
    let plan = discover(vec![DiscoverySelector::group("missing")]);
    assert_eq!(plan.paths().len(), 1);
    assert!(!plan.contains_tests());
}

#[test]
fn test_templated_group_expands_into_every_iteration() {
    common::init_tracing();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::new(
            "fx",
            vec![GroupSpec::templated("cases", 3)],
        ))
        .build();
    let request = LauncherRequest::new().with_selector(DiscoverySelector::group("cases"));
    let plan = launcher.discover(&request).unwrap();
    let paths = path_strings(&plan);
    assert_eq!(paths.len(), 5);
    for index in 0..3 {
        assert!(paths.contains(&format!("[engine:fx]/[group:cases]/[iter:{index}]")));
    }
}

#[test]
fn test_iteration_selector_picks_specific_indices() {
    common::init_tracing();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::new(
            "fx",
            vec![GroupSpec::templated("cases", 4)],
        ))
        .build();
    let selector =
        DiscoverySelector::iterations(DiscoverySelector::group("cases"), vec![0, 2]);
    let request = LauncherRequest::new().with_selector(selector);
    let plan = launcher.discover(&request).unwrap();
    let paths = path_strings(&plan);
    assert_eq!(paths.len(), 4);
    assert!(paths.contains(&"[engine:fx]/[group:cases]/[iter:0]".to_string()));
    assert!(paths.contains(&"[engine:fx]/[group:cases]/[iter:2]".to_string()));
    assert!(!paths.contains(&"[engine:fx]/[group:cases]/[iter:1]".to_string()));
}

#[test]
fn test_out_of_range_iteration_indices_are_ignored() {
    common::init_tracing();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::new(
            "fx",
            vec![GroupSpec::templated("cases", 2)],
        ))
        .build();
    let selector =
        DiscoverySelector::iterations(DiscoverySelector::group("cases"), vec![1, 9]);
    let request = LauncherRequest::new().with_selector(selector);
    let plan = launcher.discover(&request).unwrap();
    let paths = path_strings(&plan);
    assert!(paths.contains(&"[engine:fx]/[group:cases]/[iter:1]".to_string()));
    assert!(!paths.contains(&"[engine:fx]/[group:cases]/[iter:9]".to_string()));
}
