//! Engine filters and post-discovery filters applied by the launcher.

use crate::common::{self, FixtureEngine};
use gantry::{
    DiscoverySelector, EngineFilter, Launcher, LauncherRequest, RequireAnyTagFilter, TestPlan,
};
use std::sync::Arc;

fn all_selectors() -> Vec<DiscoverySelector> {
    vec![
        DiscoverySelector::group("alpha"),
        DiscoverySelector::group("beta"),
    ]
}

fn path_strings(plan: &TestPlan) -> Vec<String> {
    plan.paths().iter().map(|p| p.to_string()).collect()
}

#[test]
fn test_tag_filter_removes_excluded_tests() {
    common::init_tracing();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::standard("fx"))
        .build();
    let request = LauncherRequest::new()
        .with_selectors(all_selectors())
        .with_post_filter(Arc::new(RequireAnyTagFilter::new(["fast"])));
    let plan = launcher.discover(&request).unwrap();
    let paths = path_strings(&plan);
    // "two" carries only the "slow" tag
    assert!(!paths.contains(&"[engine:fx]/[group:alpha]/[item:two]".to_string()));
    assert!(paths.contains(&"[engine:fx]/[group:alpha]/[item:one]".to_string()));
    assert!(paths.contains(&"[engine:fx]/[group:beta]/[item:three]".to_string()));
    assert_eq!(paths.len(), 5);
}

#[test]
fn test_filter_excluding_everything_prunes_down_to_the_root() {
    common::init_tracing();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::standard("fx"))
        .build();
    let request = LauncherRequest::new()
        .with_selectors(all_selectors())
        .with_post_filter(Arc::new(RequireAnyTagFilter::new(["nonexistent"])));
    let plan = launcher.discover(&request).unwrap();
    // Tests removed, then childless groups pruned away
    assert_eq!(plan.paths().len(), 1);
    assert!(!plan.contains_tests());
}

#[test]
fn test_engine_include_filter_drops_other_engines() {
    common::init_tracing();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::standard("one"))
        .with_engine(FixtureEngine::standard("two"))
        .build();
    let request = LauncherRequest::new()
        .with_selectors(all_selectors())
        .with_engine_filter(EngineFilter::include(["one"]));
    let plan = launcher.discover(&request).unwrap();
    assert_eq!(plan.runs().len(), 1);
    assert_eq!(plan.runs()[0].engine_id(), "one");
}

#[test]
fn test_engine_exclude_filter() {
    common::init_tracing();
    let launcher = Launcher::builder()
        .with_engine(FixtureEngine::standard("one"))
        .with_engine(FixtureEngine::standard("two"))
        .build();
    let request = LauncherRequest::new()
        .with_selectors(all_selectors())
        .with_engine_filter(EngineFilter::exclude(["one"]));
    let plan = launcher.discover(&request).unwrap();
    assert_eq!(plan.runs().len(), 1);
    assert_eq!(plan.runs()[0].engine_id(), "two");
}
