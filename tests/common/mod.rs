//! Shared fixtures for the integration test suites.
//!
//! The fixture engine models a class/method-style backend: named groups
//! containing items, plus optional templated groups that expand into
//! iterations. It wires discovery through the selector-resolution
//! protocol and execution through the hierarchical runner, so suites
//! exercise the same paths a real backend would.

#![allow(dead_code)]

use gantry::{
    BehaviorRegistry, CancellationToken, DeduplicatingReporter, DiscoveryIssue, DiscoveryListener,
    DiscoveryRequest, DiscoveryRequestResolver, DiscoverySelector, ExecutionListener,
    ExecutionRequest, ForwardingReporter, HierarchicalRunner, NodeBehavior, NodePath, ReportEntry,
    Resolution, ResolutionContext, ResolverMatch, ResourceClaim, Result, SelectorResolver,
    SkipDecision, TestEngine, TestFailure, TestNode, TestResult, TestTree,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT_TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// What a fixture item does when executed.
#[derive(Clone)]
pub enum ItemOutcome {
    /// Completes successfully
    Pass,
    /// Fails with the given message
    Fail(&'static str),
    /// Panics with the given message
    Panic(&'static str),
    /// Skips itself with the given reason
    Skip(&'static str),
    /// Sleeps in small slices, polling for cancellation, then passes
    Slow(u64),
}

/// One method-like test item of a fixture group.
#[derive(Clone)]
pub struct ItemSpec {
    pub name: &'static str,
    pub outcome: ItemOutcome,
    pub tags: Vec<&'static str>,
    pub resources: Vec<ResourceClaim>,
}

impl ItemSpec {
    pub fn new(name: &'static str, outcome: ItemOutcome) -> Self {
        ItemSpec {
            name,
            outcome,
            tags: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn passing(name: &'static str) -> Self {
        ItemSpec::new(name, ItemOutcome::Pass)
    }

    pub fn failing(name: &'static str, message: &'static str) -> Self {
        ItemSpec::new(name, ItemOutcome::Fail(message))
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = &'static str>) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn with_resource(mut self, claim: ResourceClaim) -> Self {
        self.resources.push(claim);
        self
    }
}

/// One class-like group of a fixture engine.
#[derive(Clone)]
pub struct GroupSpec {
    pub name: &'static str,
    pub items: Vec<ItemSpec>,
    pub concurrent: bool,
    /// When non-zero, the group is a template expanding into this many
    /// iterations instead of items.
    pub iterations: usize,
}

impl GroupSpec {
    pub fn new(name: &'static str) -> Self {
        GroupSpec {
            name,
            items: Vec::new(),
            concurrent: false,
            iterations: 0,
        }
    }

    pub fn templated(name: &'static str, iterations: usize) -> Self {
        GroupSpec {
            name,
            items: Vec::new(),
            concurrent: false,
            iterations,
        }
    }

    pub fn with_item(mut self, item: ItemSpec) -> Self {
        self.items.push(item);
        self
    }

    pub fn concurrent(mut self) -> Self {
        self.concurrent = true;
        self
    }

    fn item(&self, name: &str) -> Option<&ItemSpec> {
        self.items.iter().find(|item| item.name == name)
    }
}

/// The default fixture model used by most suites: two plain groups, one
/// failing item, fast/slow tags.
pub fn standard_groups() -> Vec<GroupSpec> {
    vec![
        GroupSpec::new("alpha")
            .with_item(ItemSpec::passing("one").with_tags(["fast"]))
            .with_item(ItemSpec::passing("two").with_tags(["slow"])),
        GroupSpec::new("beta")
            .with_item(ItemSpec::failing("three", "three is broken").with_tags(["fast"])),
    ]
}

/// A backend engine over a fixed group/item model.
pub struct FixtureEngine {
    id: String,
    groups: Vec<GroupSpec>,
    behaviors: Arc<BehaviorRegistry>,
}

impl FixtureEngine {
    pub fn new(id: impl Into<String>, groups: Vec<GroupSpec>) -> Arc<Self> {
        let id = id.into();
        let behaviors = Arc::new(BehaviorRegistry::new());
        register_behaviors(&behaviors, &id, &groups);
        Arc::new(FixtureEngine {
            id,
            groups,
            behaviors,
        })
    }

    pub fn standard(id: impl Into<String>) -> Arc<Self> {
        FixtureEngine::new(id, standard_groups())
    }

    /// Override the behavior of one node, keyed by path.
    pub fn set_behavior(&self, path: NodePath, behavior: NodeBehavior) {
        self.behaviors.register(path, behavior);
    }
}

impl TestEngine for FixtureEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn discover(&self, request: &DiscoveryRequest, root_path: NodePath) -> Result<TestTree> {
        let tree = TestTree::new(TestNode::container(root_path.clone(), self.id.clone()));
        let resolver = DiscoveryRequestResolver::new().with_resolver(FixtureResolver {
            groups: self.groups.clone(),
        });
        let mut reporter = DeduplicatingReporter::new(ForwardingReporter::new(
            request.listener.as_ref(),
            root_path,
        ));
        resolver.resolve(request, tree, &mut reporter)
    }

    fn execute(&self, request: ExecutionRequest) -> Result<()> {
        HierarchicalRunner::new(Arc::clone(&self.behaviors)).execute(request)
    }
}

fn register_behaviors(behaviors: &BehaviorRegistry, engine_id: &str, groups: &[GroupSpec]) {
    let root = NodePath::for_engine(engine_id).expect("valid engine id");
    for group in groups {
        let group_path = root.append("group", group.name).expect("valid group name");
        for item in &group.items {
            let path = group_path.append("item", item.name).expect("valid item name");
            behaviors.register(path, behavior_for(&item.outcome));
        }
        for index in 0..group.iterations {
            let path = group_path
                .append("iter", index.to_string())
                .expect("valid iteration index");
            behaviors.register(path, NodeBehavior::new().with_action(|_| Ok(())));
        }
    }
}

fn behavior_for(outcome: &ItemOutcome) -> NodeBehavior {
    match outcome {
        ItemOutcome::Pass => NodeBehavior::new().with_action(|_| Ok(())),
        ItemOutcome::Fail(message) => {
            let message = *message;
            NodeBehavior::new().with_action(move |_| Err(TestFailure::new(message)))
        }
        ItemOutcome::Panic(message) => {
            let message = *message;
            NodeBehavior::new().with_action(move |_| panic!("{message}"))
        }
        ItemOutcome::Skip(reason) => {
            let reason = *reason;
            NodeBehavior::new()
                .with_skip(move |_| Ok(SkipDecision::because(reason)))
                .with_action(|_| Ok(()))
        }
        ItemOutcome::Slow(millis) => {
            let millis = *millis;
            NodeBehavior::new().with_action(move |context| {
                let mut remaining = millis;
                while remaining > 0 {
                    if context.cancellation_token().is_cancellation_requested() {
                        return Ok(());
                    }
                    let slice = remaining.min(5);
                    std::thread::sleep(Duration::from_millis(slice));
                    remaining -= slice;
                }
                Ok(())
            })
        }
    }
}

struct FixtureResolver {
    groups: Vec<GroupSpec>,
}

impl FixtureResolver {
    fn group(&self, name: &str) -> Option<&GroupSpec> {
        self.groups.iter().find(|group| group.name == name)
    }
}

fn group_node(path: NodePath, group: &GroupSpec) -> TestNode {
    let mut node = TestNode::container(path, group.name);
    if group.concurrent {
        node = node.with_concurrent_children();
    }
    node
}

fn item_node(path: NodePath, item: &ItemSpec) -> TestNode {
    let mut node = TestNode::test(path, item.name).with_tags(item.tags.iter().copied());
    for claim in &item.resources {
        node = node.with_resource(claim.clone());
    }
    node
}

impl SelectorResolver for FixtureResolver {
    fn resolve(
        &self,
        selector: &DiscoverySelector,
        context: &mut ResolutionContext<'_>,
    ) -> Result<Resolution> {
        match selector {
            DiscoverySelector::Group { name, enclosing } => {
                if !enclosing.is_empty() {
                    return Ok(Resolution::Unresolved);
                }
                let Some(group) = self.group(name).cloned() else {
                    return Ok(Resolution::Unresolved);
                };
                let node = {
                    let group = group.clone();
                    context.add_to_parent(None, move |tree, parent| {
                        let path = tree.get(parent).path().append("group", group.name)?;
                        Ok(Some(group_node(path, &group)))
                    })?
                };
                let Some(node) = node else {
                    return Ok(Resolution::Unresolved);
                };
                let expansion: Vec<DiscoverySelector> = if group.iterations > 0 {
                    vec![DiscoverySelector::iterations(
                        selector.clone(),
                        (0..group.iterations).collect(),
                    )]
                } else {
                    group
                        .items
                        .iter()
                        .map(|item| DiscoverySelector::item(group.name, item.name))
                        .collect()
                };
                Ok(Resolution::Match(
                    ResolverMatch::exact(node).with_expansion(move || expansion),
                ))
            }
            DiscoverySelector::Item { group, name } => {
                let Some(spec) = self.group(group).and_then(|g| g.item(name)).cloned() else {
                    return Ok(Resolution::Unresolved);
                };
                let parent = DiscoverySelector::group(group.clone());
                let node = context.add_to_parent(Some(&parent), move |tree, parent| {
                    let path = tree.get(parent).path().append("item", spec.name)?;
                    Ok(Some(item_node(path, &spec)))
                })?;
                Ok(match node {
                    Some(node) => Resolution::Match(ResolverMatch::exact(node)),
                    None => Resolution::Unresolved,
                })
            }
            DiscoverySelector::Iteration { parent, indices } => {
                let DiscoverySelector::Group { name, .. } = parent.as_ref() else {
                    return Ok(Resolution::Unresolved);
                };
                let Some(group) = self.group(name) else {
                    return Ok(Resolution::Unresolved);
                };
                if group.iterations == 0 {
                    return Ok(Resolution::Unresolved);
                }
                let total = group.iterations;
                let parent_selector: &DiscoverySelector = parent.as_ref();
                let mut matches = Vec::new();
                for &index in indices {
                    if index >= total {
                        continue;
                    }
                    let display = format!("{name}[{index}]");
                    let node = context.add_to_parent(Some(parent_selector), move |tree, parent| {
                        let path = tree.get(parent).path().append("iter", index.to_string())?;
                        Ok(Some(TestNode::test(path, display)))
                    })?;
                    if let Some(node) = node {
                        matches.push(ResolverMatch::exact(node));
                    }
                }
                if matches.is_empty() {
                    Ok(Resolution::Unresolved)
                } else {
                    Ok(Resolution::Matches(matches))
                }
            }
            DiscoverySelector::Path(path) => {
                let segment = path.last_segment();
                match segment.segment_type() {
                    "group" => {
                        let Some(group) = self.group(segment.value()).cloned() else {
                            return Ok(Resolution::Unresolved);
                        };
                        let target = path.clone();
                        let node = context.add_to_parent(None, move |_, _| {
                            Ok(Some(group_node(target, &group)))
                        })?;
                        Ok(match node {
                            Some(node) => Resolution::Match(ResolverMatch::exact(node)),
                            None => Resolution::Unresolved,
                        })
                    }
                    "item" => {
                        let Some(parent_path) = path.parent() else {
                            return Ok(Resolution::Unresolved);
                        };
                        let group_name = parent_path.last_segment().value().to_string();
                        let Some(spec) = self
                            .group(&group_name)
                            .and_then(|g| g.item(segment.value()))
                            .cloned()
                        else {
                            return Ok(Resolution::Unresolved);
                        };
                        let parent = DiscoverySelector::path(parent_path);
                        let target = path.clone();
                        let node = context.add_to_parent(Some(&parent), move |_, _| {
                            Ok(Some(item_node(target, &spec)))
                        })?;
                        Ok(match node {
                            Some(node) => Resolution::Match(ResolverMatch::exact(node)),
                            None => Resolution::Unresolved,
                        })
                    }
                    _ => Ok(Resolution::Unresolved),
                }
            }
        }
    }
}

/// Execution listener recording events and terminal results by path.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<String>>,
    results: Mutex<FxHashMap<String, TestResult>>,
    entries: Mutex<Vec<(String, ReportEntry)>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingListener::default())
    }

    pub fn result_of(&self, path: &str) -> TestResult {
        self.try_result_of(path)
            .unwrap_or_else(|| panic!("no result recorded for '{path}'"))
    }

    pub fn try_result_of(&self, path: &str) -> Option<TestResult> {
        self.results.lock().get(path).cloned()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn entries(&self) -> Vec<(String, ReportEntry)> {
        self.entries.lock().clone()
    }

    pub fn finished_count(&self) -> usize {
        self.results.lock().len()
    }
}

impl ExecutionListener for RecordingListener {
    fn node_started(&self, path: &NodePath) {
        self.events.lock().push(format!("start {path}"));
    }

    fn node_finished(&self, path: &NodePath, result: &TestResult) {
        self.events.lock().push(format!("finish {path}"));
        self.results.lock().insert(path.to_string(), result.clone());
    }

    fn dynamic_node_registered(&self, path: &NodePath) {
        self.events.lock().push(format!("dynamic {path}"));
    }

    fn reporting_entry_published(&self, path: &NodePath, entry: &ReportEntry) {
        self.entries.lock().push((path.to_string(), entry.clone()));
    }
}

/// Discovery listener recording reported issues.
#[derive(Default)]
pub struct RecordingDiscoveryListener {
    issues: Mutex<Vec<(NodePath, DiscoveryIssue)>>,
}

impl RecordingDiscoveryListener {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingDiscoveryListener::default())
    }

    pub fn issues(&self) -> Vec<(NodePath, DiscoveryIssue)> {
        self.issues.lock().clone()
    }
}

impl DiscoveryListener for RecordingDiscoveryListener {
    fn issue_encountered(&self, engine_path: &NodePath, issue: &DiscoveryIssue) {
        self.issues
            .lock()
            .push((engine_path.clone(), issue.clone()));
    }
}

/// A token that already has cancellation requested.
pub fn cancelled_token() -> CancellationToken {
    let token = CancellationToken::new();
    token.request_cancellation();
    token
}
