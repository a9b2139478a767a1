//! End-to-end reconciliation tests.
//!
//! Every test renders into a 320x480 host view the way an application
//! would: build a fresh node tree, reconcile it, inspect the hierarchy.
//!
//! Run with: cargo test --test reconcile -- --nocapture

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use spark_nodes::*;

// =============================================================================
// HELPERS
// =============================================================================

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup() -> (Engine, ViewId) {
    init();
    let mut engine = Engine::default();
    let host = engine
        .views_mut()
        .insert(View::new(ViewKind::View).with_frame(Frame::new(0.0, 0.0, 320.0, 480.0)))
        .unwrap();
    (engine, host)
}

/// Records lifecycle notifications by node key.
#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<(Lifecycle, String)>>>);

impl Recorder {
    fn push(&self, lifecycle: Lifecycle, event: &LifecycleEvent<'_>) {
        let key = event.key.unwrap_or("<none>").to_string();
        self.0.borrow_mut().push((lifecycle, key));
    }

    fn keys(&self, lifecycle: Lifecycle) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|(l, _)| *l == lifecycle)
            .map(|(_, key)| key.clone())
            .collect()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl NodeDelegate for Recorder {
    fn node_will_layout(&mut self, event: &LifecycleEvent<'_>) {
        self.push(Lifecycle::WillLayout, event);
    }

    fn node_did_layout(&mut self, event: &LifecycleEvent<'_>) {
        self.push(Lifecycle::DidLayout, event);
    }

    fn node_did_mount(&mut self, event: &LifecycleEvent<'_>) {
        self.push(Lifecycle::DidMount, event);
    }
}

fn child(id: &str, delegate: DelegateKey) -> Node {
    Node::new(ViewKind::View)
        .reuse_identifier(id)
        .key(id)
        .delegate(delegate)
}

fn root_with(ids: &[&str], delegate: DelegateKey) -> Node {
    Node::new(ViewKind::View).children(ids.iter().map(|id| child(id, delegate)))
}

fn root_view(engine: &Engine, root: NodeId) -> ViewId {
    engine.node(root).unwrap().view().unwrap()
}

fn child_view(engine: &Engine, root: NodeId, key: &str) -> ViewId {
    let node = engine.node_with_key(root, key).unwrap();
    engine.node(node).unwrap().view().unwrap()
}

fn reconcile(engine: &mut Engine, root: NodeId, host: ViewId) -> ReconcileReport {
    engine
        .reconcile(root, Some(host), None, LayoutOptions::empty())
        .unwrap()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_scenario_fresh_render_creates_in_order() {
    let (mut engine, host) = setup();
    let recorder = Recorder::default();
    let delegate = engine.register_delegate(recorder.clone());

    let root = engine.insert(root_with(&["x", "y"], delegate)).unwrap();
    let report = reconcile(&mut engine, root, host);

    assert_eq!(report.created, 3);
    assert_eq!(report.reused, 0);
    assert_eq!(recorder.keys(Lifecycle::DidMount), vec!["x", "y"]);

    let parent = root_view(&engine, root);
    let x = child_view(&engine, root, "x");
    let y = child_view(&engine, root, "y");
    assert_eq!(engine.views().subviews(parent), &[x, y]);
    assert_eq!(engine.views().subviews(host), &[parent]);

    let x_node = engine.node_with_key(root, "x").unwrap();
    let y_node = engine.node_with_key(root, "y").unwrap();
    assert_eq!(engine.node(x_node).unwrap().index(), 0);
    assert_eq!(engine.node(y_node).unwrap().index(), 1);
    assert!(engine.views()[x].render_context().is_new);
}

#[test]
fn test_scenario_swapped_children_are_reused() {
    let (mut engine, host) = setup();
    let recorder = Recorder::default();
    let delegate = engine.register_delegate(recorder.clone());

    let first = engine.insert(root_with(&["x", "y"], delegate)).unwrap();
    reconcile(&mut engine, first, host);
    let parent = root_view(&engine, first);
    let x = child_view(&engine, first, "x");
    let y = child_view(&engine, first, "y");
    recorder.clear();

    let second = engine.insert(root_with(&["y", "x"], delegate)).unwrap();
    let report = reconcile(&mut engine, second, host);

    assert_eq!(report.created, 0);
    assert_eq!(report.reused, 3);
    assert_eq!(report.removed, 0);
    assert!(recorder.keys(Lifecycle::DidMount).is_empty());
    assert_eq!(recorder.keys(Lifecycle::DidLayout), vec!["y", "x"]);

    assert_eq!(root_view(&engine, second), parent);
    assert_eq!(engine.views().subviews(parent), &[y, x]);
    assert_eq!(child_view(&engine, second, "x"), x);
    assert!(!engine.views()[x].render_context().is_new);
}

#[test]
fn test_scenario_dropped_child_is_removed() {
    let (mut engine, host) = setup();
    let delegate = engine.register_delegate(Recorder::default());

    let first = engine.insert(root_with(&["x", "y"], delegate)).unwrap();
    reconcile(&mut engine, first, host);
    let parent = root_view(&engine, first);
    let x = child_view(&engine, first, "x");
    let y = child_view(&engine, first, "y");

    let second = engine.insert(root_with(&["x"], delegate)).unwrap();
    let report = reconcile(&mut engine, second, host);

    assert_eq!(report.removed, 1);
    assert_eq!(engine.views().subviews(parent), &[x]);
    assert!(!engine.views().contains(y));
}

#[test]
fn test_scenario_disposed_root_reconciles_to_nothing() {
    let (mut engine, host) = setup();
    let delegate = engine.register_delegate(Recorder::default());

    let root = engine.insert(root_with(&["x", "y"], delegate)).unwrap();
    reconcile(&mut engine, root, host);
    let parent = root_view(&engine, root);
    let before: Vec<_> = engine.views().subviews(parent).to_vec();
    let view_count = engine.views().len();

    assert_eq!(engine.dispose(root), Disposal::Disposed);
    let report = engine
        .reconcile(root, Some(host), None, LayoutOptions::empty())
        .unwrap();

    assert_eq!(report, ReconcileReport::default());
    assert_eq!(engine.views().len(), view_count);
    assert_eq!(engine.views().subviews(parent), before.as_slice());
    assert_eq!(engine.views().subviews(host), &[parent]);
}

// =============================================================================
// PROPERTIES
// =============================================================================

#[test]
fn test_every_pass_binds_each_view_once() {
    let (mut engine, host) = setup();
    let delegate = engine.register_delegate(Recorder::default());
    let passes: [&[&str]; 5] = [
        &["a", "b", "c"],
        &["c", "a"],
        &["b", "b", "a"],
        &[],
        &["a", "c", "b", "d"],
    ];

    let mut parent = None;
    for ids in passes {
        let root = engine.insert(root_with(ids, delegate)).unwrap();
        reconcile(&mut engine, root, host);
        let root_view = root_view(&engine, root);
        if let Some(parent) = parent {
            assert_eq!(root_view, parent);
        }
        parent = Some(root_view);

        let children = engine.node(root).unwrap().children().to_vec();
        let bound: Vec<ViewId> = children
            .iter()
            .map(|c| engine.node(*c).unwrap().view().unwrap())
            .collect();

        // Declared order, no view shared between two nodes, nothing left over.
        assert_eq!(engine.views().subviews(root_view), bound.as_slice());
        for (node, view) in children.iter().zip(&bound) {
            assert_eq!(engine.views()[*view].bound_node(), Some(*node));
        }
        assert_eq!(engine.views().len(), 2 + ids.len());

        engine.dispose(root);
    }
}

#[test]
fn test_dispose_twice_is_harmless() {
    let (mut engine, host) = setup();
    let delegate = engine.register_delegate(Recorder::default());
    let root = engine.insert(root_with(&["x"], delegate)).unwrap();
    reconcile(&mut engine, root, host);
    let x = child_view(&engine, root, "x");

    assert_eq!(engine.dispose(root), Disposal::Disposed);
    let nodes = engine.nodes().len();
    assert_eq!(engine.dispose(root), Disposal::AlreadyDisposed);
    assert_eq!(engine.nodes().len(), nodes);
    assert!(engine.node(root).is_none());
    assert_eq!(engine.views()[x].bound_node(), None);
}

#[test]
fn test_dropped_property_returns_to_pristine_value() {
    let (mut engine, host) = setup();
    let card = |alpha: Option<f32>| {
        Node::new(ViewKind::View).child(
            Node::new(ViewKind::View)
                .reuse_identifier("card")
                .key("card")
                .create_with(|_| View::new(ViewKind::View).with(Property::Alpha, 0.8_f32))
                .configure(move |cfg| {
                    if let Some(alpha) = alpha {
                        cfg.set(Property::Alpha, alpha);
                    }
                }),
        )
    };

    let first = engine.insert(card(Some(1.0))).unwrap();
    reconcile(&mut engine, first, host);
    let view = child_view(&engine, first, "card");
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(1.0));

    let second = engine.insert(card(Some(0.3))).unwrap();
    reconcile(&mut engine, second, host);
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(0.3));

    let third = engine.insert(card(None)).unwrap();
    reconcile(&mut engine, third, host);
    assert_eq!(child_view(&engine, third, "card"), view);
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(0.8));
}

#[test]
fn test_restore_after_fade_in_lands_on_resting_value() {
    let (mut engine, host) = setup();
    let duration = Duration::from_millis(200);
    let component = engine.register_component(
        Recorder::default(),
        Some(LayoutAnimator::new(duration).with_curve(Curve::Linear)),
    );
    let card = |alpha: Option<f32>| {
        Node::new(ViewKind::View).component(component).child(
            Node::new(ViewKind::View).key("card").configure(move |cfg| {
                if let Some(alpha) = alpha {
                    cfg.set(Property::Alpha, alpha);
                }
            }),
        )
    };

    let first = engine.insert(card(None)).unwrap();
    reconcile(&mut engine, first, host);
    let view = child_view(&engine, first, "card");
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(0.0));

    // Alpha is first applied while the fade-in is still pending.
    let second = engine.insert(card(Some(0.5))).unwrap();
    reconcile(&mut engine, second, host);
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(0.5));

    let third = engine.insert(card(None)).unwrap();
    reconcile(&mut engine, third, host);
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(1.0));

    engine.tick(Duration::from_secs(5));
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(1.0));
}

#[test]
fn test_restore_cancels_running_property_animation() {
    let (mut engine, host) = setup();
    let card = |animated: bool| {
        Node::new(ViewKind::View).child(Node::new(ViewKind::View).key("card").configure(
            move |cfg| {
                if animated {
                    cfg.animate(
                        Property::Alpha,
                        0.0_f32,
                        Animation::new(Duration::from_millis(100)),
                    );
                }
            },
        ))
    };

    let first = engine.insert(card(true)).unwrap();
    reconcile(&mut engine, first, host);
    let view = child_view(&engine, first, "card");
    engine.tick(Duration::from_millis(50));
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(0.5));

    let second = engine.insert(card(false)).unwrap();
    reconcile(&mut engine, second, host);
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(1.0));
    assert!(!engine.views()[view].is_animating());

    engine.tick(Duration::from_millis(100));
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(1.0));
}

#[test]
fn test_styles_restore_like_configuration() {
    let (mut engine, host) = setup();
    engine.set_style_context(StyleContext::new().with("accent", Rgba::RED));
    let rule = Rc::new(StyleRule::new("accented").var(Property::BackgroundColor, "accent"));

    let styled = engine
        .insert(Node::new(ViewKind::View).child(Node::new(ViewKind::Label).key("l").shared_style(rule)))
        .unwrap();
    reconcile(&mut engine, styled, host);
    let label = child_view(&engine, styled, "l");
    assert_eq!(
        engine.views()[label].get(Property::BackgroundColor),
        PropertyValue::Color(Rgba::RED)
    );

    let plain = engine
        .insert(Node::new(ViewKind::View).child(Node::new(ViewKind::Label).key("l")))
        .unwrap();
    reconcile(&mut engine, plain, host);
    assert_eq!(
        engine.views()[label].get(Property::BackgroundColor),
        PropertyValue::Color(Rgba::CLEAR)
    );
}

// =============================================================================
// ERRORS
// =============================================================================

#[test]
fn test_kind_mismatch_aborts_only_that_subtree() {
    let (mut engine, host) = setup();
    let first = engine
        .insert(Node::new(ViewKind::View).child(Node::new(ViewKind::Label)))
        .unwrap();
    reconcile(&mut engine, first, host);
    let parent = root_view(&engine, first);

    // Same reuse identifier ("Label"), different concrete kind.
    let impostor = Node::new(ViewKind::Custom("Label")).key("impostor");
    let second = engine
        .insert(
            Node::new(ViewKind::View)
                .child(impostor)
                .child(Node::new(ViewKind::Button).key("button")),
        )
        .unwrap();
    let report = reconcile(&mut engine, second, host);

    assert_eq!(report.aborted, 1);
    assert_eq!(report.removed, 1);
    let button = child_view(&engine, second, "button");
    assert_eq!(engine.views().subviews(parent), &[button]);
    let impostor = engine.node_with_key(second, "impostor").unwrap();
    assert_eq!(engine.node(impostor).unwrap().view(), None);

    // With the conflicting view gone, the next pass builds it fresh.
    let report = reconcile(&mut engine, second, host);
    assert_eq!(report.created, 1);
    assert_eq!(report.aborted, 0);
    assert_eq!(engine.views().subviews(parent).len(), 2);
}

#[test]
fn test_custom_creation_without_identifier_is_rejected() {
    init();
    let mut engine = Engine::default();
    let err = engine
        .insert(
            Node::new(ViewKind::View)
                .child(Node::new(ViewKind::Image).create_with(|_| View::new(ViewKind::Image))),
        )
        .unwrap_err();
    assert!(matches!(err, NodeError::AmbiguousReuseIdentifier { .. }));
    assert!(engine.nodes().is_empty());
}

#[test]
fn test_reconcile_needs_a_parent() {
    let (mut engine, _host) = setup();
    let root = engine.insert(Node::new(ViewKind::View)).unwrap();
    let err = engine
        .reconcile(root, None, None, LayoutOptions::empty())
        .unwrap_err();
    assert!(matches!(err, NodeError::NoParentView));
}

// =============================================================================
// TREE SHAPE AND LOOKUP
// =============================================================================

#[test]
fn test_placeholders_never_reach_the_hierarchy() {
    let (mut engine, host) = setup();
    let show_badge = false;
    let root = engine
        .insert(Node::new(ViewKind::View).children([
            Some(Node::new(ViewKind::Label).key("title")),
            show_badge.then(|| Node::new(ViewKind::Image).key("badge")),
            Some(Node::new(ViewKind::Button).key("action")),
        ]))
        .unwrap();
    reconcile(&mut engine, root, host);

    let action = engine.node_with_key(root, "action").unwrap();
    assert_eq!(engine.node(action).unwrap().index(), 1);
    assert_eq!(engine.views().subviews(root_view(&engine, root)).len(), 2);
    assert!(engine.node_with_key(root, "badge").is_none());
}

#[test]
fn test_keys_include_unmanaged_children() {
    init();
    let mut engine = Engine::default();
    let root = engine
        .insert(
            Node::new(ViewKind::Scroll)
                .key("list")
                .child(Node::new(ViewKind::Label).key("header"))
                .unmanaged(Node::new(ViewKind::View).key("row-0"))
                .unmanaged(Node::new(ViewKind::View).key("row-1")),
        )
        .unwrap();

    let keys = engine.retrieve_keys_recursively(root);
    let mut keys: Vec<_> = keys.into_iter().collect();
    keys.sort();
    assert_eq!(keys, vec!["header", "list", "row-0", "row-1"]);
    assert!(engine.node_with_key(root, "row-1").is_some());
}

// =============================================================================
// LAYOUT
// =============================================================================

#[test]
fn test_layout_fills_parent_bounds() {
    let (mut engine, host) = setup();
    let row = |key: &'static str| {
        Node::new(ViewKind::View).key(key).configure(|cfg| {
            cfg.set(Property::Height, 44.0_f32);
        })
    };
    let root = engine
        .insert(Node::new(ViewKind::View).child(row("a")).child(row("b")))
        .unwrap();
    reconcile(&mut engine, root, host);

    assert_eq!(
        engine.views()[root_view(&engine, root)].frame(),
        Frame::new(0.0, 0.0, 320.0, 480.0)
    );
    assert_eq!(
        engine.views()[child_view(&engine, root, "a")].frame(),
        Frame::new(0.0, 0.0, 320.0, 44.0)
    );
    assert_eq!(
        engine.views()[child_view(&engine, root, "b")].frame(),
        Frame::new(0.0, 44.0, 320.0, 44.0)
    );
}

#[test]
fn test_layout_animator_moves_and_fades() {
    let (mut engine, host) = setup();
    let duration = Duration::from_millis(200);
    let component = engine.register_component(
        Recorder::default(),
        Some(LayoutAnimator::new(duration).with_curve(Curve::Linear)),
    );
    let list = |ids: &[&'static str]| {
        Node::new(ViewKind::View)
            .component(component)
            .children(ids.iter().map(|id| {
                Node::new(ViewKind::View)
                    .reuse_identifier(*id)
                    .key(*id)
                    .configure(|cfg| {
                        cfg.set(Property::Height, 40.0_f32);
                    })
            }))
    };

    let first = engine.insert(list(&["x", "y"])).unwrap();
    reconcile(&mut engine, first, host);
    let x = child_view(&engine, first, "x");
    assert_eq!(engine.views()[x].get(Property::Alpha), PropertyValue::Float(0.0));
    assert!(engine.is_animating());

    // Fade-in waits for the move animation, then runs for the same duration.
    engine.tick(duration);
    assert_eq!(engine.views()[x].get(Property::Alpha), PropertyValue::Float(0.0));
    assert!(!engine.tick(duration));
    assert_eq!(engine.views()[x].get(Property::Alpha), PropertyValue::Float(1.0));

    let second = engine.insert(list(&["y", "x"])).unwrap();
    reconcile(&mut engine, second, host);
    assert_eq!(engine.views()[x].frame(), Frame::new(0.0, 0.0, 320.0, 40.0));
    assert_eq!(engine.views()[x].target_frame(), Frame::new(0.0, 40.0, 320.0, 40.0));

    engine.tick(duration / 2);
    assert_eq!(engine.views()[x].frame(), Frame::new(0.0, 20.0, 320.0, 40.0));
    engine.tick(duration / 2);
    assert_eq!(engine.views()[x].frame(), Frame::new(0.0, 40.0, 320.0, 40.0));
    assert!(!engine.is_animating());
}

#[test]
fn test_rerender_mid_move_settles_on_new_layout() {
    let (mut engine, host) = setup();
    let duration = Duration::from_millis(200);
    let component = engine.register_component(
        Recorder::default(),
        Some(LayoutAnimator::new(duration).with_curve(Curve::Linear)),
    );
    let list = |ids: &[&'static str], component: Option<ComponentKey>| {
        let mut root = Node::new(ViewKind::View);
        if let Some(component) = component {
            root = root.component(component);
        }
        root.children(ids.iter().map(|id| {
            Node::new(ViewKind::View)
                .reuse_identifier(*id)
                .key(*id)
                .configure(|cfg| {
                    cfg.set(Property::Height, 40.0_f32);
                })
        }))
    };

    let first = engine.insert(list(&["x", "y"], Some(component))).unwrap();
    reconcile(&mut engine, first, host);
    let x = child_view(&engine, first, "x");
    engine.tick(duration * 2);

    let second = engine.insert(list(&["y", "x"], Some(component))).unwrap();
    reconcile(&mut engine, second, host);
    engine.tick(duration / 2);
    assert_eq!(engine.views()[x].frame(), Frame::new(0.0, 20.0, 320.0, 40.0));

    // No animator this time: the new layout applies at once and stays.
    let third = engine.insert(list(&["x", "y"], None)).unwrap();
    reconcile(&mut engine, third, host);
    assert_eq!(engine.views()[x].frame(), Frame::new(0.0, 0.0, 320.0, 40.0));
    assert!(!engine.is_animating());

    engine.tick(Duration::from_secs(5));
    assert_eq!(engine.views()[x].frame(), Frame::new(0.0, 0.0, 320.0, 40.0));
}

#[test]
fn test_explicit_property_animation() {
    let (mut engine, host) = setup();
    let root = engine
        .insert(Node::new(ViewKind::View).child(Node::new(ViewKind::View).key("v").configure(
            |cfg| {
                cfg.animate(
                    Property::Alpha,
                    0.0_f32,
                    Animation::new(Duration::from_millis(100)),
                );
            },
        )))
        .unwrap();
    reconcile(&mut engine, root, host);
    let view = child_view(&engine, root, "v");

    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(1.0));
    engine.tick(Duration::from_millis(50));
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(0.5));
    engine.tick(Duration::from_millis(50));
    assert_eq!(engine.views()[view].get(Property::Alpha), PropertyValue::Float(0.0));
}

// =============================================================================
// NOTIFICATIONS AND EVENTS
// =============================================================================

#[test]
fn test_mount_waits_for_unsuppressed_pass() {
    let (mut engine, host) = setup();
    let recorder = Recorder::default();
    let delegate = engine.register_delegate(recorder.clone());
    let root = engine.insert(root_with(&["x"], delegate)).unwrap();

    engine
        .reconcile(root, Some(host), None, LayoutOptions::SUPPRESS_DELEGATES)
        .unwrap();
    assert!(recorder.0.borrow().is_empty());

    reconcile(&mut engine, root, host);
    reconcile(&mut engine, root, host);
    assert_eq!(recorder.keys(Lifecycle::DidMount), vec!["x"]);
    assert_eq!(recorder.keys(Lifecycle::WillLayout), vec!["x", "x"]);
}

#[test]
fn test_event_targets_follow_the_bound_node() {
    let (mut engine, host) = setup();
    let taps = Rc::new(Cell::new(0));
    let button = |taps: &Rc<Cell<i32>>| {
        let taps = Rc::clone(taps);
        Node::new(ViewKind::View).child(
            Node::new(ViewKind::Button)
                .key("button")
                .on("tap", move |_| taps.set(taps.get() + 1)),
        )
    };

    let first = engine.insert(button(&taps)).unwrap();
    reconcile(&mut engine, first, host);
    let view = child_view(&engine, first, "button");
    assert_eq!(engine.dispatch_event(view, "tap"), 1);
    assert_eq!(taps.get(), 1);

    let second = engine.insert(button(&taps)).unwrap();
    reconcile(&mut engine, second, host);
    assert_eq!(engine.views()[view].target_count(), 1);

    // The old tree no longer owns the view, so disposing it leaves the targets.
    engine.dispose(first);
    assert_eq!(engine.dispatch_event(view, "tap"), 1);
    assert_eq!(taps.get(), 2);

    engine.dispose(second);
    assert_eq!(engine.dispatch_event(view, "tap"), 0);
    assert_eq!(taps.get(), 2);
}
