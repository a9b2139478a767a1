//! The native view model.
//!
//! A `View` is the long-lived half of the node/view pair: nodes are rebuilt
//! every render, views survive across passes and get rebound to new nodes.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::engine::NodeId;
use crate::properties::{Property, PropertyValue};
use crate::types::{Animation, Frame, ViewKind};

use super::ViewId;

// =============================================================================
// Events
// =============================================================================

/// An event delivered to a view's targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewEvent {
    pub name: String,
    pub view: ViewId,
}

/// Callback invoked for a matching [`ViewEvent`].
pub type EventHandler = Rc<dyn Fn(&ViewEvent)>;

/// A handler attached to a view for one event name.
#[derive(Clone)]
pub struct EventTarget {
    pub event: String,
    pub handler: EventHandler,
}

impl EventTarget {
    pub fn new(event: impl Into<String>, handler: impl Fn(&ViewEvent) + 'static) -> Self {
        Self {
            event: event.into(),
            handler: Rc::new(handler),
        }
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Render context
// =============================================================================

/// Per-view bookkeeping carried between passes.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Properties applied by the previous pass.
    pub(crate) applied: HashMap<Property, PropertyValue>,
    /// Value each property had before any node first applied it.
    pub(crate) baseline: HashMap<Property, PropertyValue>,
    /// Frame before the current pass.
    pub old_frame: Frame,
    /// Frame computed by the current pass.
    pub new_frame: Frame,
    /// Created (not rebound) by the latest construct.
    pub is_new: bool,
    /// Created since the last layout; consumed by the layout animator.
    pub appearing: bool,
    /// Leaf whose size was reset and waits for the layout engine to measure it.
    pub needs_measure: bool,
    /// A layout property changed since the layout box style was last built.
    pub(crate) style_dirty: bool,
}

impl RenderContext {
    pub fn applied(&self) -> &HashMap<Property, PropertyValue> {
        &self.applied
    }

    pub fn baseline(&self, property: Property) -> Option<&PropertyValue> {
        self.baseline.get(&property)
    }
}

// =============================================================================
// Transitions
// =============================================================================

#[derive(Debug, Clone)]
enum Transition {
    Property {
        property: Property,
        from: PropertyValue,
        to: PropertyValue,
        animation: Animation,
        elapsed: Duration,
    },
    Frame {
        from: Frame,
        to: Frame,
        animation: Animation,
        elapsed: Duration,
    },
}

// =============================================================================
// View
// =============================================================================

/// A native view.
#[derive(Debug, Clone)]
pub struct View {
    pub(crate) kind: ViewKind,
    pub(crate) reuse_tag: Option<u64>,
    pub(crate) owned: bool,
    pub(crate) superview: Option<ViewId>,
    pub(crate) subviews: Vec<ViewId>,
    pub(crate) bound_node: Option<NodeId>,
    pub(crate) frame: Frame,
    pub(crate) render: RenderContext,
    attributes: HashMap<Property, PropertyValue>,
    targets: Vec<EventTarget>,
    transitions: Vec<Transition>,
}

impl View {
    pub fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            reuse_tag: None,
            owned: false,
            superview: None,
            subviews: Vec::new(),
            bound_node: None,
            frame: Frame::ZERO,
            render: RenderContext {
                style_dirty: true,
                ..RenderContext::default()
            },
            attributes: HashMap::new(),
            targets: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Builder-style attribute set, for creation closures and host views.
    pub fn with(mut self, property: Property, value: impl Into<PropertyValue>) -> Self {
        self.set(property, value);
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn reuse_tag(&self) -> Option<u64> {
        self.reuse_tag
    }

    /// Whether a node created this view. Only owned views are ever reused.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub(crate) fn mark_owned(&mut self, fingerprint: u64) {
        self.reuse_tag = Some(fingerprint);
        self.owned = true;
    }

    pub fn superview(&self) -> Option<ViewId> {
        self.superview
    }

    pub fn subviews(&self) -> &[ViewId] {
        &self.subviews
    }

    pub fn bound_node(&self) -> Option<NodeId> {
        self.bound_node
    }

    /// Current (presented) frame.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    /// Frame the view ends up at once any running frame transition finishes.
    pub fn target_frame(&self) -> Frame {
        self.transitions
            .iter()
            .find_map(|t| match t {
                Transition::Frame { to, .. } => Some(*to),
                Transition::Property { .. } => None,
            })
            .unwrap_or(self.frame)
    }

    pub fn render_context(&self) -> &RenderContext {
        &self.render
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    /// Current value, falling back to the property default.
    pub fn get(&self, property: Property) -> PropertyValue {
        self.attributes
            .get(&property)
            .cloned()
            .unwrap_or_else(|| property.default_value())
    }

    pub fn attribute(&self, property: Property) -> Option<&PropertyValue> {
        self.attributes.get(&property)
    }

    pub fn set(&mut self, property: Property, value: impl Into<PropertyValue>) {
        self.render.style_dirty |= property.affects_layout();
        self.attributes.insert(property, value.into());
    }

    /// Whether the view takes part in flex layout.
    pub fn is_included_in_layout(&self) -> bool {
        self.get(Property::IncludeInLayout).as_bool().unwrap_or(true)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Transition `property` from its current value to `value`.
    ///
    /// Replaces a transition already running on the same property.
    pub fn animate(&mut self, property: Property, value: impl Into<PropertyValue>, animation: Animation) {
        let from = self.get(property);
        self.cancel_transition(property);
        self.transitions.push(Transition::Property {
            property,
            from,
            to: value.into(),
            animation,
            elapsed: Duration::ZERO,
        });
    }

    /// Value `property` ends up at once a running transition finishes.
    pub fn target_value(&self, property: Property) -> PropertyValue {
        self.transitions
            .iter()
            .find_map(|t| match t {
                Transition::Property { property: p, to, .. } if *p == property => Some(to.clone()),
                _ => None,
            })
            .unwrap_or_else(|| self.get(property))
    }

    /// Transition the frame from its current value to `to`.
    pub fn animate_frame(&mut self, to: Frame, animation: Animation) {
        let from = self.frame;
        self.cancel_frame_transition();
        self.transitions.push(Transition::Frame {
            from,
            to,
            animation,
            elapsed: Duration::ZERO,
        });
    }

    /// Drop a running property transition, leaving the current value.
    pub fn cancel_transition(&mut self, property: Property) {
        self.transitions.retain(|t| match t {
            Transition::Property { property: p, .. } => *p != property,
            Transition::Frame { .. } => true,
        });
    }

    /// Drop a running frame transition, leaving the current frame.
    pub fn cancel_frame_transition(&mut self) {
        self.transitions
            .retain(|t| !matches!(t, Transition::Frame { .. }));
    }

    pub fn is_animating(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Advance running transitions by `dt`. Returns whether any are still running.
    pub fn advance(&mut self, dt: Duration) -> bool {
        for transition in &mut self.transitions {
            match transition {
                Transition::Property {
                    property,
                    from,
                    to,
                    animation,
                    elapsed,
                } => {
                    *elapsed += dt;
                    let t = animation.progress(*elapsed);
                    let value = match PropertyValue::lerp(from, to, t) {
                        Some(value) => value,
                        // Discrete values switch when the transition completes.
                        None if animation.is_finished(*elapsed) => to.clone(),
                        None => from.clone(),
                    };
                    self.render.style_dirty |= property.affects_layout();
                    self.attributes.insert(*property, value);
                }
                Transition::Frame {
                    from,
                    to,
                    animation,
                    elapsed,
                } => {
                    *elapsed += dt;
                    self.frame = Frame::lerp(*from, *to, animation.progress(*elapsed));
                }
            }
        }

        self.transitions.retain(|t| match t {
            Transition::Property {
                animation, elapsed, ..
            }
            | Transition::Frame {
                animation, elapsed, ..
            } => !animation.is_finished(*elapsed),
        });
        self.is_animating()
    }

    // -------------------------------------------------------------------------
    // Event targets
    // -------------------------------------------------------------------------

    pub fn add_target(&mut self, target: EventTarget) {
        self.targets.push(target);
    }

    pub(crate) fn replace_targets(&mut self, targets: Vec<EventTarget>) {
        self.targets = targets;
    }

    pub fn remove_all_targets(&mut self) {
        self.targets.clear();
    }

    pub fn has_target(&self, event: &str) -> bool {
        self.targets.iter().any(|t| t.event == event)
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub(crate) fn handlers_for(&self, event: &str) -> Vec<EventHandler> {
        self.targets
            .iter()
            .filter(|t| t.event == event)
            .map(|t| Rc::clone(&t.handler))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Curve, Rgba};

    #[test]
    fn test_get_falls_back_to_default() {
        let view = View::new(ViewKind::View);
        assert_eq!(view.get(Property::Alpha), PropertyValue::Float(1.0));
        assert!(view.attribute(Property::Alpha).is_none());
        assert!(view.is_included_in_layout());
    }

    #[test]
    fn test_fresh_view_is_not_owned() {
        let view = View::new(ViewKind::Label).with(Property::Text, "hello");
        assert!(!view.is_owned());
        assert_eq!(view.reuse_tag(), None);
        assert_eq!(view.get(Property::Text), PropertyValue::Text("hello".into()));
    }

    #[test]
    fn test_color_transition_interpolates() {
        let mut view = View::new(ViewKind::View).with(Property::BackgroundColor, Rgba::BLACK);
        view.animate(
            Property::BackgroundColor,
            Rgba::WHITE,
            Animation::new(Duration::from_millis(200)),
        );

        assert!(view.advance(Duration::from_millis(100)));
        assert_eq!(
            view.get(Property::BackgroundColor),
            PropertyValue::Color(Rgba::new(128, 128, 128, 255))
        );

        assert!(!view.advance(Duration::from_millis(100)));
        assert_eq!(view.get(Property::BackgroundColor), PropertyValue::Color(Rgba::WHITE));
    }

    #[test]
    fn test_discrete_transition_switches_at_end() {
        let mut view = View::new(ViewKind::Label).with(Property::Text, "old");
        view.animate(Property::Text, "new", Animation::new(Duration::from_millis(50)));

        view.advance(Duration::from_millis(25));
        assert_eq!(view.get(Property::Text), PropertyValue::Text("old".into()));
        view.advance(Duration::from_millis(25));
        assert_eq!(view.get(Property::Text), PropertyValue::Text("new".into()));
    }

    #[test]
    fn test_frame_transition() {
        let mut view = View::new(ViewKind::View).with_frame(Frame::new(0.0, 0.0, 10.0, 10.0));
        let target = Frame::new(0.0, 100.0, 10.0, 10.0);
        view.animate_frame(
            target,
            Animation::new(Duration::from_millis(100)).with_curve(Curve::Linear),
        );
        assert_eq!(view.target_frame(), target);

        view.advance(Duration::from_millis(50));
        assert_eq!(view.frame(), Frame::new(0.0, 50.0, 10.0, 10.0));
        view.advance(Duration::from_millis(50));
        assert_eq!(view.frame(), target);
        assert!(!view.is_animating());
    }

    #[test]
    fn test_target_value_reports_running_transition() {
        let mut view = View::new(ViewKind::View);
        view.set(Property::Alpha, 0.0_f32);
        view.animate(Property::Alpha, 0.6_f32, Animation::new(Duration::from_millis(100)));

        assert_eq!(view.get(Property::Alpha), PropertyValue::Float(0.0));
        assert_eq!(view.target_value(Property::Alpha), PropertyValue::Float(0.6));
        assert_eq!(view.target_value(Property::CornerRadius), view.get(Property::CornerRadius));
    }

    #[test]
    fn test_cancel_frame_transition_keeps_property_transitions() {
        let mut view = View::new(ViewKind::View);
        view.animate_frame(Frame::new(0.0, 40.0, 10.0, 10.0), Animation::new(Duration::from_millis(100)));
        view.animate(Property::Alpha, 0.0_f32, Animation::new(Duration::from_millis(100)));

        view.cancel_frame_transition();
        assert_eq!(view.target_frame(), view.frame());
        assert!(view.is_animating());

        view.advance(Duration::from_millis(100));
        assert_eq!(view.frame(), Frame::ZERO);
        assert_eq!(view.get(Property::Alpha), PropertyValue::Float(0.0));
    }

    #[test]
    fn test_only_layout_properties_dirty_the_style() {
        let mut view = View::new(ViewKind::View);
        assert!(view.render.style_dirty);

        view.render.style_dirty = false;
        view.set(Property::BackgroundColor, Rgba::RED);
        assert!(!view.render.style_dirty);

        view.set(Property::Width, 120.0_f32);
        assert!(view.render.style_dirty);
    }

    #[test]
    fn test_event_targets() {
        let mut view = View::new(ViewKind::Button);
        view.add_target(EventTarget::new("tap", |_| {}));
        view.add_target(EventTarget::new("tap", |_| {}));
        view.add_target(EventTarget::new("hold", |_| {}));

        assert_eq!(view.handlers_for("tap").len(), 2);
        assert!(view.has_target("hold"));

        view.remove_all_targets();
        assert_eq!(view.target_count(), 0);
    }
}
