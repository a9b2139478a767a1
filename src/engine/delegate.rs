//! Lifecycle notifications for delegates and components.
//!
//! Nodes refer to their delegate and component by key; the objects
//! themselves live here. Unregistering one leaves dangling keys on nodes,
//! which simply stop receiving notifications.

use slotmap::{SecondaryMap, SlotMap};

use crate::layout::LayoutAnimator;
use crate::types::Frame;
use crate::view::ViewId;

use super::NodeId;

slotmap::new_key_type! {
    /// Handle to a registered delegate.
    pub struct DelegateKey;

    /// Handle to a registered component.
    pub struct ComponentKey;
}

/// Which notification is being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    WillLayout,
    DidLayout,
    DidMount,
}

/// Payload of every lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifecycleEvent<'a> {
    pub node: NodeId,
    pub view: ViewId,
    pub key: Option<&'a str>,
    pub frame: Frame,
    /// The view was created, not rebound, for this node.
    pub newly_created: bool,
}

/// Receiver of node lifecycle notifications. Every method defaults to a no-op.
pub trait NodeDelegate {
    fn node_will_layout(&mut self, _event: &LifecycleEvent<'_>) {}

    fn node_did_layout(&mut self, _event: &LifecycleEvent<'_>) {}

    /// Delivered once, after the first layout following view creation.
    fn node_did_mount(&mut self, _event: &LifecycleEvent<'_>) {}
}

fn deliver(target: &mut dyn NodeDelegate, lifecycle: Lifecycle, event: &LifecycleEvent<'_>) {
    match lifecycle {
        Lifecycle::WillLayout => target.node_will_layout(event),
        Lifecycle::DidLayout => target.node_did_layout(event),
        Lifecycle::DidMount => target.node_did_mount(event),
    }
}

struct ComponentEntry {
    delegate: Box<dyn NodeDelegate>,
    animator: Option<LayoutAnimator>,
}

type Observer = (String, Box<dyn FnMut()>);

/// Registry of delegates, components and notification observers.
#[derive(Default)]
pub struct Observers {
    delegates: SlotMap<DelegateKey, Box<dyn NodeDelegate>>,
    components: SlotMap<ComponentKey, ComponentEntry>,
    notifications: SecondaryMap<NodeId, Vec<Observer>>,
}

impl Observers {
    pub fn register_delegate(&mut self, delegate: impl NodeDelegate + 'static) -> DelegateKey {
        self.delegates.insert(Box::new(delegate))
    }

    pub fn unregister_delegate(&mut self, key: DelegateKey) -> bool {
        self.delegates.remove(key).is_some()
    }

    pub fn register_component(
        &mut self,
        delegate: impl NodeDelegate + 'static,
        animator: Option<LayoutAnimator>,
    ) -> ComponentKey {
        self.components.insert(ComponentEntry {
            delegate: Box::new(delegate),
            animator,
        })
    }

    pub fn unregister_component(&mut self, key: ComponentKey) -> bool {
        self.components.remove(key).is_some()
    }

    pub fn set_animator(&mut self, key: ComponentKey, animator: Option<LayoutAnimator>) {
        if let Some(entry) = self.components.get_mut(key) {
            entry.animator = animator;
        }
    }

    pub fn animator(&self, key: ComponentKey) -> Option<LayoutAnimator> {
        self.components.get(key).and_then(|entry| entry.animator)
    }

    /// Deliver `lifecycle` to the delegate, then the component.
    pub(crate) fn notify(
        &mut self,
        delegate: Option<DelegateKey>,
        component: Option<ComponentKey>,
        lifecycle: Lifecycle,
        event: &LifecycleEvent<'_>,
    ) {
        if let Some(target) = delegate.and_then(|key| self.delegates.get_mut(key)) {
            deliver(target.as_mut(), lifecycle, event);
        }
        if let Some(entry) = component.and_then(|key| self.components.get_mut(key)) {
            deliver(entry.delegate.as_mut(), lifecycle, event);
        }
    }

    // =========================================================================
    // Notification observers
    // =========================================================================

    pub(crate) fn add_observer(&mut self, node: NodeId, name: String, callback: Box<dyn FnMut()>) {
        match self.notifications.get_mut(node) {
            Some(observers) => observers.push((name, callback)),
            None => {
                self.notifications.insert(node, vec![(name, callback)]);
            }
        }
    }

    pub(crate) fn remove_observers(&mut self, node: NodeId) -> usize {
        self.notifications.remove(node).map_or(0, |observers| observers.len())
    }

    /// Invoke every observer registered for `name`. Returns how many ran.
    pub(crate) fn post(&mut self, name: &str) -> usize {
        let mut delivered = 0;
        for (_, observers) in self.notifications.iter_mut() {
            for (observed, callback) in observers.iter_mut() {
                if observed == name {
                    callback();
                    delivered += 1;
                }
            }
        }
        delivered
    }
}
