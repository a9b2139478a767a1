//! Node lifecycle: construct, configure, dispose, and the side channels
//! (event targets, notification observers, key lookup).

use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::error::{Disposal, NodeError};
use crate::properties::{Configurator, PropertyStore, apply_delta};
use crate::types::{LayoutOptions, Size};
use crate::view::{View, ViewEvent, ViewId};

use super::delegate::{Lifecycle, LifecycleEvent};
use super::{Engine, NodeId};

impl Engine {
    // =========================================================================
    // Construct
    // =========================================================================

    /// Bind a view to `id`.
    ///
    /// `reusable` is rebound when it is owned and carries the node's
    /// fingerprint; otherwise a fresh view is created, tagged, and scheduled
    /// for a mount notification. Fresh views are not attached to any
    /// superview.
    ///
    /// # Panics
    ///
    /// Panics if `id` has been disposed.
    pub fn construct(&mut self, id: NodeId, reusable: Option<ViewId>) -> Result<ViewId, NodeError> {
        let Some(node) = self.nodes.get(id) else {
            panic!("construct called on disposed node {id:?}");
        };
        let kind = node.kind;
        let fingerprint = node.fingerprint;
        let create = node.create.clone();

        if let Some(candidate) = reusable {
            let view = self
                .views
                .get_mut(candidate)
                .ok_or(NodeError::UnknownView(candidate))?;
            if view.owned && view.reuse_tag == Some(fingerprint) {
                if view.kind != kind {
                    return Err(NodeError::ViewKindMismatch {
                        reuse_identifier: self.nodes[id].reuse_identifier.clone(),
                        expected: kind,
                        found: view.kind,
                    });
                }
                view.render.is_new = false;
                let previous = view.bound_node.replace(id);

                // The view now belongs to this node alone.
                if let Some(previous) = previous.filter(|p| *p != id) {
                    if let Some(old) = self.nodes.get_mut(previous) {
                        if old.view == Some(candidate) {
                            old.view = None;
                        }
                    }
                }
                self.nodes[id].view = Some(candidate);
                trace!("rebound {candidate:?} to {id:?}");
                return Ok(candidate);
            }
            debug!("{candidate:?} is not reusable for {id:?}; constructing");
        }

        let mut view = match create {
            Some(create) => create(&self.style),
            None => View::new(kind),
        };
        if view.kind != kind {
            return Err(NodeError::ViewKindMismatch {
                reuse_identifier: self.nodes[id].reuse_identifier.clone(),
                expected: kind,
                found: view.kind,
            });
        }
        view.mark_owned(fingerprint);
        view.render.is_new = true;
        view.render.appearing = true;
        view.bound_node = Some(id);

        let view_id = self.views.insert(view)?;
        let node = &mut self.nodes[id];
        node.view = Some(view_id);
        node.pending_mount = true;
        trace!("constructed {view_id:?} for {id:?} ({})", node.reuse_identifier);
        Ok(view_id)
    }

    // =========================================================================
    // Configure
    // =========================================================================

    /// Configure `id` and its subtree without running layout.
    ///
    /// A no-op with a logged warning when `id` is disposed.
    pub fn configure_and_layout(
        &mut self,
        id: NodeId,
        bounds: Size,
        options: LayoutOptions,
    ) -> Result<(), NodeError> {
        if !self.is_live(id, "configure_and_layout") {
            return Ok(());
        }
        self.configure_node(id, bounds, options)
    }

    pub(crate) fn configure_node(
        &mut self,
        id: NodeId,
        bounds: Size,
        options: LayoutOptions,
    ) -> Result<(), NodeError> {
        let view_id = self.ensure_view(id)?;
        let notify = !options.contains(LayoutOptions::SUPPRESS_DELEGATES);

        if notify {
            self.notify(id, view_id, Lifecycle::WillLayout);
        }

        let old_frame = self.views[view_id].frame;
        self.views[view_id].render.old_frame = old_frame;

        let mut store = PropertyStore::new();
        {
            let node = &self.nodes[id];
            let mut cfg = Configurator::new(id, &self.views[view_id], &self.style, bounds, &mut store);
            for style in &node.styles {
                style.apply(&mut cfg);
            }
            if let Some(configure) = &node.configure {
                configure(&mut cfg);
            }
            if let Some(overrides) = &node.overrides {
                overrides(&mut cfg);
            }
        }

        let children = self.nodes[id].children.clone();
        for child in children {
            let node = &mut self.nodes[child];
            if node.aborted {
                node.aborted = false;
                continue;
            }
            self.configure_node(child, bounds, options)?;
        }

        let handlers = self.nodes[id].handlers.clone();
        let view = &mut self.views[view_id];
        let summary = apply_delta(view, &store);
        view.replace_targets(handlers);
        trace!("{id:?}: {summary:?}");

        let is_leaf = view.subviews.is_empty() && view.is_included_in_layout();
        if is_leaf {
            view.frame.width = 0.0;
            view.frame.height = 0.0;
            view.render.needs_measure = true;
            self.views.mark_layout_dirty(view_id)?;
        }

        self.nodes[id].store = store;

        if notify {
            self.notify(id, view_id, Lifecycle::DidLayout);
            let node = &mut self.nodes[id];
            if node.pending_mount {
                node.pending_mount = false;
                self.notify(id, view_id, Lifecycle::DidMount);
            }
        }
        Ok(())
    }

    /// The node's view, constructing and attaching one if missing.
    fn ensure_view(&mut self, id: NodeId) -> Result<ViewId, NodeError> {
        if let Some(view) = self.nodes[id].view {
            if self.views.contains(view) {
                return Ok(view);
            }
        }

        let view = self.construct(id, None)?;
        let node = &self.nodes[id];
        let index = node.index;
        if let Some(parent_view) = node.parent.and_then(|p| self.nodes.get(p)).and_then(|p| p.view) {
            if self.views.contains(parent_view) {
                self.views.insert_subview(parent_view, view, index)?;
            }
        }
        Ok(view)
    }

    fn notify(&mut self, id: NodeId, view: ViewId, lifecycle: Lifecycle) {
        let node = &self.nodes[id];
        let rendered = &self.views[view];
        let event = LifecycleEvent {
            node: id,
            view,
            key: node.key.as_deref(),
            frame: rendered.frame,
            newly_created: rendered.render.is_new,
        };
        self.observers
            .notify(node.delegate, node.component, lifecycle, &event);
    }

    // =========================================================================
    // Dispose
    // =========================================================================

    /// Tear down `id` and its subtree.
    ///
    /// Closures, stores and observers are dropped. Bound views stay in the
    /// hierarchy for later reuse but lose their event targets. Calling this
    /// again returns [`Disposal::AlreadyDisposed`].
    pub fn dispose(&mut self, id: NodeId) -> Disposal {
        let Some(parent) = self.nodes.get(id).map(|node| node.parent) else {
            debug!("dispose: {id:?} already disposed");
            return Disposal::AlreadyDisposed;
        };

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|child| *child != id);
            parent.unmanaged_children.retain(|child| *child != id);
        }
        if let Some(parent) = parent {
            self.reindex_children(parent);
        }

        let doomed = self.nodes.subtree_with_unmanaged(id);
        for node_id in &doomed {
            let Some(node) = self.nodes.remove(*node_id) else {
                continue;
            };
            if let Some(view) = node.view.and_then(|v| self.views.get_mut(v)) {
                if view.bound_node == Some(*node_id) {
                    view.remove_all_targets();
                    view.bound_node = None;
                }
            }
            self.observers.remove_observers(*node_id);
        }
        debug!("disposed {id:?} ({} nodes)", doomed.len());
        Disposal::Disposed
    }

    fn reindex_children(&mut self, parent: NodeId) {
        let Some(node) = self.nodes.get(parent) else {
            return;
        };
        let children = node.children.clone();
        let unmanaged = node.unmanaged_children.clone();
        for list in [children, unmanaged] {
            for (index, child) in list.into_iter().enumerate() {
                self.nodes[child].index = index;
            }
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// First node in `id`'s subtree, depth-first, whose key is `key`.
    pub fn node_with_key(&self, id: NodeId, key: &str) -> Option<NodeId> {
        if !self.is_live(id, "node_with_key") {
            return None;
        }
        self.nodes.node_with_key(id, key)
    }

    /// Every key in `id`'s subtree, unmanaged children included.
    pub fn retrieve_keys_recursively(&self, id: NodeId) -> HashSet<String> {
        if !self.is_live(id, "retrieve_keys_recursively") {
            return HashSet::new();
        }
        self.nodes.retrieve_keys_recursively(id)
    }

    // =========================================================================
    // Events and notifications
    // =========================================================================

    /// Deliver `event` to the view's targets. Returns how many handlers ran.
    pub fn dispatch_event(&self, view: ViewId, event: &str) -> usize {
        let Some(target) = self.views.get(view) else {
            warn!("dispatch_event: unknown view {view:?}");
            return 0;
        };
        let handlers = target.handlers_for(event);
        let payload = ViewEvent {
            name: event.to_string(),
            view,
        };
        for handler in &handlers {
            handler(&payload);
        }
        handlers.len()
    }

    /// Run `callback` whenever `name` is posted, until `id` is disposed.
    pub fn add_observer(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        callback: impl FnMut() + 'static,
    ) -> bool {
        if !self.is_live(id, "add_observer") {
            return false;
        }
        self.observers
            .add_observer(id, name.into(), Box::new(callback));
        true
    }

    /// Invoke every observer of `name`. Returns how many ran.
    pub fn post_notification(&mut self, name: &str) -> usize {
        self.observers.post(name)
    }
}
