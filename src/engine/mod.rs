//! Node engine - node arena, view hierarchy and lifecycle plumbing.
//!
//! The engine owns everything:
//! - NodeTree: arena of live nodes (rebuilt by the app every render)
//! - ViewTree: arena of native views (long-lived, reused across renders)
//! - Observers: delegates, components and notification observers
//!
//! # Architecture
//!
//! Nodes and views never hold references to each other, only ids:
//!
//! ```text
//! NodeId ──view──▶ ViewId            ViewId ──bound_node──▶ NodeId
//!   │                 │
//!   parent/children   superview/subviews
//! ```
//!
//! Stale ids are harmless: disposed nodes and destroyed views fall out of
//! their slotmaps, and every lookup through an old key misses.
//!
//! `Engine` holds `Rc` closures and boxed delegates, so it is neither `Send`
//! nor `Sync`; all work happens on the thread that created it.

mod delegate;
mod lifecycle;
mod node;
mod reconciler;

pub use delegate::*;
pub use node::*;
pub use reconciler::ReconcileReport;

use std::time::Duration;

use log::warn;

use crate::config::{EngineConfig, StyleContext};
use crate::error::NodeError;
use crate::layout::LayoutAnimator;
use crate::view::{ViewId, ViewTree};

/// The reconciliation engine.
pub struct Engine {
    pub(crate) nodes: NodeTree,
    pub(crate) views: ViewTree,
    pub(crate) observers: Observers,
    pub(crate) config: EngineConfig,
    pub(crate) style: StyleContext,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            nodes: NodeTree::new(),
            views: ViewTree::new(),
            observers: Observers::default(),
            config,
            style: StyleContext::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate a node tree and add it to the arena.
    ///
    /// Fails with [`NodeError::AmbiguousReuseIdentifier`] when any node in the
    /// tree has a creation closure but no reuse qualifier; nothing is
    /// inserted in that case.
    pub fn insert(&mut self, node: Node) -> Result<NodeId, NodeError> {
        self.nodes.insert(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &NodeTree {
        &self.nodes
    }

    pub fn views(&self) -> &ViewTree {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut ViewTree {
        &mut self.views
    }

    // =========================================================================
    // Style context
    // =========================================================================

    pub fn style_context(&self) -> &StyleContext {
        &self.style
    }

    /// Replace the resolved style values seen by the next pass.
    pub fn set_style_context(&mut self, style: StyleContext) {
        self.style = style;
    }

    // =========================================================================
    // Delegates and components
    // =========================================================================

    pub fn register_delegate(&mut self, delegate: impl NodeDelegate + 'static) -> DelegateKey {
        self.observers.register_delegate(delegate)
    }

    pub fn unregister_delegate(&mut self, key: DelegateKey) -> bool {
        self.observers.unregister_delegate(key)
    }

    pub fn register_component(
        &mut self,
        component: impl NodeDelegate + 'static,
        animator: Option<LayoutAnimator>,
    ) -> ComponentKey {
        self.observers.register_component(component, animator)
    }

    pub fn unregister_component(&mut self, key: ComponentKey) -> bool {
        self.observers.unregister_component(key)
    }

    pub fn set_layout_animator(&mut self, component: ComponentKey, animator: Option<LayoutAnimator>) {
        self.observers.set_animator(component, animator);
    }

    // =========================================================================
    // Transition clock
    // =========================================================================

    /// Advance every running transition by `dt`. Returns whether any are
    /// still running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.views.advance(dt)
    }

    pub fn is_animating(&self) -> bool {
        self.views.is_animating()
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Log and report access to a disposed node.
    pub(crate) fn is_live(&self, id: NodeId, operation: &str) -> bool {
        if self.nodes.contains(id) {
            return true;
        }
        warn!("{operation}: node {id:?} is disposed; ignoring");
        false
    }

    /// The node's bound view. Panics if it has none: every caller runs after
    /// construction.
    pub(crate) fn bound_view(&self, id: NodeId) -> ViewId {
        match self.nodes.get(id).and_then(|node| node.view) {
            Some(view) if self.views.contains(view) => view,
            _ => panic!("node {id:?} has no bound view after construction"),
        }
    }
}
