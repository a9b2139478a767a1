//! View arena mirrored into a persistent taffy tree.

use std::ops::{Index, IndexMut};
use std::time::Duration;

use slotmap::{SecondaryMap, SlotMap};
use smallvec::SmallVec;
use taffy::{NodeId as LayoutNode, Style, TaffyTree};

use crate::error::NodeError;

use super::{View, ViewId};

/// Candidate pool of reusable subviews.
pub type SubviewPool = SmallVec<[ViewId; 8]>;

/// Owns every view and its backing layout box.
pub struct ViewTree {
    pub(crate) views: SlotMap<ViewId, View>,
    pub(crate) layout: TaffyTree<ViewId>,
    pub(crate) layout_nodes: SecondaryMap<ViewId, LayoutNode>,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    pub fn new() -> Self {
        let mut layout = TaffyTree::new();
        // Frames are snapped to the configured pixel grid after write-back.
        layout.disable_rounding();
        Self {
            views: SlotMap::with_key(),
            layout,
            layout_nodes: SecondaryMap::new(),
        }
    }

    /// Add a detached view to the arena.
    pub fn insert(&mut self, view: View) -> Result<ViewId, NodeError> {
        let id = self.views.insert(view);
        match self.layout.new_leaf_with_context(Style::default(), id) {
            Ok(node) => {
                self.layout_nodes.insert(id, node);
                Ok(id)
            }
            Err(err) => {
                self.views.remove(id);
                Err(err.into())
            }
        }
    }

    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.get(id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.get_mut(id)
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn superview(&self, id: ViewId) -> Option<ViewId> {
        self.views.get(id).and_then(|v| v.superview)
    }

    pub fn subviews(&self, id: ViewId) -> &[ViewId] {
        self.views.get(id).map_or(&[], |v| v.subviews.as_slice())
    }

    /// Subviews created by nodes, in current subview order.
    pub fn owned_subviews(&self, id: ViewId) -> SubviewPool {
        self.subviews(id)
            .iter()
            .copied()
            .filter(|sub| self.views.get(*sub).is_some_and(|v| v.owned))
            .collect()
    }

    pub(crate) fn layout_node(&self, id: ViewId) -> Option<LayoutNode> {
        self.layout_nodes.get(id).copied()
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    pub fn add_subview(&mut self, parent: ViewId, child: ViewId) -> Result<(), NodeError> {
        let end = self.subviews(parent).len();
        self.insert_subview(parent, child, end)
    }

    /// Place `child` at `index` under `parent`, moving it if it already has a
    /// superview. Indices past the end append.
    pub fn insert_subview(
        &mut self,
        parent: ViewId,
        child: ViewId,
        index: usize,
    ) -> Result<(), NodeError> {
        if !self.views.contains_key(parent) {
            return Err(NodeError::UnknownView(parent));
        }
        if !self.views.contains_key(child) {
            return Err(NodeError::UnknownView(child));
        }

        let previous = self.views[child].superview;
        if let Some(previous) = previous {
            if let Some(old_parent) = self.views.get_mut(previous) {
                old_parent.subviews.retain(|sub| *sub != child);
            }
        }

        let subviews = &mut self.views[parent].subviews;
        let index = index.min(subviews.len());
        subviews.insert(index, child);
        self.views[child].superview = Some(parent);

        if let Some(previous) = previous.filter(|p| *p != parent) {
            self.sync_layout_children(previous)?;
        }
        self.sync_layout_children(parent)
    }

    /// Detach `child` from its superview. Returns false when it had none.
    pub fn remove_from_superview(&mut self, child: ViewId) -> Result<bool, NodeError> {
        let Some(parent) = self.superview(child) else {
            return Ok(false);
        };
        if let Some(parent_view) = self.views.get_mut(parent) {
            parent_view.subviews.retain(|sub| *sub != child);
        }
        self.views[child].superview = None;
        if self.views.contains_key(parent) {
            self.sync_layout_children(parent)?;
        }
        Ok(true)
    }

    /// Detach `id` and drop it with its whole subtree. Returns the number of
    /// views removed.
    pub fn destroy(&mut self, id: ViewId) -> Result<usize, NodeError> {
        if !self.views.contains_key(id) {
            return Ok(0);
        }
        self.remove_from_superview(id)?;

        let doomed = self.subtree(id);
        for view in &doomed {
            self.views.remove(*view);
            if let Some(node) = self.layout_nodes.remove(*view) {
                self.layout.remove(node)?;
            }
        }
        Ok(doomed.len())
    }

    /// `id` and all of its descendants, pre-order.
    pub fn subtree(&self, id: ViewId) -> Vec<ViewId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(view) = self.views.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(view.subviews.iter().rev().copied());
        }
        out
    }

    /// Mirror `parent`'s subviews that take part in layout into its layout box.
    pub(crate) fn sync_layout_children(&mut self, parent: ViewId) -> Result<(), NodeError> {
        let Some(parent_node) = self.layout_node(parent) else {
            return Ok(());
        };
        let children: SmallVec<[LayoutNode; 8]> = self.views[parent]
            .subviews
            .iter()
            .filter(|sub| self.views[**sub].is_included_in_layout())
            .filter_map(|sub| self.layout_nodes.get(*sub).copied())
            .collect();

        if self.layout.children(parent_node)?.as_slice() != children.as_slice() {
            self.layout.set_children(parent_node, &children)?;
        }
        Ok(())
    }

    pub fn mark_layout_dirty(&mut self, id: ViewId) -> Result<(), NodeError> {
        if let Some(node) = self.layout_node(id) {
            self.layout.mark_dirty(node)?;
        }
        Ok(())
    }

    // =========================================================================
    // Transition clock
    // =========================================================================

    /// Advance every running transition. Returns whether any are still running.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let mut running = false;
        for (_, view) in self.views.iter_mut() {
            if view.is_animating() {
                running |= view.advance(dt);
            }
        }
        running
    }

    pub fn is_animating(&self) -> bool {
        self.views.values().any(View::is_animating)
    }
}

impl Index<ViewId> for ViewTree {
    type Output = View;

    fn index(&self, id: ViewId) -> &View {
        &self.views[id]
    }
}

impl IndexMut<ViewId> for ViewTree {
    fn index_mut(&mut self, id: ViewId) -> &mut View {
        &mut self.views[id]
    }
}
