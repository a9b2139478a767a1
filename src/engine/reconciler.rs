//! Reconciler - maps a node tree onto the existing view hierarchy.
//!
//! Matching is level-by-level: a node can only reuse a view that sits under
//! the same parent view and carries the same reuse fingerprint. A node that
//! moved to another depth always gets a fresh view.
//!
//! ```text
//! parent view subviews: [A:x] [B:y] [C:z]        pool = {A, B, C}
//! declared children:     y  x                    y ← B, x ← A
//! after the pass:       [B:y] [A:x]              C destroyed
//! ```

use log::{debug, error, warn};

use crate::error::NodeError;
use crate::types::{LayoutOptions, Size};
use crate::view::ViewId;

use super::{Engine, NodeId};

/// Counts from one [`Engine::reconcile`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Views constructed fresh.
    pub created: usize,
    /// Views rebound to a new node.
    pub reused: usize,
    /// Unmatched views detached and discarded.
    pub removed: usize,
    /// Child subtrees skipped after a view kind mismatch.
    pub aborted: usize,
}

impl Engine {
    /// Reconcile `id` into `into` (or its view's current superview) and lay
    /// it out at `size` (or the parent's frame size).
    ///
    /// A no-op with a logged warning when `id` is disposed.
    pub fn reconcile(
        &mut self,
        id: NodeId,
        into: Option<ViewId>,
        size: Option<Size>,
        options: LayoutOptions,
    ) -> Result<ReconcileReport, NodeError> {
        if !self.is_live(id, "reconcile") {
            return Ok(ReconcileReport::default());
        }

        let current_superview = self.nodes[id].view.and_then(|view| self.views.superview(view));
        let Some(parent) = into.or(current_superview) else {
            warn!("reconcile: {id:?} has no parent view");
            return Err(NodeError::NoParentView);
        };
        let Some(parent_view) = self.views.get(parent) else {
            return Err(NodeError::UnknownView(parent));
        };
        let size = size.unwrap_or_else(|| parent_view.frame.size());
        let candidate = parent_view.subviews.first().copied();

        let mut report = ReconcileReport::default();
        self.reconcile_node(id, parent, candidate, &mut report)?;
        self.layout(id, size, options)?;

        debug!(
            "reconciled {id:?}: {} created, {} reused, {} removed, {} aborted",
            report.created, report.reused, report.removed, report.aborted
        );
        Ok(report)
    }

    fn reconcile_node(
        &mut self,
        id: NodeId,
        parent: ViewId,
        candidate: Option<ViewId>,
        report: &mut ReconcileReport,
    ) -> Result<ViewId, NodeError> {
        let fingerprint = self.nodes[id].fingerprint;
        let index = self.nodes[id].index;

        let reusable = candidate.filter(|view| {
            self.views
                .get(*view)
                .is_some_and(|v| v.owned && v.reuse_tag == Some(fingerprint))
        });

        let view = match reusable {
            Some(view) => {
                let view = self.construct(id, Some(view))?;
                report.reused += 1;
                view
            }
            None => {
                if let Some(stale) = candidate {
                    report.removed += self.discard(stale)?;
                }
                let view = self.construct(id, None)?;
                report.created += 1;
                view
            }
        };
        self.views.insert_subview(parent, view, index)?;

        let mut pool = self.views.owned_subviews(view);
        let children = self.nodes[id].children.clone();
        for child in children {
            let fingerprint = self.nodes[child].fingerprint;
            let matched = pool
                .iter()
                .position(|sub| self.views[*sub].reuse_tag == Some(fingerprint))
                .map(|at| pool.remove(at));

            match self.reconcile_node(child, view, matched, report) {
                Ok(_) => {}
                Err(err @ NodeError::ViewKindMismatch { .. }) => {
                    error!("skipping subtree {child:?}: {err}");
                    if let Some(rejected) = matched {
                        report.removed += self.discard(rejected)?;
                    }
                    self.nodes[child].aborted = true;
                    report.aborted += 1;
                }
                Err(err) => return Err(err),
            }
        }

        for leftover in pool {
            report.removed += self.discard(leftover)?;
        }
        Ok(view)
    }

    /// Detach a view that lost its slot. Owned views are destroyed, and any
    /// node still bound to them loses its view handle; foreign views are only
    /// detached. Returns 1 if anything was removed.
    fn discard(&mut self, view: ViewId) -> Result<usize, NodeError> {
        let Some(target) = self.views.get(view) else {
            return Ok(0);
        };
        if target.owned {
            for doomed in self.views.subtree(view) {
                let Some(owner) = self.views[doomed].bound_node else {
                    continue;
                };
                if let Some(node) = self.nodes.get_mut(owner) {
                    if node.view == Some(doomed) {
                        debug!("destroying {doomed:?} still bound to live node {owner:?}");
                        node.view = None;
                    }
                }
            }
            self.views.destroy(view)?;
        } else {
            self.views.remove_from_superview(view)?;
        }
        Ok(1)
    }
}
