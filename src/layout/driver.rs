//! Layout driver - configure, compute, normalize, animate.

use log::{debug, info};

use crate::engine::{Engine, NodeId};
use crate::error::NodeError;
use crate::types::{LayoutOptions, Size};

use super::taffy_bridge;

impl Engine {
    /// Configure `id`'s subtree and lay it out within `bounds`.
    ///
    /// Non-finite bounds leave that axis to content. When the node's owning
    /// component has a [`LayoutAnimator`](super::LayoutAnimator), views move
    /// from their old frames to the new ones and newly created views fade in
    /// afterwards; otherwise frames change immediately.
    ///
    /// A no-op with a logged warning when `id` is disposed.
    pub fn layout(&mut self, id: NodeId, bounds: Size, options: LayoutOptions) -> Result<(), NodeError> {
        if !self.is_live(id, "layout") {
            return Ok(());
        }
        self.configure_node(id, bounds, options)?;

        let nodes = self.nodes.subtree(id);
        for node in &nodes {
            self.nodes[*node].store.clear();
        }

        let root = self.bound_view(id);
        let size = taffy_bridge::compute(&mut self.views, root, bounds, self.config.scale_factor)?;

        let views: Vec<_> = nodes
            .iter()
            .filter_map(|node| self.nodes[*node].view)
            .filter(|view| self.views.contains(*view))
            .collect();

        let animator = self
            .nodes
            .owning_component(id)
            .and_then(|component| self.observers.animator(component));
        let animated = match animator {
            Some(animator) => animator.animate(&mut self.views, &views, self.config.fade_in_new_views),
            None => 0,
        };
        for view in &views {
            self.views[*view].render.appearing = false;
        }

        if self.config.debug_layout {
            info!(
                "layout {id:?}: {} views in {:?} -> {}x{}, {animated} animated",
                views.len(),
                bounds,
                size.width,
                size.height
            );
        } else {
            debug!("layout {id:?}: {}x{}", size.width, size.height);
        }
        Ok(())
    }
}
