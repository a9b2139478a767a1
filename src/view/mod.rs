//! Native views - the retained hierarchy nodes render into.
//!
//! Views live in a [`ViewTree`] arena and are addressed by [`ViewId`]. Each
//! view has a persistent layout box in the tree's taffy instance, kept in the
//! same child order as its layout-participating subviews.

mod tree;
#[allow(clippy::module_inception)]
mod view;

pub use tree::*;
pub use view::*;

slotmap::new_key_type! {
    /// Handle to a view in a [`ViewTree`].
    pub struct ViewId;
}
