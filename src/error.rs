//! Error taxonomy for node construction, reconciliation and layout.
//!
//! Disposed-node access is not an error: it is logged and turned into a
//! no-op at the call site. Missing-view invariant violations are fatal and
//! panic where they are detected.

use thiserror::Error;

use crate::types::ViewKind;
use crate::view::ViewId;

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A node declares its own creation closure but no reuse qualifier, so its
    /// reuse identifier cannot tell it apart from the default view of its kind.
    #[error("node of kind {kind} has a custom creation closure but no reuse identifier")]
    AmbiguousReuseIdentifier { kind: ViewKind },

    /// A view matched a node by reuse identifier but has a different kind.
    #[error("view kind mismatch for `{reuse_identifier}`: expected {expected}, found {found}")]
    ViewKindMismatch {
        reuse_identifier: String,
        expected: ViewKind,
        found: ViewKind,
    },

    /// `reconcile` was given no target view and the node has no superview.
    #[error("no parent view to reconcile into")]
    NoParentView,

    /// A view id does not refer to a live view.
    #[error("unknown view {0:?}")]
    UnknownView(ViewId),

    /// The layout engine rejected an operation.
    #[error("layout engine error: {0}")]
    Layout(#[from] taffy::TaffyError),
}

/// Outcome of [`Engine::dispose`](crate::Engine::dispose).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal {
    /// The node was live and has now been torn down.
    Disposed,
    /// The node had already been disposed; nothing changed.
    AlreadyDisposed,
}
