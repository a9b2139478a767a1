//! # spark-nodes
//!
//! Declarative node trees reconciled onto a retained view hierarchy.
//!
//! ## Architecture
//!
//! Application code describes the UI as a tree of [`Node`]s, rebuilt on every
//! render. The [`Engine`] maps that tree onto long-lived [`View`]s, reusing a
//! view whenever a node at the same level carries the same reuse identifier:
//!
//! ```text
//! Node tree → reconcile → configure (styles, closures, property diff) → layout (taffy) → animate
//! ```
//!
//! Property stores are diffed per pass: a property a node stops setting goes
//! back to the value the view had before any node first set it, so reused
//! views never leak state from their previous owner.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Frame, Rgba, Dimension, ViewKind, etc.)
//! - [`properties`] - Property identities, values, stores and diff/restore
//! - [`view`] - Native view model and the view arena
//! - [`engine`] - Node arena, lifecycle, reconciler, delegates
//! - [`layout`] - Taffy bridge, layout driver, layout animator
//!
//! ## Example
//!
//! ```ignore
//! use spark_nodes::*;
//!
//! let mut engine = Engine::new(EngineConfig::from_env());
//! let window = engine.views_mut().insert(View::new(ViewKind::View))?;
//!
//! let root = engine.insert(
//!     Node::new(ViewKind::View)
//!         .child(Node::new(ViewKind::Label).configure(|cfg| {
//!             cfg.set(Property::Text, "Hello");
//!         })),
//! )?;
//! engine.reconcile(root, Some(window), Some(Size::new(320.0, 480.0)), LayoutOptions::empty())?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod properties;
pub mod style;
pub mod types;
pub mod view;

// Re-export commonly used items
pub use types::*;

pub use config::{EngineConfig, StyleContext};
pub use engine::{
    ComponentKey, DelegateKey, Engine, Lifecycle, LifecycleEvent, Node, NodeData, NodeDelegate,
    NodeId, ReconcileReport,
};
pub use error::{Disposal, NodeError};
pub use layout::LayoutAnimator;
pub use properties::{Configurator, Property, PropertyStore, PropertyValue};
pub use style::{NodeStyle, StyleRule, StyleValue};
pub use view::{EventTarget, RenderContext, View, ViewEvent, ViewId, ViewTree};
