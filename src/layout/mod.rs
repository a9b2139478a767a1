//! Layout Module
//!
//! Flexbox layout for view hierarchies using Taffy.
//!
//! # Architecture
//!
//! The layout module uses [Taffy](https://github.com/DioxusLabs/taffy) for
//! W3C-compliant flexbox computation. The bridge:
//!
//! 1. Converts view layout properties → Taffy styles
//! 2. Mirrors subview order into the persistent Taffy tree
//! 3. Measures leaves from their `IntrinsicSize` property
//! 4. Writes computed layout back as normalized view frames
//!
//! The driver ([`Engine::layout`](crate::Engine::layout)) wraps this with the
//! configuration pass before and the optional [`LayoutAnimator`] after.

mod animator;
mod driver;
mod taffy_bridge;

pub use animator::LayoutAnimator;
pub use taffy_bridge::{compute, normalize_frame};
