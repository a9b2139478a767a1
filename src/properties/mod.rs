//! Properties - identities, values, per-node stores and the diff/restore pass.
//!
//! ```text
//! styles + configure + overrides ──▶ PropertyStore ──apply_delta──▶ View
//!                                                      │
//!                                   restore dropped ◀──┘ (pristine baseline)
//! ```

mod property;
mod store;

pub use property::*;
pub use store::*;
