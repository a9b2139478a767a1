//! Engine configuration and the per-pass style context.
//!
//! `EngineConfig` is fixed for the lifetime of an [`Engine`](crate::Engine).
//! `StyleContext` is the resolved style state for one render pass: it is
//! handed read-only to every style and configuration closure, and replaced
//! wholesale between passes.

use std::collections::HashMap;
use std::env;

use crate::properties::PropertyValue;

/// Environment variable overriding [`EngineConfig::scale_factor`].
pub const SCALE_ENV: &str = "SPARK_NODES_SCALE";

/// Environment variable enabling [`EngineConfig::debug_layout`].
pub const DEBUG_LAYOUT_ENV: &str = "SPARK_NODES_DEBUG_LAYOUT";

// =============================================================================
// Engine configuration
// =============================================================================

/// Static engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Device pixels per point. Frames are snapped to this pixel grid.
    pub scale_factor: f32,
    /// Log a summary of every layout pass at `info` level.
    pub debug_layout: bool,
    /// Fade in newly created views when a layout animator is active.
    pub fade_in_new_views: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            debug_layout: false,
            fade_in_new_views: true,
        }
    }
}

impl EngineConfig {
    /// Defaults, overridden by `SPARK_NODES_SCALE` and
    /// `SPARK_NODES_DEBUG_LAYOUT` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var(SCALE_ENV) {
            match raw.parse::<f32>() {
                Ok(scale) if scale.is_finite() && scale > 0.0 => config.scale_factor = scale,
                _ => log::warn!("ignoring invalid {SCALE_ENV}={raw:?}"),
            }
        }
        config.debug_layout = env::var(DEBUG_LAYOUT_ENV).is_ok();

        config
    }

    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }
}

// =============================================================================
// Style context
// =============================================================================

/// Resolved style values for one render pass.
///
/// Stylesheet parsing lives outside this crate; it produces named values that
/// configuration closures read through [`Configurator::style`](crate::Configurator::style).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleContext {
    variables: HashMap<String, PropertyValue>,
}

impl StyleContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
