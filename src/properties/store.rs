//! Property store and the diff/restore pass.
//!
//! A node's store is rebuilt on every configuration pass. After the pass,
//! [`apply_delta`] compares it with what the previous pass applied to the
//! same view: dropped properties go back to their pristine baseline, present
//! ones are (re)applied, optionally through a transition.

use std::collections::HashMap;

use crate::config::StyleContext;
use crate::engine::NodeId;
use crate::types::{Animation, Size};
use crate::view::View;

use super::property::{Property, PropertyValue};

// =============================================================================
// Property store
// =============================================================================

/// One recorded property application.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub value: PropertyValue,
    pub animation: Option<Animation>,
}

/// Per-node map from property identity to the value it should have.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore {
    entries: HashMap<Property, PropertyEntry>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an immediate application. Later calls win.
    pub fn set(&mut self, property: Property, value: impl Into<PropertyValue>) {
        self.entries.insert(
            property,
            PropertyEntry {
                value: value.into(),
                animation: None,
            },
        );
    }

    /// Record an application performed through `animation`.
    pub fn set_animated(
        &mut self,
        property: Property,
        value: impl Into<PropertyValue>,
        animation: Animation,
    ) {
        self.entries.insert(
            property,
            PropertyEntry {
                value: value.into(),
                animation: Some(animation),
            },
        );
    }

    pub fn remove(&mut self, property: Property) -> Option<PropertyEntry> {
        self.entries.remove(&property)
    }

    pub fn get(&self, property: Property) -> Option<&PropertyEntry> {
        self.entries.get(&property)
    }

    pub fn contains(&self, property: Property) -> bool {
        self.entries.contains_key(&property)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &PropertyEntry)> {
        self.entries.iter().map(|(property, entry)| (*property, entry))
    }
}

// =============================================================================
// Configurator
// =============================================================================

/// Handle given to styles and configuration closures.
///
/// Writes go to the node's fresh property store; the bound view is readable
/// but never written directly, so every change flows through the diff.
pub struct Configurator<'a> {
    node: NodeId,
    view: &'a View,
    style: &'a StyleContext,
    bounds: Size,
    store: &'a mut PropertyStore,
}

impl<'a> Configurator<'a> {
    pub(crate) fn new(
        node: NodeId,
        view: &'a View,
        style: &'a StyleContext,
        bounds: Size,
        store: &'a mut PropertyStore,
    ) -> Self {
        Self {
            node,
            view,
            style,
            bounds,
            store,
        }
    }

    /// The node being configured.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The view bound to the node, as of the start of this pass.
    pub fn view(&self) -> &View {
        self.view
    }

    /// Resolved style values for this pass.
    pub fn style(&self) -> &StyleContext {
        self.style
    }

    /// Bounds of the configure/layout call in progress.
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn set(&mut self, property: Property, value: impl Into<PropertyValue>) -> &mut Self {
        self.store.set(property, value);
        self
    }

    pub fn animate(
        &mut self,
        property: Property,
        value: impl Into<PropertyValue>,
        animation: Animation,
    ) -> &mut Self {
        self.store.set_animated(property, value, animation);
        self
    }

    /// Drop a property recorded earlier in this pass (by a style, say).
    pub fn unset(&mut self, property: Property) -> &mut Self {
        self.store.remove(property);
        self
    }

    /// Value recorded so far in this pass, if any.
    pub fn pending(&self, property: Property) -> Option<&PropertyValue> {
        self.store.get(property).map(|entry| &entry.value)
    }
}

// =============================================================================
// Diff / restore
// =============================================================================

/// Counts from one [`apply_delta`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaSummary {
    pub restored: usize,
    pub applied: usize,
    pub animated: usize,
}

/// Apply `store` to `view`, restoring properties the previous pass set but
/// this one did not.
///
/// The baseline for a property is captured the first time it is ever applied
/// to the view and never overwritten, so a restore always lands on the value
/// the view had before any node touched it.
pub fn apply_delta(view: &mut View, store: &PropertyStore) -> DeltaSummary {
    let mut summary = DeltaSummary::default();
    let previous = std::mem::take(&mut view.render.applied);

    for property in previous.keys() {
        if store.contains(*property) {
            continue;
        }
        let baseline = view
            .render
            .baseline
            .get(property)
            .cloned()
            .unwrap_or_else(|| property.default_value());
        view.cancel_transition(*property);
        view.set(*property, baseline);
        summary.restored += 1;
    }

    let mut applied = HashMap::with_capacity(store.len());
    for (property, entry) in store.iter() {
        if !view.render.baseline.contains_key(&property) {
            // A running transition (a fade-in, say) is not the resting value.
            let pristine = view.target_value(property);
            view.render.baseline.insert(property, pristine);
        }
        match entry.animation {
            Some(animation) => {
                view.animate(property, entry.value.clone(), animation);
                summary.animated += 1;
            }
            None => {
                view.cancel_transition(property);
                view.set(property, entry.value.clone());
            }
        }
        applied.insert(property, entry.value.clone());
        summary.applied += 1;
    }
    view.render.applied = applied;

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rgba, ViewKind};
    use std::time::Duration;

    fn store_with(entries: &[(Property, PropertyValue)]) -> PropertyStore {
        let mut store = PropertyStore::new();
        for (property, value) in entries {
            store.set(*property, value.clone());
        }
        store
    }

    #[test]
    fn test_store_last_write_wins() {
        let mut store = PropertyStore::new();
        store.set(Property::Alpha, 0.5_f32);
        store.set(Property::Alpha, 0.25_f32);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(Property::Alpha).map(|e| e.value.clone()),
            Some(PropertyValue::Float(0.25))
        );
    }

    #[test]
    fn test_restore_returns_to_pristine_baseline() {
        let mut view = View::new(ViewKind::View);
        view.set(Property::Alpha, 0.8_f32);

        apply_delta(&mut view, &store_with(&[(Property::Alpha, 1.0_f32.into())]));
        apply_delta(&mut view, &store_with(&[(Property::Alpha, 0.3_f32.into())]));
        assert_eq!(view.get(Property::Alpha), PropertyValue::Float(0.3));

        let summary = apply_delta(&mut view, &PropertyStore::new());
        assert_eq!(summary.restored, 1);
        // Back to the value before any node applied Alpha, not the last one.
        assert_eq!(view.get(Property::Alpha), PropertyValue::Float(0.8));
    }

    #[test]
    fn test_untouched_properties_are_left_alone() {
        let mut view = View::new(ViewKind::Label);
        view.set(Property::TextColor, Rgba::RED);

        apply_delta(&mut view, &store_with(&[(Property::Text, "hi".into())]));
        apply_delta(&mut view, &PropertyStore::new());

        assert_eq!(view.get(Property::Text), PropertyValue::None);
        assert_eq!(view.get(Property::TextColor), PropertyValue::Color(Rgba::RED));
    }

    #[test]
    fn test_animated_application_starts_transition() {
        let mut view = View::new(ViewKind::View);
        let mut store = PropertyStore::new();
        store.set_animated(
            Property::Alpha,
            0.0_f32,
            Animation::new(Duration::from_millis(100)),
        );

        let summary = apply_delta(&mut view, &store);
        assert_eq!(summary.animated, 1);
        assert!(view.is_animating());
        assert_eq!(view.get(Property::Alpha), PropertyValue::Float(1.0));

        view.advance(Duration::from_millis(100));
        assert!(!view.is_animating());
        assert_eq!(view.get(Property::Alpha), PropertyValue::Float(0.0));
    }

    #[test]
    fn test_baseline_is_the_settled_value() {
        let mut view = View::new(ViewKind::View);
        view.set(Property::Alpha, 0.0_f32);
        view.animate(Property::Alpha, 1.0_f32, Animation::new(Duration::from_millis(100)));

        apply_delta(&mut view, &store_with(&[(Property::Alpha, 0.5_f32.into())]));
        assert_eq!(view.render.baseline(Property::Alpha), Some(&PropertyValue::Float(1.0)));
        assert!(!view.is_animating());

        apply_delta(&mut view, &PropertyStore::new());
        assert_eq!(view.get(Property::Alpha), PropertyValue::Float(1.0));
    }
}
