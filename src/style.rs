//! Node styles.
//!
//! A style is anything that can `apply` itself to a node's configurator.
//! Styles run before the configuration closure, so the closure can override
//! anything a style sets, and everything they set is restored on the same
//! terms as closure-set properties.

use log::warn;

use crate::properties::{Configurator, Property, PropertyValue};

/// Capability implemented by every entry in a node's style list.
pub trait NodeStyle {
    fn apply(&self, cfg: &mut Configurator<'_>);
}

impl<F> NodeStyle for F
where
    F: Fn(&mut Configurator<'_>),
{
    fn apply(&self, cfg: &mut Configurator<'_>) {
        self(cfg)
    }
}

/// A rule value: either literal or looked up in the pass's style context.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Value(PropertyValue),
    Variable(String),
}

/// A named, resolved list of property assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRule {
    name: String,
    properties: Vec<(Property, StyleValue)>,
}

impl StyleRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn set(mut self, property: Property, value: impl Into<PropertyValue>) -> Self {
        self.properties
            .push((property, StyleValue::Value(value.into())));
        self
    }

    /// Assign `property` from the style context variable `variable`.
    pub fn var(mut self, property: Property, variable: impl Into<String>) -> Self {
        self.properties
            .push((property, StyleValue::Variable(variable.into())));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl NodeStyle for StyleRule {
    fn apply(&self, cfg: &mut Configurator<'_>) {
        for (property, value) in &self.properties {
            match value {
                StyleValue::Value(value) => {
                    cfg.set(*property, value.clone());
                }
                StyleValue::Variable(variable) => match cfg.style().get(variable).cloned() {
                    Some(value) => {
                        cfg.set(*property, value);
                    }
                    None => warn!(
                        "style `{}`: undefined variable `{variable}` for {property:?}",
                        self.name
                    ),
                },
            }
        }
    }
}
