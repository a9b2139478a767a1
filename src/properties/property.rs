//! Property identities and values.
//!
//! `Property` is the stable per-property fingerprint: the same logical
//! property always hashes to the same slot no matter which closure set it or
//! in what order.

use crate::types::{
    AlignItems, AlignSelf, Dimension, Edges, FlexDirection, FlexWrap, JustifyContent, Point,
    Position, Rgba, Size,
};

// =============================================================================
// Property identity
// =============================================================================

/// Identity of a view property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    // Visual
    BackgroundColor,
    Alpha,
    Hidden,
    Enabled,
    CornerRadius,
    BorderWidth,
    BorderColor,
    ShadowOpacity,
    ShadowRadius,
    ShadowOffset,
    ShadowColor,
    Text,
    TextColor,
    Image,

    // Layout
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    FlexDirection,
    FlexWrap,
    JustifyContent,
    AlignItems,
    AlignSelf,
    FlexGrow,
    FlexShrink,
    FlexBasis,
    Padding,
    Margin,
    Gap,
    Position,
    /// `false` removes the view from flex layout entirely.
    IncludeInLayout,
    /// Content size reported to the layout engine for leaf views.
    IntrinsicSize,

    /// Host-specific attribute.
    Custom(&'static str),
}

impl Property {
    /// Value a freshly created view reports for this property.
    pub fn default_value(&self) -> PropertyValue {
        match self {
            Self::BackgroundColor => PropertyValue::Color(Rgba::CLEAR),
            Self::Alpha => PropertyValue::Float(1.0),
            Self::Hidden => PropertyValue::Bool(false),
            Self::Enabled => PropertyValue::Bool(true),
            Self::CornerRadius | Self::BorderWidth => PropertyValue::Float(0.0),
            Self::BorderColor => PropertyValue::Color(Rgba::BLACK),
            Self::ShadowOpacity => PropertyValue::Float(0.0),
            Self::ShadowRadius => PropertyValue::Float(3.0),
            Self::ShadowOffset => PropertyValue::Point(Point::new(0.0, -3.0)),
            Self::ShadowColor => PropertyValue::Color(Rgba::BLACK),
            Self::TextColor => PropertyValue::Color(Rgba::BLACK),
            Self::Text | Self::Image | Self::IntrinsicSize | Self::Custom(_) => PropertyValue::None,

            Self::Width
            | Self::Height
            | Self::MinWidth
            | Self::MinHeight
            | Self::MaxWidth
            | Self::MaxHeight
            | Self::FlexBasis => PropertyValue::Dimension(Dimension::Auto),
            Self::FlexDirection => PropertyValue::FlexDirection(FlexDirection::Column),
            Self::FlexWrap => PropertyValue::FlexWrap(FlexWrap::NoWrap),
            Self::JustifyContent => PropertyValue::JustifyContent(JustifyContent::FlexStart),
            Self::AlignItems => PropertyValue::AlignItems(AlignItems::Stretch),
            Self::AlignSelf => PropertyValue::AlignSelf(AlignSelf::Auto),
            Self::FlexGrow => PropertyValue::Float(0.0),
            Self::FlexShrink => PropertyValue::Float(1.0),
            Self::Padding | Self::Margin => PropertyValue::Edges(Edges::ZERO),
            Self::Gap => PropertyValue::Float(0.0),
            Self::Position => PropertyValue::Position(Position::Relative),
            Self::IncludeInLayout => PropertyValue::Bool(true),
        }
    }

    /// Whether changing this property can change layout.
    pub const fn affects_layout(&self) -> bool {
        matches!(
            self,
            Self::Width
                | Self::Height
                | Self::MinWidth
                | Self::MinHeight
                | Self::MaxWidth
                | Self::MaxHeight
                | Self::FlexDirection
                | Self::FlexWrap
                | Self::JustifyContent
                | Self::AlignItems
                | Self::AlignSelf
                | Self::FlexGrow
                | Self::FlexShrink
                | Self::FlexBasis
                | Self::Padding
                | Self::Margin
                | Self::Gap
                | Self::Position
                | Self::IncludeInLayout
                | Self::IntrinsicSize
        )
    }
}

// =============================================================================
// Property values
// =============================================================================

/// A property value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyValue {
    /// Unset (no text, no image, no intrinsic size).
    #[default]
    None,
    Bool(bool),
    Float(f32),
    Color(Rgba),
    Text(String),
    Point(Point),
    Size(Size),
    Dimension(Dimension),
    Edges(Edges),
    FlexDirection(FlexDirection),
    FlexWrap(FlexWrap),
    JustifyContent(JustifyContent),
    AlignItems(AlignItems),
    AlignSelf(AlignSelf),
    Position(Position),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_size(&self) -> Option<Size> {
        match self {
            Self::Size(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_edges(&self) -> Option<Edges> {
        match self {
            Self::Edges(v) => Some(*v),
            Self::Float(v) => Some(Edges::all(*v)),
            _ => None,
        }
    }

    /// Dimensions also accept plain floats as points.
    pub fn as_dimension(&self) -> Option<Dimension> {
        match self {
            Self::Dimension(v) => Some(*v),
            Self::Float(v) => Some(Dimension::Points(*v)),
            _ => None,
        }
    }

    /// Interpolate between two values of the same interpolable variant.
    ///
    /// Returns `None` for discrete values (text, enums, mixed variants); the
    /// caller switches those at the end of the transition.
    pub fn lerp(from: &Self, to: &Self, t: f32) -> Option<Self> {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| a + (b - a) * t;
        match (from, to) {
            (Self::Float(a), Self::Float(b)) => Some(Self::Float(mix(*a, *b))),
            (Self::Color(a), Self::Color(b)) => Some(Self::Color(Rgba::lerp(*a, *b, t))),
            (Self::Point(a), Self::Point(b)) => {
                Some(Self::Point(Point::new(mix(a.x, b.x), mix(a.y, b.y))))
            }
            (Self::Size(a), Self::Size(b)) => Some(Self::Size(Size::new(
                mix(a.width, b.width),
                mix(a.height, b.height),
            ))),
            (Self::Dimension(Dimension::Points(a)), Self::Dimension(Dimension::Points(b))) => {
                Some(Self::Dimension(Dimension::Points(mix(*a, *b))))
            }
            _ => None,
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    f32 => Float,
    Rgba => Color,
    String => Text,
    Point => Point,
    Size => Size,
    Dimension => Dimension,
    Edges => Edges,
    FlexDirection => FlexDirection,
    FlexWrap => FlexWrap,
    JustifyContent => JustifyContent,
    AlignItems => AlignItems,
    AlignSelf => AlignSelf,
    Position => Position,
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}
