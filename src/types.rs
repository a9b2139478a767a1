//! Core types for spark-nodes.
//!
//! Geometry, colors, flexbox enums and the small flag/animation types that
//! flow between nodes, views and the layout bridge.

use std::time::Duration;

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Integers keep comparisons exact, which matters for property diffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const CLEAR: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Linear interpolation between two colors.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
        Self {
            r: mix(a.r, b.r),
            g: mix(a.g, b.g),
            b: mix(a.b, b.b),
            a: mix(a.a, b.a),
        }
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// A 2D point (or offset) in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A 2D size in points.
///
/// Non-finite components (`f32::INFINITY`, `NaN`) mean "unconstrained" when a
/// size is used as layout bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    /// Bounds with no constraint on either axis.
    pub const UNCONSTRAINED: Self = Self {
        width: f32::INFINITY,
        height: f32::INFINITY,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A view's frame, relative to its superview.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Linear interpolation between two frames.
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: f32, y: f32| x + (y - x) * t;
        Self {
            x: mix(a.x, b.x),
            y: mix(a.y, b.y),
            width: mix(a.width, b.width),
            height: mix(a.height, b.height),
        }
    }
}

// =============================================================================
// Dimension - Supports absolute and percentage values
// =============================================================================

/// A dimension value that can be absolute (points) or percentage.
///
/// - `Auto`: size from content / flex rules
/// - `Points(n)`: absolute value
/// - `Percent(n)`: percentage of the parent (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Points(f32),
    Percent(f32),
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        Self::Points(value)
    }
}

/// Per-edge lengths for padding and margin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Self = Self::all(0.0);

    pub const fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

// =============================================================================
// Flexbox enums
// =============================================================================

/// Flex direction. Column is the default, as in every native flexbox port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
    ColumnReverse,
    RowReverse,
}

impl FlexDirection {
    /// Check if this is a row direction (Row or RowReverse).
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }
}

/// Flex wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

/// Justify content (main axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Align items (cross axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlignItems {
    #[default]
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

/// Align self (item override for align items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlignSelf {
    #[default]
    Auto,
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

/// Position type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    #[default]
    Relative,
    Absolute,
}

// =============================================================================
// View kinds
// =============================================================================

/// The concrete kind of a native view.
///
/// Part of every reuse identifier, so two nodes of different kinds can never
/// share a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    View,
    Label,
    Button,
    Image,
    TextField,
    Scroll,
    /// Host-defined kind.
    Custom(&'static str),
}

impl ViewKind {
    /// Name used as the kind prefix of reuse identifiers.
    pub const fn name(&self) -> &'static str {
        match *self {
            Self::View => "View",
            Self::Label => "Label",
            Self::Button => "Button",
            Self::Image => "Image",
            Self::TextField => "TextField",
            Self::Scroll => "Scroll",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Per-call options (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Flags controlling a single configure/layout/reconcile call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayoutOptions: u8 {
        const NONE = 0;
        /// Do not notify delegates or components during this call.
        const SUPPRESS_DELEGATES = 1 << 0;
    }
}

// =============================================================================
// Animation
// =============================================================================

/// Timing curve for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Curve {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Curve {
    /// Map linear progress `t` (0..=1) through the curve.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// An explicit animation attached to a property application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub duration: Duration,
    pub delay: Duration,
    pub curve: Curve,
}

impl Animation {
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
            curve: Curve::Linear,
        }
    }

    pub const fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Eased progress after `elapsed`, accounting for the delay.
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if elapsed <= self.delay {
            return 0.0;
        }
        let running = elapsed - self.delay;
        if self.duration.is_zero() || running >= self.duration {
            return 1.0;
        }
        self.curve
            .apply(running.as_secs_f32() / self.duration.as_secs_f32())
    }

    /// Whether the animation has fully run after `elapsed`.
    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.delay + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_lerp() {
        let mid = Rgba::lerp(Rgba::BLACK, Rgba::WHITE, 0.5);
        assert_eq!(mid, Rgba::new(128, 128, 128, 255));
        assert_eq!(Rgba::lerp(Rgba::RED, Rgba::BLUE, 0.0), Rgba::RED);
        assert_eq!(Rgba::lerp(Rgba::RED, Rgba::BLUE, 2.0), Rgba::BLUE);
    }

    #[test]
    fn test_frame_lerp() {
        let a = Frame::new(0.0, 0.0, 10.0, 10.0);
        let b = Frame::new(10.0, 20.0, 30.0, 10.0);
        assert_eq!(Frame::lerp(a, b, 0.5), Frame::new(5.0, 10.0, 20.0, 10.0));
    }

    #[test]
    fn test_view_kind_names() {
        assert_eq!(ViewKind::Label.name(), "Label");
        assert_eq!(ViewKind::Custom("Map").to_string(), "Map");
    }

    #[test]
    fn test_animation_progress_with_delay() {
        let anim = Animation::new(Duration::from_millis(100)).with_delay(Duration::from_millis(50));
        assert_eq!(anim.progress(Duration::from_millis(25)), 0.0);
        assert!((anim.progress(Duration::from_millis(100)) - 0.5).abs() < 1e-4);
        assert_eq!(anim.progress(Duration::from_millis(150)), 1.0);
        assert!(anim.is_finished(Duration::from_millis(150)));
        assert!(!anim.is_finished(Duration::from_millis(149)));
    }

    #[test]
    fn test_curves_hit_endpoints() {
        for curve in [Curve::Linear, Curve::EaseIn, Curve::EaseOut, Curve::EaseInOut] {
            assert_eq!(curve.apply(0.0), 0.0);
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_layout_options_default_is_empty() {
        assert!(LayoutOptions::default().is_empty());
        assert!(LayoutOptions::SUPPRESS_DELEGATES.contains(LayoutOptions::SUPPRESS_DELEGATES));
    }
}
