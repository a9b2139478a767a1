//! Taffy Bridge - Integration with Taffy layout engine
//!
//! Converts view layout properties to Taffy styles, runs layout computation
//! on the view tree's persistent Taffy instance, and writes the results back
//! as view frames.

use taffy::{
    AvailableSpace, Dimension as TaffyDimension, Display, FlexDirection as TaffyFlexDirection,
    FlexWrap as TaffyFlexWrap, JustifyContent as TaffyJustifyContent,
    AlignItems as TaffyAlignItems, AlignSelf as TaffyAlignSelf, LengthPercentage,
    LengthPercentageAuto, NodeId as LayoutNode, Position as TaffyPosition, Rect,
    Size as TaffySize, Style,
};

use crate::error::NodeError;
use crate::properties::{Property, PropertyValue};
use crate::types::{
    AlignItems, AlignSelf, Dimension, Edges, FlexDirection, FlexWrap, Frame, JustifyContent,
    Position, Size,
};
use crate::view::{View, ViewId, ViewTree};

// =============================================================================
// DIMENSION CONVERSION
// =============================================================================

/// Convert our Dimension to Taffy's Dimension.
fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Points(n) => TaffyDimension::Length(n),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn to_taffy_margin(edges: Edges) -> Rect<LengthPercentageAuto> {
    Rect {
        top: LengthPercentageAuto::Length(edges.top),
        right: LengthPercentageAuto::Length(edges.right),
        bottom: LengthPercentageAuto::Length(edges.bottom),
        left: LengthPercentageAuto::Length(edges.left),
    }
}

fn to_taffy_padding(edges: Edges) -> Rect<LengthPercentage> {
    Rect {
        top: LengthPercentage::Length(edges.top),
        right: LengthPercentage::Length(edges.right),
        bottom: LengthPercentage::Length(edges.bottom),
        left: LengthPercentage::Length(edges.left),
    }
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_taffy_flex_wrap(wrap: FlexWrap) -> TaffyFlexWrap {
    match wrap {
        FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
        FlexWrap::Wrap => TaffyFlexWrap::Wrap,
        FlexWrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: JustifyContent) -> Option<TaffyJustifyContent> {
    Some(match justify {
        JustifyContent::FlexStart => TaffyJustifyContent::FlexStart,
        JustifyContent::Center => TaffyJustifyContent::Center,
        JustifyContent::FlexEnd => TaffyJustifyContent::FlexEnd,
        JustifyContent::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        JustifyContent::SpaceAround => TaffyJustifyContent::SpaceAround,
        JustifyContent::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

fn to_taffy_align_items(align: AlignItems) -> Option<TaffyAlignItems> {
    Some(match align {
        AlignItems::Stretch => TaffyAlignItems::Stretch,
        AlignItems::FlexStart => TaffyAlignItems::FlexStart,
        AlignItems::Center => TaffyAlignItems::Center,
        AlignItems::FlexEnd => TaffyAlignItems::FlexEnd,
        AlignItems::Baseline => TaffyAlignItems::Baseline,
    })
}

fn to_taffy_align_self(align: AlignSelf) -> Option<TaffyAlignSelf> {
    match align {
        AlignSelf::Auto => None, // inherit from parent
        AlignSelf::Stretch => Some(TaffyAlignSelf::Stretch),
        AlignSelf::FlexStart => Some(TaffyAlignSelf::FlexStart),
        AlignSelf::Center => Some(TaffyAlignSelf::Center),
        AlignSelf::FlexEnd => Some(TaffyAlignSelf::FlexEnd),
        AlignSelf::Baseline => Some(TaffyAlignSelf::Baseline),
    }
}

fn to_taffy_position(position: Position) -> TaffyPosition {
    match position {
        Position::Relative => TaffyPosition::Relative,
        Position::Absolute => TaffyPosition::Absolute,
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

fn dimension(view: &View, property: Property) -> TaffyDimension {
    to_taffy_dimension(view.get(property).as_dimension().unwrap_or_default())
}

fn float(view: &View, property: Property) -> f32 {
    view.get(property)
        .as_float()
        .or_else(|| property.default_value().as_float())
        .unwrap_or(0.0)
}

fn edges(view: &View, property: Property) -> Edges {
    view.get(property).as_edges().unwrap_or_default()
}

/// Build a Taffy Style from a view's layout properties.
pub(crate) fn build_style(view: &View) -> Style {
    let flex_direction = match view.get(Property::FlexDirection) {
        PropertyValue::FlexDirection(dir) => dir,
        _ => FlexDirection::default(),
    };
    let flex_wrap = match view.get(Property::FlexWrap) {
        PropertyValue::FlexWrap(wrap) => wrap,
        _ => FlexWrap::default(),
    };
    let justify_content = match view.get(Property::JustifyContent) {
        PropertyValue::JustifyContent(justify) => justify,
        _ => JustifyContent::default(),
    };
    let align_items = match view.get(Property::AlignItems) {
        PropertyValue::AlignItems(align) => align,
        _ => AlignItems::default(),
    };
    let align_self = match view.get(Property::AlignSelf) {
        PropertyValue::AlignSelf(align) => align,
        _ => AlignSelf::default(),
    };
    let position = match view.get(Property::Position) {
        PropertyValue::Position(position) => position,
        _ => Position::default(),
    };
    let gap = float(view, Property::Gap);

    Style {
        display: Display::Flex,
        position: to_taffy_position(position),

        // Flex container properties
        flex_direction: to_taffy_flex_direction(flex_direction),
        flex_wrap: to_taffy_flex_wrap(flex_wrap),
        justify_content: to_taffy_justify_content(justify_content),
        align_items: to_taffy_align_items(align_items),

        // Flex item properties
        flex_grow: float(view, Property::FlexGrow),
        flex_shrink: float(view, Property::FlexShrink),
        flex_basis: dimension(view, Property::FlexBasis),
        align_self: to_taffy_align_self(align_self),

        // Dimensions
        size: TaffySize {
            width: dimension(view, Property::Width),
            height: dimension(view, Property::Height),
        },
        min_size: TaffySize {
            width: dimension(view, Property::MinWidth),
            height: dimension(view, Property::MinHeight),
        },
        max_size: TaffySize {
            width: dimension(view, Property::MaxWidth),
            height: dimension(view, Property::MaxHeight),
        },

        margin: to_taffy_margin(edges(view, Property::Margin)),
        padding: to_taffy_padding(edges(view, Property::Padding)),
        gap: TaffySize {
            width: LengthPercentage::Length(gap),
            height: LengthPercentage::Length(gap),
        },

        ..Default::default()
    }
}

// =============================================================================
// FRAME NORMALIZATION
// =============================================================================

/// Snap `value` to the pixel grid, turning non-finite values into zero.
fn snap(value: f32, scale: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * scale).round() / scale
}

/// Drop NaN/infinite components, clamp negative sizes to zero, and snap
/// everything to the `scale` pixel grid.
pub fn normalize_frame(frame: Frame, scale: f32) -> Frame {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    Frame {
        x: snap(frame.x, scale),
        y: snap(frame.y, scale),
        width: snap(frame.width, scale).max(0.0),
        height: snap(frame.height, scale).max(0.0),
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

fn available(bound: f32) -> AvailableSpace {
    if bound.is_finite() {
        AvailableSpace::Definite(bound.max(0.0))
    } else {
        AvailableSpace::MaxContent
    }
}

/// Views under `root` (inclusive) that take part in layout, pre-order.
/// Subtrees of excluded views are skipped entirely.
fn layout_subtree(views: &ViewTree, root: ViewId) -> Vec<ViewId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        let Some(view) = views.get(current) else {
            continue;
        };
        out.push(current);
        stack.extend(
            view.subviews()
                .iter()
                .rev()
                .filter(|sub| views.get(**sub).is_some_and(View::is_included_in_layout))
                .copied(),
        );
    }
    out
}

/// Push current view properties into the layout boxes of `subtree`.
fn sync_styles(views: &mut ViewTree, subtree: &[ViewId], root: ViewId, bounds: Size) -> Result<(), NodeError> {
    for &id in subtree {
        let Some(node) = views.layout_node(id) else {
            continue;
        };
        // The root's style depends on the bounds, so it is rebuilt every pass.
        if id != root && !views[id].render.style_dirty {
            views.sync_layout_children(id)?;
            continue;
        }
        let mut style = build_style(&views[id]);

        // The root fills the bounds on any axis it leaves to content.
        if id == root {
            if style.size.width == TaffyDimension::Auto && bounds.width.is_finite() {
                style.size.width = TaffyDimension::Length(bounds.width.max(0.0));
            }
            if style.size.height == TaffyDimension::Auto && bounds.height.is_finite() {
                style.size.height = TaffyDimension::Length(bounds.height.max(0.0));
            }
        }

        if views.layout.style(node)? != &style {
            views.layout.set_style(node, style)?;
        }
        views[id].render.style_dirty = id == root;
        views.sync_layout_children(id)?;
    }
    Ok(())
}

fn run(views: &mut ViewTree, root: LayoutNode, bounds: Size) -> Result<(), NodeError> {
    let space = TaffySize {
        width: available(bounds.width),
        height: available(bounds.height),
    };
    let ViewTree { views: arena, layout, .. } = views;

    layout.compute_layout_with_measure(
        root,
        space,
        |known, _available, _node, context: Option<&mut ViewId>, _style| {
            let intrinsic = context
                .and_then(|id| arena.get(*id))
                .and_then(|view| view.get(Property::IntrinsicSize).as_size())
                .unwrap_or(Size::ZERO);
            TaffySize {
                width: known.width.unwrap_or(intrinsic.width),
                height: known.height.unwrap_or(intrinsic.height),
            }
        },
    )?;
    Ok(())
}

/// Lay out the subtree rooted at `root` within `bounds` and write frames back.
///
/// Runs Taffy twice: once against `bounds`, then again with the root's
/// computed size substituted for any unconstrained axis, so auto-sized and
/// wrapping containers settle. Returns the root's final size.
pub fn compute(
    views: &mut ViewTree,
    root: ViewId,
    bounds: Size,
    scale: f32,
) -> Result<Size, NodeError> {
    let Some(root_node) = views.layout_node(root) else {
        return Err(NodeError::UnknownView(root));
    };
    let subtree = layout_subtree(views, root);

    sync_styles(views, &subtree, root, bounds)?;
    run(views, root_node, bounds)?;

    let measured = views.layout.layout(root_node)?.size;
    let intrinsic = Size::new(
        if bounds.width.is_finite() { bounds.width } else { measured.width },
        if bounds.height.is_finite() { bounds.height } else { measured.height },
    );
    sync_styles(views, &subtree, root, intrinsic)?;
    run(views, root_node, intrinsic)?;

    // Extract results
    for &id in &subtree {
        let Some(node) = views.layout_node(id) else {
            continue;
        };
        let computed = views.layout.layout(node)?;
        let (location, size) = (computed.location, computed.size);
        let view = &mut views[id];
        let (x, y) = if id == root {
            (view.frame.x, view.frame.y)
        } else {
            (location.x, location.y)
        };
        let frame = normalize_frame(Frame::new(x, y, size.width, size.height), scale);
        view.cancel_frame_transition();
        view.frame = frame;
        view.render.new_frame = frame;
        view.render.needs_measure = false;
    }

    Ok(views[root].frame.size())
}
