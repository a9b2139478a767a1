//! Layout animator - interpolates views from their old to their new frames.

use std::time::Duration;

use crate::properties::{Property, PropertyValue};
use crate::types::{Animation, Curve};
use crate::view::{ViewId, ViewTree};

/// Animates the geometry change of a layout pass.
///
/// Attached to a component; every layout of a node owned by that component
/// runs through it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutAnimator {
    pub duration: Duration,
    pub curve: Curve,
}

impl LayoutAnimator {
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            curve: Curve::EaseInOut,
        }
    }

    pub const fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    fn animation(&self) -> Animation {
        Animation::new(self.duration).with_curve(self.curve)
    }

    /// Start transitions for `subtree`, whose frames already hold the new
    /// layout. Moved views travel from their old frame; views created this
    /// pass fade in once the moves are done. Returns how many views animate.
    pub(crate) fn animate(&self, views: &mut ViewTree, subtree: &[ViewId], fade_in: bool) -> usize {
        let animation = self.animation();
        let mut started = 0;

        for &id in subtree {
            let Some(view) = views.get_mut(id) else {
                continue;
            };
            if view.render.appearing {
                if fade_in {
                    let target = view.target_value(Property::Alpha);
                    view.set(Property::Alpha, 0.0_f32);
                    view.animate(
                        Property::Alpha,
                        match target {
                            PropertyValue::Float(alpha) => alpha,
                            _ => 1.0,
                        },
                        animation.with_delay(self.duration),
                    );
                    started += 1;
                }
                continue;
            }

            let new_frame = view.render.new_frame;
            let old_frame = view.render.old_frame;
            if old_frame != new_frame {
                view.set_frame(old_frame);
                view.animate_frame(new_frame, animation);
                started += 1;
            }
        }
        started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Frame, ViewKind};
    use crate::view::View;

    #[test]
    fn test_moved_view_animates_from_old_frame() {
        let mut tree = ViewTree::new();
        let id = tree.insert(View::new(ViewKind::View)).unwrap();
        let old = Frame::new(0.0, 0.0, 100.0, 40.0);
        let new = Frame::new(0.0, 40.0, 100.0, 40.0);
        tree[id].render.old_frame = old;
        tree[id].render.new_frame = new;
        tree[id].set_frame(new);

        let animator = LayoutAnimator::new(Duration::from_millis(200)).with_curve(Curve::Linear);
        assert_eq!(animator.animate(&mut tree, &[id], true), 1);
        assert_eq!(tree[id].frame(), old);
        assert_eq!(tree[id].target_frame(), new);

        tree.advance(Duration::from_millis(100));
        assert_eq!(tree[id].frame(), Frame::new(0.0, 20.0, 100.0, 40.0));
    }

    #[test]
    fn test_new_view_fades_in_after_duration() {
        let mut tree = ViewTree::new();
        let id = tree
            .insert(View::new(ViewKind::View).with(Property::Alpha, 0.5_f32))
            .unwrap();
        tree[id].render.appearing = true;

        let animator = LayoutAnimator::new(Duration::from_millis(100)).with_curve(Curve::Linear);
        animator.animate(&mut tree, &[id], true);
        assert_eq!(tree[id].get(Property::Alpha), PropertyValue::Float(0.0));

        tree.advance(Duration::from_millis(100));
        assert_eq!(tree[id].get(Property::Alpha), PropertyValue::Float(0.0));
        tree.advance(Duration::from_millis(100));
        assert_eq!(tree[id].get(Property::Alpha), PropertyValue::Float(0.5));
    }

    #[test]
    fn test_unchanged_views_do_not_animate() {
        let mut tree = ViewTree::new();
        let id = tree.insert(View::new(ViewKind::View)).unwrap();
        let animator = LayoutAnimator::new(Duration::from_millis(100));
        assert_eq!(animator.animate(&mut tree, &[id], true), 0);
        assert!(!tree.is_animating());
    }
}
