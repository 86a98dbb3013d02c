//! Axis-aligned box shape

use super::primitives::WorldPrimitive;
use super::{CircleShape, MultiShape, ShapeCollisions};
use crate::foundation::math::{Rect, Vec2};

/// Axis-aligned box filling the collider bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    /// Extent along x
    pub width: f32,
    /// Extent along y
    pub height: f32,
}

impl BoxShape {
    /// Create a box with the given size
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The world-space rectangle is the placement itself
    pub fn world_primitive(placement: Rect) -> WorldPrimitive {
        WorldPrimitive::Rect(placement)
    }
}

impl ShapeCollisions for BoxShape {
    fn collides_with_segment(&self, placement: Rect, from: Vec2, to: Vec2) -> bool {
        placement.segment_entry(from, to).is_some()
    }

    fn collides_with_box(&self, placement: Rect, _other: &BoxShape, other_placement: Rect) -> bool {
        placement.intersects(&other_placement)
    }

    fn collides_with_circle(
        &self,
        placement: Rect,
        other: &CircleShape,
        other_placement: Rect,
    ) -> bool {
        other.world_circle(other_placement).intersects_rect(&placement)
    }

    fn collides_with_multi(
        &self,
        placement: Rect,
        other: &MultiShape,
        other_placement: Rect,
    ) -> bool {
        other.any_part_intersects(other_placement, &Self::world_primitive(placement))
    }
}
