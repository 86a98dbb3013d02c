//! Circle shape

use super::primitives::{Circle, WorldPrimitive};
use super::{BoxShape, MultiShape, ShapeCollisions};
use crate::foundation::math::{Rect, Vec2};

/// Circle inscribed in the collider bounds
///
/// Width and height are both the diameter; the circle is centered in the bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleShape {
    /// Radius in world units
    pub radius: f32,
}

impl CircleShape {
    /// Create a circle with the given radius
    pub const fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// Diameter, used for both width and height
    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    /// World-space circle for the given placement
    pub fn world_circle(&self, placement: Rect) -> Circle {
        Circle::new(placement.center(), self.radius)
    }

    fn world_primitive(&self, placement: Rect) -> WorldPrimitive {
        WorldPrimitive::Circle(self.world_circle(placement))
    }
}

impl ShapeCollisions for CircleShape {
    fn collides_with_segment(&self, placement: Rect, from: Vec2, to: Vec2) -> bool {
        self.world_circle(placement).intersects_segment(from, to)
    }

    fn collides_with_box(&self, placement: Rect, _other: &BoxShape, other_placement: Rect) -> bool {
        self.world_circle(placement).intersects_rect(&other_placement)
    }

    fn collides_with_circle(
        &self,
        placement: Rect,
        other: &CircleShape,
        other_placement: Rect,
    ) -> bool {
        self.world_circle(placement)
            .intersects_circle(&other.world_circle(other_placement))
    }

    fn collides_with_multi(
        &self,
        placement: Rect,
        other: &MultiShape,
        other_placement: Rect,
    ) -> bool {
        other.any_part_intersects(other_placement, &self.world_primitive(placement))
    }
}
