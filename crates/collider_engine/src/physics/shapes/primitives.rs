//! World-space primitives and their intersection algorithms
//!
//! Collider shapes are stored relative to their bounds and turned into these
//! primitives only for the duration of a test.

use crate::foundation::math::{Rect, Vec2};

/// A circle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center position in world space
    pub center: Vec2,
    /// Radius in world units
    pub radius: f32,
}

impl Circle {
    /// Creates a new circle with the given center and radius
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this circle intersects another (touching counts)
    pub fn intersects_circle(&self, other: &Circle) -> bool {
        let distance_squared = (self.center - other.center).norm_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Check if this circle intersects an axis-aligned rectangle
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        let max = rect.max();
        let closest = Vec2::new(
            self.center.x.clamp(rect.x, max.x),
            self.center.y.clamp(rect.y, max.y),
        );
        (closest - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Check if the segment `from -> to` passes within the circle
    pub fn intersects_segment(&self, from: Vec2, to: Vec2) -> bool {
        let closest = closest_point_on_segment(from, to, self.center);
        (closest - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Bounding rectangle of the circle
    pub fn bounds(&self) -> Rect {
        let r = Vec2::new(self.radius, self.radius);
        Rect::from_position_size(self.center - r, r * 2.0)
    }
}

/// Closest point to `point` on the segment `from -> to`
pub fn closest_point_on_segment(from: Vec2, to: Vec2, point: Vec2) -> Vec2 {
    let segment = to - from;
    let length_squared = segment.norm_squared();
    if length_squared == 0.0 {
        return from;
    }

    let t = ((point - from).dot(&segment) / length_squared).clamp(0.0, 1.0);
    from + segment * t
}

/// A single world-space primitive produced from a collider shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldPrimitive {
    /// Axis-aligned rectangle
    Rect(Rect),
    /// Circle
    Circle(Circle),
}

impl WorldPrimitive {
    /// Test if this primitive intersects another
    pub fn intersects(&self, other: &WorldPrimitive) -> bool {
        match (self, other) {
            (Self::Rect(a), Self::Rect(b)) => a.intersects(b),
            (Self::Circle(circle), Self::Rect(rect)) | (Self::Rect(rect), Self::Circle(circle)) => {
                circle.intersects_rect(rect)
            }
            (Self::Circle(a), Self::Circle(b)) => a.intersects_circle(b),
        }
    }

    /// Test if the segment `from -> to` touches this primitive
    pub fn intersects_segment(&self, from: Vec2, to: Vec2) -> bool {
        match self {
            Self::Rect(rect) => rect.segment_entry(from, to).is_some(),
            Self::Circle(circle) => circle.intersects_segment(from, to),
        }
    }

    /// Axis-aligned bounds of the primitive
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(rect) => *rect,
            Self::Circle(circle) => circle.bounds(),
        }
    }
}
