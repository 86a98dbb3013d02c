//! Collider shapes and pairwise collision dispatch
//!
//! The built-in shapes form a closed set: [`BoxShape`], [`CircleShape`] and
//! [`MultiShape`]. Each of them implements [`ShapeCollisions`], i.e. knows how
//! to test itself against every other built-in shape and against a line
//! segment. Adding a built-in shape therefore means adding a method to the
//! trait and implementing it on every existing shape; the compiler points out
//! every missing pair.
//!
//! Shapes are stored relative to their collider. Every test receives the
//! collider's world-space bounds (its *placement*) and derives the world-space
//! geometry from it on demand.
//!
//! [`ColliderShape::Custom`] holds user-defined shapes that live outside the
//! closed set. They have a size and can be linecast, but there is no pairwise
//! algorithm for them, so any pair involving one fails with
//! [`CollisionError::UnsupportedShape`].

pub mod primitives;
mod box_shape;
mod circle_shape;
mod multi_shape;

use std::fmt;
use std::sync::Arc;

pub use box_shape::BoxShape;
pub use circle_shape::CircleShape;
pub use multi_shape::{MultiPart, MultiShape, PartShape};
pub use primitives::{Circle, WorldPrimitive};

use super::error::CollisionError;
use crate::foundation::math::{Rect, Vec2};

/// Pairwise tests every built-in shape provides against every built-in shape
///
/// `placement` is the world-space bounds of `self`, `other_placement` the
/// bounds of `other`.
pub trait ShapeCollisions {
    /// Test against the segment `from -> to` (used by linecasts)
    fn collides_with_segment(&self, placement: Rect, from: Vec2, to: Vec2) -> bool;

    /// Test against a box
    fn collides_with_box(&self, placement: Rect, other: &BoxShape, other_placement: Rect) -> bool;

    /// Test against a circle
    fn collides_with_circle(
        &self,
        placement: Rect,
        other: &CircleShape,
        other_placement: Rect,
    ) -> bool;

    /// Test against a compound shape
    fn collides_with_multi(
        &self,
        placement: Rect,
        other: &MultiShape,
        other_placement: Rect,
    ) -> bool;
}

/// A shape defined outside this crate
///
/// Custom shapes can be attached, registered and linecast like any other
/// collider, but cannot be tested pairwise against other colliders.
pub trait CustomShape: fmt::Debug + Send + Sync {
    /// Short name used in error messages
    fn kind(&self) -> &'static str;

    /// Width and height of the shape's bounds
    fn size(&self) -> Vec2;

    /// Test against the segment `from -> to`
    fn collides_with_segment(&self, placement: Rect, from: Vec2, to: Vec2) -> bool;
}

/// Collider shape types
#[derive(Debug, Clone)]
pub enum ColliderShape {
    /// Axis-aligned box
    Box(BoxShape),
    /// Circle
    Circle(CircleShape),
    /// Compound of boxes and circles
    Multi(MultiShape),
    /// User-defined shape outside the built-in set
    Custom(Arc<dyn CustomShape>),
}

impl ColliderShape {
    /// Axis-aligned box shape
    pub fn rect(width: f32, height: f32) -> Self {
        Self::Box(BoxShape::new(width, height))
    }

    /// Circle shape
    pub fn circle(radius: f32) -> Self {
        Self::Circle(CircleShape::new(radius))
    }

    /// Compound shape
    pub fn multi(parts: Vec<MultiPart>) -> Self {
        Self::Multi(MultiShape::new(parts))
    }

    /// Short name of the variant, used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box(_) => "box",
            Self::Circle(_) => "circle",
            Self::Multi(_) => "multi",
            Self::Custom(shape) => shape.kind(),
        }
    }

    /// Width of the shape's bounds
    pub fn width(&self) -> f32 {
        self.size().x
    }

    /// Height of the shape's bounds
    pub fn height(&self) -> f32 {
        self.size().y
    }

    /// Width and height of the shape's bounds
    pub fn size(&self) -> Vec2 {
        match self {
            Self::Box(shape) => Vec2::new(shape.width, shape.height),
            Self::Circle(shape) => Vec2::new(shape.diameter(), shape.diameter()),
            Self::Multi(shape) => shape.local_bounds().size(),
            Self::Custom(shape) => shape.size(),
        }
    }

    /// Origin a new collider of this shape starts with
    ///
    /// Circles are centered on their entity; everything else hangs from its
    /// top-left corner.
    pub fn default_origin(&self) -> Vec2 {
        match self {
            Self::Circle(shape) => Vec2::new(shape.radius, shape.radius),
            _ => Vec2::zeros(),
        }
    }

    fn builtin(&self) -> Option<&dyn ShapeCollisions> {
        match self {
            Self::Box(shape) => Some(shape),
            Self::Circle(shape) => Some(shape),
            Self::Multi(shape) => Some(shape),
            Self::Custom(_) => None,
        }
    }

    /// Test this shape against another shape
    ///
    /// Forwards to the typed test for `other`'s variant. Fails if either
    /// shape is outside the built-in set.
    pub fn collides_with(
        &self,
        placement: Rect,
        other: &ColliderShape,
        other_placement: Rect,
    ) -> Result<bool, CollisionError> {
        let unsupported = || CollisionError::UnsupportedShape {
            this: self.kind(),
            other: other.kind(),
        };
        let this = self.builtin().ok_or_else(unsupported)?;

        match other {
            Self::Box(shape) => Ok(this.collides_with_box(placement, shape, other_placement)),
            Self::Circle(shape) => Ok(this.collides_with_circle(placement, shape, other_placement)),
            Self::Multi(shape) => Ok(this.collides_with_multi(placement, shape, other_placement)),
            Self::Custom(_) => Err(unsupported()),
        }
    }

    /// Test this shape against the segment `from -> to`
    pub fn collides_with_segment(&self, placement: Rect, from: Vec2, to: Vec2) -> bool {
        match self {
            Self::Custom(shape) => shape.collides_with_segment(placement, from, to),
            _ => self
                .builtin()
                .is_some_and(|shape| shape.collides_with_segment(placement, from, to)),
        }
    }

    /// World-space outline primitives, used by debug rendering
    pub fn world_primitives(&self, placement: Rect) -> Vec<WorldPrimitive> {
        match self {
            Self::Box(_) | Self::Custom(_) => vec![WorldPrimitive::Rect(placement)],
            Self::Circle(shape) => vec![WorldPrimitive::Circle(shape.world_circle(placement))],
            Self::Multi(shape) => shape.world_parts(placement),
        }
    }
}

impl From<BoxShape> for ColliderShape {
    fn from(shape: BoxShape) -> Self {
        Self::Box(shape)
    }
}

impl From<CircleShape> for ColliderShape {
    fn from(shape: CircleShape) -> Self {
        Self::Circle(shape)
    }
}

impl From<MultiShape> for ColliderShape {
    fn from(shape: MultiShape) -> Self {
        Self::Multi(shape)
    }
}
