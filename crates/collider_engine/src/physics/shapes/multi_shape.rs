//! Compound shape made of boxes and circles
//!
//! Parts are positioned by an offset in the shape's local space. The bounds of
//! a multi shape are the union of its parts, so a part with the smallest
//! offset lands on the top-left corner of the collider bounds.

use super::primitives::{Circle, WorldPrimitive};
use super::{BoxShape, CircleShape, ShapeCollisions};
use crate::foundation::math::{Rect, Vec2};

/// Shape of a single part of a [`MultiShape`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartShape {
    /// Axis-aligned box
    Box(BoxShape),
    /// Circle
    Circle(CircleShape),
}

impl PartShape {
    fn size(&self) -> Vec2 {
        match self {
            Self::Box(shape) => Vec2::new(shape.width, shape.height),
            Self::Circle(shape) => Vec2::new(shape.diameter(), shape.diameter()),
        }
    }
}

/// One part of a compound shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiPart {
    /// Top-left of the part's bounds in local space
    pub offset: Vec2,
    /// The part's geometry
    pub shape: PartShape,
}

impl MultiPart {
    /// Box part with its top-left corner at `offset`
    pub fn boxed(offset: Vec2, width: f32, height: f32) -> Self {
        Self {
            offset,
            shape: PartShape::Box(BoxShape::new(width, height)),
        }
    }

    /// Circle part whose bounds start at `offset`
    pub fn circle(offset: Vec2, radius: f32) -> Self {
        Self {
            offset,
            shape: PartShape::Circle(CircleShape::new(radius)),
        }
    }

    fn local_bounds(&self) -> Rect {
        Rect::from_position_size(self.offset, self.shape.size())
    }
}

/// Compound shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiShape {
    parts: Vec<MultiPart>,
}

impl MultiShape {
    /// Create a compound shape from its parts
    pub fn new(parts: Vec<MultiPart>) -> Self {
        Self { parts }
    }

    /// Add a part (builder style)
    #[must_use]
    pub fn with_part(mut self, part: MultiPart) -> Self {
        self.parts.push(part);
        self
    }

    /// The parts of this shape
    pub fn parts(&self) -> &[MultiPart] {
        &self.parts
    }

    /// Union of the parts' local bounds; empty shapes have zero size
    pub fn local_bounds(&self) -> Rect {
        let mut parts = self.parts.iter().map(MultiPart::local_bounds);
        match parts.next() {
            Some(first) => parts.fold(first, |acc, rect| acc.union(&rect)),
            None => Rect::default(),
        }
    }

    /// Width of the union of all parts
    pub fn width(&self) -> f32 {
        self.local_bounds().width
    }

    /// Height of the union of all parts
    pub fn height(&self) -> f32 {
        self.local_bounds().height
    }

    /// Parts transformed into world space for the given placement
    pub fn world_parts(&self, placement: Rect) -> Vec<WorldPrimitive> {
        let shift = placement.min() - self.local_bounds().min();
        self.parts
            .iter()
            .map(|part| {
                let rect = part.local_bounds().translated(shift);
                match part.shape {
                    PartShape::Box(_) => WorldPrimitive::Rect(rect),
                    PartShape::Circle(circle) => {
                        WorldPrimitive::Circle(Circle::new(rect.center(), circle.radius))
                    }
                }
            })
            .collect()
    }

    /// Check if any part, placed at `placement`, touches `primitive`
    pub fn any_part_intersects(&self, placement: Rect, primitive: &WorldPrimitive) -> bool {
        self.world_parts(placement)
            .iter()
            .any(|part| part.intersects(primitive))
    }
}

impl ShapeCollisions for MultiShape {
    fn collides_with_segment(&self, placement: Rect, from: Vec2, to: Vec2) -> bool {
        self.world_parts(placement)
            .iter()
            .any(|part| part.intersects_segment(from, to))
    }

    fn collides_with_box(&self, placement: Rect, _other: &BoxShape, other_placement: Rect) -> bool {
        self.any_part_intersects(placement, &BoxShape::world_primitive(other_placement))
    }

    fn collides_with_circle(
        &self,
        placement: Rect,
        other: &CircleShape,
        other_placement: Rect,
    ) -> bool {
        let circle = WorldPrimitive::Circle(other.world_circle(other_placement));
        self.any_part_intersects(placement, &circle)
    }

    fn collides_with_multi(
        &self,
        placement: Rect,
        other: &MultiShape,
        other_placement: Rect,
    ) -> bool {
        if !placement.intersects(&other_placement) {
            return false;
        }

        let others = other.world_parts(other_placement);
        self.world_parts(placement)
            .iter()
            .any(|part| others.iter().any(|o| part.intersects(o)))
    }
}
