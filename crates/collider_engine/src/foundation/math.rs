//! Math utilities and types
//!
//! Provides the 2D vector and rectangle types the collision code is built on.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Vector2, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// RGBA color with components in 0.0..=1.0
pub type Color = Vec4;

/// Named colors used by the debug drawing facilities
pub mod colors {
    use super::Color;

    /// Default collider bounds color (CSS "IndianRed", #CD5C5C)
    pub fn indian_red() -> Color {
        Color::new(205.0 / 255.0, 92.0 / 255.0, 92.0 / 255.0, 1.0)
    }

    /// Default shape outline color
    pub fn light_green() -> Color {
        Color::new(0.56, 0.93, 0.56, 1.0)
    }
}

/// Axis-aligned rectangle stored as top-left corner plus size
///
/// `x`/`y` is the minimum corner; `width`/`height` extend towards +x/+y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum x coordinate
    pub x: f32,
    /// Minimum y coordinate
    pub y: f32,
    /// Extent along x
    pub width: f32,
    /// Extent along y
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from a top-left corner vector and a size vector
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Smallest rectangle containing both segment endpoints
    pub fn from_segment(from: Vec2, to: Vec2) -> Self {
        let min = Vec2::new(from.x.min(to.x), from.y.min(to.y));
        let max = Vec2::new(from.x.max(to.x), from.y.max(to.y));
        Self::from_position_size(min, max - min)
    }

    /// Top-left corner
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bottom-right corner
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Size as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Center of the rectangle
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Check if this rectangle contains a point (edges included)
    pub fn contains_point(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.x && point.x <= max.x && point.y >= self.y && point.y <= max.y
    }

    /// Check if this rectangle intersects another (touching edges count)
    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.x <= b_max.x && a_max.x >= other.x && self.y <= b_max.y && a_max.y >= other.y
    }

    /// Smallest rectangle containing both rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        let min = Vec2::new(self.x.min(other.x), self.y.min(other.y));
        let (a_max, b_max) = (self.max(), other.max());
        let max = Vec2::new(a_max.x.max(b_max.x), a_max.y.max(b_max.y));
        Self::from_position_size(min, max - min)
    }

    /// Same rectangle moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Rect {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Test the segment `from -> to` against this rectangle using the slab method
    ///
    /// Returns the normalized segment parameter (0.0 = `from`, 1.0 = `to`) at
    /// which the segment enters the rectangle, or 0.0 if `from` is inside.
    /// Based on "An Efficient and Robust Ray–Box Intersection Algorithm".
    pub fn segment_entry(&self, from: Vec2, to: Vec2) -> Option<f32> {
        let dir = to - from;
        let max = self.max();

        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;

        let slabs = [(from.x, dir.x, self.x, max.x), (from.y, dir.y, self.y, max.y)];
        for (origin, delta, lo, hi) in slabs {
            if delta == 0.0 {
                // Parallel to this slab: must already be between its planes
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / delta;
            let t1 = (lo - origin) * inv;
            let t2 = (hi - origin) * inv;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));

            if t_enter > t_exit {
                return None;
            }
        }

        Some(t_enter)
    }
}
