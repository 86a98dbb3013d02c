//! Debug drawing primitives and system
//!
//! Shapes drawn through [`DebugGraphics`] last for the current frame only.
//! Persistent shapes stay until explicitly removed.

use std::collections::HashMap;

use crate::foundation::math::{Color, Rect, Vec2};

/// Unique identifier for persistent debug shapes
pub type DebugShapeId = String;

/// Immediate-mode debug drawing surface
pub trait DebugGraphics {
    /// Outline a rectangle
    fn draw_hollow_rect(&mut self, rect: Rect, color: Color);

    /// Outline a circle
    ///
    /// Surfaces without circle support get the circle's bounding rectangle.
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let extent = Vec2::new(radius, radius);
        self.draw_hollow_rect(Rect::from_position_size(center - extent, extent * 2.0), color);
    }
}

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Rectangle outline
    HollowRect {
        /// World-space rectangle
        rect: Rect,
        /// Outline color
        color: Color,
        /// Seconds left to live; 0.0 means this frame only
        duration: f32,
    },

    /// Circle outline
    Circle {
        /// World-space center
        center: Vec2,
        /// Radius in world units
        radius: f32,
        /// Outline color
        color: Color,
        /// Seconds left to live; 0.0 means this frame only
        duration: f32,
    },
}

impl DebugShape {
    /// Get remaining duration
    pub fn duration(&self) -> f32 {
        match self {
            DebugShape::HollowRect { duration, .. } | DebugShape::Circle { duration, .. } => {
                *duration
            }
        }
    }

    /// Set duration (returns modified shape)
    #[must_use]
    pub fn with_duration(mut self, new_duration: f32) -> Self {
        match &mut self {
            DebugShape::HollowRect { duration, .. } | DebugShape::Circle { duration, .. } => {
                *duration = new_duration;
            }
        }
        self
    }

    /// Color the shape is drawn in
    pub fn color(&self) -> Color {
        match self {
            DebugShape::HollowRect { color, .. } | DebugShape::Circle { color, .. } => *color,
        }
    }

    /// Decrease duration by delta_time, returns true if expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        match self {
            DebugShape::HollowRect { duration, .. } | DebugShape::Circle { duration, .. } => {
                *duration -= delta_time;
                *duration <= 0.0
            }
        }
    }
}

/// Debug drawing system that records shapes for a renderer
///
/// Supports both temporary shapes (which expire after a certain time) and
/// persistent shapes (which remain until explicitly removed).
pub struct DebugDrawSystem {
    /// Temporary shapes that expire after their duration
    temporary_shapes: Vec<DebugShape>,

    /// Persistent shapes that remain until manually removed
    persistent_shapes: HashMap<DebugShapeId, DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create a new debug draw system
    pub fn new() -> Self {
        Self {
            temporary_shapes: Vec::new(),
            persistent_shapes: HashMap::new(),
            enabled: true,
        }
    }

    /// Draw a rectangle outline (temporary)
    pub fn draw_rect(&mut self, rect: Rect, color: Color, duration: f32) {
        if !self.enabled {
            return;
        }

        self.temporary_shapes.push(DebugShape::HollowRect {
            rect,
            color,
            duration,
        });
    }

    /// Draw a circle outline (temporary)
    pub fn draw_circle_for(&mut self, center: Vec2, radius: f32, color: Color, duration: f32) {
        if !self.enabled {
            return;
        }

        self.temporary_shapes.push(DebugShape::Circle {
            center,
            radius,
            color,
            duration,
        });
    }

    /// Draw a persistent shape that remains until explicitly removed
    pub fn draw_persistent(&mut self, id: impl Into<String>, shape: DebugShape) {
        if !self.enabled {
            return;
        }

        self.persistent_shapes.insert(id.into(), shape);
    }

    /// Remove a persistent shape
    pub fn clear_persistent(&mut self, id: &str) {
        self.persistent_shapes.remove(id);
    }

    /// Update shape lifetimes and remove expired temporary shapes
    pub fn update(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }

        self.temporary_shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Get all shapes for rendering (both temporary and persistent)
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        if !self.enabled {
            return Vec::new();
        }

        self.temporary_shapes
            .iter()
            .chain(self.persistent_shapes.values())
            .collect()
    }

    /// Get the number of active shapes
    pub fn shape_count(&self) -> usize {
        self.temporary_shapes.len() + self.persistent_shapes.len()
    }

    /// Clear all shapes (temporary and persistent)
    pub fn clear(&mut self) {
        self.temporary_shapes.clear();
        self.persistent_shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

// Immediate-mode draws live until the next `update`
impl DebugGraphics for DebugDrawSystem {
    fn draw_hollow_rect(&mut self, rect: Rect, color: Color) {
        self.draw_rect(rect, color, 0.0);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.draw_circle_for(center, radius, color, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::colors;

    struct RectsOnly(Vec<Rect>);

    impl DebugGraphics for RectsOnly {
        fn draw_hollow_rect(&mut self, rect: Rect, _color: Color) {
            self.0.push(rect);
        }
    }

    #[test]
    fn test_temporary_shape_expiration() {
        let mut system = DebugDrawSystem::new();

        system.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), colors::indian_red(), 1.0);
        assert_eq!(system.shape_count(), 1);

        system.update(0.5);
        assert_eq!(system.shape_count(), 1);

        // Total 1.1 seconds
        system.update(0.6);
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_immediate_draws_last_one_frame() {
        let mut system = DebugDrawSystem::new();
        system.draw_hollow_rect(Rect::new(0.0, 0.0, 2.0, 2.0), colors::indian_red());
        system.draw_circle(Vec2::new(1.0, 1.0), 1.0, colors::light_green());

        assert_eq!(system.get_shapes().len(), 2);
        assert_eq!(system.get_shapes()[0].color(), colors::indian_red());

        system.update(1.0 / 60.0);
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_persistent_shapes() {
        let mut system = DebugDrawSystem::new();

        system.draw_persistent(
            "arena",
            DebugShape::HollowRect {
                rect: Rect::new(0.0, 0.0, 100.0, 100.0),
                color: colors::light_green(),
                duration: f32::INFINITY,
            },
        );

        for _ in 0..100 {
            system.update(1.0);
        }
        assert_eq!(system.shape_count(), 1);

        system.clear_persistent("arena");
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_disabled_system_records_nothing() {
        let mut system = DebugDrawSystem::new();
        system.enabled = false;
        system.draw_hollow_rect(Rect::new(0.0, 0.0, 1.0, 1.0), colors::indian_red());

        assert_eq!(system.shape_count(), 0);
        assert!(system.get_shapes().is_empty());
    }

    #[test]
    fn test_default_circle_falls_back_to_bounds() {
        let mut surface = RectsOnly(Vec::new());
        surface.draw_circle(Vec2::new(5.0, 5.0), 2.0, colors::light_green());

        assert_eq!(surface.0, vec![Rect::new(3.0, 3.0, 4.0, 4.0)]);
        let shape = DebugShape::Circle {
            center: Vec2::zeros(),
            radius: 1.0,
            color: colors::light_green(),
            duration: 0.0,
        };
        assert_eq!(shape.with_duration(2.0).duration(), 2.0);
    }
}
