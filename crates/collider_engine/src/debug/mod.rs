//! Debug module for visualization and debugging tools
//!
//! Colliders draw themselves through the [`DebugGraphics`] trait;
//! [`DebugDrawSystem`] is the built-in recorder that keeps the drawn shapes
//! around for a renderer to pick up.

pub mod draw;

pub use draw::{DebugDrawSystem, DebugGraphics, DebugShape, DebugShapeId};
