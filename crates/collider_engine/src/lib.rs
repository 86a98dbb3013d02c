//! # Collider Engine
//!
//! 2D collision components for entity-based games.
//!
//! ## Features
//!
//! - **Colliders**: boxes, circles and compound shapes attached to entities
//! - **Registration**: colliders keep a scene-wide spatial hash up to date
//!   as their entities enter, move and leave the scene
//! - **Queries**: pairwise tests, hypothetical-position tests, rectangle
//!   overlaps and linecasts, filtered by physics layers
//! - **Contacts**: per-frame collision pairs with entered/exited tracking
//! - **Debug drawing**: collider bounds through a pluggable drawing surface
//!
//! ## Quick Start
//!
//! ```rust
//! use collider_engine::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default())?;
//!
//! let ship = scene.add_entity(Entity::new("ship").with_position(Vec2::new(5.0, 5.0)));
//! let hull = scene.add_collider(ship, Collider::circle(3.0))?;
//!
//! let wall = scene.add_entity(Entity::new("wall"));
//! let bricks = scene.add_collider(wall, Collider::rect(10.0, 10.0))?;
//!
//! assert!(scene.collides_with(hull, bricks)?);
//! assert!(!scene.collides_with_at_position(hull, bricks, Vec2::new(50.0, 50.0))?);
//! # Ok::<(), SceneError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod debug;
pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, DebugConfig, PhysicsConfig, SceneConfig},
        debug::{DebugDrawSystem, DebugGraphics, DebugShape},
        ecs::{Entity, EntityId, RaycastHit, Scene, SceneError},
        foundation::math::{colors, Color, Rect, Vec2},
        physics::{
            BoxShape, CircleShape, Collider, ColliderHandle, ColliderId, ColliderShape,
            CollisionError, CollisionPair, CustomShape, MultiPart, MultiShape, PhysicsLayers,
        },
    };
}
