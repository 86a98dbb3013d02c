//! Physics module for 2D collision detection
//!
//! Provides the collider component, its shapes and the pairwise tests
//! between them, physics layers for filtering, and the scene-wide physics
//! system that indexes colliders for broadphase queries.

pub mod collider;
pub mod collision_layers;
pub mod error;
pub mod physics_system;
pub mod shapes;

pub use collider::{
    Collider, ColliderContext, ColliderHandle, ColliderId, ColliderProxy, ColliderRegistry,
    PlacedCollider, RegistrationState,
};
pub use collision_layers::PhysicsLayers;
pub use error::CollisionError;
pub use physics_system::{CollisionPair, PhysicsSystem};
pub use shapes::{
    BoxShape, CircleShape, ColliderShape, CustomShape, MultiPart, MultiShape, PartShape,
    ShapeCollisions,
};
