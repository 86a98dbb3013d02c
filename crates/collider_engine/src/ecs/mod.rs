//! Entities and scenes
//!
//! Entities own their colliders. A scene owns entities and the physics
//! system their colliders register with.

pub mod entity;
pub mod scene;

pub use entity::{Entity, EntityId};
pub use scene::{RaycastHit, Scene, SceneError};
