//! Scene: owns entities and the physics system their colliders register with
//!
//! Every change that affects a collider's world-space bounds goes through the
//! scene, which hands the collider a [`ColliderContext`] pointing at the
//! scene's [`PhysicsSystem`].

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use thiserror::Error;

use super::entity::{Entity, EntityId};
use crate::config::{ConfigError, SceneConfig};
use crate::debug::DebugGraphics;
use crate::foundation::math::{Rect, Vec2};
use crate::physics::{
    BoxShape, Collider, ColliderContext, ColliderHandle, ColliderRegistry, ColliderShape,
    CollisionError, CollisionPair, PhysicsLayers, PhysicsSystem,
};

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// No entity with this id is in the scene
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// The entity exists but has no such collider
    #[error("entity {:?} has no collider {:?}", .0.entity, .0.collider)]
    UnknownCollider(ColliderHandle),

    /// A pairwise test could not be performed
    #[error(transparent)]
    Collision(#[from] CollisionError),

    /// Scene configuration was rejected
    #[error("invalid scene configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A collider hit by a linecast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The collider that was hit
    pub handle: ColliderHandle,
    /// Where along the segment (0.0 to 1.0) it enters the collider's bounds
    pub fraction: f32,
    /// World-space point at `fraction`
    pub point: Vec2,
}

/// A collection of entities sharing one physics system
pub struct Scene {
    config: SceneConfig,
    entities: HashMap<EntityId, Entity>,
    physics: PhysicsSystem,
}

impl Scene {
    /// Create a scene, validating the configuration
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: SceneConfig) -> Self {
        info!("Creating scene (cell size {})", config.physics.cell_size);
        Self {
            physics: PhysicsSystem::from_config(&config.physics),
            entities: HashMap::new(),
            config,
        }
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The scene's physics system
    pub fn physics(&self) -> &PhysicsSystem {
        &self.physics
    }

    /// Look up an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// All entities, in no particular order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of entities in the scene
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Add an entity; its colliders become active and register
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = entity.id();
        debug!(
            "Adding entity '{}' ({:?}) with {} collider(s)",
            entity.name(),
            id,
            entity.colliders().len()
        );
        entity.on_added_to_scene(&mut self.physics);
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity; its colliders unregister and become detached
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Entity, SceneError> {
        let mut entity = self.entities.remove(&id).ok_or(SceneError::UnknownEntity(id))?;
        debug!("Removing entity '{}' ({:?})", entity.name(), id);
        entity.on_removed_from_scene(&mut self.physics);
        Ok(entity)
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, SceneError> {
        self.entities.get_mut(&id).ok_or(SceneError::UnknownEntity(id))
    }

    /// Move an entity and refresh its colliders in the physics index
    pub fn set_entity_position(&mut self, id: EntityId, position: Vec2) -> Result<(), SceneError> {
        let entity = self.entities.get_mut(&id).ok_or(SceneError::UnknownEntity(id))?;
        entity.set_position(position);
        entity.sync_colliders(&mut self.physics);
        Ok(())
    }

    /// Move an entity by `delta`
    pub fn translate_entity(&mut self, id: EntityId, delta: Vec2) -> Result<(), SceneError> {
        let position = self.entity_mut(id)?.position() + delta;
        self.set_entity_position(id, position)
    }

    /// Enable or disable an entity; disabled entities' colliders leave the index
    pub fn set_entity_enabled(&mut self, id: EntityId, enabled: bool) -> Result<(), SceneError> {
        let entity = self.entities.get_mut(&id).ok_or(SceneError::UnknownEntity(id))?;
        let physics: &mut dyn ColliderRegistry = &mut self.physics;
        entity.apply_enabled(enabled, Some(physics));
        Ok(())
    }

    /// Attach a collider to an entity in the scene
    pub fn add_collider(
        &mut self,
        id: EntityId,
        collider: Collider,
    ) -> Result<ColliderHandle, SceneError> {
        let entity = self.entities.get_mut(&id).ok_or(SceneError::UnknownEntity(id))?;
        let position = entity.position();
        let collider_id = entity.add_collider(collider);
        let handle = ColliderHandle {
            entity: id,
            collider: collider_id,
        };

        let collider = entity
            .collider_mut(collider_id)
            .ok_or(SceneError::UnknownCollider(handle))?;
        let mut ctx = ColliderContext::in_scene(position, &mut self.physics);
        collider.on_entity_added_to_scene(&mut ctx);
        Ok(handle)
    }

    /// Detach a collider from its entity, unregistering it first
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Result<Collider, SceneError> {
        {
            let (collider, mut ctx) = self.collider_mut(handle)?;
            collider.on_entity_removed_from_scene(&mut ctx);
        }
        self.entity_mut(handle.entity)?
            .remove_collider(handle.collider)
            .ok_or(SceneError::UnknownCollider(handle))
    }

    /// Look up a collider
    pub fn collider(&self, handle: ColliderHandle) -> Result<&Collider, SceneError> {
        self.entities
            .get(&handle.entity)
            .ok_or(SceneError::UnknownEntity(handle.entity))?
            .collider(handle.collider)
            .ok_or(SceneError::UnknownCollider(handle))
    }

    fn collider_mut(
        &mut self,
        handle: ColliderHandle,
    ) -> Result<(&mut Collider, ColliderContext<'_>), SceneError> {
        let entity = self
            .entities
            .get_mut(&handle.entity)
            .ok_or(SceneError::UnknownEntity(handle.entity))?;
        let position = entity.position();
        let collider = entity
            .collider_mut(handle.collider)
            .ok_or(SceneError::UnknownCollider(handle))?;
        Ok((collider, ColliderContext::in_scene(position, &mut self.physics)))
    }

    /// Set a collider's origin
    pub fn set_collider_origin(
        &mut self,
        handle: ColliderHandle,
        origin: Vec2,
    ) -> Result<(), SceneError> {
        let (collider, mut ctx) = self.collider_mut(handle)?;
        collider.set_origin(origin, &mut ctx);
        Ok(())
    }

    /// Set a collider's origin as a fraction of its size
    pub fn set_collider_origin_normalized(
        &mut self,
        handle: ColliderHandle,
        normalized: Vec2,
    ) -> Result<(), SceneError> {
        let (collider, mut ctx) = self.collider_mut(handle)?;
        collider.set_origin_normalized(normalized, &mut ctx);
        Ok(())
    }

    /// Set a collider's local offset
    pub fn set_collider_position(
        &mut self,
        handle: ColliderHandle,
        position: Vec2,
    ) -> Result<(), SceneError> {
        let (collider, mut ctx) = self.collider_mut(handle)?;
        collider.set_position(position, &mut ctx);
        Ok(())
    }

    /// Replace a collider's shape
    pub fn set_collider_shape(
        &mut self,
        handle: ColliderHandle,
        shape: impl Into<ColliderShape>,
    ) -> Result<(), SceneError> {
        let (collider, mut ctx) = self.collider_mut(handle)?;
        collider.set_shape(shape, &mut ctx);
        Ok(())
    }

    /// Change a collider's layer and mask
    pub fn set_collider_layers(
        &mut self,
        handle: ColliderHandle,
        layer: PhysicsLayers,
        mask: PhysicsLayers,
    ) -> Result<(), SceneError> {
        let (collider, mut ctx) = self.collider_mut(handle)?;
        collider.set_layers(layer, mask, &mut ctx);
        Ok(())
    }

    /// Change a collider's trigger flag
    pub fn set_collider_trigger(
        &mut self,
        handle: ColliderHandle,
        is_trigger: bool,
    ) -> Result<(), SceneError> {
        let (collider, mut ctx) = self.collider_mut(handle)?;
        collider.set_trigger(is_trigger, &mut ctx);
        Ok(())
    }

    /// Enable or disable a single collider
    pub fn set_collider_enabled(
        &mut self,
        handle: ColliderHandle,
        enabled: bool,
    ) -> Result<(), SceneError> {
        let (collider, mut ctx) = self.collider_mut(handle)?;
        collider.set_enabled(enabled, &mut ctx);
        Ok(())
    }

    /// World-space bounds of a collider
    pub fn collider_bounds(&self, handle: ColliderHandle) -> Result<Rect, SceneError> {
        let position = self.entity_position(handle.entity)?;
        Ok(self.collider(handle)?.bounds(position))
    }

    fn entity_position(&self, id: EntityId) -> Result<Vec2, SceneError> {
        self.entities
            .get(&id)
            .map(Entity::position)
            .ok_or(SceneError::UnknownEntity(id))
    }

    /// Test two colliders at their entities' current positions
    pub fn collides_with(&self, a: ColliderHandle, b: ColliderHandle) -> Result<bool, SceneError> {
        let placed_a = self.collider(a)?.placed_at(self.entity_position(a.entity)?);
        let placed_b = self.collider(b)?.placed_at(self.entity_position(b.entity)?);
        Ok(placed_a.collides_with(&placed_b)?)
    }

    /// Test `a` against `b` as if `a`'s entity stood at `hypothetical`
    ///
    /// No entity is moved. If both colliders belong to the same entity, both
    /// are evaluated at the hypothetical position.
    pub fn collides_with_at_position(
        &self,
        a: ColliderHandle,
        b: ColliderHandle,
        hypothetical: Vec2,
    ) -> Result<bool, SceneError> {
        let other_position = if a.entity == b.entity {
            hypothetical
        } else {
            self.entity_position(b.entity)?
        };
        let other = self.collider(b)?.placed_at(other_position);
        Ok(self.collider(a)?.collides_with_at_position(&other, hypothetical)?)
    }

    /// Colliders whose bounds overlap `rect` and whose layer is in `mask`
    pub fn boxcast_broadphase(&self, rect: &Rect, mask: PhysicsLayers) -> Vec<ColliderHandle> {
        self.physics
            .boxcast(rect, mask)
            .into_iter()
            .map(|proxy| proxy.handle)
            .collect()
    }

    /// Colliders whose shape overlaps `rect` and whose layer is in `mask`
    pub fn overlap_rect(
        &self,
        rect: &Rect,
        mask: PhysicsLayers,
    ) -> Result<Vec<ColliderHandle>, SceneError> {
        let area = ColliderShape::Box(BoxShape::new(rect.width, rect.height));
        let mut hits = Vec::new();

        for handle in self.boxcast_broadphase(rect, mask) {
            let placed = self.collider(handle)?.placed_at(self.entity_position(handle.entity)?);
            if placed.collider().shape().collides_with(placed.bounds(), &area, *rect)? {
                hits.push(handle);
            }
        }
        Ok(hits)
    }

    /// Colliders on other entities currently overlapping `handle`
    ///
    /// Filtered by `handle`'s mask and the other collider's mask.
    pub fn overlapping(&self, handle: ColliderHandle) -> Result<Vec<ColliderHandle>, SceneError> {
        let collider = self.collider(handle)?;
        let placed = collider.placed_at(self.entity_position(handle.entity)?);
        let mut hits = Vec::new();

        let candidates = self.boxcast_broadphase(&placed.bounds(), collider.collides_with_layers());
        for other_handle in candidates {
            if other_handle.entity == handle.entity {
                continue;
            }
            let other = self.collider(other_handle)?;
            if !collider.physics_layer().matches_mask(other.collides_with_layers()) {
                continue;
            }
            let other_placed = other.placed_at(self.entity_position(other_handle.entity)?);
            if placed.collides_with(&other_placed)? {
                hits.push(other_handle);
            }
        }
        Ok(hits)
    }

    /// Colliders hit by the segment `from -> to`, nearest first
    ///
    /// Only the cells the segment crosses are searched. Index entries whose
    /// collider or entity is gone are logged and skipped.
    pub fn linecast(&self, from: Vec2, to: Vec2, mask: PhysicsLayers) -> Vec<RaycastHit> {
        let mut hits = Vec::new();

        for proxy in self.physics.linecast(from, to, mask) {
            let handle = proxy.handle;
            let placed = match (self.collider(handle), self.entity_position(handle.entity)) {
                (Ok(collider), Ok(position)) => collider.placed_at(position),
                (Err(err), _) | (_, Err(err)) => {
                    warn!("Physics index references missing collider {:?}: {}", handle, err);
                    continue;
                }
            };
            if !placed.collides_with_segment(from, to) {
                continue;
            }
            if let Some(fraction) = placed.bounds().segment_entry(from, to) {
                let point = from + (to - from) * fraction;
                hits.push(RaycastHit {
                    handle,
                    fraction,
                    point,
                });
            }
        }

        hits.sort_by(|a, b| {
            a.fraction
                .total_cmp(&b.fraction)
                .then(a.handle.collider.cmp(&b.handle.collider))
        });
        hits
    }

    /// Run broad and narrow phase, updating contact tracking
    ///
    /// Pairs on the same entity are never reported. Every supported pair is
    /// tested and recorded; if any pair could not be tested (a custom shape
    /// against anything), the first such error is returned after the frame
    /// has been recorded.
    pub fn detect_collisions(&mut self) -> Result<&HashSet<CollisionPair>, SceneError> {
        self.physics.begin_frame();
        let mut first_error = None;

        for (a, b) in self.physics.broad_phase_pairs() {
            if a.handle.entity == b.handle.entity {
                continue;
            }
            let placed = (
                self.collider(a.handle),
                self.entity_position(a.handle.entity),
                self.collider(b.handle),
                self.entity_position(b.handle.entity),
            );
            let (Ok(collider_a), Ok(position_a), Ok(collider_b), Ok(position_b)) = placed else {
                warn!(
                    "Physics index references missing collider ({:?}, {:?})",
                    a.handle, b.handle
                );
                continue;
            };

            let other = collider_b.placed_at(position_b);
            match collider_a.placed_at(position_a).collides_with(&other) {
                Ok(true) => {
                    let is_trigger = a.is_trigger || b.is_trigger;
                    let pair = CollisionPair::new(a.handle, b.handle, is_trigger);
                    self.physics.record_collision(pair);
                }
                Ok(false) => {}
                Err(err) => {
                    warn!("Cannot test pair ({:?}, {:?}): {}", a.handle, b.handle, err);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err.into());
        }
        Ok(self.physics.get_current_collisions())
    }

    /// Pairs that started touching in the last `detect_collisions`
    pub fn collisions_entered(&self) -> Vec<CollisionPair> {
        self.physics.get_collision_entered()
    }

    /// Pairs that stopped touching in the last `detect_collisions`
    pub fn collisions_exited(&self) -> Vec<CollisionPair> {
        self.physics.get_collision_exited()
    }

    /// Draw every enabled collider of every enabled entity
    pub fn debug_render(&self, graphics: &mut dyn DebugGraphics) {
        if !self.config.debug.enabled {
            return;
        }

        let mut entities: Vec<&Entity> =
            self.entities.values().filter(|e| e.is_enabled()).collect();
        entities.sort_by_key(|entity| entity.id());

        for entity in entities {
            for collider in entity.colliders().iter().filter(|c| c.is_enabled()) {
                collider.debug_render(entity.position(), graphics, &self.config.debug);
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::with_valid_config(SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::debug::{DebugDrawSystem, DebugShape};
    use crate::foundation::math::colors;
    use crate::physics::shapes::tests::wedge;
    use crate::physics::{MultiPart, RegistrationState};
    use approx::assert_relative_eq;

    fn scene() -> Scene {
        Scene::new(SceneConfig {
            physics: PhysicsConfig { cell_size: 16.0 },
            ..SceneConfig::default()
        })
        .expect("valid config")
    }

    fn spawn(scene: &mut Scene, name: &str, position: Vec2, collider: Collider) -> ColliderHandle {
        let entity = scene.add_entity(Entity::new(name).with_position(position));
        scene.add_collider(entity, collider).expect("entity exists")
    }

    const ALL: PhysicsLayers = PhysicsLayers::EVERYTHING;

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SceneConfig {
            physics: PhysicsConfig { cell_size: 0.0 },
            ..SceneConfig::default()
        };
        assert!(matches!(Scene::new(config), Err(SceneError::Config(_))));
    }

    #[test]
    fn test_box_and_circle_scenario() {
        let mut scene = scene();
        let boxed = spawn(&mut scene, "box", Vec2::new(0.0, 0.0), Collider::rect(10.0, 10.0));
        let circle = spawn(&mut scene, "circle", Vec2::new(5.0, 5.0), Collider::circle(3.0));

        assert!(scene.collides_with(boxed, circle).unwrap());
        let far_away = Vec2::new(50.0, 50.0);
        assert!(!scene.collides_with_at_position(circle, boxed, far_away).unwrap());
        assert_eq!(scene.entity(circle.entity).unwrap().position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_at_position_leaves_entity_untouched_on_error() {
        let mut scene = scene();
        let boxed = spawn(&mut scene, "box", Vec2::new(1.0, 2.0), Collider::rect(4.0, 4.0));
        let custom = spawn(&mut scene, "custom", Vec2::new(1.0, 2.0), Collider::new(wedge()));

        let result = scene.collides_with_at_position(boxed, custom, Vec2::new(30.0, 30.0));
        assert!(matches!(
            result,
            Err(SceneError::Collision(CollisionError::UnsupportedShape { .. }))
        ));
        assert_eq!(scene.entity(boxed.entity).unwrap().position(), Vec2::new(1.0, 2.0));
        assert_eq!(scene.collider_bounds(boxed).unwrap(), Rect::new(1.0, 2.0, 4.0, 4.0));
    }

    #[test]
    fn test_at_position_moves_siblings_together() {
        let mut scene = scene();
        let entity = scene.add_entity(Entity::new("twin").with_position(Vec2::new(0.0, 0.0)));
        let left = scene.add_collider(entity, Collider::rect(2.0, 2.0)).unwrap();
        let right = scene
            .add_collider(entity, Collider::rect(2.0, 2.0).with_position(Vec2::new(10.0, 0.0)))
            .unwrap();

        // At (10, 0) `left` sits where `right` is now, but `right` moves along
        assert!(!scene.collides_with_at_position(left, right, Vec2::new(10.0, 0.0)).unwrap());
    }

    #[test]
    fn test_origin_change_updates_index() {
        let mut scene = scene();
        let handle = spawn(&mut scene, "box", Vec2::new(20.0, 20.0), Collider::rect(4.0, 4.0));

        scene.set_collider_origin(handle, Vec2::new(40.0, 40.0)).unwrap();

        let proxy = scene.physics().proxy(handle.collider).expect("still registered");
        assert_eq!(proxy.bounds, Rect::new(-20.0, -20.0, 4.0, 4.0));
        assert!(scene.boxcast_broadphase(&Rect::new(20.0, 20.0, 4.0, 4.0), ALL).is_empty());
        assert_eq!(
            scene.boxcast_broadphase(&Rect::new(-19.0, -19.0, 1.0, 1.0), ALL),
            vec![handle]
        );
    }

    #[test]
    fn test_normalized_origin_through_scene() {
        let mut scene = scene();
        let handle = spawn(&mut scene, "box", Vec2::zeros(), Collider::rect(10.0, 4.0));

        scene.set_collider_origin_normalized(handle, Vec2::new(0.5, 0.5)).unwrap();
        assert_eq!(scene.collider_bounds(handle).unwrap(), Rect::new(-5.0, -2.0, 10.0, 4.0));
        assert_relative_eq!(scene.collider(handle).unwrap().origin_normalized().x, 0.5);
    }

    #[test]
    fn test_moving_entity_updates_index() {
        let mut scene = scene();
        let handle = spawn(&mut scene, "box", Vec2::zeros(), Collider::rect(4.0, 4.0));

        scene.translate_entity(handle.entity, Vec2::new(100.0, 0.0)).unwrap();
        assert_eq!(scene.physics().proxy(handle.collider).unwrap().bounds.x, 100.0);
        assert_eq!(scene.physics().spatial_query().entity_count(), 1);
    }

    #[test]
    fn test_remove_entity_unregisters_and_detaches() {
        let mut scene = scene();
        let handle = spawn(&mut scene, "box", Vec2::zeros(), Collider::rect(4.0, 4.0));

        let entity = scene.remove_entity(handle.entity).unwrap();
        assert_eq!(entity.colliders()[0].state(), RegistrationState::Detached);
        assert!(!scene.physics().is_registered(handle.collider));
        assert_eq!(scene.physics().collider_count(), 0);
        assert!(matches!(
            scene.remove_entity(handle.entity),
            Err(SceneError::UnknownEntity(_))
        ));

        // Re-adding registers again
        scene.add_entity(entity);
        assert!(scene.physics().is_registered(handle.collider));
    }

    #[test]
    fn test_remove_collider() {
        let mut scene = scene();
        let handle = spawn(&mut scene, "box", Vec2::zeros(), Collider::rect(4.0, 4.0));

        let collider = scene.remove_collider(handle).unwrap();
        assert_eq!(collider.entity(), None);
        assert_eq!(collider.state(), RegistrationState::Detached);
        assert!(!scene.physics().is_registered(handle.collider));
        assert!(matches!(scene.collider(handle), Err(SceneError::UnknownCollider(_))));
    }

    #[test]
    fn test_disabled_entity_leaves_index() {
        let mut scene = scene();
        let handle = spawn(&mut scene, "box", Vec2::zeros(), Collider::rect(4.0, 4.0));

        scene.set_entity_enabled(handle.entity, false).unwrap();
        assert!(!scene.physics().is_registered(handle.collider));

        // Origin changes while disabled do not sneak it back in
        scene.set_collider_origin(handle, Vec2::new(1.0, 1.0)).unwrap();
        assert!(!scene.physics().is_registered(handle.collider));

        scene.set_entity_enabled(handle.entity, true).unwrap();
        let proxy = scene.physics().proxy(handle.collider).unwrap();
        assert_eq!(proxy.bounds.min(), Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn test_detect_collisions_entered_and_exited() {
        let mut scene = scene();
        let a = spawn(&mut scene, "a", Vec2::new(0.0, 0.0), Collider::rect(10.0, 10.0));
        let b = spawn(&mut scene, "b", Vec2::new(30.0, 0.0), Collider::circle(3.0));

        assert!(scene.detect_collisions().unwrap().is_empty());

        scene.set_entity_position(b.entity, Vec2::new(12.0, 5.0)).unwrap();
        assert_eq!(scene.detect_collisions().unwrap().len(), 1);
        let entered = scene.collisions_entered();
        assert_eq!(entered.len(), 1);
        assert!(entered[0].involves(a.collider) && entered[0].involves(b.collider));

        scene.detect_collisions().unwrap();
        assert!(scene.collisions_entered().is_empty());

        scene.set_entity_position(b.entity, Vec2::new(30.0, 0.0)).unwrap();
        scene.detect_collisions().unwrap();
        assert_eq!(scene.collisions_exited(), entered);
    }

    #[test]
    fn test_detect_collisions_respects_layers_and_entities() {
        let mut scene = scene();
        let player = spawn(
            &mut scene,
            "player",
            Vec2::zeros(),
            Collider::rect(10.0, 10.0).with_layers(PhysicsLayers::PLAYER, PhysicsLayers::ENEMY),
        );
        scene.add_collider(player.entity, Collider::circle(2.0)).unwrap();
        spawn(
            &mut scene,
            "crate",
            Vec2::new(5.0, 5.0),
            Collider::rect(4.0, 4.0).with_layers(PhysicsLayers::ENVIRONMENT, ALL),
        );

        // Sibling colliders and filtered layers produce nothing for the player
        let pairs = scene.detect_collisions().unwrap();
        assert!(pairs.iter().all(|pair| pair.a.entity != pair.b.entity));
        assert!(!pairs.iter().any(|pair| pair.involves(player.collider)));
    }

    #[test]
    fn test_detect_collisions_reports_unsupported_shapes() {
        let mut scene = scene();
        spawn(&mut scene, "crate", Vec2::new(5.0, 5.0), Collider::rect(4.0, 4.0));
        spawn(&mut scene, "custom", Vec2::new(5.0, 5.0), Collider::new(wedge()));
        let a = spawn(&mut scene, "a", Vec2::new(100.0, 100.0), Collider::rect(4.0, 4.0));
        let b = spawn(&mut scene, "b", Vec2::new(102.0, 102.0), Collider::rect(4.0, 4.0));

        let result = scene.detect_collisions();
        assert!(matches!(
            result,
            Err(SceneError::Collision(CollisionError::UnsupportedShape { .. }))
        ));

        // Supported pairs are still recorded for the frame
        let entered = scene.collisions_entered();
        assert_eq!(entered.len(), 1);
        assert!(entered[0].involves(a.collider) && entered[0].involves(b.collider));
    }

    #[test]
    fn test_trigger_pairs_are_flagged() {
        let mut scene = scene();
        spawn(&mut scene, "zone", Vec2::zeros(), Collider::rect(10.0, 10.0).as_trigger());
        spawn(&mut scene, "ship", Vec2::new(2.0, 2.0), Collider::rect(2.0, 2.0));

        let pairs = scene.detect_collisions().unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(pairs.iter().all(|pair| pair.is_trigger));
    }

    #[test]
    fn test_linecast_orders_hits() {
        let mut scene = scene();
        let far = spawn(&mut scene, "far", Vec2::new(40.0, -2.0), Collider::rect(4.0, 4.0));
        let near = spawn(&mut scene, "near", Vec2::new(10.0, 0.0), Collider::circle(2.0));
        spawn(&mut scene, "off-axis", Vec2::new(20.0, 20.0), Collider::rect(4.0, 4.0));

        let hits = scene.linecast(Vec2::zeros(), Vec2::new(50.0, 0.0), ALL);
        let handles: Vec<_> = hits.iter().map(|hit| hit.handle).collect();
        assert_eq!(handles, vec![near, far]);
        assert_relative_eq!(hits[0].point.x, 8.0, epsilon = 1e-4);
        assert_relative_eq!(hits[1].fraction, 0.8, epsilon = 1e-4);
    }

    #[test]
    fn test_long_linecast_over_fine_grid() {
        let mut scene = Scene::new(SceneConfig {
            physics: PhysicsConfig { cell_size: 1.0 },
            ..SceneConfig::default()
        })
        .expect("valid config");
        let pebble = spawn(
            &mut scene,
            "pebble",
            Vec2::new(2500.0, 2500.0),
            Collider::rect(1.0, 1.0),
        );
        let floor = spawn(
            &mut scene,
            "floor",
            Vec2::new(-1.0e6, 3990.0),
            Collider::rect(2.0e6, 20.0),
        );

        let hits = scene.linecast(Vec2::zeros(), Vec2::new(4000.0, 4000.0), ALL);
        let handles: Vec<_> = hits.iter().map(|hit| hit.handle).collect();
        assert_eq!(handles, vec![pebble, floor]);
        assert_relative_eq!(hits[0].fraction, 0.625, epsilon = 1e-4);
        assert_relative_eq!(hits[1].point.y, 3990.0, epsilon = 1e-2);
    }

    #[test]
    fn test_linecast_skips_stale_index_entries() {
        let mut scene = scene();
        let wall = spawn(&mut scene, "wall", Vec2::new(20.0, -5.0), Collider::rect(2.0, 10.0));

        // Indexed, but its entity was never added to the scene
        let outsider = Entity::new("outsider");
        let mut stray = Collider::rect(2.0, 10.0);
        stray.attach(outsider.id(), true);
        let proxy = stray.proxy(Vec2::new(10.0, -5.0)).expect("attached collider has a proxy");
        scene.physics.add_collider(proxy);

        let hits = scene.linecast(Vec2::zeros(), Vec2::new(50.0, 0.0), ALL);
        let handles: Vec<_> = hits.iter().map(|hit| hit.handle).collect();
        assert_eq!(handles, vec![wall]);
    }

    #[test]
    fn test_overlap_rect_is_exact() {
        let mut scene = scene();
        let circle = spawn(&mut scene, "ball", Vec2::new(10.0, 10.0), Collider::circle(5.0));
        let dumbbell = spawn(
            &mut scene,
            "dumbbell",
            Vec2::new(40.0, 0.0),
            Collider::new(ColliderShape::multi(vec![
                MultiPart::boxed(Vec2::zeros(), 2.0, 2.0),
                MultiPart::boxed(Vec2::new(18.0, 0.0), 2.0, 2.0),
            ])),
        );

        // Touches the circle's bounds corner but not the circle itself
        let corner = Rect::new(5.0, 5.0, 0.5, 0.5);
        assert_eq!(scene.boxcast_broadphase(&corner, ALL), vec![circle]);
        assert!(scene.overlap_rect(&corner, ALL).unwrap().is_empty());

        // Between the dumbbell's parts
        let gap = Rect::new(48.0, 0.0, 2.0, 2.0);
        assert!(scene.overlap_rect(&gap, ALL).unwrap().is_empty());
        assert_eq!(
            scene.overlap_rect(&Rect::new(58.0, 0.0, 1.0, 1.0), ALL).unwrap(),
            vec![dumbbell]
        );
    }

    #[test]
    fn test_overlapping_excludes_siblings() {
        let mut scene = scene();
        let a = spawn(&mut scene, "a", Vec2::zeros(), Collider::rect(10.0, 10.0));
        scene.add_collider(a.entity, Collider::rect(10.0, 10.0)).unwrap();
        let b = spawn(&mut scene, "b", Vec2::new(5.0, 5.0), Collider::rect(10.0, 10.0));

        assert_eq!(scene.overlapping(a).unwrap(), vec![b]);
    }

    #[test]
    fn test_debug_render_draws_bounds() {
        let mut scene = scene();
        spawn(&mut scene, "box", Vec2::new(1.0, 1.0), Collider::rect(2.0, 3.0));
        let hidden = spawn(&mut scene, "hidden", Vec2::zeros(), Collider::circle(1.0));
        scene.set_entity_enabled(hidden.entity, false).unwrap();

        let mut draw = DebugDrawSystem::new();
        scene.debug_render(&mut draw);

        assert_eq!(
            draw.get_shapes(),
            vec![&DebugShape::HollowRect {
                rect: Rect::new(1.0, 1.0, 2.0, 3.0),
                color: colors::indian_red(),
                duration: 0.0,
            }]
        );
    }

    #[test]
    fn test_unknown_handles_are_errors() {
        let mut scene = scene();
        let handle = spawn(&mut scene, "box", Vec2::zeros(), Collider::rect(1.0, 1.0));
        let stray = ColliderHandle {
            entity: handle.entity,
            collider: Collider::rect(1.0, 1.0).id(),
        };

        assert!(matches!(
            scene.set_collider_origin(stray, Vec2::zeros()),
            Err(SceneError::UnknownCollider(_))
        ));
        assert!(matches!(
            scene.set_entity_position(Entity::new("ghost").id(), Vec2::zeros()),
            Err(SceneError::UnknownEntity(_))
        ));
    }
}
