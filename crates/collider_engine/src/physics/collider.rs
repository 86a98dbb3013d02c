//! Collider component
//!
//! A collider is a shape attached to an entity. It knows where it sits
//! relative to its entity, reports its world-space bounds, tests itself
//! against other colliders and keeps itself registered with the scene's
//! physics system while its entity is part of a scene.
//!
//! Colliders do not hold pointers to their entity or to the physics system.
//! The entity is referenced by id, and everything a collider needs from its
//! surroundings (entity position, physics registry) is handed in per call via
//! a [`ColliderContext`].

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};

use super::collision_layers::PhysicsLayers;
use super::error::CollisionError;
use super::shapes::{ColliderShape, WorldPrimitive};
use crate::config::DebugConfig;
use crate::debug::DebugGraphics;
use crate::ecs::EntityId;
use crate::foundation::math::{Rect, Vec2};

static NEXT_COLLIDER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique collider identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(u64);

impl ColliderId {
    fn next() -> Self {
        Self(NEXT_COLLIDER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Identifies a collider together with the entity that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle {
    /// Owning entity
    pub entity: EntityId,
    /// The collider itself
    pub collider: ColliderId,
}

/// Snapshot of a collider handed to the physics system on registration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderProxy {
    /// Which collider this is
    pub handle: ColliderHandle,
    /// World-space bounds at the time of the call
    pub bounds: Rect,
    /// Layers the collider sits on
    pub layer: PhysicsLayers,
    /// Layers the collider collides with
    pub mask: PhysicsLayers,
    /// Trigger flag
    pub is_trigger: bool,
}

/// The physics system as seen by a collider
pub trait ColliderRegistry {
    /// Add a collider to the spatial index
    fn add_collider(&mut self, proxy: ColliderProxy);

    /// Remove a collider from the spatial index
    ///
    /// With `full` set the index drops every piece of bookkeeping for the
    /// collider, including its broadphase cell membership. Without it the
    /// collider is only marked inactive.
    fn remove_collider(&mut self, proxy: ColliderProxy, full: bool);

    /// Refresh a collider whose bounds changed while registered
    fn update_collider(&mut self, proxy: ColliderProxy) {
        self.remove_collider(proxy, false);
        self.add_collider(proxy);
    }
}

/// What a collider needs from its owner for a single call
pub struct ColliderContext<'a> {
    /// World position of the owning entity
    pub entity_position: Vec2,
    physics: Option<&'a mut dyn ColliderRegistry>,
}

impl<'a> ColliderContext<'a> {
    /// Context with an optional physics registry
    pub fn new(entity_position: Vec2, physics: Option<&'a mut dyn ColliderRegistry>) -> Self {
        Self {
            entity_position,
            physics,
        }
    }

    /// Context for an entity that is not part of any scene
    pub fn detached(entity_position: Vec2) -> Self {
        Self {
            entity_position,
            physics: None,
        }
    }

    /// Context for an entity whose scene owns `physics`
    pub fn in_scene(entity_position: Vec2, physics: &'a mut dyn ColliderRegistry) -> Self {
        Self {
            entity_position,
            physics: Some(physics),
        }
    }

    /// Whether a physics registry is available
    pub fn has_physics(&self) -> bool {
        self.physics.is_some()
    }
}

/// Registration state of a collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationState {
    /// The owning entity is not in a scene; registration calls are no-ops
    #[default]
    Detached,
    /// The owning entity is in a scene; the collider is (or may be) indexed
    Active,
}

/// A shape attached to an entity
#[derive(Debug)]
pub struct Collider {
    id: ColliderId,
    entity: Option<EntityId>,
    position: Vec2,
    origin: Vec2,
    is_trigger: bool,
    physics_layer: PhysicsLayers,
    collides_with_layers: PhysicsLayers,
    enabled: bool,
    entity_enabled: bool,
    shape: ColliderShape,
    state: RegistrationState,
}

impl Collider {
    /// Create a detached collider
    ///
    /// The origin starts at the shape's default origin (the center for
    /// circles, the top-left corner otherwise).
    pub fn new(shape: impl Into<ColliderShape>) -> Self {
        let shape = shape.into();
        Self {
            id: ColliderId::next(),
            entity: None,
            position: Vec2::zeros(),
            origin: shape.default_origin(),
            is_trigger: false,
            physics_layer: PhysicsLayers::DEFAULT,
            collides_with_layers: PhysicsLayers::EVERYTHING,
            enabled: true,
            entity_enabled: true,
            shape,
            state: RegistrationState::Detached,
        }
    }

    /// Axis-aligned box collider
    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(ColliderShape::rect(width, height))
    }

    /// Circle collider, centered on its entity
    pub fn circle(radius: f32) -> Self {
        Self::new(ColliderShape::circle(radius))
    }

    /// Set the local offset (builder style, before attaching)
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Set the origin (builder style, before attaching)
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Mark as trigger (builder style, before attaching)
    #[must_use]
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Set layer and mask (builder style, before attaching)
    #[must_use]
    pub fn with_layers(mut self, layer: PhysicsLayers, mask: PhysicsLayers) -> Self {
        self.physics_layer = layer;
        self.collides_with_layers = mask;
        self
    }

    /// Collider id
    pub fn id(&self) -> ColliderId {
        self.id
    }

    /// Owning entity, if attached
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// Handle of this collider, if attached
    pub fn handle(&self) -> Option<ColliderHandle> {
        self.entity.map(|entity| ColliderHandle {
            entity,
            collider: self.id,
        })
    }

    /// Local offset added to the entity position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Local pivot subtracted when computing bounds
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Whether overlaps are reported without resolution
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Layers this collider sits on
    pub fn physics_layer(&self) -> PhysicsLayers {
        self.physics_layer
    }

    /// Layers this collider collides with
    pub fn collides_with_layers(&self) -> PhysicsLayers {
        self.collides_with_layers
    }

    /// Whether the collider takes part in physics while its entity is in a scene
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The collider's shape
    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// Registration state
    pub fn state(&self) -> RegistrationState {
        self.state
    }

    /// Whether the owning entity is in a scene
    pub fn is_active(&self) -> bool {
        self.state == RegistrationState::Active
    }

    /// Width of the shape's bounds
    pub fn width(&self) -> f32 {
        self.shape.width()
    }

    /// Height of the shape's bounds
    pub fn height(&self) -> f32 {
        self.shape.height()
    }

    /// World-space bounds for the given entity position
    ///
    /// Computed on every call: `entity_position + position - origin`, sized
    /// by the shape.
    pub fn bounds(&self, entity_position: Vec2) -> Rect {
        Rect::from_position_size(entity_position + self.position - self.origin, self.shape.size())
    }

    /// Origin as a fraction of the shape's size
    ///
    /// An axis with zero size reports 0.0.
    pub fn origin_normalized(&self) -> Vec2 {
        let size = self.shape.size();
        let ratio = |origin: f32, extent: f32| if extent == 0.0 { 0.0 } else { origin / extent };
        Vec2::new(ratio(self.origin.x, size.x), ratio(self.origin.y, size.y))
    }

    /// Set the origin, re-registering with the physics system if it changed
    ///
    /// The collider is removed from the index with its old bounds, the origin
    /// is stored and the collider is added back with its new bounds. Setting
    /// the current value does nothing.
    pub fn set_origin(&mut self, origin: Vec2, ctx: &mut ColliderContext<'_>) {
        if self.origin == origin {
            return;
        }
        self.reregister(ctx, |collider| collider.origin = origin);
    }

    /// Set the origin from a fraction of the shape's size
    pub fn set_origin_normalized(&mut self, normalized: Vec2, ctx: &mut ColliderContext<'_>) {
        let origin = normalized.component_mul(&self.shape.size());
        self.set_origin(origin, ctx);
    }

    /// Set the local offset, refreshing the index entry if it changed
    pub fn set_position(&mut self, position: Vec2, ctx: &mut ColliderContext<'_>) {
        if self.position == position {
            return;
        }
        self.reregister(ctx, |collider| collider.position = position);
    }

    /// Replace the shape, re-registering with the new bounds
    pub fn set_shape(&mut self, shape: impl Into<ColliderShape>, ctx: &mut ColliderContext<'_>) {
        let shape = shape.into();
        self.reregister(ctx, |collider| collider.shape = shape);
    }

    /// Change layer and mask, re-registering so the index sees them
    pub fn set_layers(
        &mut self,
        layer: PhysicsLayers,
        mask: PhysicsLayers,
        ctx: &mut ColliderContext<'_>,
    ) {
        if self.physics_layer == layer && self.collides_with_layers == mask {
            return;
        }
        self.reregister(ctx, |collider| {
            collider.physics_layer = layer;
            collider.collides_with_layers = mask;
        });
    }

    /// Change the trigger flag, re-registering so the index sees it
    pub fn set_trigger(&mut self, is_trigger: bool, ctx: &mut ColliderContext<'_>) {
        if self.is_trigger == is_trigger {
            return;
        }
        self.reregister(ctx, |collider| collider.is_trigger = is_trigger);
    }

    /// Enable or disable the collider
    ///
    /// A disabled collider keeps its registration state but is removed from
    /// the physics index until it is enabled again.
    pub fn set_enabled(&mut self, enabled: bool, ctx: &mut ColliderContext<'_>) {
        if self.enabled == enabled {
            return;
        }
        if enabled {
            self.enabled = true;
            self.register_with_physics_system(ctx);
        } else {
            self.unregister_with_physics_system(ctx);
            self.enabled = false;
        }
    }

    fn reregister(&mut self, ctx: &mut ColliderContext<'_>, change: impl FnOnce(&mut Self)) {
        self.unregister_with_physics_system(ctx);
        change(self);
        self.register_with_physics_system(ctx);
    }

    /// Attach to an entity; called by the entity that takes ownership
    pub(crate) fn attach(&mut self, entity: EntityId, entity_enabled: bool) {
        debug_assert!(self.entity.is_none(), "collider {:?} is already attached", self.id);
        self.entity = Some(entity);
        self.entity_enabled = entity_enabled;
    }

    /// Drop the entity back-reference; only valid while detached from a scene
    pub(crate) fn detach(&mut self) {
        debug_assert_eq!(self.state, RegistrationState::Detached);
        self.entity = None;
    }

    /// Snapshot handed to the physics system
    pub fn proxy(&self, entity_position: Vec2) -> Option<ColliderProxy> {
        self.handle().map(|handle| ColliderProxy {
            handle,
            bounds: self.bounds(entity_position),
            layer: self.physics_layer,
            mask: self.collides_with_layers,
            is_trigger: self.is_trigger,
        })
    }

    /// Called when the owning entity is added to a scene
    pub fn on_entity_added_to_scene(&mut self, ctx: &mut ColliderContext<'_>) {
        if self.is_active() {
            warn!("Collider {:?} notified of scene entry twice", self.id);
            return;
        }
        debug!("Collider {:?} ({}) entering scene", self.id, self.shape.kind());
        self.state = RegistrationState::Active;
        self.register_with_physics_system(ctx);
    }

    /// Called when the owning entity is removed from a scene
    pub fn on_entity_removed_from_scene(&mut self, ctx: &mut ColliderContext<'_>) {
        self.unregister_with_physics_system(ctx);
        if self.is_active() {
            debug!("Collider {:?} ({}) leaving scene", self.id, self.shape.kind());
        }
        self.state = RegistrationState::Detached;
    }

    /// Called when the owning entity is enabled
    pub fn on_entity_enabled(&mut self, ctx: &mut ColliderContext<'_>) {
        if self.entity_enabled {
            return;
        }
        self.entity_enabled = true;
        self.register_with_physics_system(ctx);
    }

    /// Called when the owning entity is disabled
    pub fn on_entity_disabled(&mut self, ctx: &mut ColliderContext<'_>) {
        if !self.entity_enabled {
            return;
        }
        self.unregister_with_physics_system(ctx);
        self.entity_enabled = false;
    }

    fn should_be_indexed(&self) -> bool {
        self.is_active() && self.enabled && self.entity_enabled
    }

    /// Add this collider to the physics index
    ///
    /// Does nothing unless the owning entity is in a scene. The owning entity
    /// calls this at various times (added to a scene, enabled, etc).
    pub fn register_with_physics_system(&self, ctx: &mut ColliderContext<'_>) {
        if !self.should_be_indexed() {
            return;
        }
        let Some(proxy) = self.proxy(ctx.entity_position) else {
            warn!("Active collider {:?} has no entity; skipping registration", self.id);
            return;
        };
        match ctx.physics.as_deref_mut() {
            Some(physics) => {
                trace!("Registering collider {:?} with bounds {:?}", self.id, proxy.bounds);
                physics.add_collider(proxy);
            }
            None => warn!("Active collider {:?} has no physics system to register with", self.id),
        }
    }

    /// Remove this collider from the physics index (full removal)
    ///
    /// Does nothing unless the owning entity is in a scene. The owning entity
    /// calls this at various times (removed from a scene, disabled, etc).
    pub fn unregister_with_physics_system(&self, ctx: &mut ColliderContext<'_>) {
        if !self.should_be_indexed() {
            return;
        }
        let Some(proxy) = self.proxy(ctx.entity_position) else {
            return;
        };
        match ctx.physics.as_deref_mut() {
            Some(physics) => {
                trace!("Unregistering collider {:?}", self.id);
                physics.remove_collider(proxy, true);
            }
            None => warn!("Active collider {:?} has no physics system to unregister from", self.id),
        }
    }

    /// Refresh the index after the owning entity moved
    pub fn sync_with_physics_system(&self, ctx: &mut ColliderContext<'_>) {
        if !self.should_be_indexed() {
            return;
        }
        let proxy = self.proxy(ctx.entity_position);
        if let (Some(proxy), Some(physics)) = (proxy, ctx.physics.as_deref_mut()) {
            physics.update_collider(proxy);
        }
    }

    /// World-space view of this collider for the given entity position
    pub fn placed_at(&self, entity_position: Vec2) -> PlacedCollider<'_> {
        PlacedCollider {
            collider: self,
            bounds: self.bounds(entity_position),
        }
    }

    /// Test against `other` as if the owning entity stood at `hypothetical`
    ///
    /// The entity is never moved: the hypothetical bounds are computed from
    /// the given position, so the stored entity position is untouched on
    /// every outcome, including errors.
    pub fn collides_with_at_position(
        &self,
        other: &PlacedCollider<'_>,
        hypothetical: Vec2,
    ) -> Result<bool, CollisionError> {
        self.placed_at(hypothetical).collides_with(other)
    }

    /// Draw the collider's bounds (and optionally its shape) for debugging
    pub fn debug_render(
        &self,
        entity_position: Vec2,
        graphics: &mut dyn DebugGraphics,
        style: &DebugConfig,
    ) {
        let bounds = self.bounds(entity_position);
        graphics.draw_hollow_rect(bounds, style.collider_color);

        if style.draw_shapes {
            for primitive in self.shape.world_primitives(bounds) {
                match primitive {
                    WorldPrimitive::Rect(rect) => {
                        graphics.draw_hollow_rect(rect, style.shape_color);
                    }
                    WorldPrimitive::Circle(circle) => {
                        graphics.draw_circle(circle.center, circle.radius, style.shape_color);
                    }
                }
            }
        }
    }
}

/// A collider paired with its world-space bounds
#[derive(Debug, Clone, Copy)]
pub struct PlacedCollider<'a> {
    collider: &'a Collider,
    bounds: Rect,
}

impl<'a> PlacedCollider<'a> {
    /// The underlying collider
    pub fn collider(&self) -> &'a Collider {
        self.collider
    }

    /// World-space bounds
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Test against another placed collider
    ///
    /// Dispatches on `other`'s shape. Fails with
    /// [`CollisionError::UnsupportedShape`] if either shape is custom.
    pub fn collides_with(&self, other: &PlacedCollider<'_>) -> Result<bool, CollisionError> {
        self.collider.shape.collides_with(self.bounds, &other.collider.shape, other.bounds)
    }

    /// Test against the segment `from -> to`
    pub fn collides_with_segment(&self, from: Vec2, to: Vec2) -> bool {
        self.collider.shape.collides_with_segment(self.bounds, from, to)
    }
}
