//! Entity implementation

use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::math::Vec2;
use crate::physics::{Collider, ColliderContext, ColliderId, ColliderRegistry};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A positioned object owning a list of colliders
///
/// Entities built outside a scene can be positioned and given colliders
/// directly. Once added to a [`Scene`](super::Scene), all changes go
/// through the scene so the physics index stays in sync.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
    position: Vec2,
    enabled: bool,
    colliders: Vec<Collider>,
}

impl Entity {
    /// Create an entity at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
            position: Vec2::zeros(),
            enabled: true,
            colliders: Vec::new(),
        }
    }

    /// Set the position (builder style)
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Attach a collider (builder style)
    #[must_use]
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.add_collider(collider);
        self
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Entity name, for logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// World position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the entity is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Attached colliders
    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    /// Look up an attached collider
    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.iter().find(|collider| collider.id() == id)
    }

    pub(crate) fn collider_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.colliders.iter_mut().find(|collider| collider.id() == id)
    }

    /// Take ownership of a collider and point it back at this entity
    pub fn add_collider(&mut self, mut collider: Collider) -> ColliderId {
        collider.attach(self.id, self.enabled);
        let id = collider.id();
        self.colliders.push(collider);
        id
    }

    /// Detach a collider, giving it back to the caller
    ///
    /// The collider must not be registered with a scene; the scene unregisters
    /// it before calling this.
    pub fn remove_collider(&mut self, id: ColliderId) -> Option<Collider> {
        let index = self.colliders.iter().position(|collider| collider.id() == id)?;
        let mut collider = self.colliders.remove(index);
        collider.detach();
        Some(collider)
    }

    /// Move the entity (outside a scene)
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Enable or disable the entity (outside a scene)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.apply_enabled(enabled, None);
    }

    pub(crate) fn apply_enabled(
        &mut self,
        enabled: bool,
        physics: Option<&mut dyn ColliderRegistry>,
    ) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;

        let mut ctx = ColliderContext::new(self.position, physics);
        for collider in &mut self.colliders {
            if enabled {
                collider.on_entity_enabled(&mut ctx);
            } else {
                collider.on_entity_disabled(&mut ctx);
            }
        }
    }

    pub(crate) fn on_added_to_scene(&mut self, physics: &mut dyn ColliderRegistry) {
        let mut ctx = ColliderContext::in_scene(self.position, physics);
        for collider in &mut self.colliders {
            collider.on_entity_added_to_scene(&mut ctx);
        }
    }

    pub(crate) fn on_removed_from_scene(&mut self, physics: &mut dyn ColliderRegistry) {
        let mut ctx = ColliderContext::in_scene(self.position, physics);
        for collider in &mut self.colliders {
            collider.on_entity_removed_from_scene(&mut ctx);
        }
    }

    pub(crate) fn sync_colliders(&self, physics: &mut dyn ColliderRegistry) {
        let mut ctx = ColliderContext::in_scene(self.position, physics);
        for collider in &self.colliders {
            collider.sync_with_physics_system(&mut ctx);
        }
    }
}
