//! Collision layer system for filtering collision detection
//!
//! Most games need to filter which pairs of colliders are even considered.
//! Every collider sits on one or more layers (`physics_layer`) and declares
//! the layers it wants to collide with (`collides_with_layers`).

bitflags::bitflags! {
    /// Physics layer bitmask
    ///
    /// The named layers cover common game objects; bits 8-31 are free for
    /// game-defined layers (see [`PhysicsLayers::custom`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PhysicsLayers: u32 {
        /// Layer new colliders are placed on
        const DEFAULT = 1 << 0;
        /// Player character layer
        const PLAYER = 1 << 1;
        /// Enemy character layer
        const ENEMY = 1 << 2;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 3;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 4;
        /// Trigger volumes
        const TRIGGER = 1 << 5;
        /// Pickups and collectibles
        const PICKUP = 1 << 6;

        // User-defined bits are retained as-is
        const _ = !0;
    }
}

impl PhysicsLayers {
    /// Every bit set, including user-defined layers
    pub const EVERYTHING: Self = Self::from_bits_retain(u32::MAX);

    /// Single game-defined layer at `bit` (0-31)
    ///
    /// Bits past 31 wrap around, so callers should stay within range.
    pub const fn custom(bit: u32) -> Self {
        Self::from_bits_retain(1 << (bit % 32))
    }

    /// Check if two colliders should collide based on their layers and masks
    ///
    /// A's layer must be in B's mask AND B's layer must be in A's mask.
    pub fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }

    /// Check if a collider on `self` passes a query `mask`
    pub fn matches_mask(self, mask: Self) -> bool {
        self.intersects(mask)
    }
}

impl Default for PhysicsLayers {
    fn default() -> Self {
        Self::DEFAULT
    }
}
