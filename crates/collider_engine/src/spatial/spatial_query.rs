//! Abstract spatial query interface for broad-phase collision detection
//!
//! Spatial partitioning lets the physics system cull pairs of colliders that
//! cannot possibly be touching. This abstraction allows swapping different
//! partitioning schemes (uniform grid, quadtree, BVH) without changing the
//! physics system.

use crate::foundation::math::{Rect, Vec2};

slotmap::new_key_type! {
    /// Handle of a collider proxy stored by the physics system
    pub struct ProxyKey;
}

/// Abstract interface for spatial partitioning used in broad-phase detection
///
/// Implementations index keys by their axis-aligned bounds. Callers are
/// responsible for passing the same bounds to `remove` that were passed to
/// `insert`.
pub trait SpatialQuery: Send + Sync {
    /// Insert a key covering `bounds`
    fn insert(&mut self, key: ProxyKey, bounds: Rect);

    /// Remove a key that was inserted with `bounds`
    fn remove(&mut self, key: ProxyKey, bounds: Rect);

    /// Move a key from `old_bounds` to `new_bounds`
    fn update(&mut self, key: ProxyKey, old_bounds: Rect, new_bounds: Rect) {
        self.remove(key, old_bounds);
        self.insert(key, new_bounds);
    }

    /// Keys whose indexed region may overlap `rect`
    ///
    /// The result has no duplicates but may contain false positives; callers
    /// must perform an exact bounds test.
    fn query_rect(&self, rect: &Rect) -> Vec<ProxyKey>;

    /// Keys whose indexed region may be crossed by the segment `from -> to`
    ///
    /// Same contract as [`query_rect`](Self::query_rect). The default queries
    /// the segment's bounding box; implementations can do better by visiting
    /// only the space the segment passes through.
    fn query_segment(&self, from: Vec2, to: Vec2) -> Vec<ProxyKey> {
        self.query_rect(&Rect::from_segment(from, to))
    }

    /// Remove every key
    fn clear(&mut self);

    /// Number of distinct keys currently indexed
    fn entity_count(&self) -> usize;
}
