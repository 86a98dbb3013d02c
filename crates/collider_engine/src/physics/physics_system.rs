//! Scene-wide physics index
//!
//! The physics system does not own colliders. It keeps a [`ColliderProxy`]
//! snapshot per registered collider in a broadphase structure and answers
//! spatial queries with those snapshots. Exact shape tests happen in the
//! scene, which owns the colliders.
//!
//! Split into the usual two phases:
//! - broad phase: spatial query plus layer filtering produce candidate pairs
//! - narrow phase: shape-vs-shape tests done by the caller, who reports the
//!   hits back through [`PhysicsSystem::record_collision`]

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use slotmap::SlotMap;

use super::collider::{ColliderHandle, ColliderId, ColliderProxy, ColliderRegistry};
use super::collision_layers::PhysicsLayers;
use crate::config::PhysicsConfig;
use crate::foundation::math::{Rect, Vec2};
use crate::spatial::{ProxyKey, SpatialHash, SpatialQuery};

/// Two colliders that are touching
///
/// Always stores the collider with the smaller id first, so a pair compares
/// equal regardless of the order it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Collider with the smaller id
    pub a: ColliderHandle,
    /// Collider with the larger id
    pub b: ColliderHandle,
    /// Either collider is a trigger
    pub is_trigger: bool,
}

impl CollisionPair {
    /// Create a new collision pair
    pub fn new(a: ColliderHandle, b: ColliderHandle, is_trigger: bool) -> Self {
        if a.collider <= b.collider {
            Self { a, b, is_trigger }
        } else {
            Self {
                a: b,
                b: a,
                is_trigger,
            }
        }
    }

    /// Check if `collider` is one of the two
    pub fn involves(&self, collider: ColliderId) -> bool {
        self.a.collider == collider || self.b.collider == collider
    }
}

#[derive(Debug, Clone, Copy)]
struct ProxyRecord {
    proxy: ColliderProxy,
    active: bool,
}

/// Broadphase index of all colliders in a scene
pub struct PhysicsSystem {
    /// Spatial partitioning structure for the broad phase
    spatial_query: Box<dyn SpatialQuery>,

    /// Snapshot of each known collider
    proxies: SlotMap<ProxyKey, ProxyRecord>,

    /// Lookup from collider id to its proxy slot
    by_collider: HashMap<ColliderId, ProxyKey>,

    /// Collision pairs from the current frame
    current_pairs: HashSet<CollisionPair>,

    /// Collision pairs from the previous frame
    previous_pairs: HashSet<CollisionPair>,
}

impl PhysicsSystem {
    /// Create a physics system with the given spatial query implementation
    pub fn new(spatial_query: Box<dyn SpatialQuery>) -> Self {
        Self {
            spatial_query,
            proxies: SlotMap::with_key(),
            by_collider: HashMap::new(),
            current_pairs: HashSet::new(),
            previous_pairs: HashSet::new(),
        }
    }

    /// Create a physics system backed by a spatial hash
    pub fn from_config(config: &PhysicsConfig) -> Self {
        debug!("Creating physics system with cell size {}", config.cell_size);
        Self::new(Box::new(SpatialHash::new(config.cell_size)))
    }

    /// Check if a collider is registered and active
    pub fn is_registered(&self, collider: ColliderId) -> bool {
        self.record(collider).is_some_and(|record| record.active)
    }

    /// The indexed snapshot of a collider, if registered and active
    pub fn proxy(&self, collider: ColliderId) -> Option<&ColliderProxy> {
        self.record(collider)
            .filter(|record| record.active)
            .map(|record| &record.proxy)
    }

    /// Number of active colliders
    pub fn collider_count(&self) -> usize {
        self.proxies.values().filter(|record| record.active).count()
    }

    fn record(&self, collider: ColliderId) -> Option<&ProxyRecord> {
        self.by_collider.get(&collider).and_then(|key| self.proxies.get(*key))
    }

    /// Active colliders whose bounds overlap `rect` and whose layer is in `mask`
    ///
    /// Sorted by collider id.
    pub fn boxcast(&self, rect: &Rect, mask: PhysicsLayers) -> Vec<ColliderProxy> {
        let mut hits: Vec<ColliderProxy> = self
            .spatial_query
            .query_rect(rect)
            .into_iter()
            .filter_map(|key| self.proxies.get(key))
            .filter(|record| record.active)
            .filter(|record| record.proxy.layer.matches_mask(mask))
            .filter(|record| record.proxy.bounds.intersects(rect))
            .map(|record| record.proxy)
            .collect();
        hits.sort_by_key(|proxy| proxy.handle.collider);
        hits
    }

    /// Active colliders in `mask` whose bounds are crossed by `from -> to`
    ///
    /// Only the space along the segment is searched, so the cost does not
    /// grow with the area of the segment's bounding box. Sorted by collider id.
    pub fn linecast(&self, from: Vec2, to: Vec2, mask: PhysicsLayers) -> Vec<ColliderProxy> {
        let mut hits: Vec<ColliderProxy> = self
            .spatial_query
            .query_segment(from, to)
            .into_iter()
            .filter_map(|key| self.proxies.get(key))
            .filter(|record| record.active)
            .filter(|record| record.proxy.layer.matches_mask(mask))
            .filter(|record| record.proxy.bounds.segment_entry(from, to).is_some())
            .map(|record| record.proxy)
            .collect();
        hits.sort_by_key(|proxy| proxy.handle.collider);
        hits
    }

    /// Broad phase: candidate pairs whose bounds overlap and whose layers agree
    ///
    /// Each pair is reported once, smaller collider id first, sorted.
    pub fn broad_phase_pairs(&self) -> Vec<(ColliderProxy, ColliderProxy)> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();

        for (key, record) in self.proxies.iter().filter(|(_, record)| record.active) {
            let a = record.proxy;
            for nearby in self.spatial_query.query_rect(&a.bounds) {
                if nearby == key {
                    continue;
                }
                let Some(other) = self.proxies.get(nearby).filter(|other| other.active) else {
                    continue;
                };
                let b = other.proxy;
                if a.handle.collider > b.handle.collider {
                    continue;
                }
                if !PhysicsLayers::should_collide(a.layer, a.mask, b.layer, b.mask) {
                    continue;
                }
                if !a.bounds.intersects(&b.bounds) {
                    continue;
                }
                if seen.insert((a.handle.collider, b.handle.collider)) {
                    pairs.push((a, b));
                }
            }
        }

        pairs.sort_by_key(|(a, b)| (a.handle.collider, b.handle.collider));
        pairs
    }

    /// Start a new frame of contact tracking
    ///
    /// The current pairs become the previous pairs.
    pub fn begin_frame(&mut self) {
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();
    }

    /// Narrow phase result: `pair` is touching this frame
    pub fn record_collision(&mut self, pair: CollisionPair) {
        self.current_pairs.insert(pair);
    }

    /// Pairs that started touching this frame
    pub fn get_collision_entered(&self) -> Vec<CollisionPair> {
        self.current_pairs
            .difference(&self.previous_pairs)
            .copied()
            .collect()
    }

    /// Pairs that stopped touching this frame
    pub fn get_collision_exited(&self) -> Vec<CollisionPair> {
        self.previous_pairs
            .difference(&self.current_pairs)
            .copied()
            .collect()
    }

    /// All pairs touching this frame
    pub fn get_current_collisions(&self) -> &HashSet<CollisionPair> {
        &self.current_pairs
    }

    /// Get spatial query for direct access (e.g., for visualization)
    pub fn spatial_query(&self) -> &dyn SpatialQuery {
        self.spatial_query.as_ref()
    }

    /// Clear all physics data
    pub fn clear(&mut self) {
        self.spatial_query.clear();
        self.proxies.clear();
        self.by_collider.clear();
        self.current_pairs.clear();
        self.previous_pairs.clear();
    }
}

impl ColliderRegistry for PhysicsSystem {
    fn add_collider(&mut self, proxy: ColliderProxy) {
        let id = proxy.handle.collider;
        if let Some(&key) = self.by_collider.get(&id) {
            if let Some(record) = self.proxies.get_mut(key) {
                self.spatial_query.update(key, record.proxy.bounds, proxy.bounds);
                *record = ProxyRecord {
                    proxy,
                    active: true,
                };
                trace!("Re-indexed collider {:?} at {:?}", id, proxy.bounds);
                return;
            }
        }

        let key = self.proxies.insert(ProxyRecord {
            proxy,
            active: true,
        });
        self.spatial_query.insert(key, proxy.bounds);
        self.by_collider.insert(id, key);
        trace!("Indexed collider {:?} at {:?}", id, proxy.bounds);
    }

    fn remove_collider(&mut self, proxy: ColliderProxy, full: bool) {
        let id = proxy.handle.collider;
        let Some(&key) = self.by_collider.get(&id) else {
            trace!("Ignoring removal of unknown collider {:?}", id);
            return;
        };

        if full {
            if let Some(record) = self.proxies.remove(key) {
                self.spatial_query.remove(key, record.proxy.bounds);
            }
            self.by_collider.remove(&id);
            trace!("Removed collider {:?}", id);
        } else if let Some(record) = self.proxies.get_mut(key) {
            record.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;
    use crate::physics::Collider;

    const ALL: PhysicsLayers = PhysicsLayers::EVERYTHING;

    fn create_test_system() -> PhysicsSystem {
        PhysicsSystem::from_config(&PhysicsConfig { cell_size: 10.0 })
    }

    fn proxy_at(bounds: Rect, layer: PhysicsLayers, mask: PhysicsLayers) -> ColliderProxy {
        let entity = Entity::new("test");
        let mut collider = Collider::rect(bounds.width, bounds.height).with_layers(layer, mask);
        collider.attach(entity.id(), true);
        collider.proxy(bounds.min()).expect("attached collider has a proxy")
    }

    fn everything(bounds: Rect) -> ColliderProxy {
        proxy_at(bounds, PhysicsLayers::DEFAULT, ALL)
    }

    #[test]
    fn test_collision_pair_is_ordered() {
        let a = everything(Rect::new(0.0, 0.0, 1.0, 1.0)).handle;
        let b = everything(Rect::new(0.0, 0.0, 1.0, 1.0)).handle;

        assert_eq!(CollisionPair::new(a, b, false), CollisionPair::new(b, a, false));
        let pair = CollisionPair::new(b, a, false);
        assert!(pair.a.collider < pair.b.collider);
    }

    #[test]
    fn test_add_and_boxcast() {
        let mut system = create_test_system();
        let near = everything(Rect::new(0.0, 0.0, 5.0, 5.0));
        let far = everything(Rect::new(50.0, 50.0, 5.0, 5.0));
        system.add_collider(near);
        system.add_collider(far);

        let hits = system.boxcast(&Rect::new(2.0, 2.0, 1.0, 1.0), ALL);
        assert_eq!(hits, vec![near]);
        assert_eq!(system.collider_count(), 2);
    }

    #[test]
    fn test_boxcast_respects_mask() {
        let mut system = create_test_system();
        let area = Rect::new(0.0, 0.0, 5.0, 5.0);
        system.add_collider(proxy_at(area, PhysicsLayers::PLAYER, ALL));

        assert!(system.boxcast(&area, PhysicsLayers::ENEMY).is_empty());
        assert_eq!(system.boxcast(&area, PhysicsLayers::PLAYER).len(), 1);
    }

    #[test]
    fn test_full_remove_drops_everything() {
        let mut system = create_test_system();
        let area = Rect::new(0.0, 0.0, 25.0, 25.0);
        let proxy = everything(area);
        system.add_collider(proxy);
        system.remove_collider(proxy, true);

        assert!(!system.is_registered(proxy.handle.collider));
        assert_eq!(system.spatial_query().entity_count(), 0);
        assert!(system.boxcast(&area, ALL).is_empty());
    }

    #[test]
    fn test_soft_remove_then_add_reindexes() {
        let mut system = create_test_system();
        let area = Rect::new(0.0, 0.0, 5.0, 5.0);
        let proxy = everything(area);
        system.add_collider(proxy);

        system.remove_collider(proxy, false);
        assert!(!system.is_registered(proxy.handle.collider));
        assert!(system.boxcast(&area, ALL).is_empty());

        let moved = ColliderProxy {
            bounds: Rect::new(40.0, 40.0, 5.0, 5.0),
            ..proxy
        };
        system.add_collider(moved);
        assert_eq!(system.proxy(proxy.handle.collider), Some(&moved));
        assert!(system.boxcast(&area, ALL).is_empty());
        assert_eq!(system.boxcast(&Rect::new(41.0, 41.0, 1.0, 1.0), ALL), vec![moved]);
        assert_eq!(system.spatial_query().entity_count(), 1);
    }

    #[test]
    fn test_removing_unknown_collider_is_noop() {
        let mut system = create_test_system();
        let kept = everything(Rect::new(0.0, 0.0, 5.0, 5.0));
        let unknown = everything(Rect::new(0.0, 0.0, 5.0, 5.0));
        system.add_collider(kept);

        system.remove_collider(unknown, true);
        system.remove_collider(unknown, false);
        assert_eq!(system.collider_count(), 1);
        assert!(system.is_registered(kept.handle.collider));
    }

    #[test]
    fn test_broad_phase_layer_filtering() {
        let mut system = create_test_system();

        // Player only collides with enemies; the wall is environment
        let player = proxy_at(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            PhysicsLayers::PLAYER,
            PhysicsLayers::ENEMY,
        );
        let wall = proxy_at(Rect::new(5.0, 5.0, 10.0, 10.0), PhysicsLayers::ENVIRONMENT, ALL);
        let enemy = proxy_at(Rect::new(8.0, 0.0, 10.0, 10.0), PhysicsLayers::ENEMY, ALL);
        for proxy in [player, wall, enemy] {
            system.add_collider(proxy);
        }

        let pairs: Vec<_> = system
            .broad_phase_pairs()
            .into_iter()
            .map(|(a, b)| (a.handle.collider, b.handle.collider))
            .collect();

        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&(player.handle.collider, enemy.handle.collider)));
        assert!(pairs.contains(&(wall.handle.collider, enemy.handle.collider)));
    }

    #[test]
    fn test_linecast_only_reports_crossed_bounds() {
        let mut system = create_test_system();
        let on_line = everything(Rect::new(20.0, 18.0, 4.0, 4.0));
        // Inside the segment's bounding box, but off the diagonal
        let beside = everything(Rect::new(30.0, 2.0, 4.0, 4.0));
        let enemy = proxy_at(Rect::new(40.0, 40.0, 2.0, 2.0), PhysicsLayers::ENEMY, ALL);
        for proxy in [on_line, beside, enemy] {
            system.add_collider(proxy);
        }

        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(50.0, 50.0);
        assert_eq!(system.linecast(from, to, ALL), vec![on_line, enemy]);
        assert_eq!(system.linecast(from, to, PhysicsLayers::ENEMY), vec![enemy]);

        system.remove_collider(enemy, false);
        assert_eq!(system.linecast(from, to, ALL), vec![on_line]);
    }

    #[test]
    fn test_long_linecast_with_fine_cells() {
        let mut system = PhysicsSystem::from_config(&PhysicsConfig { cell_size: 1.0 });
        let target = everything(Rect::new(3000.0, 3000.0, 1.0, 1.0));
        let huge = everything(Rect::new(-1.0e6, 3500.0, 2.0e6, 1.0e6));
        system.add_collider(target);
        system.add_collider(huge);

        let hits = system.linecast(Vec2::new(0.0, 0.0), Vec2::new(4000.0, 4000.0), ALL);
        assert_eq!(hits.len(), 2);
        assert!(hits.contains(&target));
        assert!(hits.contains(&huge));

        let below = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(system.boxcast(&below, ALL).is_empty());
        assert_eq!(system.boxcast(&Rect::new(0.0, 3600.0, 1.0, 1.0), ALL), vec![huge]);
    }

    #[test]
    fn test_entered_and_exited() {
        let mut system = create_test_system();
        let a = everything(Rect::new(0.0, 0.0, 1.0, 1.0)).handle;
        let b = everything(Rect::new(0.0, 0.0, 1.0, 1.0)).handle;
        let pair = CollisionPair::new(a, b, false);

        system.begin_frame();
        system.record_collision(pair);
        assert_eq!(system.get_collision_entered(), vec![pair]);
        assert!(system.get_collision_exited().is_empty());

        system.begin_frame();
        system.record_collision(pair);
        assert!(system.get_collision_entered().is_empty());

        system.begin_frame();
        assert_eq!(system.get_collision_exited(), vec![pair]);
        assert!(system.get_current_collisions().is_empty());
        assert!(pair.involves(a.collider));
    }
}
