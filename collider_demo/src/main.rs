//! Collider demo application
//!
//! Builds a small scene with box, circle and compound colliders, flies a ship
//! through it and logs the contacts, a linecast and the debug draw output.
//!
//! Usage: `collider_demo [config.toml|config.ron]`

use collider_engine::foundation::logging;
use collider_engine::prelude::*;

const FRAMES: usize = 12;
const SHIP_SPEED: f32 = 6.0;

fn load_config() -> Result<SceneConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading scene configuration from {path}");
            SceneConfig::load_from_file(&path)
        }
        None => Ok(SceneConfig::default()),
    }
}

fn build_scene(scene: &mut Scene) -> Result<ColliderHandle, SceneError> {
    let ship = scene.add_entity(Entity::new("ship").with_position(Vec2::new(0.0, 20.0)));
    let hull = scene.add_collider(
        ship,
        Collider::circle(4.0).with_layers(PhysicsLayers::PLAYER, PhysicsLayers::EVERYTHING),
    )?;

    let wall = scene.add_entity(Entity::new("wall").with_position(Vec2::new(40.0, 20.0)));
    let bricks = scene.add_collider(
        wall,
        Collider::rect(8.0, 60.0)
            .with_layers(PhysicsLayers::ENVIRONMENT, PhysicsLayers::EVERYTHING),
    )?;

    let station = scene.add_entity(Entity::new("station").with_position(Vec2::new(70.0, 10.0)));
    scene.add_collider(
        station,
        Collider::new(ColliderShape::multi(vec![
            MultiPart::circle(Vec2::new(0.0, 0.0), 5.0),
            MultiPart::boxed(Vec2::new(10.0, 4.0), 20.0, 2.0),
            MultiPart::circle(Vec2::new(30.0, 0.0), 5.0),
        ])),
    )?;

    let pickup = scene.add_entity(Entity::new("pickup").with_position(Vec2::new(20.0, 20.0)));
    scene.add_collider(
        pickup,
        Collider::circle(2.0)
            .as_trigger()
            .with_layers(PhysicsLayers::PICKUP, PhysicsLayers::PLAYER),
    )?;

    // Hang the wall from its vertical midpoint
    scene.set_collider_origin_normalized(bricks, Vec2::new(0.0, 0.5))?;

    Ok(hull)
}

fn entity_name(scene: &Scene, id: EntityId) -> &str {
    scene.entity(id).map_or("?", Entity::name)
}

fn log_pairs(scene: &Scene, label: &str, pairs: &[CollisionPair]) {
    for pair in pairs {
        log::info!(
            "  {label}: {} <-> {}{}",
            entity_name(scene, pair.a.entity),
            entity_name(scene, pair.b.entity),
            if pair.is_trigger { " (trigger)" } else { "" },
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = load_config()?;
    let mut scene = Scene::new(config)?;
    let hull = build_scene(&mut scene)?;
    log::info!(
        "Scene ready: {} entities, {} colliders indexed",
        scene.entity_count(),
        scene.physics().collider_count()
    );

    for frame in 0..FRAMES {
        scene.translate_entity(hull.entity, Vec2::new(SHIP_SPEED, 0.0))?;
        let contacts = scene.detect_collisions()?.len();

        let entered = scene.collisions_entered();
        let exited = scene.collisions_exited();
        if !entered.is_empty() || !exited.is_empty() {
            log::info!("Frame {frame}: {contacts} contact(s)");
            log_pairs(&scene, "entered", &entered);
            log_pairs(&scene, "exited", &exited);
        }
    }

    // Would the ship fit back at the start?
    let start = Vec2::new(0.0, 20.0);
    let around_start = Rect::new(-10.0, 10.0, 20.0, 20.0);
    for other in scene.boxcast_broadphase(&around_start, PhysicsLayers::EVERYTHING) {
        if other.entity != hull.entity {
            let blocked = scene.collides_with_at_position(hull, other, start)?;
            let name = entity_name(&scene, other.entity);
            log::info!("At {start:?} the ship would hit {name}: {blocked}");
        }
    }

    let (from, to) = (Vec2::new(0.0, 12.0), Vec2::new(120.0, 12.0));
    let hits = scene.linecast(from, to, PhysicsLayers::EVERYTHING);
    for hit in &hits {
        log::info!(
            "Linecast hit {} at {:.2} ({:.1}, {:.1})",
            entity_name(&scene, hit.handle.entity),
            hit.fraction,
            hit.point.x,
            hit.point.y
        );
    }

    let mut debug_draw = DebugDrawSystem::new();
    scene.debug_render(&mut debug_draw);
    log::info!("Debug draw recorded {} shape(s)", debug_draw.shape_count());
    debug_draw.update(1.0 / 60.0);

    Ok(())
}
