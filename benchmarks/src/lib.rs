//! Scene builders shared by the benchmarks.

use gearbox::physics::collider::{box_corners, edge_normals, rotation};
use gearbox::{Motion, MovementPath, PhysicsConfig, PhysicsObject, PhysicsWorld, Platform};
use glam::Vec2;

/// Crates stacked in columns above a wide floor, `n` in total.
pub fn setup_crate_world(n: usize) -> hecs::World {
    let mut world = hecs::World::new();
    let columns = (n as f32).sqrt().ceil().max(1.0) as usize;
    let width = columns as f32 * 48.0;

    world.spawn((
        Motion::new(Vec2::new(width * 0.5, 20.0), Vec2::new(width + 200.0, 40.0)),
        Platform::default(),
    ));
    for i in 0..n {
        let x = (i % columns) as f32 * 48.0 + 24.0;
        let y = -((i / columns) as f32 * 44.0) - 20.0;
        world.spawn((
            Motion::new(Vec2::new(x, y), Vec2::splat(40.0)),
            PhysicsObject::new(1.0),
        ));
    }
    world
}

/// Crates spread far apart so the broadphase finds no pairs.
pub fn setup_sparse_world(n: usize) -> hecs::World {
    let mut world = hecs::World::new();
    for i in 0..n {
        world.spawn((
            Motion::new(Vec2::new(i as f32 * 500.0, 0.0), Vec2::splat(40.0)),
            PhysicsObject::default(),
        ));
    }
    world
}

/// Crate scene plus a handful of moving platforms with riders.
pub fn setup_scene(n: usize) -> (hecs::World, PhysicsWorld) {
    let mut world = setup_crate_world(n);
    for i in 0..8 {
        let y = -600.0 - i as f32 * 120.0;
        let Ok(path) = MovementPath::looped(&[Vec2::new(0.0, y), Vec2::new(400.0, y)], 80.0) else {
            continue;
        };
        world.spawn((Motion::new(Vec2::new(0.0, y), Vec2::new(160.0, 16.0)), path));
        world.spawn((
            Motion::new(Vec2::new(0.0, y - 28.0), Vec2::splat(40.0)),
            PhysicsObject::default(),
        ));
    }
    let physics = PhysicsWorld::new(PhysicsConfig::default()).expect("default config is valid");
    (world, physics)
}

/// World-space box polygon with outward normals.
pub fn box_polygon(center: Vec2, half: Vec2, degrees: f32) -> (Vec<Vec2>, Vec<Vec2>) {
    let rot = rotation(degrees);
    let vertices: Vec<Vec2> = box_corners(half).iter().map(|c| center + rot * *c).collect();
    let normals = edge_normals(&vertices);
    (vertices, normals)
}
