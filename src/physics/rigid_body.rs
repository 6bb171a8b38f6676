//! Rigid body integration functions.

use glam::Vec2;

use crate::ecs::components::mesh::CompositeMesh;
use crate::ecs::components::motion::Motion;
use crate::ecs::components::path::MovementPath;
use crate::ecs::components::pendulum::Pendulum;
use crate::ecs::components::physics::{Blocked, Climbing, PhysicsObject, Walking};

use super::shape::sub_center;
use super::PhysicsConfig;

/// Rate at which climbing velocity eases toward the climb speed, per second.
const CLIMB_EASE_RATE: f32 = 1.5;

/// Move `current` toward `target` by at most `|step|`, never overshooting.
#[inline]
pub fn approach(current: f32, step: f32, target: f32) -> f32 {
    let step = step.abs();
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

/// Per-axis [`approach`].
#[inline]
pub fn approach_vec(current: Vec2, step: f32, target: Vec2) -> Vec2 {
    Vec2::new(
        approach(current.x, step, target.x),
        approach(current.y, step, target.y),
    )
}

/// Accelerate falling bodies toward terminal velocity.
///
/// Bodies already falling faster than the cap (e.g. launched) are slowed
/// back down to it at the same rate.
pub fn apply_gravity(world: &mut hecs::World, config: &PhysicsConfig, dt: f32) {
    for (_, (motion, object, climbing)) in
        world.query_mut::<(&mut Motion, &PhysicsObject, Option<&Climbing>)>()
    {
        if !object.apply_gravity || climbing.is_some() {
            continue;
        }
        motion.velocity.y = approach(motion.velocity.y, config.gravity * dt, config.max_fall_speed);
    }
}

/// Walking and climbing locomotion.
///
/// Walking accelerates along `1 - (v / max)^2` so it eases into top speed.
/// It reads the previous step's `Blocked`, refusing to push into a wall.
pub fn apply_locomotion(world: &mut hecs::World, config: &PhysicsConfig, dt: f32) {
    for (_, (motion, walking, climbing, blocked)) in world.query_mut::<(
        &mut Motion,
        Option<&Walking>,
        Option<&Climbing>,
        Option<&Blocked>,
    )>() {
        match walking {
            Some(walking) => {
                let (dir, side_blocked) = if walking.left {
                    (-1.0, blocked.is_some_and(|b| b.left))
                } else {
                    (1.0, blocked.is_some_and(|b| b.right))
                };
                if side_blocked {
                    motion.self_velocity.x = 0.0;
                } else {
                    let normalized = motion.self_velocity.x.abs() / config.max_walk_speed;
                    let ease = (1.0 - normalized * normalized).max(0.0);
                    motion.self_velocity.x += dir * config.walk_acceleration * ease * dt;
                    motion.self_velocity.x = motion
                        .self_velocity
                        .x
                        .clamp(-config.max_walk_speed, config.max_walk_speed);
                }
            }
            None => {
                motion.self_velocity.x =
                    approach(motion.self_velocity.x, config.walk_deceleration * dt, 0.0);
            }
        }

        if let Some(climbing) = climbing {
            let target = if climbing.up {
                -config.climb_speed
            } else {
                config.climb_speed
            };
            let t = (dt * CLIMB_EASE_RATE).min(1.0);
            motion.velocity.y += (target - motion.velocity.y) * t;
            motion.velocity.y = motion
                .velocity
                .y
                .clamp(-config.climb_speed, config.climb_speed);
        }
    }
}

/// Integrate angular velocity into `Motion::angle` and apply angular damping.
pub fn integrate_rotation(world: &mut hecs::World, dt: f32) {
    for (_, (motion, object)) in world.query_mut::<(&mut Motion, &mut PhysicsObject)>() {
        if !object.apply_rotation {
            continue;
        }
        motion.angle += object.angular_velocity.to_degrees() * dt;
        object.angular_velocity *= (1.0 - object.angular_damping * dt).max(0.0);
    }
}

/// Integrate positions: p += v * dt. Path-driven entities and pendulum bobs
/// are moved by their own steppers instead.
pub fn integrate_positions(world: &mut hecs::World, dt: f32) {
    for (_, (motion, path, pendulum)) in
        world.query_mut::<(&mut Motion, Option<&MovementPath>, Option<&Pendulum>)>()
    {
        if path.is_some() || pendulum.is_some() {
            continue;
        }
        motion.position += motion.total_velocity() * dt;
    }
}

/// Moment of inertia of a rectangle of the given full extents about its
/// centre.
#[inline]
pub fn rectangle_inertia(mass: f32, extents: Vec2) -> f32 {
    mass / 12.0 * (extents.x * extents.x + extents.y * extents.y)
}

/// Moment of inertia of a body about its origin.
///
/// Composite bodies split the mass evenly across sub-shapes and add the
/// parallel-axis term for each sub-shape's offset.
pub fn moment_of_inertia(mass: f32, motion: &Motion, composite: Option<&CompositeMesh>) -> f32 {
    match composite {
        Some(composite) if !composite.parts.is_empty() => {
            let part_mass = mass / composite.parts.len() as f32;
            composite
                .parts
                .iter()
                .map(|part| {
                    let extents = (motion.scale * part.scale_ratio).abs();
                    let d = sub_center(motion, part) - motion.position;
                    rectangle_inertia(part_mass, extents) + part_mass * d.length_squared()
                })
                .sum()
        }
        _ => rectangle_inertia(mass, motion.scale.abs()),
    }
}

/// Fill in any moment of inertia still at its 0.0 sentinel.
pub fn update_inertia(world: &mut hecs::World) {
    for (_, (motion, object, composite)) in
        world.query_mut::<(&Motion, &mut PhysicsObject, Option<&CompositeMesh>)>()
    {
        if object.moment_of_inertia == 0.0 {
            object.moment_of_inertia = moment_of_inertia(object.mass, motion, composite);
        }
    }
}
