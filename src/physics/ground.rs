//! Ground/Block state tracking.
//!
//! `Blocked` is reset right before resolution and re-set by it; after
//! every pair is resolved, [`update_ground_state`] turns the set of
//! grounded bodies into `Falling`/`OnGround` tags and carries riders along
//! with their platforms.

use glam::Vec2;
use tracing::debug;

use crate::ecs::components::motion::Motion;
use crate::ecs::components::path::MovementPath;
use crate::ecs::components::pendulum::Pendulum;
use crate::ecs::components::physics::{Blocked, Falling, OnGround, PhysicsObject};

use super::rigid_body::approach_vec;
use super::PhysicsConfig;

/// Clear every `Blocked`, giving dynamic bodies one if they lack it.
pub fn reset_blocked(world: &mut hecs::World) {
    let missing: Vec<hecs::Entity> = world
        .query::<(&PhysicsObject, Option<&Blocked>)>()
        .iter()
        .filter(|(_, (_, blocked))| blocked.is_none())
        .map(|(entity, _)| entity)
        .collect();
    for entity in missing {
        if let Err(err) = world.insert_one(entity, Blocked::default()) {
            debug!("Cannot add Blocked to {:?}: {}", entity, err);
        }
    }

    for (_, blocked) in world.query_mut::<&mut Blocked>() {
        blocked.clear();
    }
}

/// Record that `body` rests on `ground` and is no longer falling. Returns
/// false if `body` no longer exists.
pub fn mark_grounded(world: &mut hecs::World, body: hecs::Entity, ground: hecs::Entity) -> bool {
    if let Err(err) = world.insert_one(body, OnGround(ground)) {
        debug!("Cannot ground {:?} on {:?}: {}", body, ground, err);
        return false;
    }
    // Only fails when the body was not falling.
    let _ = world.remove_one::<Falling>(body);
    true
}

/// Drag from moving through air, opposing the physical velocity.
///
/// Never reverses the direction of travel.
pub fn apply_air_resistance(motion: &mut Motion, object: &PhysicsObject, config: &PhysicsConfig, dt: f32) {
    let v = motion.velocity;
    let speed = v.length();
    if speed <= f32::EPSILON || object.mass <= f32::EPSILON {
        return;
    }
    let dir = v / speed;
    let area = dir.x.abs() * motion.scale.y.abs() + dir.y.abs() * motion.scale.x.abs();
    let force = 0.5 * config.air_density * speed * speed * object.drag * area;
    let slowdown = (force / object.mass * dt).min(speed);
    motion.velocity -= dir * slowdown;
}

enum GroundState {
    Airborne,
    /// Resting on something that isn't a path platform or pendulum bob.
    Resting,
    /// Riding a moving platform with this physical velocity.
    Riding(Vec2),
}

/// Post-resolution bookkeeping for every dynamic body.
///
/// `grounded` lists the bodies the resolver found resting on something this
/// step.
pub fn update_ground_state(world: &mut hecs::World, config: &PhysicsConfig, grounded: &[hecs::Entity], dt: f32) {
    let mut states = Vec::new();
    for (entity, (_, on_ground)) in world.query::<(&PhysicsObject, Option<&OnGround>)>().iter() {
        let state = if !grounded.contains(&entity) {
            GroundState::Airborne
        } else {
            let carried = on_ground
                .filter(|g| world.get::<&MovementPath>(g.0).is_ok() || world.get::<&Pendulum>(g.0).is_ok())
                .and_then(|g| world.get::<&Motion>(g.0).ok())
                .map(|m| m.physical_velocity());
            match carried {
                Some(v) => GroundState::Riding(v),
                None => GroundState::Resting,
            }
        };
        states.push((entity, state));
    }

    let mut airborne = Vec::new();
    for (entity, state) in states {
        let Ok((motion, object, blocked)) =
            world.query_one_mut::<(&mut Motion, &PhysicsObject, Option<&mut Blocked>)>(entity)
        else {
            continue;
        };
        match state {
            GroundState::Airborne => {
                if let Some(blocked) = blocked {
                    blocked.clear();
                }
                if object.apply_air_resistance {
                    apply_air_resistance(motion, object, config, dt);
                }
                motion.applied_velocity =
                    approach_vec(motion.applied_velocity, config.applied_velocity_decay * dt, Vec2::ZERO);
                airborne.push(entity);
            }
            GroundState::Resting => {
                motion.applied_velocity =
                    approach_vec(motion.applied_velocity, config.applied_velocity_decay * dt, Vec2::ZERO);
            }
            GroundState::Riding(platform_velocity) => {
                motion.applied_velocity =
                    approach_vec(motion.applied_velocity, config.platform_carry_rate * dt, platform_velocity);
            }
        }
    }

    for entity in airborne {
        // Only fails when the body was already off the ground.
        let _ = world.remove_one::<OnGround>(entity);
        if world.get::<&Falling>(entity).is_err() {
            if let Err(err) = world.insert_one(entity, Falling) {
                debug!("Cannot mark {:?} falling: {}", entity, err);
            }
        }
    }
}
