//! Pendulum stepper: d²θ/dt² = -(g/L)·sin θ, semi-implicit Euler.

use tracing::trace;

use crate::ecs::components::motion::Motion;
use crate::ecs::components::pendulum::{Pendulum, PendulumRod};

use super::PhysicsConfig;

/// Advance one pendulum by `dt` and write the bob's position and velocity.
///
/// The bob's x velocity modifier scales time for the whole swing.
pub fn swing(motion: &mut Motion, pendulum: &mut Pendulum, gravity: f32, dt: f32) {
    let t = dt * motion.velocity_modifier.x;
    let accel = -(gravity / pendulum.length) * pendulum.angle.sin();

    pendulum.angular_velocity += accel * t;
    pendulum.angular_velocity *= (1.0 - pendulum.damping * t).max(0.0);
    pendulum.angle += pendulum.angular_velocity * t;

    motion.position = pendulum.bob_position();
    // Colliders read the physical velocity; the modifier is applied there.
    motion.velocity = pendulum.bob_velocity();
}

/// Step every pendulum bob.
pub fn swing_pendulums(world: &mut hecs::World, config: &PhysicsConfig, dt: f32) {
    let mut count = 0usize;
    for (_, (motion, pendulum)) in world.query_mut::<(&mut Motion, &mut Pendulum)>() {
        swing(motion, pendulum, config.gravity, dt);
        count += 1;
    }
    if count > 0 {
        trace!("Swung {} pendulums", count);
    }
}

/// Stretch each rod from its pendulum's pivot to the bob.
///
/// Rods are boxes whose `scale.y` is the rod length; angle 0 hangs straight
/// down. Rods whose bob is gone are left where they are.
pub fn update_rods(world: &mut hecs::World) {
    let mut placements = Vec::new();
    for (entity, rod) in world.query::<&PendulumRod>().iter() {
        let (Ok(pendulum), Ok(bob)) = (world.get::<&Pendulum>(rod.bob), world.get::<&Motion>(rod.bob)) else {
            continue;
        };
        let arm = bob.position - pendulum.pivot;
        placements.push((entity, pendulum.pivot + arm * 0.5, arm.length(), arm.y.atan2(arm.x).to_degrees() - 90.0));
    }

    for (entity, center, length, angle) in placements {
        if let Ok(mut motion) = world.get::<&mut Motion>(entity) {
            motion.position = center;
            motion.scale.y = length;
            motion.angle = angle;
        }
    }
}
