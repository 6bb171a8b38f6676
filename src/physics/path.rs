//! Movement-path stepper for kinematic platforms.

use tracing::debug;

use crate::ecs::components::motion::Motion;
use crate::ecs::components::path::MovementPath;

/// Slack added to the one-step snap distance to absorb float drift.
const PATH_SNAP_EPSILON: f32 = 0.01;

/// Advance one platform along its current segment.
///
/// When the endpoint is within one step's displacement the platform snaps
/// onto it, the cursor moves to the next segment (wrapping) and that
/// segment's velocity is adopted. Returns true if the cursor moved.
pub fn step_along_path(motion: &mut Motion, path: &mut MovementPath, dt: f32) -> bool {
    let segment = *path.current_segment();
    let displacement = segment.velocity * motion.velocity_modifier * dt;
    let remaining = segment.end - motion.position;

    if remaining.length() <= displacement.length() + PATH_SNAP_EPSILON {
        let next = *path.advance();
        motion.position = next.start;
        motion.velocity = next.velocity;
        return true;
    }

    motion.position += displacement;
    motion.velocity = segment.velocity;
    false
}

/// Step every entity that follows a movement path.
pub fn advance_paths(world: &mut hecs::World, dt: f32) {
    for (entity, (motion, path)) in world.query_mut::<(&mut Motion, &mut MovementPath)>() {
        if step_along_path(motion, path, dt) {
            debug!(
                "Platform {:?} reached segment {} at {:?}",
                entity, path.current, motion.position
            );
        }
    }
}
