//! Broadphase collision detection using AABB overlap tests.

use crate::ecs::components::mesh::CompositeMesh;
use crate::ecs::components::motion::Motion;
use crate::ecs::components::pendulum::PendulumRod;
use crate::ecs::components::physics::PhysicsObject;

use super::collider::PhysicsAabb;

/// Sweep-and-prune broadphase along the x axis.
pub struct SweepAndPrune {
    entries: Vec<(hecs::Entity, PhysicsAabb, bool)>,
}

impl Default for SweepAndPrune {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounds that contain everything the narrow phase could test: the `scale`
/// box plus any cached vertices (meshes may poke outside `scale`).
pub fn body_bounds(motion: &Motion, composite: Option<&CompositeMesh>) -> PhysicsAabb {
    let mut aabb = PhysicsAabb::from_motion(motion);
    if let Some(cached) = PhysicsAabb::from_points(motion.cache.vertices()) {
        aabb = aabb.union(&cached);
    }
    if let Some(composite) = composite {
        for part in &composite.parts {
            if let Some(cached) = PhysicsAabb::from_points(part.cache.vertices()) {
                aabb = aabb.union(&cached);
            }
        }
    }
    aabb
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Find all pairs of entities whose AABBs overlap.
    ///
    /// Only returns pairs where at least one entity carries a
    /// `PhysicsObject`; platform-platform pairs never need resolving.
    /// Pendulum rods are decoration and never collide.
    pub fn find_pairs(&mut self, world: &hecs::World) -> Vec<(hecs::Entity, hecs::Entity)> {
        self.entries.clear();
        for (entity, (motion, composite, object)) in world
            .query::<(&Motion, Option<&CompositeMesh>, Option<&PhysicsObject>)>()
            .without::<&PendulumRod>()
            .iter()
        {
            self.entries
                .push((entity, body_bounds(motion, composite), object.is_some()));
        }

        // Stable sort keeps query order among equal keys.
        self.entries
            .sort_by(|a, b| a.1.min.x.total_cmp(&b.1.min.x));

        let mut pairs = Vec::new();
        for i in 0..self.entries.len() {
            let (entity_a, aabb_a, dynamic_a) = self.entries[i];
            for &(entity_b, aabb_b, dynamic_b) in &self.entries[i + 1..] {
                // Sorted by min.x: nothing further right can overlap.
                if aabb_b.min.x > aabb_a.max.x {
                    break;
                }
                if !dynamic_a && !dynamic_b {
                    continue;
                }
                if aabb_a.overlaps(&aabb_b) {
                    pairs.push((entity_a, entity_b));
                }
            }
        }

        pairs
    }
}
