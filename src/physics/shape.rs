//! World-space vertex cache builder.
//!
//! Three cases, picked by the components an entity carries:
//!
//! 1. `CompositeMesh` - every sub-shape gets its own cache, `Motion::cache`
//!    stays empty.
//! 2. `MeshRef` - mesh-local vertices are scaled, rotated and translated.
//! 3. Neither - a `scale` box is synthesized.
//!
//! Caches are keyed on their inputs, so a rebuild only happens when the
//! transform (or sub-shape parameters) changed since the last pass.

use glam::Vec2;
use tracing::{trace, warn};

use crate::ecs::components::mesh::{CompositeMesh, MeshRef, SubMesh};
use crate::ecs::components::motion::{CacheKey, Motion};
use crate::mesh::{MeshId, MeshLibrary};

use super::collider::{box_corners, edge_normals, rotation};

/// Unit box used by sub-shapes without a mesh.
const UNIT_BOX_HALF: Vec2 = Vec2::splat(0.5);

fn lookup(meshes: &MeshLibrary, id: Option<MeshId>) -> Option<&[Vec2]> {
    let id = id?;
    let found = meshes.get(id);
    if found.is_none() {
        warn!("Unknown mesh {:?}, falling back to box", id);
    }
    found
}

/// World-space vertices of a single-shape body.
pub fn compute_vertices(motion: &Motion, mesh: Option<&[Vec2]>) -> Vec<Vec2> {
    let rot = rotation(motion.angle);
    match mesh {
        Some(local) => local
            .iter()
            .map(|v| motion.position + rot * (*v * motion.scale))
            .collect(),
        None => box_corners(motion.half_extents())
            .iter()
            .map(|c| motion.position + rot * *c)
            .collect(),
    }
}

/// World-space vertices of one sub-shape of a composite body.
pub fn compute_sub_vertices(motion: &Motion, part: &SubMesh, mesh: Option<&[Vec2]>) -> Vec<Vec2> {
    let parent_rot = rotation(motion.angle);
    let local_rot = rotation(part.rotation);
    let origin = motion.position + parent_rot * part.offset;

    let place = |v: Vec2| origin + parent_rot * ((local_rot * (v * part.scale_ratio)) * motion.scale);
    match mesh {
        Some(local) => local.iter().map(|v| place(*v)).collect(),
        None => box_corners(UNIT_BOX_HALF).iter().map(|c| place(*c)).collect(),
    }
}

/// Centre of a sub-shape in world space.
pub fn sub_center(motion: &Motion, part: &SubMesh) -> Vec2 {
    motion.position + rotation(motion.angle) * part.offset
}

fn sub_key(motion: &Motion, part: &SubMesh) -> CacheKey {
    CacheKey {
        position: motion.position,
        angle: motion.angle,
        scale: motion.scale,
        mesh: part.mesh,
        local_offset: part.offset,
        local_rotation: part.rotation,
        local_ratio: part.scale_ratio,
    }
}

fn rebuild_composite(motion: &mut Motion, composite: &mut CompositeMesh, meshes: &MeshLibrary) -> usize {
    if !motion.cache.is_empty() {
        motion.cache.clear();
    }

    let mut rebuilt = 0;
    for part in &mut composite.parts {
        let key = sub_key(motion, part);
        if !part.cache.is_stale(&key) {
            continue;
        }
        let vertices = compute_sub_vertices(motion, part, lookup(meshes, part.mesh));
        let normals = edge_normals(&vertices);
        part.cache.store(key, vertices, normals);
        rebuilt += 1;
    }
    rebuilt
}

fn rebuild_single(motion: &mut Motion, mesh: Option<MeshId>, meshes: &MeshLibrary) -> bool {
    let key = CacheKey::whole(motion.position, motion.angle, motion.scale, mesh);
    if !motion.cache.is_stale(&key) {
        return false;
    }
    let vertices = compute_vertices(motion, lookup(meshes, mesh));
    let normals = edge_normals(&vertices);
    motion.cache.store(key, vertices, normals);
    true
}

/// Bring every stale shape cache up to date with its transform.
///
/// Returns the number of caches rebuilt.
pub fn update_shape_caches(world: &mut hecs::World, meshes: &MeshLibrary) -> usize {
    let mut rebuilt = 0;
    for (_entity, (motion, composite, mesh_ref)) in
        world.query_mut::<(&mut Motion, Option<&mut CompositeMesh>, Option<&MeshRef>)>()
    {
        match composite {
            Some(composite) => rebuilt += rebuild_composite(motion, composite, meshes),
            None => {
                if rebuild_single(motion, mesh_ref.map(|m| m.0), meshes) {
                    rebuilt += 1;
                }
            }
        }
    }
    trace!("Rebuilt {} shape caches", rebuilt);
    rebuilt
}
