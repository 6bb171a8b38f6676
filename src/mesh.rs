//! Mesh geometry store.
//!
//! Asset loading lives outside this crate; whoever parses mesh files hands
//! the mesh-local vertex lists over here and keeps the returned [`MeshId`].

use glam::Vec2;

use crate::error::{PhysicsError, Result};

/// Opaque handle to a mesh stored in a [`MeshLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(u32);

/// Convex mesh-local vertex lists, addressed by [`MeshId`].
///
/// Vertices are expected in unit space (roughly `[-0.5, 0.5]` on each axis);
/// the owning `Motion::scale` stretches them to world size.
#[derive(Debug, Default, Clone)]
pub struct MeshLibrary {
    meshes: Vec<Vec<Vec2>>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a convex vertex list and return its handle.
    ///
    /// Convexity is not checked. Fewer than three vertices, or any
    /// non-finite coordinate, is rejected.
    pub fn insert(&mut self, vertices: Vec<Vec2>) -> Result<MeshId> {
        if vertices.len() < 3 || vertices.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::DegenerateMesh(vertices.len()));
        }
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(vertices);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: MeshId) -> Option<&[Vec2]> {
        self.meshes.get(id.0 as usize).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut meshes = MeshLibrary::new();
        let tri = vec![
            Vec2::new(0.0, -0.5),
            Vec2::new(0.5, 0.5),
            Vec2::new(-0.5, 0.5),
        ];
        let id = meshes.insert(tri.clone()).unwrap();
        assert_eq!(meshes.get(id).unwrap(), tri.as_slice());
        assert_eq!(meshes.len(), 1);
    }

    #[test]
    fn test_degenerate_mesh_rejected() {
        let mut meshes = MeshLibrary::new();
        let err = meshes
            .insert(vec![Vec2::ZERO, Vec2::X])
            .unwrap_err();
        assert_eq!(err, PhysicsError::DegenerateMesh(2));

        let err = meshes
            .insert(vec![Vec2::ZERO, Vec2::X, Vec2::new(f32::NAN, 0.0)])
            .unwrap_err();
        assert_eq!(err, PhysicsError::DegenerateMesh(3));
        assert!(meshes.is_empty());
    }
}
