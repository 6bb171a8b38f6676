//! Shape components: single custom meshes and composite bodies.

use glam::Vec2;

use super::motion::ShapeCache;
use crate::mesh::MeshId;

/// Single convex mesh used instead of the default `scale` box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRef(pub MeshId);

/// One convex piece of a composite body.
#[derive(Debug, Clone)]
pub struct SubMesh {
    pub name: String,
    /// `None` uses a unit box.
    pub mesh: Option<MeshId>,
    /// Offset from the parent origin, in parent-local pixels.
    pub offset: Vec2,
    /// Local rotation in degrees, applied before the parent angle.
    pub rotation: f32,
    /// Fraction of the parent scale this piece spans.
    pub scale_ratio: Vec2,
    pub cache: ShapeCache,
}

impl SubMesh {
    pub fn new(name: impl Into<String>, mesh: Option<MeshId>) -> Self {
        Self {
            name: name.into(),
            mesh,
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale_ratio: Vec2::ONE,
            cache: ShapeCache::default(),
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale_ratio(mut self, ratio: Vec2) -> Self {
        self.scale_ratio = ratio;
        self
    }
}

/// A rigid body made of several convex sub-shapes sharing one `Motion`.
#[derive(Debug, Clone, Default)]
pub struct CompositeMesh {
    pub parts: Vec<SubMesh>,
}

impl CompositeMesh {
    pub fn new(parts: Vec<SubMesh>) -> Self {
        Self { parts }
    }

    pub fn part(&self, name: &str) -> Option<&SubMesh> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn part_mut(&mut self, name: &str) -> Option<&mut SubMesh> {
        self.parts.iter_mut().find(|p| p.name == name)
    }

    /// Force every sub-shape to rebuild on the next cache pass.
    pub fn invalidate(&mut self) {
        for part in &mut self.parts {
            part.cache.invalidate();
        }
    }
}
