//! Motion component and its cached world-space geometry.

use glam::Vec2;

use crate::mesh::MeshId;

/// Transform inputs a [`ShapeCache`] was last built from.
///
/// Comparing keys replaces a hand-maintained dirty bit: whenever any input
/// differs from the stored key the cache is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheKey {
    pub position: Vec2,
    /// Degrees.
    pub angle: f32,
    pub scale: Vec2,
    pub mesh: Option<MeshId>,
    /// Sub-shape offset, rotation (degrees) and scale ratio. Identity for
    /// single-shape bodies.
    pub local_offset: Vec2,
    pub local_rotation: f32,
    pub local_ratio: Vec2,
}

impl CacheKey {
    pub fn whole(position: Vec2, angle: f32, scale: Vec2, mesh: Option<MeshId>) -> Self {
        Self {
            position,
            angle,
            scale,
            mesh,
            local_offset: Vec2::ZERO,
            local_rotation: 0.0,
            local_ratio: Vec2::ONE,
        }
    }
}

/// World-space vertices and outward edge normals of one convex shape.
#[derive(Debug, Clone, Default)]
pub struct ShapeCache {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
    key: Option<CacheKey>,
}

impl ShapeCache {
    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    #[inline]
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True when the cache was never built, was invalidated, or was built
    /// from different inputs.
    #[inline]
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.key.as_ref() != Some(key)
    }

    /// Force a rebuild on the next cache pass.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.key = None;
    }

    pub(crate) fn store(&mut self, key: CacheKey, vertices: Vec<Vec2>, normals: Vec<Vec2>) {
        self.vertices = vertices;
        self.normals = normals;
        self.key = Some(key);
    }

    /// Position the cache was built at, if any.
    pub fn origin(&self) -> Option<Vec2> {
        self.key.map(|k| k.position)
    }
}

/// Kinematic state of an entity. Every physical entity carries one.
#[derive(Debug, Clone)]
pub struct Motion {
    pub position: Vec2,
    /// Rotation in degrees.
    pub angle: f32,
    /// Physical velocity, changed by gravity and collision impulses.
    pub velocity: Vec2,
    /// Locomotion-driven velocity (walking). Never touched by impulses.
    pub self_velocity: Vec2,
    /// Velocity imparted from outside, e.g. by a platform the body rides.
    pub applied_velocity: Vec2,
    /// Per-axis multiplier on every velocity term. `Vec2::ONE` is normal
    /// time; slow-motion effects shrink it.
    pub velocity_modifier: Vec2,
    /// Extents of the default box, and the stretch applied to mesh vertices.
    pub scale: Vec2,
    /// World-space shape. Left empty for composite bodies.
    pub cache: ShapeCache,
}

impl Motion {
    pub fn new(position: Vec2, scale: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
            velocity: Vec2::ZERO,
            self_velocity: Vec2::ZERO,
            applied_velocity: Vec2::ZERO,
            velocity_modifier: Vec2::ONE,
            scale,
            cache: ShapeCache::default(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    /// Velocity used to move the body this step.
    #[inline]
    pub fn total_velocity(&self) -> Vec2 {
        (self.velocity + self.self_velocity + self.applied_velocity) * self.velocity_modifier
    }

    /// Velocity seen by collision response. Excludes locomotion so that
    /// impulses and friction never fight walking input.
    #[inline]
    pub fn physical_velocity(&self) -> Vec2 {
        (self.velocity + self.applied_velocity) * self.velocity_modifier
    }

    /// Change the physical velocity by `delta`, compensating for the
    /// modifier. Axes frozen by a zero modifier are left alone.
    pub fn apply_velocity_change(&mut self, delta: Vec2) {
        if self.velocity_modifier.x.abs() > f32::EPSILON {
            self.velocity.x += delta.x / self.velocity_modifier.x;
        }
        if self.velocity_modifier.y.abs() > f32::EPSILON {
            self.velocity.y += delta.y / self.velocity_modifier.y;
        }
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.scale.abs() * 0.5
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ONE)
    }
}
