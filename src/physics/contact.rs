//! Contact data structures for collision response.

use glam::Vec2;

/// Discrete contact side for box-only pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
    #[default]
    None,
}

impl Side {
    /// Side a normal points toward, by its dominant axis. y grows downward,
    /// so a positive y component is `Bottom`.
    pub fn from_normal(normal: Vec2) -> Self {
        if normal == Vec2::ZERO {
            Side::None
        } else if normal.x.abs() > normal.y.abs() {
            if normal.x > 0.0 {
                Side::Right
            } else {
                Side::Left
            }
        } else if normal.y > 0.0 {
            Side::Bottom
        } else {
            Side::Top
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::None => Side::None,
        }
    }
}

/// Result of a narrow-phase test between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// Separating normal (from shape A to shape B).
    pub normal: Vec2,
    /// Penetration depth along `normal`. Always positive.
    pub penetration: f32,
}

impl ContactInfo {
    /// Minimum translation vector, `normal * penetration`.
    #[inline]
    pub fn overlap(&self) -> Vec2 {
        self.normal * self.penetration
    }
}

/// Per-step collision record between two entities.
///
/// Records are rebuilt every fixed step and never carried over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub entity: hecs::Entity,
    pub other: hecs::Entity,
    /// Minimum separating overlap vector.
    pub overlap: Vec2,
    /// Contact normal (from `entity` to `other`).
    pub normal: Vec2,
    /// Where `other` lies relative to `entity`. Only set for unrotated
    /// box-only pairs.
    pub side: Side,
}

impl Collision {
    #[inline]
    pub fn penetration(&self) -> f32 {
        self.overlap.length()
    }

    /// The same contact seen from `other`.
    pub fn flipped(&self) -> Self {
        Self {
            entity: self.other,
            other: self.entity,
            overlap: -self.overlap,
            normal: -self.normal,
            side: self.side.opposite(),
        }
    }

    /// True if `entity` is one of the two participants.
    pub fn involves(&self, entity: hecs::Entity) -> bool {
        self.entity == entity || self.other == entity
    }
}

/// Impulses applied while resolving one contact.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactImpulse {
    /// Normal impulse magnitude (never negative).
    pub normal: f32,
    /// Signed friction impulse along the contact tangent.
    pub tangent: f32,
    /// Friction coefficient used for the pair.
    pub friction: f32,
}
