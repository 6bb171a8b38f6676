//! Convex polygon helpers shared by the detectors and the resolver.

use glam::{Mat2, Vec2};

use crate::ecs::components::motion::Motion;

/// Edges shorter than this produce no separating axis.
pub const MIN_EDGE_LENGTH: f32 = 0.001;

/// Axis-aligned bounding box for broadphase collision detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsAabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl PhysicsAabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Bounds of a `Motion`'s `scale` box, grown to contain any rotation.
    pub fn from_motion(motion: &Motion) -> Self {
        let half = motion.half_extents();
        let half = if motion.angle.rem_euclid(360.0) == 0.0 {
            half
        } else {
            Vec2::splat(half.length())
        };
        Self::from_center(motion.position, half)
    }

    /// Tight bounds of a vertex list.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    pub fn union(&self, other: &PhysicsAabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Test whether two AABBs overlap. Touching edges count as overlapping.
    #[inline]
    pub fn overlaps(&self, other: &PhysicsAabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Rotation matrix for an angle in degrees.
#[inline]
pub fn rotation(degrees: f32) -> Mat2 {
    Mat2::from_angle(degrees.to_radians())
}

/// Corners of a box centred on the origin, wound so that [`edge_normals`]
/// points outward.
pub fn box_corners(half: Vec2) -> [Vec2; 4] {
    [
        Vec2::new(-half.x, -half.y),
        Vec2::new(-half.x, half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(half.x, -half.y),
    ]
}

/// Unit normals of each polygon edge, `(-e.y, e.x)`. Degenerate edges are
/// skipped.
pub fn edge_normals(vertices: &[Vec2]) -> Vec<Vec2> {
    let n = vertices.len();
    let mut normals = Vec::with_capacity(n);
    for i in 0..n {
        let edge = vertices[(i + 1) % n] - vertices[i];
        let len = edge.length();
        if len < MIN_EDGE_LENGTH {
            continue;
        }
        normals.push(Vec2::new(-edge.y, edge.x) / len);
    }
    normals
}

/// Project a vertex list onto an axis, returning `(min, max)`.
///
/// An empty list projects to `(0, 0)`.
#[inline]
pub fn project(vertices: &[Vec2], axis: Vec2) -> (f32, f32) {
    let Some(first) = vertices.first() else {
        return (0.0, 0.0);
    };
    let start = first.dot(axis);
    vertices[1..].iter().fold((start, start), |(min, max), v| {
        let p = v.dot(axis);
        (min.min(p), max.max(p))
    })
}

/// Closest point to `p` on the segment `a`-`b`.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// 2D cross product `r × n`, the lever arm of `n` applied at `r`.
#[inline]
pub fn perp_dot(r: Vec2, n: Vec2) -> f32 {
    r.x * n.y - r.y * n.x
}
