//! Rotational stability of bodies resting on a surface.
//!
//! A body is stable while its centre of mass projects between its support
//! contacts. Otherwise gravity applies a torque about the nearer support
//! and the body tips over the edge.

use glam::Vec2;

use crate::ecs::components::physics::PhysicsObject;

use super::collider::closest_point_on_segment;
use super::narrowphase::Polygon;
use super::PhysicsConfig;

/// Outcome of one stability check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stability {
    /// Centre of mass is over the support; spin was damped.
    Stable,
    /// Gravity torque about `pivot` was integrated into angular velocity.
    Tipping { pivot: Vec2, torque: f32 },
    /// No usable support contacts (or no usable inertia).
    Unsupported,
}

/// True if `p` lies inside `poly` or within `threshold` of one of its edges.
pub fn touches(p: Vec2, poly: &Polygon<'_>, threshold: f32) -> bool {
    let n = poly.vertices.len();
    if n < 2 {
        return false;
    }
    let mut inside = n >= 3;
    for i in 0..n {
        let a = poly.vertices[i];
        let b = poly.vertices[(i + 1) % n];
        if closest_point_on_segment(p, a, b).distance(p) <= threshold {
            return true;
        }
        // Edge normals are (-e.y, e.x) and point outward.
        let e = b - a;
        if Vec2::new(-e.y, e.x).dot(p - a) > 0.0 {
            inside = false;
        }
    }
    inside
}

/// Vertices of `from` touching any polygon of `onto`.
fn touching(from: &[Polygon<'_>], onto: &[Polygon<'_>], threshold: f32) -> Vec<Vec2> {
    from.iter()
        .flat_map(|poly| poly.vertices.iter().copied())
        .filter(|p| onto.iter().any(|poly| touches(*p, poly, threshold)))
        .collect()
}

/// Points where object and platform touch, deepest first, at most two.
///
/// Candidates are the object's vertices touching the platform and the
/// platform's vertices touching the object, so a body hanging over a ledge
/// is supported by the ledge corner. `platform_normal` points from the
/// platform toward the object, so the deepest points have the smallest
/// projection onto it.
pub fn support_contacts(
    object: &[Polygon<'_>],
    platform: &[Polygon<'_>],
    platform_center: Vec2,
    platform_normal: Vec2,
    threshold: f32,
) -> Vec<Vec2> {
    let mut contacts = touching(object, platform, threshold);
    contacts.extend(touching(platform, object, threshold));
    contacts.sort_by(|a, b| {
        let da = (*a - platform_center).dot(platform_normal);
        let db = (*b - platform_center).dot(platform_normal);
        da.total_cmp(&db)
    });
    contacts.truncate(2);
    contacts
}

/// Damp or tip a resting body depending on where its centre of mass sits
/// relative to its support contacts.
pub fn stabilize(
    object: &mut PhysicsObject,
    center_of_mass: Vec2,
    contacts: &[Vec2],
    platform_normal: Vec2,
    config: &PhysicsConfig,
    dt: f32,
) -> Stability {
    let tangent = Vec2::new(platform_normal.y, -platform_normal.x).normalize_or_zero();
    if contacts.is_empty() || tangent == Vec2::ZERO {
        return Stability::Unsupported;
    }

    let (mut min_proj, mut max_proj) = (f32::MAX, f32::MIN);
    let (mut min_pivot, mut max_pivot) = (contacts[0], contacts[0]);
    for &c in contacts {
        let proj = c.dot(tangent);
        if proj < min_proj {
            min_proj = proj;
            min_pivot = c;
        }
        if proj > max_proj {
            max_proj = proj;
            max_pivot = c;
        }
    }

    let com_proj = center_of_mass.dot(tangent);
    let tolerance = config.support_tolerance;
    if com_proj >= min_proj - tolerance && com_proj <= max_proj + tolerance {
        if object.angular_damping > 0.0 {
            object.angular_velocity *= config.stable_angular_damping;
        }
        return Stability::Stable;
    }

    if object.moment_of_inertia <= f32::EPSILON {
        return Stability::Unsupported;
    }

    let pivot = if com_proj > max_proj {
        max_pivot
    } else {
        min_pivot
    };
    let lever = center_of_mass - pivot;
    // r x F with F = (0, m g) on a y-down screen.
    let torque = lever.x * object.mass * config.gravity;
    object.angular_velocity += torque / object.moment_of_inertia * dt;

    Stability::Tipping { pivot, torque }
}
