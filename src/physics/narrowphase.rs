//! Narrowphase collision detection: SAT for convex polygons.

use glam::Vec2;

use crate::ecs::components::mesh::{CompositeMesh, MeshRef};
use crate::ecs::components::motion::Motion;

use super::collider::project;
use super::contact::{ContactInfo, Side};
use super::shape::sub_center;

/// A convex polygon as borrowed from a shape cache.
#[derive(Debug, Clone, Copy)]
pub struct Polygon<'a> {
    pub vertices: &'a [Vec2],
    pub normals: &'a [Vec2],
}

/// Test a single SAT axis. Returns Some(overlap) if the projections overlap,
/// None if the axis separates the shapes.
#[inline]
fn sat_test_axis(axis: Vec2, a: &[Vec2], b: &[Vec2]) -> Option<f32> {
    let (a_min, a_max) = project(a, axis);
    let (b_min, b_max) = project(b, axis);
    if a_max < b_min || b_max < a_min {
        return None;
    }
    Some(a_max.min(b_max) - a_min.max(b_min))
}

/// SAT (Separating Axis Theorem) test for two convex polygons.
///
/// `center_a` and `center_b` only orient the result: the returned normal
/// always satisfies `normal.dot(center_b - center_a) >= 0`. Shapes that
/// merely touch report no contact. On exact ties the first axis wins.
pub fn sat_convex(
    a: Polygon<'_>,
    center_a: Vec2,
    b: Polygon<'_>,
    center_b: Vec2,
) -> Option<ContactInfo> {
    if a.vertices.is_empty() || b.vertices.is_empty() {
        return None;
    }

    let mut min_overlap = f32::MAX;
    let mut best_axis = Vec2::ZERO;

    for &axis in a.normals.iter().chain(b.normals) {
        let overlap = sat_test_axis(axis, a.vertices, b.vertices)?;
        if overlap < min_overlap {
            min_overlap = overlap;
            best_axis = axis;
        }
    }

    if best_axis == Vec2::ZERO || min_overlap <= 0.0 {
        return None;
    }

    // Ensure normal points from A to B
    if best_axis.dot(center_b - center_a) < 0.0 {
        best_axis = -best_axis;
    }

    Some(ContactInfo {
        normal: best_axis,
        penetration: min_overlap,
    })
}

/// Overlap test for two unrotated boxes given centre and half extents.
///
/// Detects exactly the same pairs as [`sat_convex`] for axis-aligned
/// rectangles; cheaper when neither body has a mesh or rotation.
pub fn aabb_contact(center_a: Vec2, half_a: Vec2, center_b: Vec2, half_b: Vec2) -> Option<ContactInfo> {
    let d = center_b - center_a;
    let overlap = half_a + half_b - d.abs();
    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return None;
    }
    let (normal, penetration) = if overlap.x <= overlap.y {
        (Vec2::new(if d.x < 0.0 { -1.0 } else { 1.0 }, 0.0), overlap.x)
    } else {
        (Vec2::new(0.0, if d.y < 0.0 { -1.0 } else { 1.0 }), overlap.y)
    };
    Some(ContactInfo { normal, penetration })
}

/// Every convex piece of a body: its sub-shapes if composite, otherwise the
/// body's own cache.
pub fn polygons<'a>(motion: &'a Motion, composite: Option<&'a CompositeMesh>) -> Vec<Polygon<'a>> {
    match composite {
        Some(composite) => composite
            .parts
            .iter()
            .map(|p| Polygon {
                vertices: p.cache.vertices(),
                normals: p.cache.normals(),
            })
            .collect(),
        None => vec![Polygon {
            vertices: motion.cache.vertices(),
            normals: motion.cache.normals(),
        }],
    }
}

/// Centre of every convex piece, in the same order as [`polygons`].
fn centers(motion: &Motion, composite: Option<&CompositeMesh>) -> Vec<Vec2> {
    match composite {
        Some(composite) => composite.parts.iter().map(|p| sub_center(motion, p)).collect(),
        None => vec![motion.position],
    }
}

/// SAT across every sub-shape pair of two bodies, keeping the deepest hit so
/// a composite body yields a single contact per partner.
pub fn composite_contact(
    motion_a: &Motion,
    composite_a: Option<&CompositeMesh>,
    motion_b: &Motion,
    composite_b: Option<&CompositeMesh>,
) -> Option<ContactInfo> {
    let shapes_a = polygons(motion_a, composite_a);
    let shapes_b = polygons(motion_b, composite_b);
    let centers_a = centers(motion_a, composite_a);
    let centers_b = centers(motion_b, composite_b);

    let mut best: Option<ContactInfo> = None;
    for (pa, &ca) in shapes_a.iter().zip(&centers_a) {
        for (pb, &cb) in shapes_b.iter().zip(&centers_b) {
            let Some(info) = sat_convex(*pa, ca, *pb, cb) else {
                continue;
            };
            match best {
                Some(b) if b.penetration >= info.penetration => {}
                _ => best = Some(info),
            }
        }
    }
    best
}

/// Narrow-phase test between two entities. Returns the contact and, for
/// unrotated box-only pairs, the side `b` lies on relative to `a`.
pub fn detect_pair(world: &hecs::World, a: hecs::Entity, b: hecs::Entity) -> Option<(ContactInfo, Side)> {
    let motion_a = world.get::<&Motion>(a).ok()?;
    let motion_b = world.get::<&Motion>(b).ok()?;
    let composite_a = world.get::<&CompositeMesh>(a).ok();
    let composite_b = world.get::<&CompositeMesh>(b).ok();

    let info = composite_contact(
        &motion_a,
        composite_a.as_deref(),
        &motion_b,
        composite_b.as_deref(),
    )?;

    let box_only = composite_a.is_none()
        && composite_b.is_none()
        && world.get::<&MeshRef>(a).is_err()
        && world.get::<&MeshRef>(b).is_err()
        && motion_a.angle == 0.0
        && motion_b.angle == 0.0;
    let side = if box_only {
        Side::from_normal(info.normal)
    } else {
        Side::None
    };
    Some((info, side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::mesh::SubMesh;
    use crate::mesh::MeshLibrary;
    use crate::physics::collider::{box_corners, edge_normals, rotation};
    use crate::physics::shape::update_shape_caches;
    use rand::{Rng, SeedableRng};

    fn boxed(center: Vec2, half: Vec2, degrees: f32) -> (Vec<Vec2>, Vec<Vec2>) {
        let rot = rotation(degrees);
        let verts: Vec<Vec2> = box_corners(half).iter().map(|c| center + rot * *c).collect();
        let normals = edge_normals(&verts);
        (verts, normals)
    }

    fn poly<'a>(shape: &'a (Vec<Vec2>, Vec<Vec2>)) -> Polygon<'a> {
        Polygon {
            vertices: &shape.0,
            normals: &shape.1,
        }
    }

    #[test]
    fn test_sat_box_box_intersection() {
        let a = boxed(Vec2::ZERO, Vec2::ONE, 0.0);
        let b = boxed(Vec2::new(1.5, 0.0), Vec2::ONE, 0.0);
        let info = sat_convex(poly(&a), Vec2::ZERO, poly(&b), Vec2::new(1.5, 0.0)).unwrap();
        assert!((info.penetration - 0.5).abs() < 1e-5);
        assert!((info.normal - Vec2::X).length() < 1e-5);
    }

    #[test]
    fn test_sat_box_box_no_intersection() {
        let a = boxed(Vec2::ZERO, Vec2::ONE, 0.0);
        let b = boxed(Vec2::new(5.0, 0.0), Vec2::ONE, 0.0);
        assert!(sat_convex(poly(&a), Vec2::ZERO, poly(&b), Vec2::new(5.0, 0.0)).is_none());
    }

    #[test]
    fn test_touching_is_not_a_contact() {
        let a = boxed(Vec2::ZERO, Vec2::ONE, 0.0);
        let b = boxed(Vec2::new(2.0, 0.0), Vec2::ONE, 0.0);
        assert!(sat_convex(poly(&a), Vec2::ZERO, poly(&b), Vec2::new(2.0, 0.0)).is_none());
    }

    #[test]
    fn test_sat_agrees_with_aabb() {
        let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(1);
        for _ in 0..500 {
            // Integer coordinates keep the arithmetic exact.
            let ca = Vec2::new(rng.random_range(-20..20) as f32, rng.random_range(-20..20) as f32);
            let cb = Vec2::new(rng.random_range(-20..20) as f32, rng.random_range(-20..20) as f32);
            let ha = Vec2::new(rng.random_range(1..10) as f32, rng.random_range(1..10) as f32);
            let hb = Vec2::new(rng.random_range(1..10) as f32, rng.random_range(1..10) as f32);

            let a = boxed(ca, ha, 0.0);
            let b = boxed(cb, hb, 0.0);
            let sat = sat_convex(poly(&a), ca, poly(&b), cb);
            let aabb = aabb_contact(ca, ha, cb, hb);

            assert_eq!(sat.is_some(), aabb.is_some(), "a={ca} {ha} b={cb} {hb}");
        }
    }

    #[test]
    fn test_normal_points_from_a_to_b() {
        let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(7);
        let mut hits = 0;
        for _ in 0..500 {
            let ca = Vec2::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0));
            let cb = Vec2::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0));
            let a = boxed(ca, Vec2::new(3.0, 2.0), rng.random_range(0.0..360.0));
            let b = boxed(cb, Vec2::new(2.0, 4.0), rng.random_range(0.0..360.0));

            if let Some(info) = sat_convex(poly(&a), ca, poly(&b), cb) {
                hits += 1;
                assert!(info.normal.dot(cb - ca) >= 0.0);
                assert!(info.overlap().length() > 0.0);
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_separated_along_x_gives_no_contact() {
        let ha = Vec2::new(3.0, 2.0);
        let hb = Vec2::new(1.0, 5.0);
        let ca = Vec2::ZERO;
        let cb = Vec2::new(ha.x + hb.x + 0.5, 1.0);
        let a = boxed(ca, ha, 0.0);
        let b = boxed(cb, hb, 0.0);
        assert!(sat_convex(poly(&a), ca, poly(&b), cb).is_none());
        assert!(aabb_contact(ca, ha, cb, hb).is_none());
    }

    #[test]
    fn test_empty_polygon() {
        let a = boxed(Vec2::ZERO, Vec2::ONE, 0.0);
        let empty = Polygon {
            vertices: &[],
            normals: &[],
        };
        assert!(sat_convex(poly(&a), Vec2::ZERO, empty, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_detect_pair_box_side() {
        let mut world = hecs::World::new();
        let a = world.spawn((Motion::new(Vec2::ZERO, Vec2::splat(10.0)),));
        let b = world.spawn((Motion::new(Vec2::new(0.0, 9.0), Vec2::splat(10.0)),));
        update_shape_caches(&mut world, &MeshLibrary::new());

        let (info, side) = detect_pair(&world, a, b).unwrap();
        assert!((info.normal - Vec2::Y).length() < 1e-5);
        assert!((info.penetration - 1.0).abs() < 1e-4);
        assert_eq!(side, Side::Bottom);
    }

    #[test]
    fn test_composite_keeps_largest_overlap() {
        let mut world = hecs::World::new();
        // Two 10x10 pieces side by side; the right one overlaps the target more.
        let body = world.spawn((
            Motion::new(Vec2::ZERO, Vec2::splat(10.0)),
            CompositeMesh::new(vec![
                SubMesh::new("left", None).with_offset(Vec2::new(-10.0, 0.0)),
                SubMesh::new("right", None).with_offset(Vec2::new(10.0, 0.0)),
            ]),
        ));
        let target = world.spawn((Motion::new(Vec2::new(10.0, 8.0), Vec2::splat(10.0)),));
        update_shape_caches(&mut world, &MeshLibrary::new());

        let (info, side) = detect_pair(&world, body, target).unwrap();
        assert!((info.penetration - 2.0).abs() < 1e-4);
        assert!(info.normal.dot(Vec2::new(10.0, 8.0)) >= 0.0);
        assert_eq!(side, Side::None);
    }

    /// Static cup: floor plus two walls, 100 px across, open at the top.
    fn cup() -> CompositeMesh {
        CompositeMesh::new(vec![
            SubMesh::new("floor", None)
                .with_offset(Vec2::new(0.0, 45.0))
                .with_scale_ratio(Vec2::new(1.0, 0.1)),
            SubMesh::new("left", None)
                .with_offset(Vec2::new(-45.0, 0.0))
                .with_scale_ratio(Vec2::new(0.1, 1.0)),
            SubMesh::new("right", None)
                .with_offset(Vec2::new(45.0, 0.0))
                .with_scale_ratio(Vec2::new(0.1, 1.0)),
        ])
    }

    #[test]
    fn test_composite_normal_uses_sub_shape_centre() {
        let mut world = hecs::World::new();
        let holder = world.spawn((Motion::new(Vec2::ZERO, Vec2::splat(100.0)), cup()));
        // Spans x in [-43, -23]; the left wall spans [-50, -40].
        let item = world.spawn((Motion::new(Vec2::new(-33.0, 0.0), Vec2::splat(20.0)),));
        update_shape_caches(&mut world, &MeshLibrary::new());

        let (info, _) = detect_pair(&world, holder, item).unwrap();
        assert!((info.normal - Vec2::X).length() < 1e-5, "normal {}", info.normal);
        assert!((info.penetration - 3.0).abs() < 1e-4);

        let (info, _) = detect_pair(&world, item, holder).unwrap();
        assert!((info.normal + Vec2::X).length() < 1e-5);
    }
}
