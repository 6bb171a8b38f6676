//! Collision resolution.
//!
//! Each contact is resolved once, in detection order:
//!
//! 1. Position correction along the normal, split by inverse mass, leaving
//!    a small residual overlap so resting pairs stay in contact.
//! 2. Ground/Block classification.
//! 3. Normal impulse with the lower restitution of the pair.
//! 4. Coulomb friction with the geometric-mean coefficient.
//! 5. Tipping for rotating bodies resting on a surface.
//!
//! Pairs where one side is immovable (a platform, a path-driven body or a
//! massless object) take the surface path with angular response. Two
//! dynamic bodies take the pushing path: linear only, and a body heavier
//! than `push_mass_ratio` times its partner does not yield.

use glam::Vec2;
use tracing::trace;

use crate::ecs::components::mesh::CompositeMesh;
use crate::ecs::components::motion::Motion;
use crate::ecs::components::path::MovementPath;
use crate::ecs::components::pendulum::Pendulum;
use crate::ecs::components::physics::{Blocked, PhysicsObject, Platform};

use super::collider::perp_dot;
use super::contact::{Collision, ContactImpulse};
use super::ground::mark_grounded;
use super::narrowphase::{polygons, Polygon};
use super::stability::{stabilize, support_contacts, touches};
use super::PhysicsConfig;

/// Vertices within this distance of the other shape, and of the deepest
/// such vertex, form the contact patch.
const CONTACT_SLOP: f32 = 0.5;
/// Tangential speeds below this skip friction.
const MIN_TANGENT_SPEED: f32 = 0.001;

/// Snapshot of the body data one contact needs.
#[derive(Debug, Clone, Copy)]
pub struct BodyState {
    pub entity: hecs::Entity,
    pub position: Vec2,
    /// Physical velocity (see `Motion::physical_velocity`).
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub mass: f32,
    pub inv_mass: f32,
    pub inv_inertia: f32,
    pub bounce: f32,
    pub friction: f32,
    pub apply_friction: bool,
    /// Carries a `PhysicsObject`.
    pub dynamic: bool,
    /// Pendulum bob; contacts with it use `pendulum_friction`.
    pub swinging: bool,
}

impl BodyState {
    /// Read a body from the world. Path-driven bodies and pendulum bobs are
    /// kinematic: they have zero inverse mass in every direction.
    pub fn read(world: &hecs::World, entity: hecs::Entity, config: &PhysicsConfig) -> Option<Self> {
        let motion = world.get::<&Motion>(entity).ok()?;
        let swinging = world.get::<&Pendulum>(entity).is_ok();
        let kinematic = swinging || world.get::<&MovementPath>(entity).is_ok();

        let state = match world.get::<&PhysicsObject>(entity) {
            Ok(object) => Self {
                entity,
                position: motion.position,
                velocity: motion.physical_velocity(),
                angular_velocity: object.angular_velocity,
                mass: object.mass,
                inv_mass: if kinematic { 0.0 } else { object.inverse_mass() },
                inv_inertia: if kinematic { 0.0 } else { object.inverse_inertia() },
                bounce: object.bounce,
                friction: object.friction,
                apply_friction: object.apply_friction,
                dynamic: true,
                swinging,
            },
            Err(_) => {
                let platform = world
                    .get::<&Platform>(entity)
                    .map(|p| *p)
                    .unwrap_or_default();
                Self {
                    entity,
                    position: motion.position,
                    velocity: motion.physical_velocity(),
                    angular_velocity: 0.0,
                    mass: 0.0,
                    inv_mass: 0.0,
                    inv_inertia: 0.0,
                    bounce: platform.bounce.unwrap_or(config.surface_bounce),
                    friction: platform.friction.unwrap_or(config.surface_friction),
                    apply_friction: true,
                    dynamic: false,
                    swinging,
                }
            }
        };
        Some(state)
    }

    /// Velocity of the material point at offset `r` from the centre.
    #[inline]
    pub fn point_velocity(&self, r: Vec2) -> Vec2 {
        self.velocity + self.angular_velocity * Vec2::new(-r.y, r.x)
    }

    /// Apply impulse `p` at offset `r`.
    #[inline]
    pub fn apply_impulse(&mut self, p: Vec2, r: Vec2) {
        self.velocity += p * self.inv_mass;
        self.angular_velocity += self.inv_inertia * perp_dot(r, p);
    }
}

/// Position shifts that separate a pair along `normal` (A to B), split by
/// inverse mass. Returns None when neither body can move.
pub fn separation(
    a: &BodyState,
    b: &BodyState,
    normal: Vec2,
    penetration: f32,
    resting_overlap: f32,
) -> Option<(Vec2, Vec2)> {
    let total = a.inv_mass + b.inv_mass;
    if total <= 0.0 {
        return None;
    }
    let correction = normal * (penetration - resting_overlap).max(0.0);
    Some((
        -correction * (a.inv_mass / total),
        correction * (b.inv_mass / total),
    ))
}

/// Normal impulse followed by Coulomb friction.
///
/// `ra` and `rb` are the contact point's offsets from each centre. Bodies
/// that are already separating get no impulse.
pub fn apply_contact_impulse(
    a: &mut BodyState,
    b: &mut BodyState,
    normal: Vec2,
    ra: Vec2,
    rb: Vec2,
    config: &PhysicsConfig,
) -> ContactImpulse {
    let ra_n = perp_dot(ra, normal);
    let rb_n = perp_dot(rb, normal);

    let closing = (b.point_velocity(rb) - a.point_velocity(ra)).dot(normal);
    if closing > 0.0 {
        return ContactImpulse::default();
    }

    let inv_mass_sum =
        a.inv_mass + b.inv_mass + ra_n * ra_n * a.inv_inertia + rb_n * rb_n * b.inv_inertia;
    if inv_mass_sum <= f32::EPSILON {
        return ContactImpulse::default();
    }

    let bounce = if -closing < config.rest_velocity_threshold {
        0.0
    } else {
        a.bounce.min(b.bounce)
    };
    let j = -(1.0 + bounce) * closing / inv_mass_sum;
    a.apply_impulse(-normal * j, ra);
    b.apply_impulse(normal * j, rb);

    let mut result = ContactImpulse {
        normal: j,
        ..Default::default()
    };
    if !(a.apply_friction && b.apply_friction) {
        return result;
    }

    let relative = b.point_velocity(rb) - a.point_velocity(ra);
    let tangent = relative - normal * relative.dot(normal);
    let tangent_speed = tangent.length();
    if tangent_speed < MIN_TANGENT_SPEED {
        return result;
    }
    let t = tangent / tangent_speed;

    let ra_t = perp_dot(ra, t);
    let rb_t = perp_dot(rb, t);
    let inv_mass_t =
        a.inv_mass + b.inv_mass + ra_t * ra_t * a.inv_inertia + rb_t * rb_t * b.inv_inertia;
    if inv_mass_t <= f32::EPSILON {
        return result;
    }

    let mu = if a.swinging || b.swinging {
        config.pendulum_friction
    } else {
        (a.friction * b.friction).max(0.0).sqrt()
    };
    let jt = (-tangent_speed / inv_mass_t).clamp(-mu * j, mu * j);
    a.apply_impulse(-t * jt, ra);
    b.apply_impulse(t * jt, rb);

    result.tangent = jt;
    result.friction = mu;
    result
}

fn all_vertices(polys: &[Polygon<'_>]) -> Vec<Vec2> {
    polys.iter().flat_map(|p| p.vertices.iter().copied()).collect()
}

fn deepest_mean(vertices: &[Vec2], normal: Vec2) -> Option<Vec2> {
    let deepest = vertices.iter().map(|v| v.dot(normal)).fold(f32::MIN, f32::max);
    let (sum, count) = vertices
        .iter()
        .filter(|v| v.dot(normal) >= deepest - CONTACT_SLOP)
        .fold((Vec2::ZERO, 0u32), |(sum, n), v| (sum + *v, n + 1));
    (count > 0).then(|| sum / count as f32)
}

/// World-space contact point of `body` against `surface`.
///
/// The patch is every vertex of either shape that lies inside (or within
/// `CONTACT_SLOP` of) the other, keeping the deepest along the normal. The
/// point is the spot on that patch nearest the body's centre, so a body
/// resting flat is pushed straight up and one hanging over a ledge is pushed
/// at the ledge corner. Falls back to the middle of the overlap when no
/// vertex touches. Also returns the origin the body's cache was built at.
fn contact_point(
    world: &hecs::World,
    body: hecs::Entity,
    surface: hecs::Entity,
    normal: Vec2,
    penetration: f32,
) -> Option<(Vec2, Vec2)> {
    let motion = world.get::<&Motion>(body).ok()?;
    let composite = world.get::<&CompositeMesh>(body).ok();
    let surface_motion = world.get::<&Motion>(surface).ok()?;
    let surface_composite = world.get::<&CompositeMesh>(surface).ok();
    let origin = match composite.as_deref() {
        Some(c) => c.parts.first()?.cache.origin()?,
        None => motion.cache.origin()?,
    };

    let shapes = polygons(&motion, composite.as_deref());
    let surface_shapes = polygons(&surface_motion, surface_composite.as_deref());
    let (body_vertices, surface_vertices) = (all_vertices(&shapes), all_vertices(&surface_shapes));

    let body_front = body_vertices.iter().map(|v| v.dot(normal)).fold(f32::MIN, f32::max);
    let surface_back = surface_vertices.iter().map(|v| v.dot(normal)).fold(f32::MAX, f32::min);

    // (depth, point) for every vertex touching the other shape.
    let mut patch: Vec<(f32, Vec2)> = body_vertices
        .iter()
        .filter(|v| surface_shapes.iter().any(|p| touches(**v, p, CONTACT_SLOP)))
        .map(|v| (v.dot(normal) - surface_back, *v))
        .collect();
    patch.extend(
        surface_vertices
            .iter()
            .filter(|v| shapes.iter().any(|p| touches(**v, p, CONTACT_SLOP)))
            .map(|v| (body_front - v.dot(normal), *v)),
    );

    let deepest = patch.iter().map(|(d, _)| *d).fold(f32::MIN, f32::max);
    patch.retain(|(d, _)| *d >= deepest - CONTACT_SLOP);
    if patch.is_empty() {
        let point = deepest_mean(&body_vertices, normal)? - normal * (penetration * 0.5);
        return Some((origin, point));
    }

    let tangent = normal.perp();
    let (lo, hi) = patch.iter().fold((f32::MAX, f32::MIN), |(lo, hi), (_, p)| {
        let along = p.dot(tangent);
        (lo.min(along), hi.max(along))
    });
    let across = patch.iter().map(|(_, p)| p.dot(normal)).sum::<f32>() / patch.len() as f32;
    let along = origin.dot(tangent).clamp(lo, hi);
    Some((origin, tangent * along + normal * across))
}

fn write_back(world: &hecs::World, before: &BodyState, after: &BodyState, shift: Vec2) {
    if before.inv_mass == 0.0 && before.inv_inertia == 0.0 {
        return;
    }
    if let Ok(mut motion) = world.get::<&mut Motion>(after.entity) {
        motion.position += shift;
        motion.apply_velocity_change(after.velocity - before.velocity);
    }
    if after.dynamic {
        if let Ok(mut object) = world.get::<&mut PhysicsObject>(after.entity) {
            object.angular_velocity = after.angular_velocity;
        }
    }
}

fn tip_on_surface(world: &hecs::World, body: hecs::Entity, surface: hecs::Entity, normal: Vec2, config: &PhysicsConfig, dt: f32) {
    let Ok(mut object) = world.get::<&mut PhysicsObject>(body) else {
        return;
    };
    if !object.apply_rotation || object.angular_damping <= 0.0 {
        return;
    }
    let (Ok(motion), Ok(surface_motion)) = (world.get::<&Motion>(body), world.get::<&Motion>(surface)) else {
        return;
    };
    let composite = world.get::<&CompositeMesh>(body).ok();
    let surface_composite = world.get::<&CompositeMesh>(surface).ok();

    let shapes = polygons(&motion, composite.as_deref());
    let surface_shapes = polygons(&surface_motion, surface_composite.as_deref());
    let com = motion.cache.origin().unwrap_or(motion.position);
    let surface_center = surface_motion.cache.origin().unwrap_or(surface_motion.position);

    // Normal from the surface toward the body.
    let surface_normal = -normal;
    let contacts = support_contacts(
        &shapes,
        &surface_shapes,
        surface_center,
        surface_normal,
        config.support_distance,
    );
    let result = stabilize(&mut object, com, &contacts, surface_normal, config, dt);
    trace!("Stability of {:?} on {:?}: {:?}", body, surface, result);
}

/// Resolve one collision. Returns the impulses applied, or None if the pair
/// could not be resolved (both immovable, or an entity went missing).
pub fn resolve_collision(
    world: &mut hecs::World,
    collision: &Collision,
    config: &PhysicsConfig,
    dt: f32,
    grounded: &mut Vec<hecs::Entity>,
) -> Option<ContactImpulse> {
    let mut sa = BodyState::read(world, collision.entity, config)?;
    let mut sb = BodyState::read(world, collision.other, config)?;
    let mut normal = collision.normal;

    // The movable body is always A.
    if sa.inv_mass == 0.0 && sb.inv_mass > 0.0 {
        std::mem::swap(&mut sa, &mut sb);
        normal = -normal;
    }

    let surface = sa.inv_mass == 0.0 || sb.inv_mass == 0.0;
    if !surface {
        if sa.mass >= config.push_mass_ratio * sb.mass {
            sa.inv_mass = 0.0;
        } else if sb.mass >= config.push_mass_ratio * sa.mass {
            sb.inv_mass = 0.0;
        }
        sa.inv_inertia = 0.0;
        sb.inv_inertia = 0.0;
    }
    let (before_a, before_b) = (sa, sb);

    // 1. Position correction
    let (shift_a, shift_b) = separation(&sa, &sb, normal, collision.penetration(), config.resting_overlap)?;

    let (ra, rb) = if surface {
        match contact_point(world, sa.entity, sb.entity, normal, collision.penetration()) {
            Some((origin, point)) => (point - origin, point - sb.position),
            None => (Vec2::ZERO, Vec2::ZERO),
        }
    } else {
        (Vec2::ZERO, Vec2::ZERO)
    };

    // 2. Ground/Block classification
    if let Ok(mut blocked) = world.get::<&mut Blocked>(sa.entity) {
        blocked.block_toward(normal);
    }
    if let Ok(mut blocked) = world.get::<&mut Blocked>(sb.entity) {
        blocked.block_toward(-normal);
    }
    let threshold = config.ground_threshold();
    let a_on_b = normal.y >= threshold;
    if sa.dynamic && a_on_b && mark_grounded(world, sa.entity, sb.entity) {
        grounded.push(sa.entity);
    }
    if sb.dynamic && -normal.y >= threshold && mark_grounded(world, sb.entity, sa.entity) {
        grounded.push(sb.entity);
    }

    // 3-4. Impulse and friction
    let impulse = apply_contact_impulse(&mut sa, &mut sb, normal, ra, rb, config);
    write_back(world, &before_a, &sa, shift_a);
    write_back(world, &before_b, &sb, shift_b);

    // 5. Tipping, only while resting on the surface
    if surface && a_on_b && sa.dynamic && sb.inv_mass == 0.0 {
        tip_on_surface(world, sa.entity, sb.entity, normal, config, dt);
    }

    Some(impulse)
}

/// Resolve every collision of the step and return the grounded bodies.
pub fn resolve_contacts(
    world: &mut hecs::World,
    collisions: &[Collision],
    config: &PhysicsConfig,
    dt: f32,
) -> Vec<hecs::Entity> {
    let mut grounded = Vec::new();
    let mut resolved = 0usize;
    for collision in collisions {
        if resolve_collision(world, collision, config, dt, &mut grounded).is_some() {
            resolved += 1;
        }
    }
    trace!("Resolved {}/{} collisions", resolved, collisions.len());
    grounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::physics::OnGround;
    use crate::mesh::MeshLibrary;
    use crate::physics::contact::Side;
    use crate::physics::shape::update_shape_caches;
    use rand::{Rng, SeedableRng};

    const DT: f32 = 1.0 / 120.0;

    fn state(world: &mut hecs::World, mass: f32, velocity: Vec2, bounce: f32) -> BodyState {
        let entity = world.spawn(());
        let inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        BodyState {
            entity,
            position: Vec2::ZERO,
            velocity,
            angular_velocity: 0.0,
            mass,
            inv_mass,
            inv_inertia: 0.0,
            bounce,
            friction: 0.5,
            apply_friction: true,
            dynamic: mass > 0.0,
            swinging: false,
        }
    }

    fn normal_energy(s: &BodyState, n: Vec2) -> f32 {
        0.5 * s.mass * s.velocity.dot(n).powi(2)
    }

    #[test]
    fn test_separation_split_by_inverse_mass() {
        let mut world = hecs::World::new();
        let a = state(&mut world, 1.0, Vec2::ZERO, 0.0);
        let b = state(&mut world, 3.0, Vec2::ZERO, 0.0);
        let (sa, sb) = separation(&a, &b, Vec2::X, 4.01, 0.01).unwrap();
        assert!((sa - Vec2::new(-3.0, 0.0)).length() < 1e-4);
        assert!((sb - Vec2::new(1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_separation_aborts_for_immovable_pair() {
        let mut world = hecs::World::new();
        let a = state(&mut world, 0.0, Vec2::ZERO, 0.0);
        let b = state(&mut world, 0.0, Vec2::ZERO, 0.0);
        assert!(separation(&a, &b, Vec2::X, 1.0, 0.01).is_none());
    }

    #[test]
    fn test_separating_bodies_get_no_impulse() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let mut a = state(&mut world, 1.0, Vec2::new(-5.0, 0.0), 0.5);
        let mut b = state(&mut world, 1.0, Vec2::new(5.0, 0.0), 0.5);
        let impulse = apply_contact_impulse(&mut a, &mut b, Vec2::X, Vec2::ZERO, Vec2::ZERO, &config);
        assert_eq!(impulse, ContactImpulse::default());
        assert_eq!(a.velocity, Vec2::new(-5.0, 0.0));
    }

    #[test]
    fn test_inelastic_impulse_never_adds_energy() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(3);

        for _ in 0..200 {
            let n = Vec2::from_angle(rng.random_range(0.0..std::f32::consts::TAU));
            let va = Vec2::new(rng.random_range(-400.0..400.0), rng.random_range(-400.0..400.0));
            let vb = Vec2::new(rng.random_range(-400.0..400.0), rng.random_range(-400.0..400.0));
            let mut a = state(&mut world, rng.random_range(0.1..10.0), va, 0.0);
            let mut b = state(&mut world, rng.random_range(0.1..10.0), vb, 0.0);

            let before = normal_energy(&a, n) + normal_energy(&b, n);
            apply_contact_impulse(&mut a, &mut b, n, Vec2::ZERO, Vec2::ZERO, &config);
            let after = normal_energy(&a, n) + normal_energy(&b, n);

            assert!(after <= before * (1.0 + 1e-4) + 1e-3, "{after} > {before}");
        }
    }

    #[test]
    fn test_bounce_uses_lower_restitution() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let mut ball = state(&mut world, 1.0, Vec2::new(0.0, 100.0), 0.8);
        let mut floor = state(&mut world, 0.0, Vec2::ZERO, 0.5);

        apply_contact_impulse(&mut ball, &mut floor, Vec2::Y, Vec2::ZERO, Vec2::ZERO, &config);
        assert!((ball.velocity.y + 50.0).abs() < 1e-3);
        assert_eq!(floor.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_friction_obeys_coulomb() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(1);

        for _ in 0..500 {
            let n = Vec2::from_angle(rng.random_range(0.0..std::f32::consts::TAU));
            let t = n.perp();
            let closing = rng.random_range(0.0..200.0);
            let slide = rng.random_range(-500.0..500.0);

            let mut a = state(&mut world, rng.random_range(0.1..5.0), n * closing + t * slide, 0.0);
            a.friction = rng.random_range(0.0..1.5);
            a.inv_inertia = 1.0 / rng.random_range(1.0..100.0);
            let mut b = state(&mut world, 0.0, Vec2::ZERO, 0.0);
            b.friction = rng.random_range(0.0..1.5);
            let ra = Vec2::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));

            let impulse = apply_contact_impulse(&mut a, &mut b, n, ra, Vec2::ZERO, &config);
            let mu = (a.friction * b.friction).sqrt();
            assert!(impulse.normal >= 0.0);
            assert!(
                impulse.tangent.abs() <= mu * impulse.normal + 1e-4,
                "|{}| > {} * {}",
                impulse.tangent,
                mu,
                impulse.normal
            );
        }
    }

    #[test]
    fn test_friction_skipped_without_slide() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let mut a = state(&mut world, 1.0, Vec2::new(0.0, 50.0), 0.0);
        let mut b = state(&mut world, 0.0, Vec2::ZERO, 0.0);
        let impulse = apply_contact_impulse(&mut a, &mut b, Vec2::Y, Vec2::ZERO, Vec2::ZERO, &config);
        assert!(impulse.normal > 0.0);
        assert_eq!(impulse.tangent, 0.0);
    }

    #[test]
    fn test_pendulum_contact_uses_pendulum_friction() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let mut a = state(&mut world, 1.0, Vec2::new(300.0, 100.0), 0.0);
        let mut b = state(&mut world, 0.0, Vec2::ZERO, 0.0);
        b.swinging = true;

        let impulse = apply_contact_impulse(&mut a, &mut b, Vec2::Y, Vec2::ZERO, Vec2::ZERO, &config);
        assert_eq!(impulse.friction, config.pendulum_friction);
        assert!((impulse.normal - 100.0).abs() < 1e-3);
        assert!((a.velocity.x - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_pendulum_bob_reads_as_kinematic() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let pendulum = Pendulum::new(Vec2::ZERO, 100.0, 0.0).unwrap();
        let bob = world.spawn((Motion::new(pendulum.bob_position(), Vec2::splat(20.0)), pendulum, PhysicsObject::new(10.0)));

        let state = BodyState::read(&world, bob, &config).unwrap();
        assert!(state.swinging);
        assert_eq!(state.inv_mass, 0.0);
        assert_eq!(state.inv_inertia, 0.0);
    }

    fn spawn_floor(world: &mut hecs::World) -> hecs::Entity {
        world.spawn((Motion::new(Vec2::new(0.0, 110.0), Vec2::new(400.0, 20.0)), Platform::default()))
    }

    #[test]
    fn test_box_lands_on_platform() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let floor = spawn_floor(&mut world);
        // Bottom at y = 101, one pixel into the floor.
        let body = world.spawn((
            Motion::new(Vec2::new(0.0, 81.0), Vec2::splat(40.0)).with_velocity(Vec2::new(0.0, 200.0)),
            PhysicsObject::new(1.0),
            Blocked::default(),
        ));
        update_shape_caches(&mut world, &MeshLibrary::new());

        let (info, side) = crate::physics::narrowphase::detect_pair(&world, floor, body).unwrap();
        let collision = Collision {
            entity: floor,
            other: body,
            overlap: info.overlap(),
            normal: info.normal,
            side,
        };
        assert_eq!(collision.side, Side::Top);

        let mut grounded = Vec::new();
        let impulse = resolve_collision(&mut world, &collision, &config, DT, &mut grounded).unwrap();

        assert!(impulse.normal > 0.0);
        assert_eq!(grounded, vec![body]);
        assert_eq!(*world.get::<&OnGround>(body).unwrap(), OnGround(floor));
        assert!(world.get::<&Blocked>(body).unwrap().bottom);

        let motion = world.get::<&Motion>(body).unwrap();
        assert!((motion.position.y - (80.0 + config.resting_overlap)).abs() < 1e-3);
        assert!(motion.velocity.y.abs() < 1e-3);
        assert_eq!(world.get::<&Motion>(floor).unwrap().position, Vec2::new(0.0, 110.0));
    }

    #[test]
    fn test_heavy_body_is_not_pushed() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let heavy = world.spawn((
            Motion::new(Vec2::ZERO, Vec2::splat(20.0)),
            PhysicsObject::new(10.0),
        ));
        let light = world.spawn((
            Motion::new(Vec2::new(18.0, 0.0), Vec2::splat(20.0)).with_velocity(Vec2::new(-100.0, 0.0)),
            PhysicsObject::new(1.0),
        ));
        update_shape_caches(&mut world, &MeshLibrary::new());

        let (info, side) = crate::physics::narrowphase::detect_pair(&world, heavy, light).unwrap();
        let collision = Collision {
            entity: heavy,
            other: light,
            overlap: info.overlap(),
            normal: info.normal,
            side,
        };
        let mut grounded = Vec::new();
        resolve_collision(&mut world, &collision, &config, DT, &mut grounded).unwrap();

        let heavy_motion = world.get::<&Motion>(heavy).unwrap();
        let light_motion = world.get::<&Motion>(light).unwrap();
        assert_eq!(heavy_motion.position, Vec2::ZERO);
        assert_eq!(heavy_motion.velocity, Vec2::ZERO);
        assert!((light_motion.position.x - (20.0 - config.resting_overlap)).abs() < 1e-3);
        assert!(light_motion.velocity.x.abs() < 1e-3);
        assert!(grounded.is_empty());
    }

    #[test]
    fn test_similar_bodies_share_the_push() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let a = world.spawn((
            Motion::new(Vec2::ZERO, Vec2::splat(20.0)).with_velocity(Vec2::new(100.0, 0.0)),
            PhysicsObject::new(1.0),
        ));
        let b = world.spawn((
            Motion::new(Vec2::new(18.0, 0.0), Vec2::splat(20.0)),
            PhysicsObject::new(1.0),
        ));
        update_shape_caches(&mut world, &MeshLibrary::new());

        let (info, side) = crate::physics::narrowphase::detect_pair(&world, a, b).unwrap();
        let collision = Collision {
            entity: a,
            other: b,
            overlap: info.overlap(),
            normal: info.normal,
            side,
        };
        let mut grounded = Vec::new();
        resolve_collision(&mut world, &collision, &config, DT, &mut grounded).unwrap();

        let va = world.get::<&Motion>(a).unwrap().velocity;
        let vb = world.get::<&Motion>(b).unwrap().velocity;
        assert!((va.x - 50.0).abs() < 1e-3);
        assert!((vb.x - 50.0).abs() < 1e-3);
        assert!(world.get::<&Motion>(a).unwrap().position.x < 0.0);
    }

    fn collide(world: &hecs::World, a: hecs::Entity, b: hecs::Entity) -> Collision {
        let (info, side) = crate::physics::narrowphase::detect_pair(world, a, b).unwrap();
        Collision {
            entity: a,
            other: b,
            overlap: info.overlap(),
            normal: info.normal,
            side,
        }
    }

    #[test]
    fn test_contact_point_sits_on_the_ledge() {
        let mut world = hecs::World::new();
        // Top surface at y = 190, right edge at x = 100.
        let ledge = world.spawn((Motion::new(Vec2::new(0.0, 200.0), Vec2::new(200.0, 20.0)), Platform::default()));
        // Tilted toward the drop, touching only the ledge corner.
        let body = world.spawn((
            Motion::new(Vec2::new(110.0, 171.5), Vec2::splat(40.0)).with_angle(5.0),
            PhysicsObject::new(1.0).with_rotation(true),
        ));
        update_shape_caches(&mut world, &MeshLibrary::new());

        let collision = collide(&world, ledge, body);
        let (origin, point) =
            contact_point(&world, body, ledge, -collision.normal, collision.penetration()).unwrap();

        assert_eq!(origin, Vec2::new(110.0, 171.5));
        assert!((point.x - 100.0).abs() < 0.5, "contact at {point}");
        assert!((point.y - 190.0).abs() < 1.0, "contact at {point}");
    }

    #[test]
    fn test_ledge_contact_spins_body_over_the_edge() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        let ledge = world.spawn((Motion::new(Vec2::new(0.0, 200.0), Vec2::new(200.0, 20.0)), Platform::default()));
        let body = world.spawn((
            Motion::new(Vec2::new(110.0, 171.5), Vec2::splat(40.0))
                .with_angle(5.0)
                .with_velocity(Vec2::new(0.0, 50.0)),
            PhysicsObject::new(1.0).with_rotation(true),
        ));
        world.get::<&mut PhysicsObject>(body).unwrap().moment_of_inertia =
            crate::physics::rigid_body::rectangle_inertia(1.0, Vec2::splat(40.0));
        update_shape_caches(&mut world, &MeshLibrary::new());

        let collision = collide(&world, ledge, body);
        let mut grounded = Vec::new();
        let impulse = resolve_collision(&mut world, &collision, &config, DT, &mut grounded).unwrap();

        assert!(impulse.normal > 0.0);
        // Pushed up at the corner left of its centre: clockwise, off the ledge.
        assert!(world.get::<&PhysicsObject>(body).unwrap().angular_velocity > 0.0);
    }

    #[test]
    fn test_wall_contact_keeps_spin() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig::default();
        // Wall spans x in [-10, 10].
        let wall = world.spawn((Motion::new(Vec2::ZERO, Vec2::new(20.0, 400.0)), Platform::default()));
        let mut object = PhysicsObject::new(1.0).with_rotation(true);
        object.moment_of_inertia = crate::physics::rigid_body::rectangle_inertia(1.0, Vec2::splat(20.0));
        object.angular_velocity = 2.0;
        let body = world.spawn((Motion::new(Vec2::new(19.0, 0.0), Vec2::splat(20.0)), object));
        update_shape_caches(&mut world, &MeshLibrary::new());

        let collision = collide(&world, wall, body);
        let mut grounded = Vec::new();
        resolve_collision(&mut world, &collision, &config, DT, &mut grounded).unwrap();

        assert!(grounded.is_empty());
        let spin = world.get::<&PhysicsObject>(body).unwrap().angular_velocity;
        assert!(spin > 1.9, "wall contact damped spin to {spin}");
    }
}
