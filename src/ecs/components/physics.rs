//! Physics components for ECS entities.

use glam::Vec2;

use crate::physics::contact::Side;

/// Dynamic body parameters. Static platforms don't carry one.
#[derive(Debug, Clone)]
pub struct PhysicsObject {
    pub mass: f32,
    /// Coefficient of restitution (0.0 - 1.0).
    pub bounce: f32,
    /// Friction coefficient (default: 0.5).
    pub friction: f32,
    /// Air drag coefficient (default: 0.2).
    pub drag: f32,
    /// Cached moment of inertia. 0.0 means "compute on next use".
    pub moment_of_inertia: f32,
    /// Radians per second, positive is clockwise on a y-down screen.
    pub angular_velocity: f32,
    /// Angular damping factor per second (default: 0.8).
    pub angular_damping: f32,
    pub apply_gravity: bool,
    pub apply_rotation: bool,
    pub apply_air_resistance: bool,
    pub apply_friction: bool,
}

impl PhysicsObject {
    /// Create a dynamic body of the given mass with default flags.
    pub fn new(mass: f32) -> Self {
        Self {
            mass,
            ..Default::default()
        }
    }

    pub fn with_bounce(mut self, bounce: f32) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.apply_rotation = enabled;
        self
    }

    /// `1 / mass`, or 0.0 for massless (immovable) bodies.
    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        if self.mass > f32::EPSILON {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// `1 / I`, or 0.0 when rotation is disabled or the inertia is unknown.
    #[inline]
    pub fn inverse_inertia(&self) -> f32 {
        if self.apply_rotation && self.moment_of_inertia > f32::EPSILON {
            1.0 / self.moment_of_inertia
        } else {
            0.0
        }
    }
}

impl Default for PhysicsObject {
    fn default() -> Self {
        Self {
            mass: 0.1,
            bounce: 0.0,
            friction: 0.5,
            drag: 0.2,
            moment_of_inertia: 0.0,
            angular_velocity: 0.0,
            angular_damping: 0.8,
            apply_gravity: true,
            apply_rotation: false,
            apply_air_resistance: true,
            apply_friction: true,
        }
    }
}

/// Static surface marker. Overrides fall back to `PhysicsConfig` surface
/// defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct Platform {
    pub friction: Option<f32>,
    pub bounce: Option<f32>,
}

/// Sides blocked by contacts in the most recent step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Blocked {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
    /// Normal of the last contact, pointing toward the obstacle.
    pub normal: Vec2,
}

impl Blocked {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Mark the side an obstacle lies on, given the contact normal pointing
    /// from this body toward it.
    pub fn block_toward(&mut self, normal: Vec2) {
        self.normal = normal;
        match Side::from_normal(normal) {
            Side::Left => self.left = true,
            Side::Right => self.right = true,
            Side::Top => self.top = true,
            Side::Bottom => self.bottom = true,
            Side::None => {}
        }
    }

    pub fn is_blocked(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::None => false,
        }
    }
}

/// The entity this body rests on. A weak relation: the ground may be
/// despawned at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnGround(pub hecs::Entity);

/// Airborne marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Falling;

/// Horizontal locomotion intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Walking {
    pub left: bool,
}

/// Ladder locomotion intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Climbing {
    pub up: bool,
}
