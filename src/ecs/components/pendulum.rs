//! Swinging pendulum platforms.

use glam::Vec2;

use crate::error::{PhysicsError, Result};

/// A bob swinging on a rigid rod about `pivot`.
///
/// `angle` is in radians from straight down, positive toward +x. The bob's
/// `Motion` position and velocity are derived from it every step, so the bob
/// behaves like a kinematic platform: it carries riders and is never pushed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pendulum {
    pub pivot: Vec2,
    pub length: f32,
    pub angle: f32,
    /// Radians per second.
    pub angular_velocity: f32,
    /// Fraction of angular velocity lost per second (default: 0.0).
    pub damping: f32,
}

impl Pendulum {
    /// Rejects non-finite or non-positive rod lengths.
    pub fn new(pivot: Vec2, length: f32, angle: f32) -> Result<Self> {
        if !(length.is_finite() && length > 0.0) {
            return Err(PhysicsError::InvalidPendulumLength(length));
        }
        Ok(Self {
            pivot,
            length,
            angle,
            angular_velocity: 0.0,
            damping: 0.0,
        })
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Where the bob hangs for the current angle.
    #[inline]
    pub fn bob_position(&self) -> Vec2 {
        self.pivot + self.length * Vec2::new(self.angle.sin(), self.angle.cos())
    }

    /// Linear velocity of the bob, tangent to its arc.
    #[inline]
    pub fn bob_velocity(&self) -> Vec2 {
        self.angular_velocity * self.length * Vec2::new(self.angle.cos(), -self.angle.sin())
    }
}

/// Rod drawn from a pendulum's pivot to its bob. Rods never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendulumRod {
    pub bob: hecs::Entity,
}
