//! Fixed-timestep 2D platformer physics.
//!
//! # Architecture
//!
//! Each sub-step runs a strict pipeline:
//!
//! 1. Integrate (gravity, walking/climbing, rotation, positions)
//! 2. Advance movement paths and swing pendulums
//! 3. Rebuild stale shape caches
//! 4. Broadphase (sweep and prune over AABBs)
//! 5. Narrowphase (SAT, composite sub-shape pairs)
//! 6. Clear `Blocked`
//! 7. Resolve collisions (correction, impulses, friction, tipping)
//! 8. Ground/Falling bookkeeping and platform carry
//! 9. Downstream hook
//!
//! Coordinates are pixels with y pointing down.

pub mod broadphase;
pub mod collider;
pub mod contact;
pub mod ground;
pub mod narrowphase;
pub mod path;
pub mod pendulum;
pub mod rigid_body;
pub mod shape;
pub mod solver;
pub mod stability;

use tracing::{debug, trace, warn};

use crate::error::{PhysicsError, Result};
use crate::mesh::MeshLibrary;

use self::broadphase::SweepAndPrune;
use self::contact::Collision;
use self::narrowphase::detect_pair;

/// Configuration for the physics simulation.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Fixed timestep in seconds. Default: 1/120.
    pub fixed_timestep: f64,
    /// Cap on accumulated frame time in seconds. Default: 0.25.
    pub max_frame_time: f64,
    /// Downward acceleration in px/s². Default: 490 (9.8 m/s² at 50 px/m).
    pub gravity: f32,
    /// Terminal fall speed in px/s. Default: 1000.
    pub max_fall_speed: f32,
    /// Walking acceleration in px/s². Default: 500.
    pub walk_acceleration: f32,
    /// Walking speed cap in px/s. Default: 300.
    pub max_walk_speed: f32,
    /// Walking deceleration once `Walking` is removed, px/s². Default: 1500.
    pub walk_deceleration: f32,
    /// Climbing speed in px/s. Default: 200.
    pub climb_speed: f32,
    /// Steepest surface, in degrees from flat, that still counts as ground.
    /// Default: 46.
    pub walk_angle: f32,
    /// Overlap left behind by position correction, in px. Default: 0.01.
    pub resting_overlap: f32,
    /// Closing speeds below this bounce with zero restitution, px/s.
    /// Default: 1.
    pub rest_velocity_threshold: f32,
    /// Friction of surfaces without a `PhysicsObject`. Default: 0.8.
    pub surface_friction: f32,
    /// Restitution of surfaces without a `PhysicsObject`. Default: 1.0.
    pub surface_bounce: f32,
    /// Mass ratio at which the heavier of two dynamic bodies stops yielding.
    /// Default: 4.
    pub push_mass_ratio: f32,
    /// Air density in px-scaled units. Default: 1.0e-5.
    pub air_density: f32,
    /// Rate at which `applied_velocity` decays off a moving platform, px/s².
    /// Default: 250.
    pub applied_velocity_decay: f32,
    /// Rate at which riders pick up a platform's velocity, px/s². Default: 600.
    pub platform_carry_rate: f32,
    /// Distance from a surface edge at which a vertex supports a body, px.
    /// Default: 8.
    pub support_distance: f32,
    /// Slack on the support interval before a body tips, px. Default: 1.
    pub support_tolerance: f32,
    /// Angular velocity multiplier for stable resting bodies. Default: 0.02.
    pub stable_angular_damping: f32,
    /// Friction coefficient of any contact with a pendulum bob. Default: 1.
    pub pendulum_friction: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 120.0,
            max_frame_time: 0.25,
            gravity: 490.0,
            max_fall_speed: 1000.0,
            walk_acceleration: 500.0,
            max_walk_speed: 300.0,
            walk_deceleration: 1500.0,
            climb_speed: 200.0,
            walk_angle: 46.0,
            resting_overlap: 0.01,
            rest_velocity_threshold: 1.0,
            surface_friction: 0.8,
            surface_bounce: 1.0,
            push_mass_ratio: 4.0,
            air_density: 1.0e-5,
            applied_velocity_decay: 250.0,
            platform_carry_rate: 600.0,
            support_distance: 8.0,
            support_tolerance: 1.0,
            stable_angular_damping: 0.02,
            pendulum_friction: 1.0,
        }
    }
}

impl PhysicsConfig {
    /// Minimum upward component of a contact normal for the surface to
    /// count as ground.
    #[inline]
    pub fn ground_threshold(&self) -> f32 {
        self.walk_angle.to_radians().cos()
    }

    /// Reject configurations the pipeline cannot step.
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig("fixed_timestep must be positive"));
        }
        if !(self.max_frame_time >= self.fixed_timestep) {
            return Err(PhysicsError::InvalidConfig(
                "max_frame_time must be at least one fixed_timestep",
            ));
        }
        if !(self.walk_angle > 0.0 && self.walk_angle < 90.0) {
            return Err(PhysicsError::InvalidConfig("walk_angle must be within (0, 90) degrees"));
        }
        if !(self.push_mass_ratio >= 1.0) {
            return Err(PhysicsError::InvalidConfig("push_mass_ratio must be at least 1"));
        }
        let non_negative = [
            self.gravity,
            self.max_fall_speed,
            self.walk_acceleration,
            self.max_walk_speed,
            self.walk_deceleration,
            self.climb_speed,
            self.resting_overlap,
            self.rest_velocity_threshold,
            self.surface_friction,
            self.surface_bounce,
            self.air_density,
            self.applied_velocity_decay,
            self.platform_carry_rate,
            self.support_distance,
            self.support_tolerance,
            self.stable_angular_damping,
            self.pendulum_friction,
        ];
        if non_negative.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(PhysicsError::InvalidConfig("tunables must be finite and non-negative"));
        }
        Ok(())
    }
}

/// The physics world: owns the accumulator, broadphase state, mesh assets
/// and the last sub-step's collision records.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    accumulator: f64,
    broadphase: SweepAndPrune,
    meshes: MeshLibrary,
    collisions: Vec<Collision>,
}

impl PhysicsWorld {
    /// Create a new physics world, rejecting configurations that
    /// [`PhysicsConfig::validate`] refuses.
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            accumulator: 0.0,
            broadphase: SweepAndPrune::new(),
            meshes: MeshLibrary::new(),
            collisions: Vec::new(),
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn meshes(&self) -> &MeshLibrary {
        &self.meshes
    }

    /// Mesh assets, for registering custom shapes.
    pub fn meshes_mut(&mut self) -> &mut MeshLibrary {
        &mut self.meshes
    }

    /// Collision records from the most recent sub-step.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Step the simulation forward by `delta_time` seconds of wall-clock
    /// time. Returns the number of sub-steps run.
    pub fn step(&mut self, world: &mut hecs::World, delta_time: f64) -> u32 {
        self.step_with(world, delta_time, |_, _| {})
    }

    /// Like [`step`](Self::step), calling `hook` after every sub-step with
    /// that sub-step's collisions.
    pub fn step_with<F>(&mut self, world: &mut hecs::World, delta_time: f64, mut hook: F) -> u32
    where
        F: FnMut(&mut hecs::World, &[Collision]),
    {
        self.accumulator += delta_time.max(0.0);

        // Avoid the spiral of death after a long stall
        if self.accumulator > self.config.max_frame_time {
            warn!(
                "Physics fell behind by {:.3}s, clamping to {:.3}s",
                self.accumulator, self.config.max_frame_time
            );
            self.accumulator = self.config.max_frame_time;
        }

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep {
            self.fixed_step(world, self.config.fixed_timestep as f32);
            hook(world, &self.collisions);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        if substeps > 1 {
            debug!("Ran {} physics sub-steps", substeps);
        }
        substeps
    }

    fn fixed_step(&mut self, world: &mut hecs::World, dt: f32) {
        // 1. Integrate
        rigid_body::update_inertia(world);
        rigid_body::apply_gravity(world, &self.config, dt);
        rigid_body::apply_locomotion(world, &self.config, dt);
        rigid_body::integrate_rotation(world, dt);
        rigid_body::integrate_positions(world, dt);

        // 2. Movement paths and pendulums
        path::advance_paths(world, dt);
        pendulum::swing_pendulums(world, &self.config, dt);
        pendulum::update_rods(world);

        // 3. Shape caches
        let rebuilt = shape::update_shape_caches(world, &self.meshes);

        // 4. Broadphase
        let pairs = self.broadphase.find_pairs(world);

        // 5. Narrowphase
        self.collisions.clear();
        for &(a, b) in &pairs {
            if let Some((info, side)) = detect_pair(world, a, b) {
                self.collisions.push(Collision {
                    entity: a,
                    other: b,
                    overlap: info.overlap(),
                    normal: info.normal,
                    side,
                });
            }
        }
        trace!(
            "Rebuilt {} caches, {} pairs, {} collisions",
            rebuilt,
            pairs.len(),
            self.collisions.len()
        );

        // 6-7. Resolution re-sets Blocked
        ground::reset_blocked(world);
        let grounded = solver::resolve_contacts(world, &self.collisions, &self.config, dt);

        // 8. Bookkeeping
        ground::update_ground_state(world, &self.config, &grounded, dt);
    }
}
