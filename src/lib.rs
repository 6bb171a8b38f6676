//! Gearbox 2D Physics
//!
//! Fixed-timestep platformer physics on top of hecs: convex-polygon
//! collision, composite bodies, moving platforms and swinging pendulums that
//! carry their riders, Coulomb friction and gravity-driven tipping.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **mesh** - Mesh assets addressed by `MeshId`
//! 2. **ecs** - Components (`Motion`, `PhysicsObject`, `CompositeMesh`, `MovementPath`, `Pendulum`, tags)
//! 3. **physics** - Shape caches, broadphase, SAT narrowphase, resolution, scheduler
//! 4. **error** - Construction-time validation errors

pub mod ecs;
pub mod error;
pub mod mesh;
pub mod physics;

// Re-export commonly used types
pub use ecs::prelude::*;
pub use error::{PhysicsError, Result};
pub use mesh::{MeshId, MeshLibrary};
pub use physics::contact::{Collision, ContactImpulse, Side};
pub use physics::{PhysicsConfig, PhysicsWorld};

// Re-export dependencies
pub use glam;
pub use hecs;
