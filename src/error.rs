//! Construction-time validation errors.
//!
//! The per-step pipeline never fails; these only surface when building
//! paths, meshes or configs from untrusted data (level files, tools).

use thiserror::Error;

/// Errors raised while building physics inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("movement path has no segments")]
    EmptyPath,

    #[error("path segment {index} has invalid duration {duration}")]
    InvalidSegmentDuration { index: usize, duration: f32 },

    #[error("pendulum length must be positive and finite, got {0}")]
    InvalidPendulumLength(f32),

    #[error("mesh needs at least 3 finite vertices, got {0}")]
    DegenerateMesh(usize),

    #[error("invalid physics config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
