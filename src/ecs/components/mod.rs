//! ECS components (motion, physics bodies, meshes, movement paths, pendulums).

pub mod mesh;
pub mod motion;
pub mod path;
pub mod pendulum;
pub mod physics;

pub use mesh::*;
pub use motion::*;
pub use path::*;
pub use pendulum::*;
pub use physics::*;
