//! Entity Component System integration with hecs.
//!
//! Entities are polymorphic only through the components they carry; every
//! pipeline stage asks "does this entity have X" through hecs queries.

pub mod components;

pub mod prelude {
    pub use super::components::*;
}
