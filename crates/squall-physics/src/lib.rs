//! Squall Physics - Rapier 2D particle world
//!
//! Thin owner of one physics world per effect layer:
//! - `ParticleWorld` - wraps the Rapier pipeline; steps, creates and destroys particle groups
//! - `ParticleGroupDef` / `GroupShape` - what a new group looks like
//! - `ParticleGroupHandle` - opaque, never-reused group id

pub mod group;
pub mod world;

pub use group::{GroupShape, ParticleGroupDef, ParticleGroupHandle};
pub use world::{GroundConfig, ParticleWorld, WorldConfig};
