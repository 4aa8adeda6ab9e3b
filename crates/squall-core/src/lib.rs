//! Squall Core - Foundational types for the Squall weather effects
//!
//! This crate provides the types that all other Squall crates depend on:
//! - `EffectKind` - which ambient weather layer is running
//! - `Vec2`, `Rgba` - spatial and color types
//! - Error types and Result alias

mod effect;
mod error;
mod types;

pub use effect::EffectKind;
pub use error::{Result, SquallError};
pub use types::{Rgba, Vec2};
