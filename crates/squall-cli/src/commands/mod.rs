//! CLI command implementations

pub mod disintegrate;
pub mod run;
pub mod simulate;

use anyhow::{Context, Result};
use squall_particles::EffectsConfig;
use std::path::Path;

/// Built-in presets, overridden by the TOML file at `path` when given
pub fn load_config(path: Option<&str>) -> Result<EffectsConfig> {
    match path {
        Some(path) => EffectsConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path)),
        None => Ok(EffectsConfig::default()),
    }
}
