//! Weather effect selector

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SquallError;

/// Which ambient layer the host should run. `None` turns every layer off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Rain,
    Snow,
    Smoke,
    #[default]
    None,
}

impl EffectKind {
    pub const LAYERS: [EffectKind; 3] = [EffectKind::Rain, EffectKind::Snow, EffectKind::Smoke];

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Rain => "rain",
            EffectKind::Snow => "snow",
            EffectKind::Smoke => "smoke",
            EffectKind::None => "none",
        }
    }

    /// Smoke enters from the bottom edge and rises; everything else falls.
    pub fn rises(&self) -> bool {
        matches!(self, EffectKind::Smoke)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = SquallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rain" => Ok(EffectKind::Rain),
            "snow" => Ok(EffectKind::Snow),
            "smoke" | "haze" => Ok(EffectKind::Smoke),
            "none" | "off" => Ok(EffectKind::None),
            other => Err(SquallError::Config(format!(
                "unknown effect '{}'; valid values: rain, snow, smoke, none",
                other
            ))),
        }
    }
}
