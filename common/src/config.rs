use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Tunables for the object model, loadable from a TOML file.
///
/// All fields default to their standard values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonConfig {
    /// Record a trajectory sample every time a grenade position is tracked
    pub track_grenade_trajectories: bool,
    /// Keep at most this many trajectory samples per grenade
    pub max_trajectory_len: Option<usize>,
    /// Tick rate used for flash timing when the demo does not report one
    pub fallback_tick_rate: Option<f64>,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            track_grenade_trajectories: true,
            max_trajectory_len: None,
            fallback_tick_rate: None,
        }
    }
}

impl CommonConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// Generate a commented default TOML config string.
    pub fn generate_default_toml() -> String {
        r#"# Demo object model configuration

# Record grenade positions as they are tracked
track_grenade_trajectories = true

# Upper bound of samples kept per grenade trajectory (unset = unlimited)
# max_trajectory_len = 512

# Tick rate assumed for flash timing when the demo reports none (unset = no decay)
# fallback_tick_rate = 64.0
"#
        .to_string()
    }
}
