//! Combat configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing CombatConfig
    ///
    /// # Returns
    ///
    /// Returns a CombatConfig. Keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a CombatConfig from TOML text.
    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.frames_per_second == 0 {
            anyhow::bail!("frames_per_second must be greater than zero");
        }
        if let Some(scaling) = config.level_scaling
            && scaling.min > scaling.max
        {
            anyhow::bail!(
                "level_scaling.min ({}) exceeds level_scaling.max ({})",
                scaling.min,
                scaling.max
            );
        }

        Ok(config)
    }
}
