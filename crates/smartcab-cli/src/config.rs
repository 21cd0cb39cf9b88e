//! Configuration loading for the smartcab CLI

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use smartcab_rl::{AgentConfig, ExportConfig};
use smartcab_sim::{SimulationConfig, WorldConfig};

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "smartcab.toml";

/// Prefix for environment overrides, e.g. `SMARTCAB__SIMULATION__TRIALS=50`
const ENV_PREFIX: &str = "SMARTCAB";

/// Effective configuration for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub world: WorldConfig,
    pub simulation: SimulationConfig,
    pub learning: AgentConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from an optional file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::build(path, None)
    }

    /// Layer a file (if any) under environment overrides.
    ///
    /// `env` replaces the process environment when given.
    fn build(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.world.validate().context("Invalid [world] configuration")?;
        self.learning
            .validate()
            .context("Invalid [learning] configuration")?;
        Ok(())
    }

    /// Find the configuration file.
    ///
    /// Checks in order: an explicit path, `SMARTCAB_CONFIG`, `./smartcab.toml`,
    /// then `~/.config/smartcab/smartcab.toml`.
    pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var("SMARTCAB_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".config").join("smartcab").join(CONFIG_FILE_NAME);
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }
}
