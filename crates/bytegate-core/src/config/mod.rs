//! Agent configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod plugins;
pub mod runtime;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::plugins::PluginsConfig;
use self::runtime::RuntimeConfig;

use crate::error::AgentError;

/// Root agent configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration file and environment variable overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Extension loading settings.
    #[serde(default)]
    pub plugins: PluginsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Runtime collaborator settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl AgentConfig {
    /// Load configuration for an agent rooted at `base_dir`.
    ///
    /// Merges `<base_dir>/config/agent.toml` (optional) with environment
    /// variables prefixed with `BYTEGATE`.
    pub fn load(base_dir: &Path) -> Result<Self, AgentError> {
        let file = base_dir.join("config").join("agent.toml");

        let config = config::Config::builder()
            .add_source(config::File::from(file).required(false))
            .add_source(
                config::Environment::with_prefix("BYTEGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AgentError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AgentError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            plugins: PluginsConfig::default(),
            logging: LoggingConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}
