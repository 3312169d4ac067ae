//! Extension loading configuration.

use serde::{Deserialize, Serialize};

/// Extension loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Directory containing extension packages, relative to the agent base
    /// directory (absolute paths are honored as-is).
    #[serde(default = "default_directory")]
    pub directory: String,
    /// File-name suffix marking a package as disabled.
    #[serde(default = "default_disabled_suffix")]
    pub disabled_suffix: String,
    /// Aggregate deadline for loading all discovered packages, in seconds.
    #[serde(default = "default_load_timeout")]
    pub load_timeout_secs: u64,
    /// Maximum number of packages loaded concurrently.
    #[serde(default = "default_max_concurrent_loads")]
    pub max_concurrent_loads: usize,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            disabled_suffix: default_disabled_suffix(),
            load_timeout_secs: default_load_timeout(),
            max_concurrent_loads: default_max_concurrent_loads(),
        }
    }
}

fn default_directory() -> String {
    "plugins".to_string()
}

fn default_disabled_suffix() -> String {
    ".disabled".to_string()
}

fn default_load_timeout() -> u64 {
    30
}

fn default_max_concurrent_loads() -> usize {
    4
}
