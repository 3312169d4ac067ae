//! Runtime collaborator configuration.

use serde::{Deserialize, Serialize};

/// Runtime collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Prefix handed to the runtime for renamed native methods, so rewritten
    /// units can delegate to the original implementations.
    #[serde(default = "default_native_prefix")]
    pub native_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            native_prefix: default_native_prefix(),
        }
    }
}

fn default_native_prefix() -> String {
    "$$bytegate$$_".to_string()
}
