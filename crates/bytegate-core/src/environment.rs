//! Process-wide attach context.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::traits::instrumentation::Instrumentation;

/// Read-only context shared by every framework component.
///
/// Constructed once at attach and never mutated afterwards; components hold
/// it by `Arc` reference.
#[derive(Debug)]
pub struct Environment {
    /// Handle to the managed execution environment.
    instrumentation: Arc<dyn Instrumentation>,
    /// Directory the agent is rooted at.
    base_dir: PathBuf,
    /// Directory scanned for extension packages.
    plugins_dir: PathBuf,
    /// Directory holding the agent and per-extension configuration files.
    config_dir: PathBuf,
    /// Directory reserved for diagnostic output files.
    logs_dir: PathBuf,
    /// File-name suffix marking a package as disabled.
    disabled_suffix: String,
    /// Prefix announced to the runtime for renamed native methods.
    native_prefix: String,
    /// Whether the agent was attached to an already-running process.
    attach_mode: bool,
    /// Opaque options string handed through by the attach front end.
    raw_options: Option<String>,
}

impl Environment {
    /// Build the environment from the agent configuration.
    ///
    /// The plugins directory comes from `config.plugins.directory`, resolved
    /// against `base_dir` when relative; the `config` and `logs` directories
    /// are fixed children of `base_dir`.
    pub fn new(
        instrumentation: Arc<dyn Instrumentation>,
        base_dir: PathBuf,
        config: &AgentConfig,
        attach_mode: bool,
        raw_options: Option<String>,
    ) -> Self {
        let plugins_dir = base_dir.join(&config.plugins.directory);
        let config_dir = base_dir.join("config");
        let logs_dir = base_dir.join("logs");

        Self {
            instrumentation,
            base_dir,
            plugins_dir,
            config_dir,
            logs_dir,
            disabled_suffix: config.plugins.disabled_suffix.clone(),
            native_prefix: config.runtime.native_prefix.clone(),
            attach_mode,
            raw_options,
        }
    }

    /// Handle to the managed execution environment.
    pub fn instrumentation(&self) -> &Arc<dyn Instrumentation> {
        &self.instrumentation
    }

    /// Directory the agent is rooted at.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory scanned for extension packages.
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// Directory holding configuration files.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Directory reserved for diagnostic output files.
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// File-name suffix marking a package as disabled.
    pub fn disabled_suffix(&self) -> &str {
        &self.disabled_suffix
    }

    /// Prefix announced to the runtime for renamed native methods.
    pub fn native_prefix(&self) -> &str {
        &self.native_prefix
    }

    /// Whether the agent was attached to an already-running process.
    pub fn attach_mode(&self) -> bool {
        self.attach_mode
    }

    /// Opaque options string handed through by the attach front end.
    pub fn raw_options(&self) -> Option<&str> {
        self.raw_options.as_deref()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "base={}, plugins={}, attach_mode={}",
            self.base_dir.display(),
            self.plugins_dir.display(),
            self.attach_mode
        )
    }
}
