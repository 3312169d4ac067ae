//! Extension entry-point contract.

use async_trait::async_trait;

use crate::conf::PluginConf;
use crate::environment::Environment;
use crate::result::AgentResult;
use crate::traits::transformer::Registration;

/// The capability contract every extension entry point implements.
///
/// The loader constructs one entry per package, initializes it with the
/// shared environment and the extension's own configuration, then collects
/// its transformer registrations. After registration the entry is retained
/// read-only for the process lifetime.
#[async_trait]
pub trait PluginEntry: Send + Sync + std::fmt::Debug {
    /// Extension name. Also selects the configuration file name
    /// (`<lowercased name>.conf`).
    fn name(&self) -> &str;

    /// Extension version string.
    fn version(&self) -> &str;

    /// Author or maintainer.
    fn author(&self) -> &str;

    /// Initialize the extension. Called once, before registration.
    async fn init(&mut self, env: &Environment, conf: &PluginConf) -> AgentResult<()>;

    /// Return the handler registrations this extension contributes.
    fn transformers(&self) -> Vec<Registration>;
}
