//! # bytegate
//!
//! Runtime code-interception agent. Bytegate attaches to a managed runtime,
//! loads extension packages from a plugin directory, installs a dispatcher on
//! the runtime's unit-load callback, and retransforms units that were already
//! active before attach so extensions apply uniformly.
//!
//! This crate is the embedding facade: implement [`Instrumentation`] for your
//! runtime, then attach with [`Agent::builder`].
//!
//! ```rust,ignore
//! let agent = Agent::builder(runtime)
//!     .base_dir("/opt/bytegate")
//!     .attach()
//!     .await?;
//! tracing::info!(extensions = agent.load_report().loaded.len(), "attached");
//! ```
//!
//! Extension authors should depend on the SDK instead, re-exported here as
//! [`sdk`].

pub mod agent;

pub use agent::{Agent, AgentBuilder};

pub use bytegate_core::conf::PluginConf;
pub use bytegate_core::config::AgentConfig;
pub use bytegate_core::environment::Environment;
pub use bytegate_core::error::{AgentError, ErrorKind};
pub use bytegate_core::result::AgentResult;
pub use bytegate_core::traits::entry::PluginEntry;
pub use bytegate_core::traits::instrumentation::{Instrumentation, LoadInterceptor};
pub use bytegate_core::traits::transformer::{Registration, TransformError, Transformer};
pub use bytegate_core::types::context::{LoadContext, LoadKind};
pub use bytegate_core::types::definition::{Definition, DefinitionTable, EntryFactory};
pub use bytegate_core::types::unit::UnitName;

pub use bytegate_plugin::descriptor::{ExtensionDescriptor, ExtensionSummary};
pub use bytegate_plugin::driver::{AgentPhase, RetransformReport};
pub use bytegate_plugin::error::LoadError;
pub use bytegate_plugin::hooks::dispatcher::Dispatcher;
pub use bytegate_plugin::manager::{LoadReport, PluginManager};

pub use bytegate_plugin_sdk as sdk;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
