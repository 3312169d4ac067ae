//! # bytegate-plugin
//!
//! Extension framework for Bytegate. Provides:
//!
//! - Package discovery and manifest parsing
//! - Concurrent, fault-isolated extension loading with a bounded limiter
//!   and an aggregate deadline
//! - Transformer registry and the load dispatcher installed on the
//!   runtime's interception callback
//! - The one-time retransformation pass for units active before attach
//! - Optional dynamic loading via `libloading` (`dynamic` feature)

pub mod descriptor;
pub mod driver;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod namespace;

pub use descriptor::{ExtensionDescriptor, ExtensionSummary};
pub use driver::{AgentPhase, PhaseCell, Retransformer, RetransformReport};
pub use error::LoadError;
pub use hooks::dispatcher::Dispatcher;
pub use hooks::registry::TransformerRegistry;
pub use loader::{ABI_VERSION, DynamicLoader};
pub use manager::{LoadOutcome, LoadReport, PluginManager};
pub use manifest::{PACKAGE_SUFFIX, PackageManifest};
pub use namespace::PackageNamespace;
