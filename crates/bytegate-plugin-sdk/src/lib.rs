//! # bytegate-plugin-sdk
//!
//! SDK for developing Bytegate extensions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bytegate_plugin_sdk::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct MyEntry {
//!     marker: Vec<u8>,
//! }
//!
//! #[async_trait]
//! impl PluginEntry for MyEntry {
//!     fn name(&self) -> &str {
//!         "my-extension"
//!     }
//!
//!     fn version(&self) -> &str {
//!         "1.0.0"
//!     }
//!
//!     fn author(&self) -> &str {
//!         "Developer"
//!     }
//!
//!     async fn init(&mut self, _env: &Environment, conf: &PluginConf) -> AgentResult<()> {
//!         self.marker = conf.get("marker").unwrap_or("X").as_bytes().to_vec();
//!         Ok(())
//!     }
//!
//!     fn transformers(&self) -> Vec<Registration> {
//!         let marker = self.marker.clone();
//!         Registrations::new()
//!             .on_fn("com.example.Stamped", "stamp", move |_unit, bytes, _ctx| {
//!                 let mut out = bytes.to_vec();
//!                 out.extend_from_slice(&marker);
//!                 Ok(Some(out))
//!             })
//!             .build()
//!     }
//! }
//!
//! // For packages shipped as a dynamic library:
//! bytegate_plugin_sdk::export_plugin!(MyEntry);
//! ```

pub mod definitions;
pub mod macros;
pub mod registrations;
pub mod transformers;

pub use bytegate_plugin::loader::ABI_VERSION;

/// Prelude for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use bytegate_core::conf::PluginConf;
    pub use bytegate_core::environment::Environment;
    pub use bytegate_core::error::AgentError;
    pub use bytegate_core::result::AgentResult;
    pub use bytegate_core::traits::entry::PluginEntry;
    pub use bytegate_core::traits::transformer::{Registration, TransformError, Transformer};
    pub use bytegate_core::types::context::{LoadContext, LoadKind};
    pub use bytegate_core::types::definition::{Definition, DefinitionTable, EntryFactory};
    pub use bytegate_core::types::unit::UnitName;

    pub use crate::definitions::DefinitionTableBuilder;
    pub use crate::registrations::Registrations;
    pub use crate::transformers::FnTransformer;
}
