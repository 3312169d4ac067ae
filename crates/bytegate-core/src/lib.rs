//! # bytegate-core
//!
//! Core crate for Bytegate. Contains the runtime collaborator traits, the
//! transformer and entry-point contracts, configuration schemas, the plain
//! key/value extension configuration format, the shared environment, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Bytegate crates.

pub mod conf;
pub mod config;
pub mod environment;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use conf::PluginConf;
pub use environment::Environment;
pub use error::AgentError;
pub use result::AgentResult;
