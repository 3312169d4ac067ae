//! Core traits defined in `bytegate-core` and implemented by other crates.

pub mod entry;
pub mod instrumentation;
pub mod transformer;

pub use entry::PluginEntry;
pub use instrumentation::{Instrumentation, LoadInterceptor};
pub use transformer::{Registration, TransformError, Transformer};
