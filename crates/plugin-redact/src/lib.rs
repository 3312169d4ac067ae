//! Byte-pattern redaction extension for Bytegate.
//!
//! Replaces configured byte patterns in unit representations before they
//! load. Rules live in the extension configuration (`redact.conf`) as
//! repeated `rule` keys; see [`rules`] for the format. The extension works
//! compiled-in (register [`definitions`] under the package stem) or as a
//! dynamic library built from this crate's `cdylib` target.

pub mod plugin;
pub mod rules;
pub mod transformer;

pub use plugin::{definitions, RedactEntry, ENTRY_NAME};
pub use rules::{RedactRule, RuleError};
pub use transformer::RedactTransformer;

bytegate_plugin_sdk::export_plugin!(RedactEntry);
