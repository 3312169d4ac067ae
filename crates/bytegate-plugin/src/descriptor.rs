//! Descriptors for successfully loaded extensions.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use bytegate_core::traits::entry::PluginEntry;

/// A successfully loaded extension.
///
/// The descriptor owns the initialized entry point and keeps it alive for
/// the process lifetime; loaded extensions are never unloaded.
#[derive(Debug)]
pub struct ExtensionDescriptor {
    /// Extension name, as reported by its entry point.
    pub name: String,
    /// Extension version.
    pub version: String,
    /// Author or maintainer.
    pub author: String,
    /// Package stem the extension was loaded from.
    pub package: String,
    /// Handle of the namespace the extension resolves through.
    pub namespace: Uuid,
    /// Number of transformer registrations the extension contributed.
    pub registrations: usize,
    /// Configuration file consulted during initialization.
    pub conf_path: Option<PathBuf>,
    /// The initialized entry point.
    pub entry: Arc<dyn PluginEntry>,
    /// When loading completed.
    pub loaded_at: DateTime<Utc>,
}

impl ExtensionDescriptor {
    /// Serializable summary of this extension.
    pub fn summary(&self) -> ExtensionSummary {
        ExtensionSummary {
            name: self.name.clone(),
            version: self.version.clone(),
            author: self.author.clone(),
            package: self.package.clone(),
            registrations: self.registrations,
            loaded_at: self.loaded_at,
        }
    }
}

/// Metadata about a loaded extension, for reports and logs.
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionSummary {
    /// Extension name.
    pub name: String,
    /// Extension version.
    pub version: String,
    /// Author or maintainer.
    pub author: String,
    /// Package stem.
    pub package: String,
    /// Number of transformer registrations.
    pub registrations: usize,
    /// When loading completed.
    pub loaded_at: DateTime<Utc>,
}
