//! Extension loading errors.

use std::path::PathBuf;

use thiserror::Error;

use bytegate_core::error::AgentError;

/// Why a single extension package failed to load.
///
/// Loading is fault-isolated per package, so these errors are recorded in
/// the load report instead of aborting the pass.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The package manifest exists but could not be read.
    #[error("cannot read package manifest {path}: {source}")]
    ManifestUnreadable {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest names an entry the namespace does not define.
    #[error("entry `{entry}` of package `{package}` did not resolve")]
    EntryUnresolved {
        /// Entry name from the manifest.
        entry: String,
        /// Package stem.
        package: String,
    },

    /// The per-extension configuration file exists but could not be read.
    #[error("cannot read configuration for `{plugin}`: {source}")]
    ConfUnreadable {
        /// Extension name.
        plugin: String,
        /// Underlying error.
        #[source]
        source: AgentError,
    },

    /// The extension's `init` hook reported an error.
    #[error("extension `{plugin}` failed to initialize: {source}")]
    Init {
        /// Extension name.
        plugin: String,
        /// Error returned by the extension.
        #[source]
        source: AgentError,
    },

    /// Publishing the package's definitions into the shared namespace failed.
    #[error("shared-namespace injection failed for package `{package}`: {source}")]
    Injection {
        /// Package stem.
        package: String,
        /// Error reported by the instrumentation handle.
        #[source]
        source: AgentError,
    },

    /// A dynamic library could not be opened or is missing export symbols.
    #[error("cannot load library {path}: {message}")]
    LibraryLoad {
        /// Library path.
        path: PathBuf,
        /// Loader diagnostic.
        message: String,
    },

    /// A dynamic library was built against a different plugin ABI.
    #[error("library {path} uses plugin ABI {found}, expected {expected}")]
    AbiMismatch {
        /// Library path.
        path: PathBuf,
        /// ABI version the library reports.
        found: u32,
        /// ABI version this loader supports.
        expected: u32,
    },

    /// The load task for this package panicked.
    #[error("load task for package `{package}` panicked")]
    TaskPanic {
        /// Package stem.
        package: String,
    },

    /// The load limiter shut down while the package was waiting.
    #[error("load limiter closed before the package was admitted")]
    Semaphore,
}

impl From<LoadError> for AgentError {
    fn from(err: LoadError) -> Self {
        AgentError::plugin_load(err.to_string())
    }
}
