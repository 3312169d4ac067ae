//! Unified error types for Bytegate.
//!
//! All crates map their internal errors into [`AgentError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A configuration error occurred.
    Configuration,
    /// An I/O error occurred.
    Io,
    /// An extension package failed to load.
    PluginLoad,
    /// A namespace lookup or injection error occurred.
    Namespace,
    /// The runtime collaborator reported a fault.
    Instrumentation,
    /// An operation exceeded its deadline.
    Timeout,
    /// The retransformation pass failed or was re-entered.
    Retransform,
    /// The agent is already attached to this runtime.
    AlreadyAttached,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Io => write!(f, "IO"),
            Self::PluginLoad => write!(f, "PLUGIN_LOAD"),
            Self::Namespace => write!(f, "NAMESPACE"),
            Self::Instrumentation => write!(f, "INSTRUMENTATION"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Retransform => write!(f, "RETRANSFORM"),
            Self::AlreadyAttached => write!(f, "ALREADY_ATTACHED"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error type used throughout Bytegate.
///
/// All crate-specific errors are mapped into `AgentError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type at the
/// framework boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AgentError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AgentError {
    /// Create a new agent error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new agent error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a plugin-load error.
    pub fn plugin_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PluginLoad, message)
    }

    /// Create a namespace error.
    pub fn namespace(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Namespace, message)
    }

    /// Create an instrumentation error.
    pub fn instrumentation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Instrumentation, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a retransform error.
    pub fn retransform(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Retransform, message)
    }

    /// Create an already-attached error.
    pub fn already_attached(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyAttached, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AgentError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AgentError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
