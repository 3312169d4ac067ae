//! Rewrite handler trait and registration types.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::types::context::LoadContext;
use crate::types::unit::UnitName;

/// Error reported by a transformer that could not rewrite a unit.
///
/// The dispatcher contains these faults: a failing handler stops its chain
/// and the unit keeps the last successfully produced representation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransformError {
    /// A human-readable description of the fault.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransformError {
    /// Create a new transform error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new transform error with an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<String> for TransformError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for TransformError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A rewrite handler for one code unit.
///
/// Transformers run synchronously: the runtime invokes the interception
/// callback inline on its load path, and rewrites are CPU-bound.
pub trait Transformer: Send + Sync + fmt::Debug {
    /// Rewrite the representation of `unit`.
    ///
    /// `bytes` is the output of the previous handler in the chain (the
    /// original representation for the first handler). Return `Ok(None)` to
    /// leave the representation unchanged, or `Ok(Some(..))` with the
    /// replacement bytes.
    fn transform(
        &self,
        unit: &UnitName,
        bytes: &[u8],
        ctx: &LoadContext,
    ) -> Result<Option<Vec<u8>>, TransformError>;
}

/// One handler contribution to one unit's chain.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The unit the handler hooks.
    pub unit: UnitName,
    /// The handler.
    pub transformer: Arc<dyn Transformer>,
}

impl Registration {
    /// Create a registration.
    pub fn new(unit: impl Into<UnitName>, transformer: Arc<dyn Transformer>) -> Self {
        Self {
            unit: unit.into(),
            transformer,
        }
    }
}
