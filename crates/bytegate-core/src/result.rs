//! Convenience result type alias for Bytegate.

use crate::error::AgentError;

/// A specialized `Result` type for Bytegate operations.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, AgentError>` explicitly.
pub type AgentResult<T> = Result<T, AgentError>;
