//! Runtime collaborator contract.
//!
//! The managed execution environment the agent attaches to is reached
//! exclusively through these traits. The framework never assumes more about
//! the runtime than they express.

use async_trait::async_trait;

use crate::result::AgentResult;
use crate::types::context::LoadContext;
use crate::types::definition::{Definition, DefinitionTable};
use crate::types::unit::UnitName;

/// Callback the runtime invokes for every code unit it is about to load.
///
/// Implemented by the dispatcher and installed once at attach. The runtime
/// calls it inline on its load path, so implementations must be fast for
/// unmatched units and must never panic across this boundary.
pub trait LoadInterceptor: Send + Sync + std::fmt::Debug {
    /// Offer `unit` for rewriting. `None` means pass-through: the runtime
    /// loads the unchanged representation.
    fn transform(&self, unit: &UnitName, bytes: &[u8], ctx: &LoadContext) -> Option<Vec<u8>>;
}

/// Handle to the managed execution environment.
///
/// Supplied by the embedding host at attach and shared through the
/// [`Environment`](crate::environment::Environment) for the process lifetime.
#[async_trait]
pub trait Instrumentation: Send + Sync + std::fmt::Debug {
    /// Install the interception callback for subsequent unit loads.
    fn attach_interceptor(&self, interceptor: std::sync::Arc<dyn LoadInterceptor>);

    /// Announce the prefix used for renamed native methods. Runtimes without
    /// native-method renaming ignore this.
    fn set_native_prefix(&self, _prefix: &str) {}

    /// Names of all units currently active in the runtime.
    async fn active_units(&self) -> Vec<UnitName>;

    /// Re-derive and re-apply the representation of an already-active unit,
    /// routing it back through the interception callback.
    async fn retransform_unit(&self, unit: &UnitName) -> AgentResult<()>;

    /// Register definitions in the runtime's shared namespace. The underlying
    /// registration API is not safe for concurrent use; callers serialize.
    async fn inject_shared(&self, table: DefinitionTable) -> AgentResult<()>;

    /// Resolve a name in the runtime's shared namespace.
    async fn resolve_shared(&self, name: &str) -> Option<Definition>;
}
