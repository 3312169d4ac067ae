//! Load dispatcher: routes each intercepted code unit through its handler
//! chain.
//!
//! The dispatcher sits on the runtime's load path. For units nobody hooked it
//! answers with a single map lookup and no allocation. For hooked units the
//! chain runs in registration order, each handler receiving the previous
//! handler's output. A handler fault stops the chain; the unit keeps the last
//! successfully produced representation. Nothing is allowed to escape into
//! the runtime as an unhandled fault.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::{debug, error};

use bytegate_core::traits::instrumentation::LoadInterceptor;
use bytegate_core::traits::transformer::Registration;
use bytegate_core::types::context::LoadContext;
use bytegate_core::types::unit::UnitName;

use super::registry::TransformerRegistry;

/// Routes intercepted unit loads through registered handler chains.
#[derive(Debug, Default)]
pub struct Dispatcher {
    /// Transformer registry.
    registry: Arc<TransformerRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over a fresh registry.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(TransformerRegistry::new()),
        }
    }

    /// Creates a dispatcher over an existing registry.
    pub fn with_registry(registry: Arc<TransformerRegistry>) -> Self {
        Self { registry }
    }

    /// Appends handler registrations. Returns how many were appended.
    pub fn add_transformers(
        &self,
        registrations: impl IntoIterator<Item = Registration>,
    ) -> usize {
        self.registry.append_all(registrations)
    }

    /// Snapshot of all hooked unit names.
    pub fn hooked_units(&self) -> std::collections::HashSet<UnitName> {
        self.registry.hooked_units()
    }

    /// Number of handlers registered for a unit.
    pub fn chain_len(&self, unit: &UnitName) -> usize {
        self.registry.chain_len(unit)
    }

    /// Returns a reference to the transformer registry.
    pub fn registry(&self) -> &Arc<TransformerRegistry> {
        &self.registry
    }

    /// Run `unit` through its handler chain.
    ///
    /// Returns `None` when the unit is not hooked or no handler changed the
    /// representation; the runtime then loads the original bytes. Returns
    /// `Some(..)` with the rewritten representation otherwise. On a handler
    /// fault the chain stops and the representation produced so far is
    /// returned.
    pub fn transform(
        &self,
        unit: &UnitName,
        original: &[u8],
        ctx: &LoadContext,
    ) -> Option<Vec<u8>> {
        // Pass-through fast path: one lookup, no allocation.
        let chain = self.registry.chain(unit)?;

        debug!(unit = %unit, handlers = chain.len(), kind = ?ctx.kind, "Dispatching unit");

        // None means the representation is still the original bytes.
        let mut current: Option<Vec<u8>> = None;

        for (position, transformer) in chain.iter().enumerate() {
            let input: &[u8] = current.as_deref().unwrap_or(original);

            // A panicking handler must not unwind into the runtime's load
            // path, so the invocation is fenced alongside the Err route.
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                transformer.transform(unit, input, ctx)
            }));

            match outcome {
                Ok(Ok(Some(next))) => current = Some(next),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    error!(
                        unit = %unit,
                        position = position,
                        error = %e,
                        "Transformer failed; keeping last good representation"
                    );
                    return current;
                }
                Err(panic) => {
                    error!(
                        unit = %unit,
                        position = position,
                        panic = %panic_message(&panic),
                        "Transformer panicked; keeping last good representation"
                    );
                    return current;
                }
            }
        }

        current
    }
}

impl LoadInterceptor for Dispatcher {
    fn transform(&self, unit: &UnitName, bytes: &[u8], ctx: &LoadContext) -> Option<Vec<u8>> {
        Dispatcher::transform(self, unit, bytes, ctx)
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
