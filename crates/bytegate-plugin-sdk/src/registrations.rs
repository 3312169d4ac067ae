//! Builder for transformer registrations.

use std::sync::Arc;

use bytegate_core::traits::transformer::{Registration, TransformError, Transformer};
use bytegate_core::types::context::LoadContext;
use bytegate_core::types::unit::UnitName;

use crate::transformers::FnTransformer;

/// Collects the registrations an extension returns from
/// [`PluginEntry::transformers`](bytegate_core::traits::entry::PluginEntry::transformers).
#[derive(Debug, Default)]
pub struct Registrations {
    items: Vec<Registration>,
}

impl Registrations {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook `transformer` onto `unit`.
    pub fn on(mut self, unit: impl Into<UnitName>, transformer: Arc<dyn Transformer>) -> Self {
        self.items.push(Registration::new(unit, transformer));
        self
    }

    /// Hook a closure onto `unit` under a diagnostic name.
    pub fn on_fn<F>(self, unit: impl Into<UnitName>, name: &str, f: F) -> Self
    where
        F: Fn(&UnitName, &[u8], &LoadContext) -> Result<Option<Vec<u8>>, TransformError>
            + Send
            + Sync
            + 'static,
    {
        self.on(unit, Arc::new(FnTransformer::new(name, f)))
    }

    /// Number of registrations collected so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no registrations were collected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finish and return the registrations.
    pub fn build(self) -> Vec<Registration> {
        self.items
    }
}
