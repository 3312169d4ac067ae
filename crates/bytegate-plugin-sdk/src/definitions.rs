//! Builder for package definition tables.

use std::sync::Arc;

use bytegate_core::traits::entry::PluginEntry;
use bytegate_core::types::definition::{Definition, DefinitionTable};

/// Builds the definition table a compiled-in package registers under its
/// stem via `PluginManager::provide_package`.
#[derive(Debug, Default)]
pub struct DefinitionTableBuilder {
    table: DefinitionTable,
}

impl DefinitionTableBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry-point constructor under `name`.
    pub fn entry<E>(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> E + Send + Sync + 'static,
    ) -> Self
    where
        E: PluginEntry + 'static,
    {
        self.table.insert(name.into(), Definition::entry(factory));
        self
    }

    /// Add companion unit bytes under `name`.
    pub fn unit(mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.table.insert(name.into(), Definition::unit(bytes));
        self
    }

    /// Finish and return the table.
    pub fn build(self) -> DefinitionTable {
        self.table
    }
}
