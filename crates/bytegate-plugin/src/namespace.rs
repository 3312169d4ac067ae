//! Per-package namespaces.
//!
//! Each extension package resolves names through a two-tier namespace: the
//! package's own definition table first, then the runtime's shared namespace.
//! Definitions published by earlier packages are therefore visible to later
//! ones, while a package's private definitions stay private.

use std::sync::Arc;

use tracing::trace;
use uuid::Uuid;

use bytegate_core::traits::instrumentation::Instrumentation;
use bytegate_core::types::definition::{Definition, DefinitionTable};

/// Namespace through which one package resolves definitions.
#[derive(Debug)]
pub struct PackageNamespace {
    /// Unique handle for this namespace instance.
    handle: Uuid,
    /// Package stem the namespace belongs to.
    name: String,
    /// Definitions local to the package.
    local: DefinitionTable,
    /// Runtime handle used for shared-namespace lookups.
    instrumentation: Arc<dyn Instrumentation>,
}

impl PackageNamespace {
    /// Create a namespace for one package.
    pub fn new(
        name: impl Into<String>,
        local: DefinitionTable,
        instrumentation: Arc<dyn Instrumentation>,
    ) -> Self {
        Self {
            handle: Uuid::new_v4(),
            name: name.into(),
            local,
            instrumentation,
        }
    }

    /// Unique handle of this namespace instance.
    pub fn handle(&self) -> Uuid {
        self.handle
    }

    /// Package stem this namespace belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package-local definition table.
    pub fn local(&self) -> &DefinitionTable {
        &self.local
    }

    /// Resolve a name against the local table only.
    pub fn resolve_local(&self, name: &str) -> Option<&Definition> {
        self.local.get(name)
    }

    /// Resolve a name, checking the local table before the shared namespace.
    ///
    /// Resolution never instantiates anything; it only locates a definition.
    pub async fn resolve(&self, name: &str) -> Option<Definition> {
        if let Some(definition) = self.local.get(name) {
            trace!(namespace = %self.name, name = name, tier = "local", "Resolved definition");
            return Some(definition.clone());
        }
        let shared = self.instrumentation.resolve_shared(name).await;
        if shared.is_some() {
            trace!(namespace = %self.name, name = name, tier = "shared", "Resolved definition");
        }
        shared
    }
}
