//! Transformer registry: extensions register handlers by code-unit name.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use bytegate_core::traits::transformer::{Registration, Transformer};
use bytegate_core::types::unit::UnitName;

/// Registry of handler chains keyed by code-unit name.
///
/// Insertion is append-only: within one unit's chain, invocation order is
/// registration order, and nothing is ever removed for the process lifetime.
/// A unit name is only inserted together with its first handler, so a present
/// chain is never empty. Registration and lookup are safe to run
/// concurrently; dispatch may begin while extensions are still registering.
#[derive(Debug, Default)]
pub struct TransformerRegistry {
    /// Unit name → handlers in registration order.
    chains: DashMap<UnitName, Vec<Arc<dyn Transformer>>>,
}

impl TransformerRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            chains: DashMap::new(),
        }
    }

    /// Appends one handler to its unit's chain.
    pub fn append(&self, registration: Registration) {
        let Registration { unit, transformer } = registration;
        let mut chain = self.chains.entry(unit.clone()).or_default();
        chain.push(transformer);

        debug!(unit = %unit, chain_len = chain.len(), "Transformer registered");
    }

    /// Appends every registration in order. Returns how many were appended.
    pub fn append_all(&self, registrations: impl IntoIterator<Item = Registration>) -> usize {
        let mut appended = 0;
        for registration in registrations {
            self.append(registration);
            appended += 1;
        }
        appended
    }

    /// Snapshot of all unit names with at least one handler.
    ///
    /// Every present chain is non-empty by construction, so this is exactly
    /// the set of hooked units.
    pub fn hooked_units(&self) -> HashSet<UnitName> {
        self.chains.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Cloned snapshot of one unit's chain, in invocation order.
    ///
    /// Returns `None` when the unit is not hooked. The clone means no map
    /// shard stays locked while handlers run.
    pub fn chain(&self, unit: &UnitName) -> Option<Vec<Arc<dyn Transformer>>> {
        self.chains.get(unit).map(|entry| entry.value().clone())
    }

    /// Number of handlers registered for a unit.
    pub fn chain_len(&self, unit: &UnitName) -> usize {
        self.chains.get(unit).map(|entry| entry.value().len()).unwrap_or(0)
    }

    /// Number of hooked units.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether no unit is hooked.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytegate_core::traits::transformer::TransformError;
    use bytegate_core::types::context::LoadContext;

    #[derive(Debug)]
    struct Tag(u8);

    impl Transformer for Tag {
        fn transform(
            &self,
            _unit: &UnitName,
            bytes: &[u8],
            _ctx: &LoadContext,
        ) -> Result<Option<Vec<u8>>, TransformError> {
            let mut out = bytes.to_vec();
            out.push(self.0);
            Ok(Some(out))
        }
    }

    #[test]
    fn test_append_creates_chain_with_first_handler() {
        let registry = TransformerRegistry::new();
        assert!(registry.is_empty());

        registry.append(Registration::new("com.acme.Widget", Arc::new(Tag(1))));

        let unit = UnitName::from("com.acme.Widget");
        assert_eq!(registry.chain_len(&unit), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_chains_merge_across_batches() {
        let registry = TransformerRegistry::new();
        let unit = UnitName::from("com.acme.Widget");

        registry.append_all(vec![
            Registration::new("com.acme.Widget", Arc::new(Tag(1)) as Arc<dyn Transformer>),
            Registration::new("com.acme.Other", Arc::new(Tag(2))),
        ]);
        registry.append(Registration::new("com.acme.Widget", Arc::new(Tag(3))));

        assert_eq!(registry.chain_len(&unit), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_hooked_units_reflects_only_present_chains() {
        let registry = TransformerRegistry::new();
        registry.append(Registration::new("a.B", Arc::new(Tag(1))));
        registry.append(Registration::new("c.D", Arc::new(Tag(2))));

        let hooked = registry.hooked_units();
        assert_eq!(hooked.len(), 2);
        assert!(hooked.contains(&UnitName::from("a.B")));
        assert!(hooked.contains(&UnitName::from("c.D")));
        assert!(!hooked.contains(&UnitName::from("e.F")));
    }

    #[test]
    fn test_chain_is_a_snapshot() {
        let registry = TransformerRegistry::new();
        let unit = UnitName::from("a.B");
        registry.append(Registration::new("a.B", Arc::new(Tag(1))));

        let snapshot = registry.chain(&unit).expect("chain");
        registry.append(Registration::new("a.B", Arc::new(Tag(2))));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.chain_len(&unit), 2);
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let registry = Arc::new(TransformerRegistry::new());
        let unit = UnitName::from("com.acme.Widget");

        let mut handles = Vec::new();
        for i in 0..16u8 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.append(Registration::new("com.acme.Widget", Arc::new(Tag(i))));
            }));
        }
        for handle in handles {
            handle.await.expect("join");
        }

        assert_eq!(registry.chain_len(&unit), 16);
    }
}
