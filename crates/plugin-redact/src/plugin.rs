//! Redact entry point: registers with the Bytegate extension system.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing;

use bytegate_core::conf::PluginConf;
use bytegate_core::environment::Environment;
use bytegate_core::result::AgentResult;
use bytegate_core::traits::entry::PluginEntry;
use bytegate_core::traits::transformer::Registration;
use bytegate_core::types::definition::DefinitionTable;
use bytegate_core::types::unit::UnitName;
use bytegate_plugin_sdk::definitions::DefinitionTableBuilder;
use bytegate_plugin_sdk::registrations::Registrations;

use crate::rules::RedactRule;
use crate::transformer::RedactTransformer;

/// Fully qualified name the entry registers under in package namespaces.
pub const ENTRY_NAME: &str = "plugin_redact::RedactEntry";

/// Redaction extension for Bytegate
#[derive(Debug, Default)]
pub struct RedactEntry {
    /// Rules parsed from the extension configuration.
    rules: Vec<RedactRule>,
}

impl RedactEntry {
    /// Create a new redact entry
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rules accepted during initialization.
    pub fn rules(&self) -> &[RedactRule] {
        &self.rules
    }
}

#[async_trait]
impl PluginEntry for RedactEntry {
    fn name(&self) -> &str {
        "redact"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn author(&self) -> &str {
        "Bytegate"
    }

    async fn init(&mut self, _env: &Environment, conf: &PluginConf) -> AgentResult<()> {
        let mut rules = Vec::new();
        for line in conf.get_all("rule") {
            match RedactRule::parse(line) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    tracing::warn!(rule = line, error = %e, "Ignoring invalid redaction rule");
                }
            }
        }

        tracing::info!(rules = rules.len(), "Redact extension initialized");
        self.rules = rules;
        Ok(())
    }

    fn transformers(&self) -> Vec<Registration> {
        // One transformer per unit, rules grouped in configuration order.
        let mut order: Vec<UnitName> = Vec::new();
        let mut grouped: HashMap<UnitName, Vec<RedactRule>> = HashMap::new();
        for rule in &self.rules {
            if !grouped.contains_key(&rule.unit) {
                order.push(rule.unit.clone());
            }
            grouped
                .entry(rule.unit.clone())
                .or_default()
                .push(rule.clone());
        }

        let mut registrations = Registrations::new();
        for unit in order {
            if let Some(rules) = grouped.remove(&unit) {
                registrations = registrations.on(unit, Arc::new(RedactTransformer::new(rules)));
            }
        }
        registrations.build()
    }
}

/// Definition table for compiled-in use: the host registers this under the
/// package stem via `PluginManager::provide_package`.
pub fn definitions() -> DefinitionTable {
    DefinitionTableBuilder::new()
        .entry(ENTRY_NAME, RedactEntry::new)
        .build()
}
