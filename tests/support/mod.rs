//! Shared fixtures for the integration tests: an in-memory managed runtime
//! and a marker extension entry.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use bytegate::sdk::definitions::DefinitionTableBuilder;
use bytegate::sdk::registrations::Registrations;
use bytegate::{
    AgentError, AgentResult, Definition, DefinitionTable, Environment, Instrumentation,
    LoadContext, LoadInterceptor, PluginConf, PluginEntry, Registration, UnitName,
};

/// In-memory managed runtime.
///
/// Tracks the original and current representation of every defined unit,
/// routes loads and retransformations through the installed interceptor, and
/// records the interactions tests assert on.
#[derive(Debug, Default)]
pub struct SimulatedRuntime {
    /// Original representation per defined unit.
    originals: DashMap<UnitName, Vec<u8>>,
    /// Current, possibly rewritten, representation per active unit.
    units: DashMap<UnitName, Vec<u8>>,
    /// Shared-namespace definitions injected by packages.
    shared: DashMap<String, Definition>,
    /// Units whose retransformation the runtime refuses.
    broken: DashMap<UnitName, ()>,
    /// Retransformation count per unit.
    retransforms: DashMap<UnitName, usize>,
    interceptor: Mutex<Option<Arc<dyn LoadInterceptor>>>,
    native_prefix: Mutex<Option<String>>,
    injecting: AtomicBool,
    injection_overlap: AtomicBool,
    inject_calls: AtomicUsize,
}

impl SimulatedRuntime {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Defines `unit` as active, with `bytes` as its original representation.
    pub fn define_unit(&self, unit: &str, bytes: &[u8]) {
        let unit = UnitName::from(unit);
        self.originals.insert(unit.clone(), bytes.to_vec());
        self.units.insert(unit, bytes.to_vec());
    }

    /// Routes a fresh load of `unit` through the installed interceptor and
    /// returns the representation the runtime activates.
    pub fn load_unit(&self, unit: &str) -> Vec<u8> {
        let unit = UnitName::from(unit);
        let original = self
            .originals
            .get(&unit)
            .map(|entry| entry.value().clone())
            .expect("unit not defined");
        let interceptor = self.interceptor.lock().expect("interceptor lock").clone();
        let bytes = interceptor
            .and_then(|i| i.transform(&unit, &original, &LoadContext::initial()))
            .unwrap_or(original);
        self.units.insert(unit, bytes.clone());
        bytes
    }

    /// Current representation of `unit`.
    pub fn current(&self, unit: &str) -> Option<Vec<u8>> {
        self.units
            .get(&UnitName::from(unit))
            .map(|entry| entry.value().clone())
    }

    /// Marks `unit` as one the runtime refuses to retransform.
    pub fn break_unit(&self, unit: &str) {
        self.broken.insert(UnitName::from(unit), ());
    }

    /// How many times `unit` has been retransformed.
    pub fn retransform_count(&self, unit: &str) -> usize {
        self.retransforms
            .get(&UnitName::from(unit))
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    pub fn interceptor_installed(&self) -> bool {
        self.interceptor.lock().expect("interceptor lock").is_some()
    }

    pub fn native_prefix(&self) -> Option<String> {
        self.native_prefix.lock().expect("prefix lock").clone()
    }

    pub fn shared_definition(&self, name: &str) -> Option<Definition> {
        self.shared.get(name).map(|entry| entry.value().clone())
    }

    pub fn injection_overlap_detected(&self) -> bool {
        self.injection_overlap.load(Ordering::SeqCst)
    }

    pub fn inject_calls(&self) -> usize {
        self.inject_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Instrumentation for SimulatedRuntime {
    fn attach_interceptor(&self, interceptor: Arc<dyn LoadInterceptor>) {
        *self.interceptor.lock().expect("interceptor lock") = Some(interceptor);
    }

    fn set_native_prefix(&self, prefix: &str) {
        *self.native_prefix.lock().expect("prefix lock") = Some(prefix.to_string());
    }

    async fn active_units(&self) -> Vec<UnitName> {
        self.units.iter().map(|entry| entry.key().clone()).collect()
    }

    async fn retransform_unit(&self, unit: &UnitName) -> AgentResult<()> {
        if self.broken.contains_key(unit) {
            return Err(AgentError::instrumentation(format!(
                "unit {unit} is not modifiable"
            )));
        }
        let original = self
            .originals
            .get(unit)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AgentError::instrumentation(format!("unknown unit {unit}")))?;
        *self.retransforms.entry(unit.clone()).or_insert(0) += 1;

        let interceptor = self.interceptor.lock().expect("interceptor lock").clone();
        if let Some(rewritten) =
            interceptor.and_then(|i| i.transform(unit, &original, &LoadContext::retransform()))
        {
            self.units.insert(unit.clone(), rewritten);
        }
        Ok(())
    }

    async fn inject_shared(&self, table: DefinitionTable) -> AgentResult<()> {
        // The real registration endpoint is not reentrant; flag overlapping
        // calls so tests can assert the loader serializes them.
        if self.injecting.swap(true, Ordering::SeqCst) {
            self.injection_overlap.store(true, Ordering::SeqCst);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        for (name, definition) in table {
            self.shared.insert(name, definition);
        }
        self.injecting.store(false, Ordering::SeqCst);
        self.inject_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn resolve_shared(&self, name: &str) -> Option<Definition> {
        self.shared.get(name).map(|entry| entry.value().clone())
    }
}

/// Extension entry that appends a fixed marker to one unit.
#[derive(Debug)]
pub struct MarkerEntry {
    name: String,
    unit: String,
    marker: Vec<u8>,
    init_delay: Duration,
}

impl MarkerEntry {
    pub fn new(name: &str, unit: &str, marker: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            marker: marker.to_vec(),
            init_delay: Duration::ZERO,
        }
    }

    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }
}

#[async_trait]
impl PluginEntry for MarkerEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn author(&self) -> &str {
        "tests"
    }

    async fn init(&mut self, _env: &Environment, _conf: &PluginConf) -> AgentResult<()> {
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }
        Ok(())
    }

    fn transformers(&self) -> Vec<Registration> {
        let marker = self.marker.clone();
        Registrations::new()
            .on_fn(self.unit.as_str(), "marker", move |_unit, bytes, _ctx| {
                let mut out = bytes.to_vec();
                out.extend_from_slice(&marker);
                Ok(Some(out))
            })
            .build()
    }
}

/// Builds a definition table exposing a [`MarkerEntry`] under `entry_name`.
pub fn marker_table(
    entry_name: &str,
    plugin_name: &str,
    unit: &str,
    marker: &[u8],
) -> DefinitionTable {
    let plugin_name = plugin_name.to_string();
    let unit = unit.to_string();
    let marker = marker.to_vec();
    DefinitionTableBuilder::new()
        .entry(entry_name, move || {
            MarkerEntry::new(&plugin_name, &unit, &marker)
        })
        .build()
}

/// Like [`marker_table`], but the entry sleeps in `init` before registering.
pub fn delayed_marker_table(
    entry_name: &str,
    plugin_name: &str,
    unit: &str,
    marker: &[u8],
    delay: Duration,
) -> DefinitionTable {
    let plugin_name = plugin_name.to_string();
    let unit = unit.to_string();
    let marker = marker.to_vec();
    DefinitionTableBuilder::new()
        .entry(entry_name, move || {
            MarkerEntry::new(&plugin_name, &unit, &marker).with_init_delay(delay)
        })
        .build()
}

/// Creates a temporary agent home with `plugins/` and `config/` directories.
pub async fn agent_home() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    tokio::fs::create_dir_all(dir.path().join("plugins"))
        .await
        .expect("create plugins dir");
    tokio::fs::create_dir_all(dir.path().join("config"))
        .await
        .expect("create config dir");
    dir
}

/// Writes a package manifest into the agent home's plugins directory.
pub async fn write_package(home: &Path, file_name: &str, entry: &str) {
    let manifest = format!("entry = {entry}\n");
    tokio::fs::write(home.join("plugins").join(file_name), manifest)
        .await
        .expect("write manifest");
}

/// Writes an extension configuration file into the agent home.
pub async fn write_conf(home: &Path, file_name: &str, text: &str) {
    tokio::fs::write(home.join("config").join(file_name), text)
        .await
        .expect("write conf");
}
