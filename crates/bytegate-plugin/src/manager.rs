//! Extension manager: package discovery, concurrent loading, and reporting.
//!
//! Every discovered package loads in its own task so one broken package
//! cannot take down its siblings. The manager bounds load concurrency with a
//! semaphore, serializes shared-namespace injection behind a single lock,
//! and awaits the whole pass under one aggregate deadline. Tasks still in
//! flight when the deadline expires are left to finish on their own; their
//! registrations simply miss the initial retransformation pass.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, error, info, trace, warn};

use bytegate_core::conf::PluginConf;
use bytegate_core::config::plugins::PluginsConfig;
use bytegate_core::environment::Environment;
use bytegate_core::types::definition::{Definition, DefinitionTable, EntryFactory};

use crate::descriptor::{ExtensionDescriptor, ExtensionSummary};
use crate::error::LoadError;
use crate::hooks::dispatcher::Dispatcher;
use crate::loader::DynamicLoader;
use crate::manifest::{self, PackageFile, PackageManifest};
use crate::namespace::PackageNamespace;

/// Result of one package load attempt.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The package loaded and its transformers are registered.
    Loaded(Arc<ExtensionDescriptor>),
    /// The package carries the disabled suffix.
    SkippedDisabled,
    /// The manifest does not designate a usable entry point.
    NotAnExtension,
    /// The package failed to load.
    Failed(LoadError),
}

/// Aggregate result of one loading pass.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Summaries of successfully loaded extensions.
    pub loaded: Vec<ExtensionSummary>,
    /// Stems of packages skipped because they carry the disabled suffix.
    pub skipped_disabled: Vec<String>,
    /// Stems of package files that do not designate an entry point.
    pub not_extensions: Vec<String>,
    /// Per-package load failures.
    pub failed: Vec<(String, LoadError)>,
    /// Stems of packages still in flight when the deadline expired.
    pub pending: Vec<String>,
    /// Whether the aggregate deadline expired before every task finished.
    pub timed_out: bool,
    /// Wall-clock duration of the pass.
    pub elapsed: Duration,
}

/// Manages the full extension lifecycle: discovery, loading, registration.
#[derive(Debug, Clone)]
pub struct PluginManager {
    /// Shared attach context handed to extension init hooks.
    environment: Arc<Environment>,
    /// Dispatcher receiving transformer registrations.
    dispatcher: Arc<Dispatcher>,
    /// Compiled-in definition tables, keyed by package stem.
    builtins: Arc<DashMap<String, DefinitionTable>>,
    /// Descriptors of loaded extensions, keyed by package stem.
    descriptors: Arc<DashMap<String, Arc<ExtensionDescriptor>>>,
    /// Serializes shared-namespace injection across load tasks.
    injection_lock: Arc<Mutex<()>>,
    /// Bounds the number of packages loading at once.
    limiter: Arc<Semaphore>,
    /// Dynamic library loader.
    loader: Arc<Mutex<DynamicLoader>>,
    /// Aggregate deadline for one loading pass.
    load_timeout: Duration,
}

impl PluginManager {
    /// Creates a new plugin manager.
    pub fn new(
        environment: Arc<Environment>,
        dispatcher: Arc<Dispatcher>,
        config: &PluginsConfig,
    ) -> Self {
        Self {
            environment,
            dispatcher,
            builtins: Arc::new(DashMap::new()),
            descriptors: Arc::new(DashMap::new()),
            injection_lock: Arc::new(Mutex::new(())),
            limiter: Arc::new(Semaphore::new(config.max_concurrent_loads.max(1))),
            loader: Arc::new(Mutex::new(DynamicLoader::new())),
            load_timeout: Duration::from_secs(config.load_timeout_secs),
        }
    }

    /// Pre-registers a compiled-in definition table for a package stem.
    ///
    /// The table becomes the local tier of the package's namespace when a
    /// manifest with that stem loads.
    pub fn provide_package(&self, stem: impl Into<String>, table: DefinitionTable) {
        let stem = stem.into();
        debug!(package = %stem, definitions = table.len(), "Compiled-in definitions provided");
        self.builtins.insert(stem, table);
    }

    /// Scans the plugins directory for package files.
    ///
    /// Non-recursive. Disabled packages are included so the loading pass can
    /// log the skip. A missing or unreadable directory yields no packages.
    pub async fn discover(&self) -> Vec<PathBuf> {
        let dir = self.environment.plugins_dir();
        let mut read_dir = match tokio::fs::read_dir(dir).await {
            Ok(read_dir) => read_dir,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Plugins directory not readable");
                return Vec::new();
            }
        };

        let suffix = self.environment.disabled_suffix();
        let mut packages = Vec::new();
        loop {
            match read_dir.next_entry().await {
                Ok(Some(entry)) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if manifest::classify(&name, suffix).is_some() {
                        packages.push(entry.path());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Directory scan aborted");
                    break;
                }
            }
        }

        packages.sort();
        packages
    }

    /// Discovers and loads every extension package.
    ///
    /// One task per package, admission bounded by the load limiter. Outcomes
    /// are collected as values; nothing a broken package does can abort the
    /// pass. Returns once every task finished or the aggregate deadline
    /// expired, whichever comes first.
    pub async fn load_plugins(&self) -> LoadReport {
        let started = Instant::now();
        let packages = self.discover().await;
        info!(
            count = packages.len(),
            dir = %self.environment.plugins_dir().display(),
            "Loading extension packages"
        );

        let outcomes: Arc<DashMap<String, LoadOutcome>> = Arc::new(DashMap::new());
        let mut spawned: Vec<(String, String)> = Vec::new();
        let mut handles = Vec::new();

        for path in packages {
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            let Some(file) = manifest::classify(&file_name, self.environment.disabled_suffix())
            else {
                continue;
            };
            let stem = match &file {
                PackageFile::Enabled { stem } | PackageFile::Disabled { stem } => stem.clone(),
            };
            spawned.push((file_name.clone(), stem));

            let manager = self.clone();
            let outcomes = outcomes.clone();
            handles.push(tokio::spawn(async move {
                let outcome = match manager.limiter.clone().acquire_owned().await {
                    Ok(_permit) => manager.load_package(&path, file).await,
                    Err(_) => LoadOutcome::Failed(LoadError::Semaphore),
                };
                outcomes.insert(file_name, outcome);
            }));
        }

        let timed_out = tokio::time::timeout(self.load_timeout, futures::future::join_all(handles))
            .await
            .is_err();

        let mut report = LoadReport {
            timed_out,
            ..LoadReport::default()
        };

        for (file_name, stem) in &spawned {
            match outcomes.remove(file_name) {
                Some((_, LoadOutcome::Loaded(descriptor))) => {
                    report.loaded.push(descriptor.summary());
                }
                Some((_, LoadOutcome::SkippedDisabled)) => {
                    report.skipped_disabled.push(stem.clone());
                }
                Some((_, LoadOutcome::NotAnExtension)) => {
                    report.not_extensions.push(stem.clone());
                }
                Some((_, LoadOutcome::Failed(error))) => {
                    error!(package = %stem, error = %error, "Extension package failed to load");
                    report.failed.push((stem.clone(), error));
                }
                None if timed_out => {
                    report.pending.push(stem.clone());
                }
                None => {
                    let error = LoadError::TaskPanic {
                        package: stem.clone(),
                    };
                    error!(package = %stem, error = %error, "Extension package failed to load");
                    report.failed.push((stem.clone(), error));
                }
            }
        }

        report.elapsed = started.elapsed();

        if timed_out {
            warn!(
                pending = report.pending.len(),
                timeout_secs = self.load_timeout.as_secs(),
                "Load deadline expired; continuing with the extensions loaded so far"
            );
        }
        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            skipped_disabled = report.skipped_disabled.len(),
            not_extensions = report.not_extensions.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Extension loading complete"
        );

        report
    }

    /// Loads one package through the full sequence.
    async fn load_package(&self, path: &Path, file: PackageFile) -> LoadOutcome {
        // Step 1: disabled packages are skipped before the manifest is read.
        let stem = match file {
            PackageFile::Disabled { stem } => {
                debug!(package = %stem, "Package disabled; skipping");
                return LoadOutcome::SkippedDisabled;
            }
            PackageFile::Enabled { stem } => stem,
        };

        // Step 2: parse the manifest; a missing entry attribute means the
        // file is in package format but is not an extension.
        let manifest = match PackageManifest::load(path, &stem).await {
            Ok(manifest) => manifest,
            Err(e) => return LoadOutcome::Failed(e),
        };
        let Some(entry_name) = manifest.entry().map(String::from) else {
            trace!(package = %stem, "No entry attribute; not an extension");
            return LoadOutcome::NotAnExtension;
        };

        // Assemble the package-local definition tier: compiled-in table
        // first, then whatever the manifest's library exports.
        let mut local: DefinitionTable = self
            .builtins
            .get(&stem)
            .map(|t| t.value().clone())
            .unwrap_or_default();
        if let Some(library) = manifest.library() {
            match self.load_library(&library).await {
                Ok(Some(factory)) => {
                    local.insert(entry_name.clone(), Definition::Entry(factory));
                }
                Ok(None) => {}
                Err(e) => return LoadOutcome::Failed(e),
            }
        }

        // Step 3: resolve the entry name through the package namespace. This
        // locates a definition; nothing is instantiated yet.
        let namespace = PackageNamespace::new(
            stem.clone(),
            local,
            self.environment.instrumentation().clone(),
        );
        let Some(definition) = namespace.resolve(&entry_name).await else {
            return LoadOutcome::Failed(LoadError::EntryUnresolved {
                entry: entry_name,
                package: stem,
            });
        };

        // Step 4: capability check. A name resolving to something that is
        // not an entry-point constructor disqualifies the package silently.
        let Some(factory) = definition.as_entry() else {
            trace!(package = %stem, entry = %entry_name, "Entry is not an entry-point type; not an extension");
            return LoadOutcome::NotAnExtension;
        };

        // Step 5: publish the package's definitions to the shared namespace.
        // The runtime's registration API is not concurrency-safe, so this is
        // the one serialized section of the load.
        {
            let _guard = self.injection_lock.lock().await;
            if let Err(e) = self
                .environment
                .instrumentation()
                .inject_shared(namespace.local().clone())
                .await
            {
                return LoadOutcome::Failed(LoadError::Injection {
                    package: stem,
                    source: e,
                });
            }
        }

        // Step 6: instantiate, read the per-extension configuration, and
        // initialize.
        let mut entry = factory();
        let name = entry.name().to_string();
        let conf_path = self
            .environment
            .config_dir()
            .join(format!("{}.conf", name.to_lowercase()));
        let conf = match PluginConf::load(&conf_path).await {
            Ok(conf) => conf,
            Err(e) => {
                return LoadOutcome::Failed(LoadError::ConfUnreadable {
                    plugin: name,
                    source: e,
                });
            }
        };
        if let Err(e) = entry.init(&self.environment, &conf).await {
            return LoadOutcome::Failed(LoadError::Init {
                plugin: name,
                source: e,
            });
        }

        // Step 7: register the extension's transformers with the dispatcher.
        let registrations = self.dispatcher.add_transformers(entry.transformers());

        // Step 8: record the descriptor.
        let descriptor = Arc::new(ExtensionDescriptor {
            name: name.clone(),
            version: entry.version().to_string(),
            author: entry.author().to_string(),
            package: stem.clone(),
            namespace: namespace.handle(),
            registrations,
            conf_path: conf.path().map(|p| p.to_path_buf()),
            entry: Arc::from(entry),
            loaded_at: chrono::Utc::now(),
        });
        info!(
            plugin = %descriptor.name,
            version = %descriptor.version,
            author = %descriptor.author,
            package = %stem,
            registrations,
            "Extension loaded"
        );
        self.descriptors.insert(stem, descriptor.clone());

        LoadOutcome::Loaded(descriptor)
    }

    #[cfg(feature = "dynamic")]
    async fn load_library(&self, path: &Path) -> Result<Option<EntryFactory>, LoadError> {
        let mut loader = self.loader.lock().await;
        let factory = unsafe { loader.load_entry_factory(path) }?;
        Ok(Some(factory))
    }

    #[cfg(not(feature = "dynamic"))]
    async fn load_library(&self, path: &Path) -> Result<Option<EntryFactory>, LoadError> {
        debug!(
            library = %path.display(),
            "Manifest names a library but dynamic loading is not compiled in"
        );
        Ok(None)
    }

    /// Returns the descriptor of a loaded extension by package stem.
    pub fn descriptor(&self, package: &str) -> Option<Arc<ExtensionDescriptor>> {
        self.descriptors.get(package).map(|d| d.value().clone())
    }

    /// Returns all loaded extension descriptors.
    pub fn descriptors(&self) -> Vec<Arc<ExtensionDescriptor>> {
        self.descriptors.iter().map(|d| d.value().clone()).collect()
    }

    /// Lists loaded extension summaries, ordered by package stem.
    pub fn summaries(&self) -> Vec<ExtensionSummary> {
        let mut summaries: Vec<ExtensionSummary> = self
            .descriptors
            .iter()
            .map(|d| d.value().summary())
            .collect();
        summaries.sort_by(|a, b| a.package.cmp(&b.package));
        summaries
    }

    /// Number of loaded extensions.
    pub fn loaded_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns the dispatcher transformers register through.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}
