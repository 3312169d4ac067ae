//! Agent construction and the attach sequence.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, Weak};

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use bytegate_core::config::AgentConfig;
use bytegate_core::environment::Environment;
use bytegate_core::error::AgentError;
use bytegate_core::result::AgentResult;
use bytegate_core::traits::instrumentation::Instrumentation;
use bytegate_core::types::definition::DefinitionTable;
use bytegate_plugin::descriptor::ExtensionDescriptor;
use bytegate_plugin::driver::{AgentPhase, PhaseCell, Retransformer, RetransformReport};
use bytegate_plugin::hooks::dispatcher::Dispatcher;
use bytegate_plugin::manager::{LoadReport, PluginManager};

/// Runtimes an agent is currently attached to.
///
/// Slots are weak so a dropped agent frees its runtime for a later attach.
static ATTACHED: Mutex<Vec<Weak<dyn Instrumentation>>> = Mutex::new(Vec::new());

/// Claims `runtime` for a new agent, refusing handles already claimed.
fn register_attachment(runtime: &Arc<dyn Instrumentation>) -> AgentResult<()> {
    let mut attached = ATTACHED
        .lock()
        .map_err(|_| AgentError::internal("attachment registry lock poisoned"))?;
    attached.retain(|slot| slot.strong_count() > 0);
    for slot in attached.iter() {
        if let Some(existing) = slot.upgrade() {
            if Arc::ptr_eq(&existing, runtime) {
                tracing::warn!("Agent already attached to this runtime, refusing second attach");
                return Err(AgentError::already_attached(
                    "agent is already attached to this runtime",
                ));
            }
        }
    }
    attached.push(Arc::downgrade(runtime));
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &AgentConfig, attach_mode: bool) {
    // Attaching to a live process is interactive; surface the load
    // diagnostics unless the operator pinned a level.
    let level = if attach_mode && config.logging.level == "info" {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // The embedding host may already own the global subscriber.
    match config.logging.format.as_str() {
        "json" => {
            let _ = fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .try_init();
        }
        _ => {
            let _ = fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .try_init();
        }
    }
}

/// Builder returned by [`Agent::builder`].
#[derive(Debug)]
pub struct AgentBuilder {
    instrumentation: Arc<dyn Instrumentation>,
    base_dir: PathBuf,
    attach_mode: bool,
    options: Option<String>,
    config: Option<AgentConfig>,
    packages: Vec<(String, DefinitionTable)>,
}

impl AgentBuilder {
    fn new(instrumentation: Arc<dyn Instrumentation>) -> Self {
        Self {
            instrumentation,
            base_dir: PathBuf::from("."),
            attach_mode: false,
            options: None,
            config: None,
            packages: Vec::new(),
        }
    }

    /// Directory the agent is rooted at. Configuration, plugins and logs
    /// all resolve against it. Defaults to the current directory.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Marks this attach as targeting an already-running process.
    pub fn attach_mode(mut self, attach_mode: bool) -> Self {
        self.attach_mode = attach_mode;
        self
    }

    /// Opaque options string handed through by the attach front end.
    pub fn options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Uses `config` instead of loading it from `base_dir`.
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Pre-registers a compiled-in definition table for a package stem.
    ///
    /// The table becomes the local namespace tier of the package with that
    /// stem when its manifest loads.
    pub fn provide_package(mut self, stem: impl Into<String>, table: DefinitionTable) -> Self {
        self.packages.push((stem.into(), table));
        self
    }

    /// Attaches to the runtime.
    ///
    /// Loads configuration and extensions, installs the interception
    /// callback, and retransforms units that were active before attach.
    pub async fn attach(self) -> AgentResult<Agent> {
        // ── Step 1: Refuse duplicate attaches ────────────────────────
        register_attachment(&self.instrumentation)?;

        // ── Step 2: Configuration ────────────────────────────────────
        let config = match self.config {
            Some(config) => config,
            None => AgentConfig::load(&self.base_dir)?,
        };

        // ── Step 3: Logging ──────────────────────────────────────────
        init_logging(&config, self.attach_mode);

        tracing::info!("Bytegate v{} attaching", crate::VERSION);

        // ── Step 4: Environment ──────────────────────────────────────
        let environment = Arc::new(Environment::new(
            Arc::clone(&self.instrumentation),
            self.base_dir,
            &config,
            self.attach_mode,
            self.options,
        ));
        tracing::info!(environment = %environment, "Attach context ready");

        // ── Step 5: Load extensions ──────────────────────────────────
        let dispatcher = Arc::new(Dispatcher::new());
        let manager = PluginManager::new(
            Arc::clone(&environment),
            Arc::clone(&dispatcher),
            &config.plugins,
        );
        for (stem, table) in self.packages {
            manager.provide_package(stem, table);
        }
        let load_report = manager.load_plugins().await;

        // ── Step 6: Install the interception callback ────────────────
        self.instrumentation.attach_interceptor(dispatcher.clone());
        self.instrumentation
            .set_native_prefix(environment.native_prefix());

        let phase = Arc::new(PhaseCell::new());
        phase
            .advance(AgentPhase::Uninitialized, AgentPhase::RegistryPopulated)
            .map_err(|found| {
                AgentError::internal(format!("unexpected phase {found} after loading"))
            })?;

        // ── Step 7: Retransform already-active units ─────────────────
        let driver = Retransformer::new(
            Arc::clone(&dispatcher),
            Arc::clone(&self.instrumentation),
            Arc::clone(&phase),
        );
        let retransform_report = driver.run().await?;

        tracing::info!(
            extensions = load_report.loaded.len(),
            failed = load_report.failed.len(),
            retransformed = retransform_report.retransformed,
            "Bytegate attached"
        );

        Ok(Agent {
            environment,
            dispatcher,
            manager,
            phase,
            load_report,
            retransform_report,
        })
    }
}

/// An attached agent.
///
/// Dropping the agent does not uninstall the interception callback; the
/// runtime keeps the dispatcher alive for the remainder of the process.
#[derive(Debug)]
pub struct Agent {
    environment: Arc<Environment>,
    dispatcher: Arc<Dispatcher>,
    manager: PluginManager,
    phase: Arc<PhaseCell>,
    load_report: LoadReport,
    retransform_report: RetransformReport,
}

impl Agent {
    /// Starts building an agent attached through `instrumentation`.
    pub fn builder(instrumentation: Arc<dyn Instrumentation>) -> AgentBuilder {
        AgentBuilder::new(instrumentation)
    }

    /// Shared attach context.
    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    /// The dispatcher installed on the runtime's load path.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// The manager owning the loaded extension descriptors.
    pub fn manager(&self) -> &PluginManager {
        &self.manager
    }

    /// Descriptors of every loaded extension.
    pub fn descriptors(&self) -> Vec<Arc<ExtensionDescriptor>> {
        self.manager.descriptors()
    }

    /// Report of the extension loading pass.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Report of the initial retransformation pass.
    pub fn retransform_report(&self) -> &RetransformReport {
        &self.retransform_report
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> AgentPhase {
        self.phase.current()
    }
}
