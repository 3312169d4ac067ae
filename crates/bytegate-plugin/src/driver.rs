//! Retransformation driver and agent lifecycle phase.
//!
//! Units already active when the agent attaches never passed through the
//! interception callback. Once every extension has registered, the driver
//! asks the runtime to push each hooked, active unit back through the
//! dispatcher. The pass runs exactly once per attach; the phase cell
//! enforces that.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{debug, info, warn};

use bytegate_core::error::AgentError;
use bytegate_core::result::AgentResult;
use bytegate_core::traits::instrumentation::Instrumentation;
use bytegate_core::types::unit::UnitName;

use crate::hooks::dispatcher::Dispatcher;

/// Lifecycle phase of an attached agent. Transitions are forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AgentPhase {
    /// No extension registrations yet.
    Uninitialized = 0,
    /// Every extension that will register has registered.
    RegistryPopulated = 1,
    /// The initial retransformation pass is running.
    RetransformInProgress = 2,
    /// The initial retransformation pass finished.
    RetransformComplete = 3,
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "UNINITIALIZED"),
            Self::RegistryPopulated => write!(f, "REGISTRY_POPULATED"),
            Self::RetransformInProgress => write!(f, "RETRANSFORM_IN_PROGRESS"),
            Self::RetransformComplete => write!(f, "RETRANSFORM_COMPLETE"),
        }
    }
}

fn decode(raw: u8) -> AgentPhase {
    match raw {
        0 => AgentPhase::Uninitialized,
        1 => AgentPhase::RegistryPopulated,
        2 => AgentPhase::RetransformInProgress,
        _ => AgentPhase::RetransformComplete,
    }
}

/// Atomic cell holding the agent's lifecycle phase.
#[derive(Debug)]
pub struct PhaseCell(AtomicU8);

impl PhaseCell {
    /// Creates a cell in the uninitialized phase.
    pub fn new() -> Self {
        Self(AtomicU8::new(AgentPhase::Uninitialized as u8))
    }

    /// Current phase.
    pub fn current(&self) -> AgentPhase {
        decode(self.0.load(Ordering::Acquire))
    }

    /// Advances `from` to `to` atomically.
    ///
    /// Fails with the phase actually observed when the cell is not in
    /// `from`, leaving the cell unchanged.
    pub fn advance(&self, from: AgentPhase, to: AgentPhase) -> Result<(), AgentPhase> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| {
                debug!(from = %from, to = %to, "Agent phase advanced");
            })
            .map_err(decode)
    }
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate result of the initial retransformation pass.
#[derive(Debug, Default)]
pub struct RetransformReport {
    /// Active units that had registered handlers.
    pub matched: usize,
    /// Units the runtime successfully re-derived.
    pub retransformed: usize,
    /// Units whose retransformation failed.
    pub failed: Vec<(UnitName, AgentError)>,
}

/// Drives the one-time retransformation pass after loading completes.
#[derive(Debug)]
pub struct Retransformer {
    /// Dispatcher holding the populated hook registry.
    dispatcher: Arc<Dispatcher>,
    /// Runtime handle.
    instrumentation: Arc<dyn Instrumentation>,
    /// Shared lifecycle phase.
    phase: Arc<PhaseCell>,
}

impl Retransformer {
    /// Creates a new retransformation driver.
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        instrumentation: Arc<dyn Instrumentation>,
        phase: Arc<PhaseCell>,
    ) -> Self {
        Self {
            dispatcher,
            instrumentation,
            phase,
        }
    }

    /// Runs the initial retransformation pass.
    ///
    /// Walks every unit that is both hooked in the registry and active in
    /// the runtime, asking the runtime to re-derive it through the
    /// dispatcher. A unit that fails is logged and counted; the pass
    /// continues with the remaining units. Calling `run` a second time, or
    /// before the registry is populated, is refused.
    pub async fn run(&self) -> AgentResult<RetransformReport> {
        self.phase
            .advance(
                AgentPhase::RegistryPopulated,
                AgentPhase::RetransformInProgress,
            )
            .map_err(|actual| {
                AgentError::retransform(format!(
                    "retransformation pass requires phase {}, agent is {actual}",
                    AgentPhase::RegistryPopulated
                ))
            })?;

        let hooked = self.dispatcher.hooked_units();
        let mut report = RetransformReport::default();

        if hooked.is_empty() {
            debug!("No hooked units; skipping retransformation pass");
        } else {
            for unit in self.instrumentation.active_units().await {
                if !hooked.contains(&unit) {
                    continue;
                }
                report.matched += 1;
                match self.instrumentation.retransform_unit(&unit).await {
                    Ok(()) => {
                        debug!(unit = %unit, "Unit retransformed");
                        report.retransformed += 1;
                    }
                    Err(e) => {
                        warn!(unit = %unit, error = %e, "Retransformation failed for unit");
                        report.failed.push((unit, e));
                    }
                }
            }
        }

        self.phase
            .advance(
                AgentPhase::RetransformInProgress,
                AgentPhase::RetransformComplete,
            )
            .map_err(|actual| {
                AgentError::retransform(format!(
                    "phase moved to {actual} during the retransformation pass"
                ))
            })?;

        info!(
            matched = report.matched,
            retransformed = report.retransformed,
            failed = report.failed.len(),
            "Initial retransformation pass complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashmap::DashMap;

    use bytegate_core::traits::instrumentation::LoadInterceptor;
    use bytegate_core::traits::transformer::{Registration, TransformError, Transformer};
    use bytegate_core::types::context::LoadContext;
    use bytegate_core::types::definition::{Definition, DefinitionTable};

    #[derive(Debug)]
    struct NopTransformer;

    impl Transformer for NopTransformer {
        fn transform(
            &self,
            _unit: &UnitName,
            _bytes: &[u8],
            _ctx: &LoadContext,
        ) -> Result<Option<Vec<u8>>, TransformError> {
            Ok(None)
        }
    }

    /// Runtime that records which units were retransformed and fails the
    /// units listed in `broken`.
    #[derive(Debug, Default)]
    struct RecordingRuntime {
        active: Vec<UnitName>,
        broken: Vec<UnitName>,
        retransformed: DashMap<UnitName, ()>,
    }

    #[async_trait]
    impl Instrumentation for RecordingRuntime {
        fn attach_interceptor(&self, _interceptor: Arc<dyn LoadInterceptor>) {}

        async fn active_units(&self) -> Vec<UnitName> {
            self.active.clone()
        }

        async fn retransform_unit(&self, unit: &UnitName) -> AgentResult<()> {
            if self.broken.contains(unit) {
                return Err(AgentError::instrumentation("unit is not modifiable"));
            }
            self.retransformed.insert(unit.clone(), ());
            Ok(())
        }

        async fn inject_shared(&self, _table: DefinitionTable) -> AgentResult<()> {
            Ok(())
        }

        async fn resolve_shared(&self, _name: &str) -> Option<Definition> {
            None
        }
    }

    fn hooked_dispatcher(units: &[&str]) -> Arc<Dispatcher> {
        let dispatcher = Arc::new(Dispatcher::new());
        for unit in units {
            dispatcher.add_transformers(vec![Registration::new(
                *unit,
                Arc::new(NopTransformer) as Arc<dyn Transformer>,
            )]);
        }
        dispatcher
    }

    fn populated_phase() -> Arc<PhaseCell> {
        let phase = Arc::new(PhaseCell::new());
        phase
            .advance(AgentPhase::Uninitialized, AgentPhase::RegistryPopulated)
            .expect("populate");
        phase
    }

    #[test]
    fn test_phase_cell_advances_forward_only() {
        let cell = PhaseCell::new();
        assert_eq!(cell.current(), AgentPhase::Uninitialized);
        cell.advance(AgentPhase::Uninitialized, AgentPhase::RegistryPopulated)
            .expect("advance");
        let stale = cell.advance(AgentPhase::Uninitialized, AgentPhase::RegistryPopulated);
        assert_eq!(stale, Err(AgentPhase::RegistryPopulated));
    }

    #[tokio::test]
    async fn test_retransforms_intersection_of_hooked_and_active() {
        let runtime = Arc::new(RecordingRuntime {
            active: vec![
                UnitName::from("app.Hooked"),
                UnitName::from("app.Unhooked"),
            ],
            ..RecordingRuntime::default()
        });
        let dispatcher = hooked_dispatcher(&["app.Hooked", "app.NotActive"]);
        let driver = Retransformer::new(dispatcher, runtime.clone(), populated_phase());

        let report = driver.run().await.expect("run");
        assert_eq!(report.matched, 1);
        assert_eq!(report.retransformed, 1);
        assert!(report.failed.is_empty());
        assert!(runtime.retransformed.contains_key(&UnitName::from("app.Hooked")));
        assert!(!runtime.retransformed.contains_key(&UnitName::from("app.Unhooked")));
    }

    #[tokio::test]
    async fn test_unit_failure_does_not_abort_the_pass() {
        let runtime = Arc::new(RecordingRuntime {
            active: vec![
                UnitName::from("app.Broken"),
                UnitName::from("app.Fine"),
            ],
            broken: vec![UnitName::from("app.Broken")],
            ..RecordingRuntime::default()
        });
        let dispatcher = hooked_dispatcher(&["app.Broken", "app.Fine"]);
        let driver = Retransformer::new(dispatcher, runtime.clone(), populated_phase());

        let report = driver.run().await.expect("run");
        assert_eq!(report.matched, 2);
        assert_eq!(report.retransformed, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, UnitName::from("app.Broken"));
        assert!(runtime.retransformed.contains_key(&UnitName::from("app.Fine")));
    }

    #[tokio::test]
    async fn test_second_pass_is_refused() {
        let runtime = Arc::new(RecordingRuntime::default());
        let driver = Retransformer::new(hooked_dispatcher(&[]), runtime, populated_phase());

        driver.run().await.expect("first run");
        let second = driver.run().await;
        assert!(second.is_err());
        assert_eq!(
            second.expect_err("refused").kind,
            bytegate_core::error::ErrorKind::Retransform
        );
    }

    #[tokio::test]
    async fn test_run_before_registry_populated_is_refused() {
        let runtime = Arc::new(RecordingRuntime::default());
        let driver = Retransformer::new(
            hooked_dispatcher(&[]),
            runtime,
            Arc::new(PhaseCell::new()),
        );
        assert!(driver.run().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_registry_completes_without_touching_the_runtime() {
        let runtime = Arc::new(RecordingRuntime {
            active: vec![UnitName::from("app.Something")],
            ..RecordingRuntime::default()
        });
        let phase = populated_phase();
        let driver = Retransformer::new(hooked_dispatcher(&[]), runtime.clone(), phase.clone());

        let report = driver.run().await.expect("run");
        assert_eq!(report.matched, 0);
        assert!(runtime.retransformed.is_empty());
        assert_eq!(phase.current(), AgentPhase::RetransformComplete);
    }
}
