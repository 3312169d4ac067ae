//! Per-load context handed to transformers.

/// Why a code unit is passing through the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    /// The unit is being defined for the first time.
    Initial,
    /// The unit was already active and is being re-derived.
    Retransform,
}

/// Context for one trip through the dispatcher.
///
/// Carries the load kind and, when the runtime provides one, the name of the
/// loading scope the unit is being defined in.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Initial load or retransformation pass.
    pub kind: LoadKind,
    /// Loading scope the unit is defined in, if the runtime reports one.
    pub scope: Option<String>,
}

impl LoadContext {
    /// Context for a first-time unit definition.
    pub fn initial() -> Self {
        Self {
            kind: LoadKind::Initial,
            scope: None,
        }
    }

    /// Context for a retransformation pass.
    pub fn retransform() -> Self {
        Self {
            kind: LoadKind::Retransform,
            scope: None,
        }
    }

    /// Set the loading scope.
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(LoadContext::initial().kind, LoadKind::Initial);
        assert_eq!(LoadContext::retransform().kind, LoadKind::Retransform);
    }

    #[test]
    fn test_scope_builder() {
        let ctx = LoadContext::initial().in_scope("app");
        assert_eq!(ctx.scope.as_deref(), Some("app"));
    }
}
