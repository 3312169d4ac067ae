//! Code-unit identifiers.

use std::fmt;
use std::sync::Arc;

/// Fully qualified name of a loadable code unit.
///
/// The name is opaque to the framework: it is only compared for equality and
/// used as a registry key. Names are typically namespaced and dot-separated
/// (for example `com.acme.licensing.Gatekeeper`). Cloning is cheap; this type
/// is the lookup key on the per-load hot path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitName(Arc<str>);

impl UnitName {
    /// Create a unit name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UnitName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for UnitName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
