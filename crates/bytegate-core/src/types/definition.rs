//! Named definitions contributed to namespaces by packages.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::traits::entry::PluginEntry;

/// Constructor for an extension entry point.
///
/// Boxed as a shared closure so both compiled-in packages and dynamically
/// loaded libraries can contribute factories.
pub type EntryFactory = Arc<dyn Fn() -> Box<dyn PluginEntry> + Send + Sync>;

/// Named definitions a package provides, keyed by fully qualified name.
pub type DefinitionTable = HashMap<String, Definition>;

/// One definition a package contributes to a namespace.
#[derive(Clone)]
pub enum Definition {
    /// Constructor for an entry-point type. Only types implementing
    /// [`PluginEntry`] can be wrapped here, so resolving a name to this
    /// variant is the capability check for step four of package loading.
    Entry(EntryFactory),
    /// Raw artifact bytes for a companion code unit the package supplies,
    /// so rewritten units can reference definitions the package provides.
    Unit(Arc<[u8]>),
}

impl Definition {
    /// Wrap an entry-point constructor.
    pub fn entry<E>(factory: impl Fn() -> E + Send + Sync + 'static) -> Self
    where
        E: PluginEntry + 'static,
    {
        Self::Entry(Arc::new(move || Box::new(factory())))
    }

    /// Wrap companion unit bytes.
    pub fn unit(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Unit(bytes.into())
    }

    /// Return the entry factory, if this definition is one.
    pub fn as_entry(&self) -> Option<&EntryFactory> {
        match self {
            Self::Entry(factory) => Some(factory),
            Self::Unit(_) => None,
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(_) => f.write_str("Definition::Entry(..)"),
            Self::Unit(bytes) => write!(f, "Definition::Unit({} bytes)", bytes.len()),
        }
    }
}
