//! Dynamic extension library loading using `libloading` (feature-gated).
//!
//! A package manifest may name a shared library. The library exports a
//! versioned pair of symbols; the loader checks the ABI version, then wraps
//! the exported constructor as an entry factory for the package namespace.

/// Plugin ABI version this loader accepts.
///
/// Bump whenever the exported symbols or the `PluginEntry` trait change
/// incompatibly.
pub const ABI_VERSION: u32 = 1;

/// Name of the symbol reporting the library's plugin ABI version.
pub const ABI_SYMBOL: &[u8] = b"bytegate_abi_version";

/// Name of the symbol constructing the library's entry point.
pub const CREATE_ENTRY_SYMBOL: &[u8] = b"bytegate_create_entry";

#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::path::Path;
    use std::sync::Arc;

    use tracing::info;

    use bytegate_core::types::definition::EntryFactory;

    use super::{ABI_SYMBOL, ABI_VERSION, CREATE_ENTRY_SYMBOL};
    use crate::error::LoadError;

    /// Type of the ABI-version function exported by extension libraries.
    pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

    /// Type of the entry constructor exported by extension libraries.
    ///
    /// Libraries must export:
    /// `extern "C" fn bytegate_create_entry() -> *mut dyn PluginEntry`,
    /// returning a pointer obtained from `Box::into_raw`.
    pub type CreateEntryFn =
        unsafe extern "C" fn() -> *mut dyn bytegate_core::traits::entry::PluginEntry;

    /// Loads extension entry factories from shared libraries.
    pub struct DynamicLoader {
        /// Loaded libraries (kept alive for the lifetime of the loader).
        _libraries: Vec<libloading::Library>,
    }

    impl DynamicLoader {
        /// Creates a new dynamic loader.
        pub fn new() -> Self {
            Self {
                _libraries: Vec::new(),
            }
        }

        /// Number of libraries currently held open.
        pub fn loaded_count(&self) -> usize {
            self._libraries.len()
        }

        /// Loads the entry factory from the given shared library path.
        ///
        /// The library stays open for the lifetime of the loader, so the
        /// returned factory and everything it constructs remain valid.
        ///
        /// # Safety
        /// This function runs arbitrary code from a shared library. Only
        /// load trusted extension packages.
        pub unsafe fn load_entry_factory(
            &mut self,
            path: &Path,
        ) -> Result<EntryFactory, LoadError> {
            let lib = unsafe { libloading::Library::new(path) }.map_err(|e| {
                LoadError::LibraryLoad {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;

            let abi_version: AbiVersionFn = unsafe {
                let symbol: libloading::Symbol<AbiVersionFn> =
                    lib.get(ABI_SYMBOL).map_err(|e| LoadError::LibraryLoad {
                        path: path.to_path_buf(),
                        message: format!("missing ABI version symbol: {e}"),
                    })?;
                *symbol
            };

            let found = unsafe { abi_version() };
            if found != ABI_VERSION {
                return Err(LoadError::AbiMismatch {
                    path: path.to_path_buf(),
                    found,
                    expected: ABI_VERSION,
                });
            }

            let create: CreateEntryFn = unsafe {
                let symbol: libloading::Symbol<CreateEntryFn> =
                    lib.get(CREATE_ENTRY_SYMBOL)
                        .map_err(|e| LoadError::LibraryLoad {
                            path: path.to_path_buf(),
                            message: format!("missing entry constructor symbol: {e}"),
                        })?;
                *symbol
            };

            info!(path = %path.display(), abi = found, "Extension library loaded");

            // Never dropped, so the raw constructor stays valid.
            self._libraries.push(lib);

            Ok(Arc::new(move || unsafe { Box::from_raw(create()) }))
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for DynamicLoader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DynamicLoader")
                .field("loaded_count", &self._libraries.len())
                .finish()
        }
    }
}

/// Stub loader when the `dynamic` feature is not enabled.
#[cfg(not(feature = "dynamic"))]
pub mod dynamic_loader {
    /// Stub dynamic loader.
    #[derive(Debug)]
    pub struct DynamicLoader;

    impl DynamicLoader {
        /// Creates a stub loader.
        pub fn new() -> Self {
            Self
        }

        /// Number of libraries currently held open. Always zero.
        pub fn loaded_count(&self) -> usize {
            0
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub use dynamic_loader::DynamicLoader;
