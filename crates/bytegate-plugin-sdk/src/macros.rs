//! Export macro for dynamically loaded extension libraries.

/// Exports the symbols the dynamic loader expects from an extension library.
///
/// Invoke once at crate root in a `cdylib` extension crate. The one-argument
/// form constructs the entry via `Default`; pass a constructor expression as
/// the second argument otherwise.
///
/// ```rust,ignore
/// bytegate_plugin_sdk::export_plugin!(RedactEntry);
/// bytegate_plugin_sdk::export_plugin!(RedactEntry, RedactEntry::new());
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($entry:ty) => {
        $crate::export_plugin!($entry, <$entry as ::core::default::Default>::default());
    };
    ($entry:ty, $ctor:expr) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn bytegate_abi_version() -> u32 {
            $crate::ABI_VERSION
        }

        #[unsafe(no_mangle)]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn bytegate_create_entry() -> *mut dyn $crate::prelude::PluginEntry {
            let entry: $entry = $ctor;
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(entry))
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[derive(Debug, Default)]
    struct ExportedEntry;

    #[async_trait]
    impl PluginEntry for ExportedEntry {
        fn name(&self) -> &str {
            "exported"
        }

        fn version(&self) -> &str {
            "0.1.0"
        }

        fn author(&self) -> &str {
            "tests"
        }

        async fn init(&mut self, _env: &Environment, _conf: &PluginConf) -> AgentResult<()> {
            Ok(())
        }

        fn transformers(&self) -> Vec<Registration> {
            Vec::new()
        }
    }

    crate::export_plugin!(ExportedEntry);

    #[test]
    fn test_exported_symbols_round_trip() {
        assert_eq!(bytegate_abi_version(), crate::ABI_VERSION);

        let raw = bytegate_create_entry();
        let entry = unsafe { Box::from_raw(raw) };
        assert_eq!(entry.name(), "exported");
    }
}
