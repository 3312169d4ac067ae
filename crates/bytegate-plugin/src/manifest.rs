//! Extension package manifests.
//!
//! An extension package is a `<stem>.plugin` file in the plugins directory,
//! written in the same `key = value` format as extension configuration. The
//! `entry` key names the definition to instantiate; the optional `library`
//! key names a dynamic library contributing definitions to the package
//! namespace. Renaming the file to `<stem>.plugin<disabled-suffix>` disables
//! the package without deleting it.

use std::path::{Path, PathBuf};

use bytegate_core::conf::PluginConf;

use crate::error::LoadError;

/// File suffix identifying an extension package manifest.
pub const PACKAGE_SUFFIX: &str = ".plugin";

/// How a file in the plugins directory relates to the package format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageFile {
    /// An enabled package manifest, `<stem>.plugin`.
    Enabled {
        /// Package stem.
        stem: String,
    },
    /// A disabled package manifest, `<stem>.plugin<disabled-suffix>`.
    Disabled {
        /// Package stem.
        stem: String,
    },
}

/// Classify a file name found in the plugins directory.
///
/// Returns `None` for files that are not package manifests at all. Disabled
/// manifests are still reported so the loader can log the skip.
pub fn classify(file_name: &str, disabled_suffix: &str) -> Option<PackageFile> {
    if !disabled_suffix.is_empty() {
        let disabled_full = format!("{PACKAGE_SUFFIX}{disabled_suffix}");
        if let Some(stem) = file_name.strip_suffix(disabled_full.as_str()) {
            if !stem.is_empty() {
                return Some(PackageFile::Disabled {
                    stem: stem.to_string(),
                });
            }
        }
    }
    if let Some(stem) = file_name.strip_suffix(PACKAGE_SUFFIX) {
        if !stem.is_empty() {
            return Some(PackageFile::Enabled {
                stem: stem.to_string(),
            });
        }
    }
    None
}

/// Parsed package manifest.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    /// Manifest file path.
    path: PathBuf,
    /// Package stem, the file name without the manifest suffix.
    stem: String,
    /// Declared entry name, when present and non-empty.
    entry: Option<String>,
    /// Dynamic library named by the manifest, as written.
    library: Option<PathBuf>,
}

impl PackageManifest {
    /// Read and parse a package manifest file.
    pub async fn load(path: &Path, stem: impl Into<String>) -> Result<Self, LoadError> {
        let text =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| LoadError::ManifestUnreadable {
                    path: path.to_path_buf(),
                    source,
                })?;
        Ok(Self::parse(path, stem, &text))
    }

    /// Parse manifest text.
    pub fn parse(path: &Path, stem: impl Into<String>, text: &str) -> Self {
        let conf = PluginConf::parse(text);
        let entry = conf
            .get("entry")
            .filter(|v| !v.is_empty())
            .map(String::from);
        let library = conf
            .get("library")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            path: path.to_path_buf(),
            stem: stem.into(),
            entry,
            library,
        }
    }

    /// Manifest file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Package stem.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Declared entry name.
    ///
    /// `None` means the manifest carries no usable `entry` key and the file
    /// is not an extension package.
    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    /// Dynamic library path, resolved against the manifest's directory.
    pub fn library(&self) -> Option<PathBuf> {
        self.library.as_ref().map(|lib| {
            if lib.is_absolute() {
                lib.clone()
            } else {
                match self.path.parent() {
                    Some(dir) => dir.join(lib),
                    None => lib.clone(),
                }
            }
        })
    }
}
