//! Plain key/value configuration files for extensions.
//!
//! Every extension reads its settings from a text file of `key = value`
//! lines. The same format describes extension package manifests. The parser
//! is deliberately lenient: `#` starts a comment, blank lines and lines
//! without `=` are ignored, and repeated keys are preserved in file order so
//! extensions can express rule lists.

use std::path::{Path, PathBuf};

use crate::result::AgentResult;

/// Parsed per-extension configuration.
///
/// Entries keep their file order. A key may appear more than once; use
/// [`PluginConf::get_all`] to read repeated keys.
#[derive(Debug, Clone, Default)]
pub struct PluginConf {
    /// The file this configuration was read from, if any.
    path: Option<PathBuf>,
    /// Key/value pairs in file order.
    entries: Vec<(String, String)>,
}

impl PluginConf {
    /// Parse configuration text.
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();

        for raw_line in text.lines() {
            let line = match raw_line.find('#') {
                Some(pos) => &raw_line[..pos],
                None => raw_line,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            entries.push((key.to_string(), value.trim().to_string()));
        }

        Self {
            path: None,
            entries,
        }
    }

    /// Read and parse a configuration file.
    ///
    /// A missing file is not an error: extensions without a configuration
    /// file receive an empty configuration.
    pub async fn load(path: &Path) -> AgentResult<Self> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path: Some(path.to_path_buf()),
                    entries: Vec::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut conf = Self::parse(&text);
        conf.path = Some(path.to_path_buf());
        Ok(conf)
    }

    /// Return the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Return all values for a key, in file order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Return all entries in file order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Return the file this configuration was read from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Return whether the configuration has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_pairs() {
        let conf = PluginConf::parse("name = redact\nversion = 1.2");
        assert_eq!(conf.get("name"), Some("redact"));
        assert_eq!(conf.get("version"), Some("1.2"));
        assert_eq!(conf.len(), 2);
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "# header comment\n\nkey = value # trailing comment\n   \n# another";
        let conf = PluginConf::parse(text);
        assert_eq!(conf.get("key"), Some("value"));
        assert_eq!(conf.len(), 1);
    }

    #[test]
    fn test_parse_ignores_lines_without_separator() {
        let conf = PluginConf::parse("garbage line\nvalid = yes\n= no key");
        assert_eq!(conf.get("valid"), Some("yes"));
        assert_eq!(conf.len(), 1);
    }

    #[test]
    fn test_repeated_keys_preserve_order() {
        let conf = PluginConf::parse("rule = first\nother = x\nrule = second");
        assert_eq!(conf.get("rule"), Some("first"));
        assert_eq!(conf.get_all("rule"), vec!["first", "second"]);
    }

    #[test]
    fn test_value_may_contain_equals() {
        let conf = PluginConf::parse("expr = a=b");
        assert_eq!(conf.get("expr"), Some("a=b"));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let conf = PluginConf::load(&dir.path().join("absent.conf"))
            .await
            .expect("load");
        assert!(conf.is_empty());
        assert!(conf.path().is_some());
    }

    #[tokio::test]
    async fn test_load_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("redact.conf");
        tokio::fs::write(&path, "rule = a ; b ; c\n")
            .await
            .expect("write");
        let conf = PluginConf::load(&path).await.expect("load");
        assert_eq!(conf.get("rule"), Some("a ; b ; c"));
        assert_eq!(conf.path(), Some(path.as_path()));
    }
}
