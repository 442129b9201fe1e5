//! The `package.config` key/value store that marks a KnightOS project.
use anyhow::Result;
use std::path::Path;

use crate::error::{IoResultExt as _, ProvisionError};

/// File name of the project marker at the workspace root.
pub const FILE_NAME: &str = "package.config";

/// Persisted project configuration, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageConfig {
    entries: Vec<(String, String)>,
}

impl PackageConfig {
    /// Read `path`, returning `None` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Filesystem`] if the file exists but cannot be
    /// read, or [`ProvisionError::Configuration`] if it is malformed.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).fs_context("read", path)?;
        Self::parse(&content)
            .map(Some)
            .map_err(|msg| ProvisionError::Configuration(format!("{}: {msg}", path.display())).into())
    }

    /// Parse `key=value` lines. Blank lines and `#` comments are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use knightos_sdk::config::package_config::PackageConfig;
    ///
    /// let config = PackageConfig::parse("name=Calc\n# comment\ndependencies=core/init\n").unwrap();
    /// assert_eq!(config.get("name"), Some("Calc"));
    /// assert_eq!(config.list("dependencies"), ["core/init"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a message naming the first line that has no `=`.
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut entries = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(format!(
                    "line {}: expected key=value, found '{trimmed}'",
                    line_num + 1
                ));
            };
            entries.push((key.trim().to_string(), value.trim().to_string()));
        }
        Ok(Self { entries })
    }

    /// Look up a key. The last occurrence wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a key holding a space-delimited list.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| v.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }
}
