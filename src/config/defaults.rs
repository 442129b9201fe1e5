//! Per-user defaults read from `$XDG_CONFIG_HOME/knightos/sdk.toml`.
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt as _, ProvisionError};
use crate::vcs::Vcs;

/// Optional per-user defaults. Every field falls back to the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserDefaults {
    /// Emulator.
    pub emulator: Option<String>,
    /// Debugger.
    pub debugger: Option<String>,
    /// Assembler.
    pub assembler: Option<String>,
    /// C compiler.
    pub compiler: Option<String>,
    /// Calculator model.
    pub platform: Option<String>,
    /// Template for new projects.
    pub template: Option<String>,
    /// Version-control system.
    pub vcs: Option<Vcs>,
    /// Directory searched for templates before the bundled ones.
    pub template_dir: Option<PathBuf>,
}

impl UserDefaults {
    /// Default location: `$XDG_CONFIG_HOME/knightos/sdk.toml`, falling back to
    /// `~/.config/knightos/sdk.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let base = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(
                std::env::var("HOME")
                    .or_else(|_| std::env::var("USERPROFILE"))
                    .ok()?,
            )
            .join(".config"),
        };
        Some(base.join("knightos").join("sdk.toml"))
    }

    /// Load defaults from `path`. A missing file yields empty defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Configuration`] if the file is not valid
    /// TOML or holds unknown keys.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).fs_context("read", path)?;
        toml::from_str(&content).map_err(|e| {
            ProvisionError::Configuration(format!("{}: {}", path.display(), e.message())).into()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults = UserDefaults::load(&tmp.path().join("sdk.toml")).unwrap();
        assert_eq!(defaults, UserDefaults::default());
    }

    #[test]
    fn parses_known_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sdk.toml");
        std::fs::write(&path, "platform = \"TI83p\"\nvcs = \"hg\"\ntemplate_dir = \"/opt/t\"\n").unwrap();
        let defaults = UserDefaults::load(&path).unwrap();
        assert_eq!(defaults.platform.as_deref(), Some("TI83p"));
        assert_eq!(defaults.vcs, Some(Vcs::Hg));
        assert_eq!(defaults.template_dir, Some(PathBuf::from("/opt/t")));
        assert!(defaults.emulator.is_none());
    }

    #[test]
    fn unknown_key_is_configuration_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sdk.toml");
        std::fs::write(&path, "emulater = \"z80e\"\n").unwrap();
        let err = UserDefaults::load(&path).expect_err("unknown key");
        assert!(matches!(
            err.downcast_ref::<ProvisionError>(),
            Some(ProvisionError::Configuration(_))
        ));
    }
}
