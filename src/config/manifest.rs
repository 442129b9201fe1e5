//! Template manifests: the declarative list of files and packages a project
//! template installs.
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ProvisionError;

/// Environment variable naming an alternative template directory.
pub const TEMPLATES_ENV: &str = "KNIGHTOS_TEMPLATES";

/// One template definition, loaded from `<dir>/<name>/<name>.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateManifest {
    /// Template name; also the directory file sources are resolved in.
    pub name: String,
    /// Files to install, in order.
    #[serde(default)]
    pub files: Vec<FileSpec>,
    /// Declared package dependencies.
    #[serde(default)]
    pub install: Vec<String>,
}

/// One file a template wants installed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileSpec {
    /// Source path relative to the template directory.
    pub template: PathBuf,
    /// Destination path relative to the workspace root.
    pub path: PathBuf,
    /// Copy bytes verbatim instead of rendering as text.
    #[serde(default)]
    pub binary: bool,
    /// May be rewritten when re-provisioning an existing project.
    #[serde(default)]
    pub reinit: bool,
}

/// A manifest together with the directory its file sources live in.
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    /// Parsed manifest.
    pub manifest: TemplateManifest,
    /// Directory that [`FileSpec::template`] paths are relative to.
    pub source_dir: PathBuf,
}

impl LoadedTemplate {
    /// Absolute source path for a file spec.
    #[must_use]
    pub fn source_path(&self, spec: &FileSpec) -> PathBuf {
        self.source_dir.join(&spec.template)
    }
}

/// A directory of templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Use `dir` as the template directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the template directory.
    ///
    /// Order: explicit argument, user default, `KNIGHTOS_TEMPLATES`,
    /// `<exe>/../share/knightos/templates`, then the templates bundled with
    /// this crate.
    #[must_use]
    pub fn locate(explicit: Option<&Path>, user_default: Option<&Path>) -> Self {
        if let Some(dir) = explicit.or(user_default) {
            return Self::new(dir);
        }

        if let Ok(dir) = std::env::var(TEMPLATES_ENV)
            && !dir.is_empty()
        {
            return Self::new(dir);
        }

        if let Ok(exe) = std::env::current_exe()
            && let Some(parent) = exe.parent()
        {
            let candidate = parent.join("../share/knightos/templates");
            if candidate.is_dir() {
                return Self::new(candidate);
            }
        }

        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))
    }

    /// The directory this store reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the manifest for template `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::TemplateNotFound`] if the manifest cannot be
    /// read or parsed.
    pub fn load(&self, name: &str) -> Result<LoadedTemplate> {
        let path = self.dir.join(name).join(format!("{name}.yaml"));
        let not_found = |source: Box<dyn std::error::Error + Send + Sync>| {
            ProvisionError::TemplateNotFound {
                name: name.to_string(),
                dir: self.dir.clone(),
                source,
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| not_found(e.into()))?;
        let manifest: TemplateManifest =
            serde_yaml::from_str(&content).map_err(|e| not_found(e.into()))?;
        let source_dir = self.dir.join(&manifest.name);
        Ok(LoadedTemplate {
            manifest,
            source_dir,
        })
    }
}
