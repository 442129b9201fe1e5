//! The on-disk project workspace and its SDK-managed control directory.
use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::keys;
use crate::config::package_config::{self, PackageConfig};
use crate::error::ProvisionError;
use crate::logging::Log;
use crate::packages::PackageInstaller;
use crate::resources::fs::{has_entries_besides, recreate_dir};

/// Name of the control directory at the workspace root.
pub const CONTROL_DIR: &str = ".knightos";

/// Subdirectories created inside the control directory on every run.
pub const CONTROL_SUBDIRS: [&str; 3] = ["include", "packages", "pkgroot"];

/// A project directory. Every path is derived from the explicit root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

/// What the root initialiser found, consulted by later steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionState {
    /// The root already held content besides the control directory.
    pub exists: bool,
    /// The caller accepted provisioning into a foreign directory.
    pub force: bool,
}

impl ProvisionState {
    /// Whether this run is creating a new project.
    #[must_use]
    pub const fn is_new(self) -> bool {
        !self.exists
    }
}

impl Workspace {
    /// Workspace rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// SDK-managed directory, rebuilt on every run.
    #[must_use]
    pub fn control_dir(&self) -> PathBuf {
        self.root.join(CONTROL_DIR)
    }

    /// Canonical kernel image location.
    #[must_use]
    pub fn kernel_image(&self) -> PathBuf {
        self.control_dir().join("kernel.rom")
    }

    /// Version marker written for downloaded kernels.
    #[must_use]
    pub fn kernel_version_file(&self) -> PathBuf {
        self.control_dir().join("kernel-version")
    }

    /// Downloaded package archives.
    #[must_use]
    pub fn packages_dir(&self) -> PathBuf {
        self.control_dir().join("packages")
    }

    /// Extraction root for installed packages.
    #[must_use]
    pub fn pkgroot_dir(&self) -> PathBuf {
        self.control_dir().join("pkgroot")
    }

    /// Where the archive for package `repo/name` is stored.
    #[must_use]
    pub fn package_archive(&self, package: &str) -> PathBuf {
        self.packages_dir()
            .join(format!("{}.pkg", package.replace('/', "-")))
    }

    /// The project marker file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(package_config::FILE_NAME)
    }

    /// Read `package.config`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read_config(&self) -> Result<Option<PackageConfig>> {
        PackageConfig::read(&self.config_path())
    }

    /// Establish the control directory and report whether the root already
    /// held a project.
    ///
    /// All checks run before anything is written: a new project without a
    /// name, or a populated directory without `package.config` and without
    /// `force`, leaves the disk untouched. Otherwise the control directory is
    /// deleted, recreated, and populated with [`CONTROL_SUBDIRS`].
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Configuration`] for a new project without a
    /// name, [`ProvisionError::UnsafeState`] for a foreign directory, or
    /// [`ProvisionError::Filesystem`] if the skeleton cannot be created.
    pub fn initialize(
        &self,
        project_name: Option<&str>,
        force: bool,
        log: &dyn Log,
    ) -> Result<ProvisionState> {
        let exists = has_entries_besides(&self.root, &[CONTROL_DIR])?;

        if !exists && project_name.is_none_or(str::is_empty) {
            return Err(ProvisionError::Configuration(
                "a project name is required for new projects".to_string(),
            )
            .into());
        }

        if exists && !self.config_path().exists() {
            if !force {
                return Err(ProvisionError::UnsafeState {
                    root: self.root.clone(),
                }
                .into());
            }
            log.warn("forcibly installing SDK in populated directory");
        }

        let control = self.control_dir();
        if control.exists() {
            log.info("rebuilding existing environment");
        }
        recreate_dir(&control)?;
        for sub in CONTROL_SUBDIRS {
            recreate_dir(&control.join(sub))?;
        }

        Ok(ProvisionState { exists, force })
    }

    /// Reload `package.config` and install every declared `dependencies`
    /// entry whose archive is missing from the control directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or the installer
    /// fails.
    pub fn ensure_packages_consistent(
        &self,
        installer: &dyn PackageInstaller,
        log: &dyn Log,
    ) -> Result<()> {
        let Some(config) = self.read_config()? else {
            log.debug("no package.config; nothing to reconcile");
            return Ok(());
        };
        let missing: Vec<String> = config
            .list(keys::DEPENDENCIES)
            .into_iter()
            .filter(|p| !self.package_archive(p).exists())
            .collect();
        if missing.is_empty() {
            log.debug("declared dependencies are installed");
            return Ok(());
        }
        log.info(&format!("installing declared dependencies: {}", missing.join(", ")));
        installer.install(self, &missing)
    }
}
