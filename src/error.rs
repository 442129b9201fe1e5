//! Domain-specific error types for workspace provisioning.
//!
//! Components return [`anyhow::Result`] and raise a [`ProvisionError`] when a
//! failure belongs to one of the categories below.  The command dispatcher in
//! `main` recovers the category with [`anyhow::Error::downcast_ref`] and
//! decides how to report it.
//!
//! # Error hierarchy
//!
//! ```text
//! ProvisionError
//! ├── Configuration      : required input missing or malformed
//! ├── UnsafeState        : populated directory without a project marker
//! ├── TemplateNotFound   : template manifest cannot be loaded
//! ├── Filesystem         : create/remove/link/copy/write failures
//! ├── KernelAcquisition  : remote fetch failed or local kernel missing
//! └── DependencyInstall  : package installer failure
//! ```
//!
//! Version-control initialisation failures are deliberately absent: they are
//! reported through [`VcsOutcome`](crate::vcs::VcsOutcome) and never abort a
//! run.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal provisioning failures.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// A required input is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The target directory holds foreign content and `--force` was not given.
    #[error(
        "{} is not empty and does not appear to hold a KnightOS project, aborting",
        root.display()
    )]
    UnsafeState {
        /// Workspace root that was refused.
        root: PathBuf,
    },

    /// The named template manifest could not be loaded.
    #[error("template '{name}' not found in {}", dir.display())]
    TemplateNotFound {
        /// Requested template name.
        name: String,
        /// Directory that was searched.
        dir: PathBuf,
        /// Underlying load or parse failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A filesystem operation failed.
    #[error("failed to {action} {}", path.display())]
    Filesystem {
        /// Short verb phrase, e.g. `"create directory"`.
        action: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The kernel image could not be obtained.
    #[error("kernel acquisition failed: {0}")]
    KernelAcquisition(String),

    /// The package installer reported a failure.
    #[error("failed to install package '{package}'")]
    DependencyInstall {
        /// Package that could not be installed.
        package: String,
        /// Underlying installer failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ProvisionError {
    /// Build a [`ProvisionError::Filesystem`] from an I/O error.
    #[must_use]
    pub fn filesystem(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a validation failure detected before any
    /// provisioning work started.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::UnsafeState { .. } | Self::TemplateNotFound { .. }
        )
    }
}

/// Extension for mapping [`std::io::Result`] into a [`ProvisionError::Filesystem`].
pub trait IoResultExt<T> {
    /// Attach the action and path to an I/O failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Filesystem`] when `self` is an error.
    fn fs_context(self, action: &'static str, path: &std::path::Path) -> Result<T, ProvisionError>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn fs_context(self, action: &'static str, path: &std::path::Path) -> Result<T, ProvisionError> {
        self.map_err(|e| ProvisionError::filesystem(action, path, e))
    }
}
