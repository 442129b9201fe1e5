//! Kernel acquisition and installation into the control directory.
mod release;

pub use release::ReleaseKernelSource;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt as _, ProvisionError};
use crate::logging::Log;
use crate::resources::symlink::{SymlinkResource, create_symlink};
use crate::resources::{Applicable as _, fs::remove_existing};
use crate::workspace::Workspace;

/// A kernel image available on the local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelImage {
    /// Image file.
    pub path: PathBuf,
    /// Release version of the image.
    pub version: String,
}

/// Supplies kernel images for a platform.
#[cfg_attr(test, mockall::automock)]
pub trait KernelSource {
    /// Make an image for `platform` available locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform is unsupported or the image cannot be
    /// fetched.
    fn ensure(&self, platform: &str) -> Result<KernelImage>;
}

/// How the kernel was installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelInstall {
    /// Fetched from a [`KernelSource`]; a version marker was written.
    Remote {
        /// Installed release.
        version: String,
    },
    /// Linked from a local build; no version marker.
    Local {
        /// Image the workspace now links to.
        image: PathBuf,
    },
}

/// Install exactly one kernel image as `.knightos/kernel.rom`.
///
/// With `local_source`, links `<root>/<local_source>/bin/<platform>/kernel.rom`.
/// Otherwise asks `source` for an image, links it into the control directory
/// under its own file name, moves that link to `kernel.rom`, and records the
/// version in `kernel-version`.
///
/// # Errors
///
/// Returns [`ProvisionError::KernelAcquisition`] if no image can be obtained
/// or [`ProvisionError::Filesystem`] if it cannot be linked.
pub fn install_kernel(
    workspace: &Workspace,
    platform: &str,
    local_source: Option<&Path>,
    source: &dyn KernelSource,
    log: &dyn Log,
) -> Result<KernelInstall> {
    match local_source {
        Some(local) => install_local(workspace, platform, local, log),
        None => install_remote(workspace, platform, source, log),
    }
}

fn install_local(
    workspace: &Workspace,
    platform: &str,
    local: &Path,
    log: &dyn Log,
) -> Result<KernelInstall> {
    let image = absolute(
        &workspace
            .root()
            .join(local)
            .join("bin")
            .join(platform)
            .join("kernel.rom"),
    )?;
    if !image.is_file() {
        return Err(ProvisionError::KernelAcquisition(format!(
            "no local kernel image at {}",
            image.display()
        ))
        .into());
    }

    log.info(&format!("linking local kernel {}", image.display()));
    SymlinkResource::new(image.clone(), workspace.kernel_image()).apply()?;
    Ok(KernelInstall::Local { image })
}

fn install_remote(
    workspace: &Workspace,
    platform: &str,
    source: &dyn KernelSource,
    log: &dyn Log,
) -> Result<KernelInstall> {
    let image = source.ensure(platform).map_err(|e| match e.downcast::<ProvisionError>() {
        Ok(typed) => anyhow::Error::from(typed),
        Err(other) => ProvisionError::KernelAcquisition(format!("{other:#}")).into(),
    })?;
    if !image.path.is_file() {
        return Err(ProvisionError::KernelAcquisition(format!(
            "kernel source returned a missing image {}",
            image.path.display()
        ))
        .into());
    }
    let file_name = image.path.file_name().ok_or_else(|| {
        ProvisionError::KernelAcquisition(format!(
            "kernel source returned a path without a file name: {}",
            image.path.display()
        ))
    })?;

    log.info(&format!("installing kernel {}", image.version));
    let image_path = absolute(&image.path)?;
    let staged = workspace.control_dir().join(file_name);
    let target = workspace.kernel_image();
    remove_existing(&staged)?;
    create_symlink(&image_path, &staged).fs_context("create symlink", &staged)?;
    if staged != target {
        std::fs::rename(&staged, &target).fs_context("move", &staged)?;
    }

    let marker = workspace.kernel_version_file();
    std::fs::write(&marker, &image.version).fs_context("write", &marker)?;
    Ok(KernelInstall::Remote {
        version: image.version,
    })
}

/// Symlink targets must not depend on the current directory.
fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path).fs_context("resolve", path)?)
}
