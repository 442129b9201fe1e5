use anyhow::{Context as _, Result, anyhow};
use std::io;
use std::path::Path;
use std::sync::Arc;

use super::PackageInstaller;
use crate::error::ProvisionError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::resources::fs::{discard_partial, ensure_parent_dir};
use crate::workspace::Workspace;

const DEFAULT_REPOSITORY: &str = "https://packages.knightos.org";

/// Downloads packages from the KnightOS package repository and extracts them
/// with `kpack`.
pub struct RepositoryInstaller {
    base_url: String,
    executor: Arc<dyn Executor>,
    log: Arc<dyn Log>,
}

impl std::fmt::Debug for RepositoryInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryInstaller")
            .field("base_url", &self.base_url)
            .field("executor", &self.executor)
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl RepositoryInstaller {
    /// Installer for the public KnightOS repository.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>, log: Arc<dyn Log>) -> Self {
        Self {
            base_url: DEFAULT_REPOSITORY.to_string(),
            executor,
            log,
        }
    }

    /// Use a different repository.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn download_url(&self, package: &str) -> Result<String> {
        let (repo, name) = package
            .split_once('/')
            .filter(|(r, n)| !r.is_empty() && !n.is_empty() && !n.contains('/'))
            .ok_or_else(|| anyhow!("expected repo/name, found '{package}'"))?;
        Ok(format!(
            "{}/{repo}/{name}/download",
            self.base_url.trim_end_matches('/')
        ))
    }

    fn install_one(&self, workspace: &Workspace, package: &str) -> Result<()> {
        let url = self.download_url(package)?;
        let archive = workspace.package_archive(package);
        fetch(&url, &archive, self.log.as_ref())?;

        if !self.executor.which("kpack") {
            self.log.warn(&format!(
                "kpack not found; {package} downloaded but not extracted"
            ));
            return Ok(());
        }
        let archive_arg = archive.to_string_lossy();
        let pkgroot = workspace.pkgroot_dir();
        let pkgroot_arg = pkgroot.to_string_lossy();
        self.executor
            .run("kpack", &["-e", &archive_arg, &pkgroot_arg])?;
        Ok(())
    }
}

impl PackageInstaller for RepositoryInstaller {
    fn install(&self, workspace: &Workspace, packages: &[String]) -> Result<()> {
        for package in packages {
            self.log.debug(&format!("installing {package}"));
            self.install_one(workspace, package).map_err(|e| {
                ProvisionError::DependencyInstall {
                    package: package.clone(),
                    source: e.into(),
                }
            })?;
        }
        Ok(())
    }
}

fn fetch(url: &str, dest: &Path, log: &dyn Log) -> Result<()> {
    ensure_parent_dir(dest)?;
    let mut response = ureq::get(url)
        .header("User-Agent", concat!("knightos-sdk/", env!("CARGO_PKG_VERSION")))
        .call()
        .with_context(|| format!("downloading {url}"))?;
    let mut file = std::fs::File::create(dest)
        .with_context(|| format!("creating {}", dest.display()))?;
    if let Err(e) = io::copy(&mut response.body_mut().as_reader(), &mut file) {
        drop(file);
        discard_partial(dest, log);
        return Err(e).with_context(|| format!("downloading {url}"));
    }
    Ok(())
}
