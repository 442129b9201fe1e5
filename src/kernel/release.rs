//! Kernel images from the published KnightOS kernel releases.
use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{KernelImage, KernelSource};
use crate::error::{IoResultExt as _, ProvisionError};
use crate::logging::Log;
use crate::platform::Device;
use crate::resources::fs::{discard_partial, ensure_parent_dir};

const LATEST_RELEASE_URL: &str = "https://api.github.com/repos/KnightOS/kernel/releases/latest";
const USER_AGENT: &str = concat!("knightos-sdk/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
}

/// Downloads release images into a per-version cache.
///
/// Cached images are reused. When the release query fails, the newest cached
/// image for the platform is used instead.
pub struct ReleaseKernelSource {
    cache_dir: PathBuf,
    release_url: String,
    log: Arc<dyn Log>,
}

impl std::fmt::Debug for ReleaseKernelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseKernelSource")
            .field("cache_dir", &self.cache_dir)
            .field("release_url", &self.release_url)
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl ReleaseKernelSource {
    /// Cache images under `cache_dir` (one subdirectory per version).
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, log: Arc<dyn Log>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            release_url: LATEST_RELEASE_URL.to_string(),
            log,
        }
    }

    /// Query `url` instead of the public release API.
    #[must_use]
    pub fn with_release_url(mut self, url: impl Into<String>) -> Self {
        self.release_url = url.into();
        self
    }

    fn latest_release(&self) -> Result<Release> {
        let body = ureq::get(&self.release_url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .call()
            .with_context(|| format!("querying {}", self.release_url))?
            .body_mut()
            .read_to_string()
            .context("reading release metadata")?;
        serde_json::from_str(&body).context("parsing release metadata")
    }

    fn fetch(&self, device: Device, asset_name: &str) -> Result<KernelImage> {
        let release = self.latest_release()?;
        let image = self.cache_dir.join(&release.tag_name).join(asset_name);
        if image.is_file() {
            self.log
                .debug(&format!("using cached kernel {}", image.display()));
        } else {
            let asset = release
                .assets
                .iter()
                .find(|a| a.name == asset_name)
                .ok_or_else(|| {
                    ProvisionError::KernelAcquisition(format!(
                        "kernel {} has no image for {device}",
                        release.tag_name
                    ))
                })?;
            self.log.info(&format!(
                "downloading kernel {} for {device}",
                release.tag_name
            ));
            download(&asset.browser_download_url, &image, self.log.as_ref())?;
        }
        Ok(KernelImage {
            path: image,
            version: release.tag_name,
        })
    }
}

impl KernelSource for ReleaseKernelSource {
    fn ensure(&self, platform: &str) -> Result<KernelImage> {
        let device = Device::lookup(platform).ok_or_else(|| {
            ProvisionError::KernelAcquisition(format!("unsupported platform '{platform}'"))
        })?;
        let asset_name = asset_name(device);

        match self.fetch(device, &asset_name) {
            Ok(image) => Ok(image),
            Err(e) if e.downcast_ref::<ProvisionError>().is_some() => Err(e),
            Err(e) => {
                let Some(cached) = newest_cached(&self.cache_dir, &asset_name) else {
                    return Err(ProvisionError::KernelAcquisition(format!("{e:#}")).into());
                };
                self.log.warn(&format!(
                    "could not reach kernel releases ({e:#}); using cached kernel {}",
                    cached.version
                ));
                Ok(cached)
            }
        }
    }
}

/// Release asset name for `device`.
fn asset_name(device: Device) -> String {
    format!("kernel-{}.rom", device.name())
}

/// Stream `url` into `dest` through a `.part` sibling.
fn download(url: &str, dest: &Path, log: &dyn Log) -> Result<()> {
    ensure_parent_dir(dest)?;
    let part = part_path(dest);

    let mut response = ureq::get(url)
        .header("User-Agent", USER_AGENT)
        .call()
        .with_context(|| format!("downloading {url}"))?;
    let mut file = std::fs::File::create(&part).fs_context("create", &part)?;
    if let Err(e) = io::copy(&mut response.body_mut().as_reader(), &mut file) {
        drop(file);
        discard_partial(&part, log);
        return Err(e).with_context(|| format!("downloading {url}"));
    }
    drop(file);
    std::fs::rename(&part, dest).fs_context("move", &part)?;
    Ok(())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// The most recently written cached image named `asset_name`, if any.
fn newest_cached(cache_dir: &Path, asset_name: &str) -> Option<KernelImage> {
    std::fs::read_dir(cache_dir)
        .ok()?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path().join(asset_name);
            let modified = path.metadata().ok()?.modified().ok()?;
            let version = entry.file_name().to_string_lossy().into_owned();
            Some((modified, KernelImage { path, version }))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, image)| image)
}
