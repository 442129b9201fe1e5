//! Symlink resource.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::IoResultExt as _;

/// A symlink that can be checked and applied.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// What the symlink points to.
    pub source: PathBuf,
    /// Where the symlink is created.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if !self.needs_change()? {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        super::fs::ensure_parent_dir(&self.target)?;
        super::fs::remove_existing(&self.target)?;
        create_symlink(&self.source, &self.target).fs_context("create symlink", &self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        std::fs::read_link(&self.target).map_or_else(
            |_| {
                if self.target.symlink_metadata().is_ok() {
                    Ok(ResourceState::Incorrect {
                        current: "target is a regular file".to_string(),
                    })
                } else {
                    Ok(ResourceState::Missing)
                }
            },
            |existing| {
                if existing == self.source {
                    Ok(ResourceState::Correct)
                } else {
                    Ok(ResourceState::Incorrect {
                        current: format!("points to {}", existing.display()),
                    })
                }
            },
        )
    }
}

/// Create a symlink at `link` pointing to `target`.
///
/// The target does not have to exist.
///
/// # Errors
///
/// Returns the underlying I/O error if the link cannot be created.
pub fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_then_applied_then_correct() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("kernel-TI84pSE.rom");
        std::fs::write(&source, b"rom").unwrap();
        let link = SymlinkResource::new(source.clone(), tmp.path().join(".knightos/kernel.rom"));

        assert_eq!(link.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(link.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_link(&link.target).unwrap(), source);
        assert_eq!(link.apply().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn replaces_link_to_other_target() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("kernel.rom");
        create_symlink(&tmp.path().join("old.rom"), &target).unwrap();
        let link = SymlinkResource::new(tmp.path().join("new.rom"), target.clone());

        assert!(matches!(
            link.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
        assert_eq!(link.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_link(&target).unwrap(), tmp.path().join("new.rom"));
    }

    #[test]
    fn dangling_source_is_allowed() {
        let tmp = tempfile::tempdir().unwrap();
        let link = SymlinkResource::new(tmp.path().join("nowhere"), tmp.path().join("link"));
        assert_eq!(link.apply().unwrap(), ResourceChange::Applied);
        assert!(link.target.symlink_metadata().unwrap().is_symlink());
    }
}
