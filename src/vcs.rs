//! Optional version-control initialisation of the workspace root.
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::exec::Executor;

/// Version-control system to initialise in a new workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Vcs {
    /// Git.
    #[default]
    Git,
    /// Mercurial.
    Hg,
    /// No version control.
    #[serde(rename = "none")]
    #[value(name = "none")]
    Disabled,
}

impl Vcs {
    /// Command-line tool, if any.
    #[must_use]
    pub const fn program(self) -> Option<&'static str> {
        match self {
            Self::Git => Some("git"),
            Self::Hg => Some("hg"),
            Self::Disabled => None,
        }
    }

    /// Metadata directory the tool creates at the repository root.
    #[must_use]
    pub const fn metadata_dir(self) -> Option<&'static str> {
        match self {
            Self::Git => Some(".git"),
            Self::Hg => Some(".hg"),
            Self::Disabled => None,
        }
    }

    /// The ignore-marker file belonging to this system.
    #[must_use]
    pub const fn ignore_file(self) -> Option<&'static str> {
        match self {
            Self::Git => Some(".gitignore"),
            Self::Hg => Some(".hgignore"),
            Self::Disabled => None,
        }
    }

    /// The system an ignore-marker file name belongs to, if it is one.
    #[must_use]
    pub fn owning_ignore_file(file_name: &str) -> Option<Self> {
        [Self::Git, Self::Hg]
            .into_iter()
            .find(|v| v.ignore_file() == Some(file_name))
    }
}

impl fmt::Display for Vcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program().unwrap_or("none"))
    }
}

/// Result of [`initialize_vcs`]. None of these abort provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsOutcome {
    /// No version control was requested.
    NotRequested,
    /// The tool is not on `PATH`.
    ToolUnavailable(&'static str),
    /// The metadata directory already exists.
    AlreadyInitialized,
    /// The repository was created.
    Initialized,
    /// The tool ran and failed; provisioning continues regardless.
    Failed(String),
}

/// Initialise `vcs` at `root` when the tool is available and no repository
/// exists yet. Tool output is captured and discarded.
pub fn initialize_vcs(executor: &dyn Executor, root: &Path, vcs: Vcs) -> VcsOutcome {
    let (Some(program), Some(metadata)) = (vcs.program(), vcs.metadata_dir()) else {
        return VcsOutcome::NotRequested;
    };
    if !executor.which(program) {
        return VcsOutcome::ToolUnavailable(program);
    }
    if root.join(metadata).exists() {
        return VcsOutcome::AlreadyInitialized;
    }

    let root_arg = root.to_string_lossy();
    match executor.run_unchecked(program, &["init", &root_arg]) {
        Ok(result) if result.success => VcsOutcome::Initialized,
        Ok(result) => VcsOutcome::Failed(format!(
            "{program} init exited with {}",
            result
                .code
                .map_or_else(|| "a signal".to_string(), |c| c.to_string())
        )),
        Err(e) => VcsOutcome::Failed(format!("{e:#}")),
    }
}
