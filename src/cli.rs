//! Command-line interface definitions.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::vcs::Vcs;

/// Top-level CLI entry point for the KnightOS SDK.
#[derive(Parser, Debug)]
#[command(name = "knightos", about = "KnightOS SDK project tooling", version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Short name of the selected subcommand, used for the log file name.
    #[must_use]
    pub const fn command_name(&self) -> &'static str {
        match self.command {
            Command::Init(_) => "init",
            Command::Version => "version",
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or re-provision a KnightOS project
    Init(InitOpts),
    /// Print version information
    Version,
}

/// Options for the `init` subcommand.
///
/// Unset options fall back to the project's `package.config`, then to the
/// user's `sdk.toml`, then to built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
pub struct InitOpts {
    /// Project name (required for a new project)
    pub name: Option<String>,

    /// Emulator used by `make run`
    #[arg(long)]
    pub emulator: Option<String>,

    /// Debugger used by `make debug`
    #[arg(long)]
    pub debugger: Option<String>,

    /// Assembler
    #[arg(long)]
    pub assembler: Option<String>,

    /// C compiler
    #[arg(long)]
    pub compiler: Option<String>,

    /// Target calculator (e.g. TI84pSE)
    #[arg(long)]
    pub platform: Option<String>,

    /// Project template
    #[arg(long)]
    pub template: Option<String>,

    /// Version control system to initialise
    #[arg(long, value_enum)]
    pub vcs: Option<Vcs>,

    /// Link a locally built kernel from this directory instead of downloading one
    #[arg(long, value_name = "PATH")]
    pub kernel_source: Option<PathBuf>,

    /// Provision even if the directory holds something other than a KnightOS project
    #[arg(long)]
    pub force: bool,

    /// Reinstall every missing template file when re-provisioning
    #[arg(long)]
    pub reinit_missing: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory holding project templates
    #[arg(long, value_name = "DIR")]
    pub template_dir: Option<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init_with_name() {
        let cli = Cli::parse_from(["knightos", "init", "Calc"]);
        let Command::Init(opts) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(opts.name.as_deref(), Some("Calc"));
        assert!(!opts.force);
        assert!(opts.vcs.is_none());
    }

    #[test]
    fn parse_init_all_options() {
        let cli = Cli::parse_from([
            "knightos",
            "init",
            "--platform",
            "84pcse",
            "--template",
            "c",
            "--vcs",
            "none",
            "--kernel-source",
            "../localkernel",
            "--force",
            "--reinit-missing",
            "--root",
            "/work/calc",
        ]);
        let Command::Init(opts) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(opts.platform.as_deref(), Some("84pcse"));
        assert_eq!(opts.template.as_deref(), Some("c"));
        assert_eq!(opts.vcs, Some(Vcs::Disabled));
        assert_eq!(opts.kernel_source, Some(PathBuf::from("../localkernel")));
        assert!(opts.force && opts.reinit_missing);
        assert_eq!(opts.root, Some(PathBuf::from("/work/calc")));
    }

    #[test]
    fn parse_rejects_unknown_vcs() {
        assert!(Cli::try_parse_from(["knightos", "init", "--vcs", "svn"]).is_err());
    }

    #[test]
    fn parse_verbose_global() {
        let cli = Cli::parse_from(["knightos", "version", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.command_name(), "version");
    }
}
