//! Typed configuration: persisted project settings, template manifests, user
//! defaults, and the merged [`ProjectSettings`] for one run.
pub mod defaults;
pub mod manifest;
pub mod package_config;

use std::path::PathBuf;

use crate::cli::InitOpts;
use crate::vcs::Vcs;
use defaults::UserDefaults;
use package_config::PackageConfig;

/// Built-in fallbacks used when no other source supplies a value.
pub mod builtin {
    /// Emulator launched by `make run`.
    pub const EMULATOR: &str = "z80e";
    /// Debugger launched by `make debug`.
    pub const DEBUGGER: &str = "z80e";
    /// Assembler for `.asm` sources.
    pub const ASSEMBLER: &str = "sass";
    /// C compiler.
    pub const COMPILER: &str = "kcc";
    /// Calculator model.
    pub const PLATFORM: &str = "TI84pSE";
    /// Project template.
    pub const TEMPLATE: &str = "assembly";
}

/// Keys read from `package.config`.
pub mod keys {
    /// Project name; its presence marks an SDK project.
    pub const NAME: &str = "name";
    /// Persisted emulator.
    pub const EMULATOR: &str = "-sdk-emulator";
    /// Persisted debugger.
    pub const DEBUGGER: &str = "-sdk-debugger";
    /// Persisted assembler.
    pub const ASSEMBLER: &str = "-sdk-assembler";
    /// Persisted compiler.
    pub const COMPILER: &str = "-sdk-compiler";
    /// Template the project was created from.
    pub const TEMPLATE: &str = "-sdk-template";
    /// Whitespace-separated template packages to leave out.
    pub const EXCLUDED_DEPS: &str = "-exclude-template-deps";
    /// Whitespace-separated packages the project depends on.
    pub const DEPENDENCIES: &str = "dependencies";
}

/// Template that is always built with the `scas` assembler.
pub const C_TEMPLATE: &str = "c";
const C_ASSEMBLER: &str = "scas";

/// Effective settings for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    /// Project name; required when the root is new.
    pub name: Option<String>,
    /// Emulator written into the build files.
    pub emulator: String,
    /// Debugger written into the build files.
    pub debugger: String,
    /// Assembler; always `scas` for the `c` template.
    pub assembler: String,
    /// C compiler.
    pub compiler: String,
    /// Calculator model key, e.g. `TI84pSE`.
    pub platform: String,
    /// Template name.
    pub template: String,
    /// Version-control system to initialise.
    pub vcs: Vcs,
    /// Local kernel checkout, relative to the root.
    pub kernel_source: Option<PathBuf>,
    /// Provision into a populated directory without `package.config`.
    pub force: bool,
    /// Recreate missing template files in an existing project.
    pub reinit_missing: bool,
    /// Template dependencies the project opted out of.
    pub excluded_dependencies: Vec<String>,
}

impl ProjectSettings {
    /// Merge the three configuration sources.
    ///
    /// Each field takes the CLI value, else the persisted project value (when
    /// a `package.config` was found), else the user default, else the
    /// built-in. The `c` template then forces the `scas` assembler.
    #[must_use]
    pub fn resolve(
        opts: &InitOpts,
        persisted: Option<&PackageConfig>,
        defaults: &UserDefaults,
    ) -> Self {
        let from_project = |key: &str| persisted.and_then(|c| c.get(key)).map(String::from);
        let pick = |cli: Option<&str>, key: &str, user: Option<&str>, builtin: &str| {
            cli.map(String::from)
                .or_else(|| from_project(key))
                .or_else(|| user.map(String::from))
                .unwrap_or_else(|| builtin.to_string())
        };

        let template = pick(
            opts.template.as_deref(),
            keys::TEMPLATE,
            defaults.template.as_deref(),
            builtin::TEMPLATE,
        );
        let mut assembler = pick(
            opts.assembler.as_deref(),
            keys::ASSEMBLER,
            defaults.assembler.as_deref(),
            builtin::ASSEMBLER,
        );
        if template == C_TEMPLATE {
            assembler = C_ASSEMBLER.to_string();
        }

        Self {
            name: opts.name.clone().or_else(|| from_project(keys::NAME)),
            emulator: pick(
                opts.emulator.as_deref(),
                keys::EMULATOR,
                defaults.emulator.as_deref(),
                builtin::EMULATOR,
            ),
            debugger: pick(
                opts.debugger.as_deref(),
                keys::DEBUGGER,
                defaults.debugger.as_deref(),
                builtin::DEBUGGER,
            ),
            assembler,
            compiler: pick(
                opts.compiler.as_deref(),
                keys::COMPILER,
                defaults.compiler.as_deref(),
                builtin::COMPILER,
            ),
            // Platform is not persisted.
            platform: opts
                .platform
                .clone()
                .or_else(|| defaults.platform.clone())
                .unwrap_or_else(|| builtin::PLATFORM.to_string()),
            template,
            vcs: opts.vcs.or(defaults.vcs).unwrap_or_default(),
            kernel_source: opts.kernel_source.clone(),
            force: opts.force,
            reinit_missing: opts.reinit_missing,
            excluded_dependencies: persisted
                .map(|c| c.list(keys::EXCLUDED_DEPS))
                .unwrap_or_default(),
        }
    }
}
