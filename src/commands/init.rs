//! The `init` command: provision a KnightOS project workspace.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::InitOpts;
use crate::config::ProjectSettings;
use crate::config::defaults::UserDefaults;
use crate::config::manifest::TemplateStore;
use crate::error::IoResultExt as _;
use crate::exec::{Executor, SystemExecutor};
use crate::kernel::ReleaseKernelSource;
use crate::logging::{Log, Logger, TaskStatus, knightos_cache_dir};
use crate::packages::RepositoryInstaller;
use crate::platform::Device;
use crate::tasks::{self, Collaborators, Context};
use crate::template::{TemplateVariables, TeraRenderer};
use crate::workspace::{ProvisionState, Workspace};

/// Name recorded in the summary for root initialisation.
pub const INITIALIZE_STEP: &str = "Initialize workspace";

/// Run the init command against the real kernel releases, package
/// repository and host tools.
///
/// # Errors
///
/// Returns an error if the root cannot be determined, user defaults cannot be
/// loaded, or provisioning fails.
pub fn run(opts: &InitOpts, log: &Arc<Logger>) -> Result<()> {
    let root = resolve_root(opts)?;
    let defaults = match UserDefaults::default_path() {
        Some(path) => UserDefaults::load(&path)?,
        None => UserDefaults::default(),
    };

    let version = option_env!("KNIGHTOS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("knightos {version}"));
    log.debug(&format!("root: {}", root.display()));

    let dyn_log: Arc<dyn Log> = Arc::clone(log) as Arc<dyn Log>;
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let cache = knightos_cache_dir().unwrap_or_else(|| std::env::temp_dir().join("knightos"));
    let collaborators = Collaborators {
        kernel_source: Arc::new(ReleaseKernelSource::new(
            cache.join("kernels"),
            Arc::clone(&dyn_log),
        )),
        installer: Arc::new(RepositoryInstaller::new(
            Arc::clone(&executor),
            Arc::clone(&dyn_log),
        )),
        renderer: Arc::new(TeraRenderer),
        executor,
    };

    let result = provision(opts, &root, &defaults, collaborators, dyn_log);
    log.print_summary();
    result?;

    log.info("all done, run `make help` to see what to do next");
    Ok(())
}

/// Provision the workspace at `root`.
///
/// Resolves settings and the template before touching the disk, then
/// initialises the root and runs each provisioning step in order, stopping
/// at the first failure. Every step is recorded in `log`.
///
/// # Errors
///
/// Returns the first configuration, template or step failure.
pub fn provision(
    opts: &InitOpts,
    root: &Path,
    defaults: &UserDefaults,
    collaborators: Collaborators,
    log: Arc<dyn Log>,
) -> Result<ProvisionState> {
    let root = &std::path::absolute(root).fs_context("resolve", root)?;
    let workspace = Workspace::new(root);

    log.stage("Resolving configuration");
    let persisted = workspace.read_config()?;
    let settings = ProjectSettings::resolve(opts, persisted.as_ref(), defaults);
    log.debug(&format!(
        "template {}, platform {}, assembler {}, compiler {}, vcs {}",
        settings.template, settings.platform, settings.assembler, settings.compiler, settings.vcs
    ));

    let store = TemplateStore::locate(
        opts.template_dir.as_deref(),
        defaults.template_dir.as_deref(),
    );
    log.debug(&format!("templates: {}", store.dir().display()));
    let template = store.load(&settings.template)?;

    if Device::lookup(&settings.platform).is_none() {
        log.warn(&format!(
            "unknown platform '{}'; device settings will be left empty",
            settings.platform
        ));
    }

    let project_name = project_name(&settings, root);
    let variables = TemplateVariables::new(&project_name, &settings);

    log.stage(INITIALIZE_STEP);
    let state = match workspace.initialize(settings.name.as_deref(), settings.force, log.as_ref())
    {
        Ok(state) => state,
        Err(e) => {
            log.record_task(INITIALIZE_STEP, TaskStatus::Failed, Some(&format!("{e:#}")));
            return Err(e);
        }
    };
    let kind = if state.is_new() { "new project" } else { "existing project" };
    log.record_task(INITIALIZE_STEP, TaskStatus::Ok, Some(kind));

    let ctx = Context {
        workspace,
        settings,
        state,
        template,
        variables,
        log,
        collaborators,
    };
    for step in tasks::provisioning_steps() {
        tasks::execute(step.as_ref(), &ctx)?;
    }
    Ok(state)
}

/// The name substituted into templates: the configured name, else the root
/// directory's own name.
fn project_name(settings: &ProjectSettings, root: &Path) -> String {
    settings.name.clone().unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    })
}

/// The absolute workspace root: `--root`, else the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read.
pub fn resolve_root(opts: &InitOpts) -> Result<PathBuf> {
    match &opts.root {
        Some(root) => std::path::absolute(root)
            .with_context(|| format!("cannot resolve {}", root.display())),
        None => std::env::current_dir().context("cannot determine the current directory"),
    }
}
