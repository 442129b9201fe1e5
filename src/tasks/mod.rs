//! Named pipeline steps that turn a prepared [`Context`] into workspace
//! changes.
pub mod context;
pub mod kernel;
pub mod packages;
pub mod template;
pub mod vcs;

pub use context::{Collaborators, Context};

use anyhow::Result;

use crate::logging::TaskStatus;

/// Outcome of a step that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Step completed.
    Ok,
    /// Step completed; the message is shown in the summary.
    Summary(String),
    /// Step had nothing to do or was unable to act, without failing the run.
    Skipped(String),
}

/// A named, executable pipeline step.
pub trait Task {
    /// Human-readable step name.
    fn name(&self) -> &'static str;

    /// Whether this step applies to the current run.
    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    /// Execute the step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails; the pipeline stops there.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The provisioning steps that follow root initialisation, in their fixed
/// order.
#[must_use]
pub fn provisioning_steps() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(kernel::InstallKernel),
        Box::new(template::InstallTemplate),
        Box::new(packages::InstallPackages),
        Box::new(vcs::InitializeVcs),
    ]
}

/// Execute a step, recording the result in the logger.
///
/// # Errors
///
/// Returns the step's error after recording it as failed.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping step: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            Ok(())
        }
        Ok(TaskResult::Summary(message)) => {
            ctx.log
                .record_task(task.name(), TaskStatus::Ok, Some(&message));
            Ok(())
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            Ok(())
        }
        Err(e) => {
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            Err(e)
        }
    }
}

/// Shared helpers for unit tests.
///
/// Provides stub collaborators and a context factory so each test module
/// does not have to duplicate boilerplate.
#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]
pub mod test_helpers {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use anyhow::Result;

    use super::{Collaborators, Context};
    use crate::cli::InitOpts;
    use crate::config::ProjectSettings;
    use crate::config::defaults::UserDefaults;
    use crate::config::manifest::{LoadedTemplate, TemplateManifest};
    use crate::exec::{ExecResult, Executor};
    use crate::kernel::{KernelImage, KernelSource};
    use crate::logging::{Log, TaskStatus};
    use crate::packages::PackageInstaller;
    use crate::template::{TemplateVariables, TeraRenderer};
    use crate::workspace::{ProvisionState, Workspace};

    /// [`Log`] that discards everything.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct NullLog;

    impl Log for NullLog {
        fn stage(&self, _: &str) {}
        fn info(&self, _: &str) {}
        fn debug(&self, _: &str) {}
        fn warn(&self, _: &str) {}
        fn error(&self, _: &str) {}
        fn record_task(&self, _: &str, _: TaskStatus, _: Option<&str>) {}
    }

    /// [`Log`] that keeps debug lines, warnings and step records for
    /// assertions.
    #[derive(Debug, Default)]
    pub struct RecordingLog {
        /// Recorded debug lines.
        pub debugs: Mutex<Vec<String>>,
        /// Recorded warnings.
        pub warnings: Mutex<Vec<String>>,
        /// Recorded task names and statuses.
        pub tasks: Mutex<Vec<(String, TaskStatus)>>,
    }

    impl Log for RecordingLog {
        fn stage(&self, _: &str) {}
        fn info(&self, _: &str) {}
        fn debug(&self, msg: &str) {
            self.debugs.lock().unwrap().push(msg.to_string());
        }
        fn warn(&self, msg: &str) {
            self.warnings.lock().unwrap().push(msg.to_string());
        }
        fn error(&self, _: &str) {}
        fn record_task(&self, name: &str, status: TaskStatus, _: Option<&str>) {
            self.tasks.lock().unwrap().push((name.to_string(), status));
        }
    }

    /// Executor that never spawns anything.
    ///
    /// `which()` returns `which_result`; every command call is recorded and
    /// exits 0, or 1 when `fail` is set.
    #[derive(Debug, Default)]
    pub struct StubExecutor {
        /// Value returned by `which()`.
        pub which_result: bool,
        /// Whether commands exit 1 instead of 0.
        pub fail: bool,
        /// Recorded command invocations.
        pub calls: Mutex<Vec<String>>,
    }

    impl Executor for StubExecutor {
        fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
            self.run_unchecked(program, args)
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{program} {}", args.join(" ")));
            Ok(ExecResult {
                stdout: String::new(),
                stderr: String::new(),
                success: !self.fail,
                code: Some(i32::from(self.fail)),
            })
        }

        fn which(&self, _: &str) -> bool {
            self.which_result
        }
    }

    /// Kernel source that must not be consulted.
    #[derive(Debug)]
    pub struct UnusedKernelSource;

    impl KernelSource for UnusedKernelSource {
        fn ensure(&self, platform: &str) -> Result<KernelImage> {
            panic!("unexpected kernel request for {platform}")
        }
    }

    /// Installer that accepts everything.
    #[derive(Debug)]
    pub struct AcceptingInstaller;

    impl PackageInstaller for AcceptingInstaller {
        fn install(&self, _: &Workspace, _: &[String]) -> Result<()> {
            Ok(())
        }
    }

    /// Collaborators that do no I/O.
    #[must_use]
    pub fn inert_collaborators() -> Collaborators {
        Collaborators {
            kernel_source: Arc::new(UnusedKernelSource),
            installer: Arc::new(AcceptingInstaller),
            renderer: Arc::new(TeraRenderer),
            executor: Arc::new(StubExecutor::default()),
        }
    }

    /// Build a [`Context`] for a workspace at `root` using `template_dir` as
    /// the template source directory.
    #[must_use]
    pub fn make_context(
        root: &Path,
        template_dir: &Path,
        manifest: TemplateManifest,
        opts: &InitOpts,
        state: ProvisionState,
        collaborators: Collaborators,
    ) -> Context {
        let settings = ProjectSettings::resolve(opts, None, &UserDefaults::default());
        let variables = TemplateVariables::new("Calc", &settings);
        Context {
            workspace: Workspace::new(root),
            settings,
            state,
            template: LoadedTemplate {
                manifest,
                source_dir: template_dir.to_path_buf(),
            },
            variables,
            log: Arc::new(NullLog),
            collaborators,
        }
    }
}
