// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed fixture with recording stand-ins for
// every collaborator, so each test can run the whole init pipeline without
// network access or host tools.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};

use knightos_sdk::cli::InitOpts;
use knightos_sdk::commands::init::provision;
use knightos_sdk::config::defaults::UserDefaults;
use knightos_sdk::exec::{ExecResult, Executor};
use knightos_sdk::kernel::{KernelImage, KernelSource};
use knightos_sdk::logging::{Log, TaskStatus};
use knightos_sdk::packages::PackageInstaller;
use knightos_sdk::tasks::Collaborators;
use knightos_sdk::template::TeraRenderer;
use knightos_sdk::workspace::{ProvisionState, Workspace};

/// Version reported by [`FakeKernelSource`].
pub const KERNEL_VERSION: &str = "0.6.9";

/// Templates shipped with the crate.
pub fn bundled_templates() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// Kernel source that writes a small image into a cache directory.
#[derive(Debug)]
pub struct FakeKernelSource {
    cache: PathBuf,
    pub fail: bool,
    pub requests: Mutex<Vec<String>>,
}

impl KernelSource for FakeKernelSource {
    fn ensure(&self, platform: &str) -> Result<KernelImage> {
        self.requests.lock().unwrap().push(platform.to_string());
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        let path = self
            .cache
            .join(KERNEL_VERSION)
            .join(format!("kernel-{platform}.rom"));
        std::fs::create_dir_all(path.parent().unwrap())?;
        std::fs::write(&path, b"kernel image")?;
        Ok(KernelImage {
            path,
            version: KERNEL_VERSION.to_string(),
        })
    }
}

/// Installer that records each call and drops an empty archive per package.
#[derive(Debug, Default)]
pub struct RecordingInstaller {
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl PackageInstaller for RecordingInstaller {
    fn install(&self, workspace: &Workspace, packages: &[String]) -> Result<()> {
        self.calls.lock().unwrap().push(packages.to_vec());
        for package in packages {
            std::fs::write(workspace.package_archive(package), b"")?;
        }
        Ok(())
    }
}

/// Executor that reports `available` tools and records invocations.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub available: Vec<&'static str>,
    pub calls: Mutex<Vec<String>>,
}

impl Executor for RecordingExecutor {
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
            success: true,
            code: Some(0),
        })
    }

    fn which(&self, program: &str) -> bool {
        self.available.contains(&program)
    }
}

/// Log that keeps warnings and step results.
#[derive(Debug, Default)]
pub struct RecordingLog {
    pub warnings: Mutex<Vec<String>>,
    pub tasks: Mutex<Vec<(String, TaskStatus)>>,
}

impl RecordingLog {
    pub fn status_of(&self, step: &str) -> Option<TaskStatus> {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(name, _)| name == step)
            .map(|(_, status)| *status)
    }
}

impl Log for RecordingLog {
    fn stage(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn debug(&self, _: &str) {}
    fn warn(&self, msg: &str) {
        self.warnings.lock().unwrap().push(msg.to_string());
    }
    fn error(&self, _: &str) {}
    fn record_task(&self, name: &str, status: TaskStatus, _: Option<&str>) {
        self.tasks.lock().unwrap().push((name.to_string(), status));
    }
}

/// An isolated parent directory plus recording collaborators.
///
/// The workspace under test is `<base>/calc`; sibling directories hold the
/// kernel cache and any local kernel builds. `base` is the temporary
/// directory itself, or its path relative to the current directory for
/// [`Fixture::relative`].
pub struct Fixture {
    pub tmp: tempfile::TempDir,
    base: PathBuf,
    pub kernel: Arc<FakeKernelSource>,
    pub installer: Arc<RecordingInstaller>,
    pub executor: Arc<RecordingExecutor>,
    pub log: Arc<RecordingLog>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_tools(&[])
    }

    /// Fixture whose executor reports `tools` as installed.
    pub fn with_tools(tools: &[&'static str]) -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let base = tmp.path().to_path_buf();
        Self::build(tmp, base, tools)
    }

    /// Fixture under the current directory, addressed by a relative path.
    pub fn relative() -> Self {
        let tmp = tempfile::tempdir_in(".").expect("create temp dir");
        let cwd = std::env::current_dir().expect("current dir");
        let base = tmp
            .path()
            .strip_prefix(&cwd)
            .unwrap_or(tmp.path())
            .to_path_buf();
        assert!(base.is_relative(), "{}", base.display());
        Self::build(tmp, base, &[])
    }

    fn build(tmp: tempfile::TempDir, base: PathBuf, tools: &[&'static str]) -> Self {
        let kernel = Arc::new(FakeKernelSource {
            cache: tmp.path().join("cache"),
            fail: false,
            requests: Mutex::new(Vec::new()),
        });
        Self {
            tmp,
            base,
            kernel,
            installer: Arc::new(RecordingInstaller::default()),
            executor: Arc::new(RecordingExecutor {
                available: tools.to_vec(),
                calls: Mutex::new(Vec::new()),
            }),
            log: Arc::new(RecordingLog::default()),
        }
    }

    /// Make every kernel request fail.
    pub fn offline(mut self) -> Self {
        self.kernel = Arc::new(FakeKernelSource {
            cache: self.tmp.path().join("cache"),
            fail: true,
            requests: Mutex::new(Vec::new()),
        });
        self
    }

    pub fn root(&self) -> PathBuf {
        self.base.join("calc")
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.root())
    }

    /// Options pointing at the bundled templates.
    pub fn opts(&self) -> InitOpts {
        InitOpts {
            template_dir: Some(bundled_templates()),
            ..InitOpts::default()
        }
    }

    /// Options for a new project called `Calc`.
    pub fn new_project(&self) -> InitOpts {
        InitOpts {
            name: Some("Calc".to_string()),
            ..self.opts()
        }
    }

    /// Build a local kernel image at `<base>/<dir>/bin/<platform>/kernel.rom`.
    pub fn local_kernel(&self, dir: &str, platform: &str) -> PathBuf {
        let image = self
            .base
            .join(dir)
            .join("bin")
            .join(platform)
            .join("kernel.rom");
        std::fs::create_dir_all(image.parent().unwrap()).unwrap();
        std::fs::write(&image, b"local kernel").unwrap();
        image
    }

    pub fn provision(&self, opts: &InitOpts) -> Result<ProvisionState> {
        let collaborators = Collaborators {
            kernel_source: Arc::clone(&self.kernel) as Arc<dyn KernelSource>,
            installer: Arc::clone(&self.installer) as Arc<dyn PackageInstaller>,
            renderer: Arc::new(TeraRenderer),
            executor: Arc::clone(&self.executor) as Arc<dyn Executor>,
        };
        provision(
            opts,
            &self.root(),
            &UserDefaults::default(),
            collaborators,
            Arc::clone(&self.log) as Arc<dyn Log>,
        )
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> String {
        std::fs::read_to_string(self.root().join(relative)).expect("read workspace file")
    }
}
