//! Kernel installation step.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::kernel::{KernelInstall, install_kernel};

/// Install the kernel image into the control directory.
#[derive(Debug)]
pub struct InstallKernel;

impl Task for InstallKernel {
    fn name(&self) -> &'static str {
        "Install kernel"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let installed = install_kernel(
            &ctx.workspace,
            &ctx.settings.platform,
            ctx.settings.kernel_source.as_deref(),
            ctx.collaborators.kernel_source.as_ref(),
            ctx.log.as_ref(),
        )?;
        Ok(TaskResult::Summary(match installed {
            KernelInstall::Remote { version } => {
                format!("{} kernel {version}", ctx.settings.platform)
            }
            KernelInstall::Local { image } => format!("linked {}", image.display()),
        }))
    }
}
