//! Package installation step.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::packages::install_dependencies;

/// Install the template's package dependencies.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &'static str {
        "Install packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let installed = install_dependencies(
            &ctx.workspace,
            &ctx.template.manifest.install,
            &ctx.settings.excluded_dependencies,
            ctx.collaborators.installer.as_ref(),
            ctx.log.as_ref(),
        )?;
        if installed.is_empty() {
            return Ok(TaskResult::Ok);
        }
        Ok(TaskResult::Summary(format!(
            "{} package(s) installed",
            installed.len()
        )))
    }
}
