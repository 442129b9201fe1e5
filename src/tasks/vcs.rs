//! Version-control initialisation step.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::vcs::{Vcs, VcsOutcome, initialize_vcs};

/// Create a version-control repository at the workspace root.
///
/// Never fails the run: an unavailable tool or a failing `init` is reported
/// as skipped.
#[derive(Debug)]
pub struct InitializeVcs;

impl Task for InitializeVcs {
    fn name(&self) -> &'static str {
        "Initialize version control"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.vcs != Vcs::Disabled
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let vcs = ctx.settings.vcs;
        let outcome = initialize_vcs(
            ctx.collaborators.executor.as_ref(),
            ctx.workspace.root(),
            vcs,
        );
        Ok(match outcome {
            VcsOutcome::Initialized => TaskResult::Summary(format!("{vcs} repository created")),
            VcsOutcome::AlreadyInitialized => {
                TaskResult::Skipped(format!("{vcs} repository already present"))
            }
            VcsOutcome::ToolUnavailable(program) => {
                TaskResult::Skipped(format!("{program} not installed"))
            }
            VcsOutcome::NotRequested => TaskResult::Skipped("no version control".to_string()),
            VcsOutcome::Failed(reason) => {
                ctx.log.warn(&format!("{vcs} init failed: {reason}"));
                TaskResult::Skipped(format!("{vcs} init failed"))
            }
        })
    }
}
