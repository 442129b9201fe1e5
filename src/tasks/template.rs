//! Template materialisation step.
use anyhow::Result;
use std::path::PathBuf;

use super::{Context, Task, TaskResult};
use crate::config::manifest::FileSpec;
use crate::resources::Applicable as _;
use crate::resources::template_file::{Content, TemplateFileResource};
use crate::vcs::Vcs;
use crate::workspace::ProvisionState;

/// What happens to one template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Write (render or copy) the file.
    Write,
    /// Destination exists and may not be replaced.
    KeepExisting,
    /// Ignore marker of a different version-control system.
    SkipIgnoreFile,
}

/// Decide what to do with `spec` given its destination's existence.
///
/// Ignore markers are only written for the selected system. Any other
/// file is written when its destination is absent and the project is new,
/// the file allows reinit, or `reinit_missing` is set.
#[must_use]
pub fn plan(
    spec: &FileSpec,
    destination_exists: bool,
    state: ProvisionState,
    reinit_missing: bool,
    vcs: Vcs,
) -> FileAction {
    if let Some(owner) = spec
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(Vcs::owning_ignore_file)
        && owner != vcs
    {
        return FileAction::SkipIgnoreFile;
    }
    if destination_exists {
        return FileAction::KeepExisting;
    }
    if state.is_new() || spec.reinit || reinit_missing {
        FileAction::Write
    } else {
        FileAction::KeepExisting
    }
}

/// Install the template's files into the workspace.
#[derive(Debug)]
pub struct InstallTemplate;

impl InstallTemplate {
    fn destination(ctx: &Context, spec: &FileSpec) -> PathBuf {
        ctx.workspace.root().join(&spec.path)
    }
}

impl Task for InstallTemplate {
    fn name(&self) -> &'static str {
        "Install template files"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut written = 0usize;
        let mut kept = 0usize;

        for spec in &ctx.template.manifest.files {
            let target = Self::destination(ctx, spec);
            let action = plan(
                spec,
                target.symlink_metadata().is_ok(),
                ctx.state,
                ctx.settings.reinit_missing,
                ctx.settings.vcs,
            );
            match action {
                FileAction::SkipIgnoreFile => {
                    ctx.log.debug(&format!(
                        "skipping {} (vcs is {})",
                        spec.path.display(),
                        ctx.settings.vcs
                    ));
                }
                FileAction::KeepExisting => {
                    ctx.log
                        .debug(&format!("keeping existing {}", spec.path.display()));
                    kept += 1;
                }
                FileAction::Write => {
                    let content = if spec.binary {
                        Content::Verbatim
                    } else {
                        Content::Rendered {
                            renderer: ctx.collaborators.renderer.as_ref(),
                            variables: &ctx.variables,
                        }
                    };
                    let resource = TemplateFileResource {
                        source: ctx.template.source_path(spec),
                        target,
                        content,
                    };
                    ctx.log.debug(&format!("writing {}", resource.description()));
                    resource.apply()?;
                    written += 1;
                }
            }
        }

        Ok(TaskResult::Summary(format!(
            "{written} written, {kept} kept ({})",
            ctx.template.manifest.name
        )))
    }
}
