//! Shared state handed to every provisioning step.
use std::sync::Arc;

use crate::config::ProjectSettings;
use crate::config::manifest::LoadedTemplate;
use crate::exec::Executor;
use crate::kernel::KernelSource;
use crate::logging::Log;
use crate::packages::PackageInstaller;
use crate::template::{TemplateVariables, TextRenderer};
use crate::workspace::{ProvisionState, Workspace};

/// External collaborators the pipeline delegates to.
#[derive(Clone)]
pub struct Collaborators {
    /// Supplies downloaded kernel images.
    pub kernel_source: Arc<dyn KernelSource>,
    /// Installs package dependencies.
    pub installer: Arc<dyn PackageInstaller>,
    /// Renders text template files.
    pub renderer: Arc<dyn TextRenderer>,
    /// Runs version-control tools.
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("kernel_source", &"<dyn KernelSource>")
            .field("installer", &"<dyn PackageInstaller>")
            .field("renderer", &"<dyn TextRenderer>")
            .field("executor", &self.executor)
            .finish()
    }
}

/// Everything a pipeline step reads. Built once after the workspace root is
/// initialised and never mutated.
pub struct Context {
    /// Workspace being provisioned.
    pub workspace: Workspace,
    /// Merged settings for this run.
    pub settings: ProjectSettings,
    /// What root initialisation found.
    pub state: ProvisionState,
    /// Template being materialised.
    pub template: LoadedTemplate,
    /// Values substituted into text files.
    pub variables: TemplateVariables,
    /// Logger for output and step recording.
    pub log: Arc<dyn Log>,
    /// External collaborators.
    pub collaborators: Collaborators,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("workspace", &self.workspace)
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("template", &self.template.manifest.name)
            .field("variables", &self.variables)
            .field("log", &"<dyn Log>")
            .field("collaborators", &self.collaborators)
            .finish()
    }
}
