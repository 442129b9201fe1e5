//! A file installed from a project template.
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

use super::{Applicable, ResourceChange};
use crate::error::IoResultExt as _;
use crate::template::{TemplateVariables, TextRenderer};

/// How the source bytes become the destination bytes.
pub enum Content<'a> {
    /// Copy bytes unchanged.
    Verbatim,
    /// Read as text and render with the given variables.
    Rendered {
        /// Renderer applied to the file's text.
        renderer: &'a dyn TextRenderer,
        /// Values substituted into the text.
        variables: &'a TemplateVariables,
    },
}

impl fmt::Debug for Content<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verbatim => f.write_str("Verbatim"),
            Self::Rendered { .. } => f.write_str("Rendered"),
        }
    }
}

/// Writes one template source file to its destination, unconditionally.
///
/// Whether a file should be written at all is decided by the caller.
#[derive(Debug)]
pub struct TemplateFileResource<'a> {
    /// Template source file.
    pub source: PathBuf,
    /// Destination inside the workspace.
    pub target: PathBuf,
    /// Copy or render.
    pub content: Content<'a>,
}

impl Applicable for TemplateFileResource<'_> {
    fn description(&self) -> String {
        self.target.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        super::fs::ensure_parent_dir(&self.target)?;
        match &self.content {
            Content::Verbatim => {
                std::fs::copy(&self.source, &self.target).fs_context("copy", &self.source)?;
            }
            Content::Rendered {
                renderer,
                variables,
            } => {
                let text = std::fs::read_to_string(&self.source).fs_context("read", &self.source)?;
                let name = self.source.display().to_string();
                let rendered = renderer.render(&name, &text, variables)?;
                std::fs::write(&self.target, rendered).fs_context("write", &self.target)?;
            }
        }
        Ok(ResourceChange::Applied)
    }
}
