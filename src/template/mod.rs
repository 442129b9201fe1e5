//! Template variables and text rendering.
mod render;
mod variables;

pub use render::{TeraRenderer, TextRenderer};
pub use variables::TemplateVariables;

#[cfg(test)]
pub use render::MockTextRenderer;
