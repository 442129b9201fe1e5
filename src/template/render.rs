use anyhow::{Context as _, Result};
use tera::{Context, Tera};

use super::TemplateVariables;

/// Substitutes [`TemplateVariables`] into template text.
#[cfg_attr(test, mockall::automock)]
pub trait TextRenderer {
    /// Render `source`, read from the template file `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be rendered, for example when it
    /// references an unknown variable.
    fn render(&self, name: &str, source: &str, variables: &TemplateVariables) -> Result<String>;
}

/// [`TextRenderer`] backed by Tera (`{{ project_name }}` placeholders,
/// no HTML escaping).
#[derive(Debug, Default, Clone, Copy)]
pub struct TeraRenderer;

impl TextRenderer for TeraRenderer {
    fn render(&self, name: &str, source: &str, variables: &TemplateVariables) -> Result<String> {
        let mut context = Context::new();
        for (key, value) in variables.iter() {
            context.insert(key, value);
        }
        Tera::one_off(source, &context, false).with_context(|| format!("rendering {name}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cli::InitOpts;
    use crate::config::{ProjectSettings, defaults::UserDefaults};

    fn variables() -> TemplateVariables {
        let settings =
            ProjectSettings::resolve(&InitOpts::default(), None, &UserDefaults::default());
        TemplateVariables::new("Calc <demo>", &settings)
    }

    #[test]
    fn substitutes_variables() {
        let out = TeraRenderer
            .render(
                "Makefile",
                "NAME:={{ project_name }}\nAS:={{assembler}}\nKEY:={{ key }}",
                &variables(),
            )
            .unwrap();
        insta::assert_snapshot!(out, @r"
        NAME:=Calc <demo>
        AS:=sass
        KEY:=0A
        ");
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let src = "; plain assembly\n    ret\n";
        assert_eq!(TeraRenderer.render("main.asm", src, &variables()).unwrap(), src);
    }

    #[test]
    fn rendering_is_deterministic() {
        let src = "{{ project_name }} on {{ platform }} ({{ upgrade_ext }})";
        let vars = variables();
        let first = TeraRenderer.render("a", src, &vars).unwrap();
        let second = TeraRenderer.render("a", src, &vars).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_placeholder_fails_naming_file() {
        let err = TeraRenderer
            .render("package.config", "{{ nonsense }}", &variables())
            .expect_err("undefined variable");
        assert!(format!("{err:#}").contains("rendering package.config"));
    }
}
