//! Template environment with ordered directory search.
//!
//! Templates are looked up by bare name across a list of directories,
//! first hit wins. Builds search `[layout, pages]` so layout templates
//! shadow page templates of the same name.

use crate::error::SiteError;
use anyhow::{Result, bail};
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::{fs, io::ErrorKind, path::PathBuf};

pub struct TemplateEnv {
    env: Environment<'static>,
}

impl TemplateEnv {
    /// Build an environment over `dirs`, searched in order.
    pub fn new(dirs: &[PathBuf]) -> Self {
        let dirs = dirs.to_vec();
        let mut env = Environment::new();
        env.set_loader(move |name| {
            for dir in &dirs {
                match fs::read_to_string(dir.join(name)) {
                    Ok(source) => return Ok(Some(source)),
                    Err(err) if err.kind() == ErrorKind::NotFound => continue,
                    Err(err) => {
                        return Err(minijinja::Error::new(
                            minijinja::ErrorKind::InvalidOperation,
                            format!("failed to read template `{name}`"),
                        )
                        .with_source(err));
                    }
                }
            }
            Ok(None)
        });
        // Rendered markdown is injected into html templates as-is, only
        // the markdown scaffolds escape their substitutions.
        env.set_auto_escape_callback(|name| {
            if name.ends_with(".md") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        Self { env }
    }

    /// Render template `name` against `ctx`.
    pub fn render<S: Serialize>(&self, name: &str, ctx: &S) -> Result<String> {
        let template = match self.env.get_template(name) {
            Ok(template) => template,
            Err(err) if err.kind() == minijinja::ErrorKind::TemplateNotFound => {
                bail!(SiteError::TemplateNotFound {
                    name: name.to_owned(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        Ok(template.render(ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Ctx {
        name: String,
    }

    fn ctx(name: &str) -> Ctx {
        Ctx { name: name.into() }
    }

    #[test]
    fn test_renders_from_first_matching_dir() {
        let layout = TempDir::new().unwrap();
        let pages = TempDir::new().unwrap();
        fs::write(layout.path().join("t.html"), "layout {{ name }}").unwrap();
        fs::write(pages.path().join("t.html"), "pages {{ name }}").unwrap();

        let env = TemplateEnv::new(&[layout.path().to_path_buf(), pages.path().to_path_buf()]);
        let out = env.render("t.html", &ctx("x")).unwrap();

        assert_eq!(out, "layout x");
    }

    #[test]
    fn test_falls_through_to_later_dirs() {
        let layout = TempDir::new().unwrap();
        let pages = TempDir::new().unwrap();
        fs::write(pages.path().join("only.html"), "found").unwrap();

        let env = TemplateEnv::new(&[layout.path().to_path_buf(), pages.path().to_path_buf()]);
        let out = env.render("only.html", &ctx("x")).unwrap();

        assert_eq!(out, "found");
    }

    #[test]
    fn test_missing_template_is_typed_error() {
        let dir = TempDir::new().unwrap();
        let env = TemplateEnv::new(&[dir.path().to_path_buf()]);

        let err = env.render("nope.html", &ctx("x")).unwrap_err();
        let site_err = err.downcast_ref::<SiteError>();
        assert!(matches!(
            site_err,
            Some(SiteError::TemplateNotFound { name }) if name == "nope.html"
        ));
    }

    #[test]
    fn test_html_templates_do_not_escape() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("raw.html"), "{{ name }}").unwrap();

        let env = TemplateEnv::new(&[dir.path().to_path_buf()]);
        let out = env.render("raw.html", &ctx("<b>bold</b>")).unwrap();

        assert_eq!(out, "<b>bold</b>");
    }

    #[test]
    fn test_markdown_templates_escape() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("post.md"), "{{ name }}").unwrap();

        let env = TemplateEnv::new(&[dir.path().to_path_buf()]);
        let out = env.render("post.md", &ctx("a < b")).unwrap();

        assert_eq!(out, "a &lt; b");
    }
}
