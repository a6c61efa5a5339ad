//! Post and page rendering.
//!
//! Both paths share the same write discipline: create parent directories,
//! write the rendered text, copy whatever owned files belong next to it.

use crate::config::SiteConfig;
use crate::content::Post;
use crate::context::{PostContext, SiteContext};
use crate::templates::TemplateEnv;
use crate::utils;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Render one post through its layout template into `output_root`.
///
/// Output lands at `<output_root>/posts/<rel>.html`. Sibling files are
/// copied next to it, directories recursively, overwriting collisions.
pub fn render_post(
    post: &Post,
    ctx: &PostContext,
    env: &TemplateEnv,
    config: &SiteConfig,
    output_root: &Path,
) -> Result<()> {
    let html = env
        .render(&post.header.layout, ctx)
        .with_context(|| format!("failed to render `{}`", post.path.display()))?;

    let rel = post.rel_path(&config.build.posts)?;
    let target = output_root.join("posts").join(rel).with_extension("html");
    let target_dir = target.parent().context("post target has no parent")?;
    fs::create_dir_all(target_dir)?;
    fs::write(&target, html)
        .with_context(|| format!("failed to write `{}`", target.display()))?;

    for sibling in &post.siblings {
        let name = sibling.file_name().context("sibling has no file name")?;
        let dest = target_dir.join(name);
        if sibling.is_dir() {
            utils::copy_dir_recursive(sibling, &dest)?;
        } else {
            fs::copy(sibling, &dest)
                .with_context(|| format!("failed to copy `{}`", sibling.display()))?;
        }
    }
    Ok(())
}

/// Render one page template against the shared site context.
///
/// The template's own extension is stripped, not replaced, so a template
/// named `about.html.j2` produces `about.html`.
pub fn render_page(
    rel_template: &Path,
    ctx: &SiteContext,
    env: &TemplateEnv,
    output_root: &Path,
) -> Result<()> {
    let name = rel_template
        .to_str()
        .context("template name is not UTF-8")?;
    let html = env
        .render(name, ctx)
        .with_context(|| format!("failed to render `{name}`"))?;

    let target = output_root.join(rel_template).with_extension("");
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, html)
        .with_context(|| format!("failed to write `{}`", target.display()))?;
    Ok(())
}
