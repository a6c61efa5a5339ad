//! Post scaffolding and publishing.
//!
//! `post` renders `templates/post.md` into a fresh draft; `publish` flips
//! a draft's `published` flag and stamps the publication time through the
//! front-matter codec, preserving every other header field.

use crate::config::SiteConfig;
use crate::content::INDEX_FILE;
use crate::error::SiteError;
use crate::frontmatter;
use crate::log;
use crate::templates::TemplateEnv;
use anyhow::{Context, Result, bail};
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Scaffold template for new posts
const POST_TEMPLATE: &str = "post.md";

/// Values `templates/post.md` is rendered against.
#[derive(Serialize)]
struct ScaffoldContext {
    title: String,
    slug: String,
    create_time: String,
}

/// Create a new draft post from the scaffold template.
///
/// The destination is `posts/<slug>.md`, or `posts/<slug>/index.md` with
/// `as_dir`. An existing destination is refused.
pub fn new_post(config: &SiteConfig, title: &str, as_dir: bool) -> Result<()> {
    let slug = slug::slugify(title);
    let dest = resolve_post_path(config, &slug, as_dir);
    if dest.exists() {
        bail!(SiteError::DestinationExists { path: dest });
    }

    let env = TemplateEnv::new(&[config.build.templates.clone()]);
    let content = env.render(
        POST_TEMPLATE,
        &ScaffoldContext {
            title: title.to_owned(),
            slug,
            create_time: Local::now().to_rfc3339(),
        },
    )?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&dest, content)
        .with_context(|| format!("failed to write `{}`", dest.display()))?;
    log!("post"; "created {}", dest.display());
    Ok(())
}

fn resolve_post_path(config: &SiteConfig, slug: &str, as_dir: bool) -> PathBuf {
    if as_dir {
        config.build.posts.join(slug).join(INDEX_FILE)
    } else {
        config.build.posts.join(format!("{slug}.md"))
    }
}

/// Mark a post as published, stamping `published_at`.
///
/// Accepts a post file or a post directory (resolved to its `index.md`),
/// relative to the project root. Publishing an already-published post is
/// a no-op. The header is rewritten in full, unrelated fields included.
pub fn publish_post(config: &SiteConfig, path: &Path) -> Result<()> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        config.get_root().join(path)
    };
    let file = if path.is_dir() {
        path.join(INDEX_FILE)
    } else {
        path
    };

    let text = fs::read_to_string(&file).map_err(|err| SiteError::ContentRead {
        path: file.clone(),
        source: err,
    })?;
    let (mut header, body) =
        frontmatter::parse(&text).map_err(|err| SiteError::MalformedHeader {
            path: file.clone(),
            source: err,
        })?;

    if header.published == Some(true) {
        log!("publish"; "already published: {}", file.display());
        return Ok(());
    }

    header.published = Some(true);
    header.published_at = Some(Local::now().to_rfc3339());

    let text = frontmatter::serialize(Some(&header), &body)?;
    fs::write(&file, text)
        .with_context(|| format!("failed to write `{}`", file.display()))?;
    log!("publish"; "published {}", file.display());
    Ok(())
}
