//! Site building orchestration.
//!
//! A build writes the whole site into a staging directory, then swaps it
//! into place with two renames. The live output tree never holds a
//! partial build, so the dev server can keep reading it mid-rebuild.
//!
//! ```text
//! build_site()
//!     │
//!     ├── stage fresh tree          (.www.staging)
//!     ├── copy assets               → staging/assets
//!     ├── collect + link posts      (unfiltered chronological order)
//!     ├── render published posts    → staging/posts/ (parallel)
//!     ├── render page tree          → staging/
//!     └── swap staging into place   (live → .www.old → deleted)
//! ```

use crate::{
    config::SiteConfig,
    content::{self, Post},
    context::{self, PostContext},
    log, pages, render,
    templates::TemplateEnv,
    utils,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{fs, path::Path, time::Instant};

/// Build the entire site.
///
/// Posts are collected and cross-linked over the full chronological
/// list before draft filtering, so neighbor links may name excluded
/// drafts. Any failure aborts before the swap and leaves the previous
/// output tree untouched.
pub fn build_site(config: &'static SiteConfig) -> Result<()> {
    let started = Instant::now();
    let staging = config.staging_dir();

    ensure_empty_dir(&staging)?;

    utils::copy_dir_recursive(&config.build.assets, &staging.join("assets"))
        .context("failed to copy assets")?;

    let posts = content::collect(&config.build.posts)?;
    let contexts = context::build_contexts(&posts, config)?;
    log!("build"; "collected {} posts", posts.len());

    let env = TemplateEnv::new(&[config.build.layout.clone(), config.build.pages.clone()]);

    let visible: Vec<(&Post, &PostContext)> = posts
        .iter()
        .zip(&contexts)
        .filter(|(post, _)| config.build.drafts || post.is_published())
        .collect();

    visible
        .par_iter()
        .try_for_each(|(post, ctx)| render::render_post(post, ctx, &env, config, &staging))?;

    let site_ctx = context::site_context(
        config,
        visible.iter().map(|(_, ctx)| (*ctx).clone()).collect(),
    );
    pages::render_tree(&config.build.pages, &site_ctx, &env, &staging)?;

    swap_into_place(&staging, &config.build.output, &config.old_output_dir())?;

    log!("build"; "{} posts rendered in {:.2?}", visible.len(), started.elapsed());
    Ok(())
}

/// Recreate `dir` empty.
fn ensure_empty_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("failed to clear `{}`", dir.display()))?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Replace `live` with `staging` using two renames.
///
/// The previous tree is parked at `old` for the duration of the swap and
/// deleted afterwards. A leftover `old` from an interrupted swap is
/// cleared first.
fn swap_into_place(staging: &Path, live: &Path, old: &Path) -> Result<()> {
    if old.exists() {
        fs::remove_dir_all(old)
            .with_context(|| format!("failed to clear `{}`", old.display()))?;
    }
    if live.exists() {
        fs::rename(live, old)
            .with_context(|| format!("failed to retire `{}`", live.display()))?;
    }
    fs::rename(staging, live)
        .with_context(|| format!("failed to activate `{}`", staging.display()))?;
    fs::remove_dir_all(old).ok();
    Ok(())
}
