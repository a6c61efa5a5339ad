//! Page tree walker.
//!
//! Mirrors the pages directory onto the output root: each template file
//! renders once against the shared site context, each subdirectory is
//! recreated and recursed into. Files are handled before subdirectories
//! at every level; order among siblings is not part of the contract.

use crate::context::SiteContext;
use crate::render;
use crate::templates::TemplateEnv;
use anyhow::Result;
use std::fs;
use std::path::Path;

/// Walk `pages_root` and render every template into `output_root`.
pub fn render_tree(
    pages_root: &Path,
    ctx: &SiteContext,
    env: &TemplateEnv,
    output_root: &Path,
) -> Result<()> {
    walk(pages_root, pages_root, ctx, env, output_root)
}

fn walk(
    dir: &Path,
    pages_root: &Path,
    ctx: &SiteContext,
    env: &TemplateEnv,
    output_root: &Path,
) -> Result<()> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        } else {
            files.push(entry.path());
        }
    }

    for file in files {
        let rel = file.strip_prefix(pages_root)?;
        render::render_page(rel, ctx, env, output_root)?;
    }
    for sub in dirs {
        let rel = sub.strip_prefix(pages_root)?;
        fs::create_dir_all(output_root.join(rel))?;
        walk(&sub, pages_root, ctx, env, output_root)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::context::{self, PostContext, PageContext};
    use crate::templates::TemplateEnv;
    use std::fs;
    use tempfile::TempDir;

    fn post_ctx(title: &str, href: &str) -> PostContext {
        PostContext {
            page: PageContext {
                title: Some(title.into()),
                description: None,
                content: String::new(),
                tags: Vec::new(),
                keywords: String::new(),
                created_at: None,
                published_at: None,
                published: Some(true),
            },
            href: href.into(),
            url: href.into(),
            next: None,
            previous: None,
        }
    }

    #[test]
    fn test_renders_whole_tree() {
        let root = TempDir::new().unwrap();
        let pages = root.path().join("pages");
        let out = root.path().join("www");
        fs::create_dir_all(pages.join("docs/inner")).unwrap();
        fs::create_dir(&out).unwrap();
        fs::write(pages.join("index.html.j2"), "home").unwrap();
        fs::write(pages.join("docs/guide.html.j2"), "guide").unwrap();
        fs::write(pages.join("docs/inner/deep.html.j2"), "deep").unwrap();

        let env = TemplateEnv::new(&[pages.clone()]);
        let ctx = context::site_context(&SiteConfig::default(), Vec::new());
        render_tree(&pages, &ctx, &env, &out).unwrap();

        assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), "home");
        assert_eq!(
            fs::read_to_string(out.join("docs/guide.html")).unwrap(),
            "guide"
        );
        assert_eq!(
            fs::read_to_string(out.join("docs/inner/deep.html")).unwrap(),
            "deep"
        );
    }

    #[test]
    fn test_empty_subdirectories_are_mirrored() {
        let root = TempDir::new().unwrap();
        let pages = root.path().join("pages");
        let out = root.path().join("www");
        fs::create_dir_all(pages.join("empty")).unwrap();
        fs::create_dir(&out).unwrap();

        let env = TemplateEnv::new(&[pages.clone()]);
        let ctx = context::site_context(&SiteConfig::default(), Vec::new());
        render_tree(&pages, &ctx, &env, &out).unwrap();

        assert!(out.join("empty").is_dir());
    }

    #[test]
    fn test_pages_see_the_post_list() {
        let root = TempDir::new().unwrap();
        let pages = root.path().join("pages");
        let out = root.path().join("www");
        fs::create_dir(&pages).unwrap();
        fs::create_dir(&out).unwrap();
        fs::write(
            pages.join("index.html.j2"),
            "{% for p in posts %}{{ p.page.title }};{% endfor %}",
        )
        .unwrap();

        let env = TemplateEnv::new(&[pages.clone()]);
        let ctx = context::site_context(
            &SiteConfig::default(),
            vec![post_ctx("One", "/posts/one"), post_ctx("Two", "/posts/two")],
        );
        render_tree(&pages, &ctx, &env, &out).unwrap();

        assert_eq!(
            fs::read_to_string(out.join("index.html")).unwrap(),
            "One;Two;"
        );
    }
}
