//! Render contexts handed to templates.
//!
//! All contexts are plain serializable structs assembled eagerly, once
//! per build, so templates see a fixed shape instead of ad-hoc maps.

use crate::config::SiteConfig;
use crate::content::Post;
use crate::markdown;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// Per-post fields exposed under the `page` key.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Markdown body rendered to HTML.
    pub content: String,
    pub tags: Vec<String>,
    /// Comma-joined tags for meta keywords.
    pub keywords: String,
    pub created_at: Option<String>,
    pub published_at: Option<String>,
    pub published: Option<bool>,
}

/// Lightweight pointer to a chronological neighbor.
#[derive(Debug, Clone, Serialize)]
pub struct PostLink {
    pub title: Option<String>,
    pub href: String,
}

/// Everything a layout template sees when rendering one post.
#[derive(Debug, Clone, Serialize)]
pub struct PostContext {
    pub page: PageContext,
    /// Site-relative location of the rendered post.
    pub href: String,
    /// Absolute location: base url + href.
    pub url: String,
    pub next: Option<PostLink>,
    pub previous: Option<PostLink>,
}

/// Site metadata block for page templates.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
}

/// Context shared by every page template.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub site: SiteInfo,
    pub posts: Vec<PostContext>,
}

/// Assemble every post's context in one pass.
///
/// Neighbor links are resolved over the unfiltered sorted list, so a
/// published post can legitimately link to a draft the current build
/// excludes.
pub fn build_contexts(posts: &[Post], config: &SiteConfig) -> Result<Vec<PostContext>> {
    let base_url = config.base.url.clone().unwrap_or_default();
    let posts_root = &config.build.posts;

    let mut contexts = Vec::with_capacity(posts.len());
    for post in posts {
        let href = post.href(posts_root)?;
        let tags = post.header.tags.clone().unwrap_or_default();

        contexts.push(PostContext {
            page: PageContext {
                title: post.header.title.clone(),
                description: post.header.description.clone(),
                content: markdown::to_html(&post.body),
                keywords: tags.join(", "),
                tags,
                created_at: post.header.created_at.clone(),
                published_at: post.header.published_at.clone(),
                published: post.header.published,
            },
            url: format!("{base_url}{href}"),
            href,
            next: post
                .next
                .map(|i| link_to(&posts[i], posts_root))
                .transpose()?,
            previous: post
                .previous
                .map(|i| link_to(&posts[i], posts_root))
                .transpose()?,
        });
    }
    Ok(contexts)
}

fn link_to(post: &Post, posts_root: &Path) -> Result<PostLink> {
    Ok(PostLink {
        title: post.header.title.clone(),
        href: post.href(posts_root)?,
    })
}

/// Context for page templates: site metadata plus the visible posts.
pub fn site_context(config: &SiteConfig, visible: Vec<PostContext>) -> SiteContext {
    SiteContext {
        site: SiteInfo {
            title: config.base.title.clone(),
            description: config.base.description.clone(),
            author: config.base.author.clone(),
            url: config.base.url.clone().unwrap_or_default(),
        },
        posts: visible,
    }
}
