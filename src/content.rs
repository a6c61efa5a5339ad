//! Content repository: post discovery, ordering, and cross-linking.
//!
//! A post is either a single `*.md` file directly under the posts root,
//! or a directory holding an `index.md` plus any number of sibling files
//! that are copied next to the rendered output.

use crate::error::SiteError;
use crate::frontmatter::{self, Header};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Canonical file name of a directory-shaped post
pub const INDEX_FILE: &str = "index.md";

/// Recognized content extension
pub const CONTENT_EXT: &str = ".md";

/// One discovered post.
#[derive(Debug, Clone)]
pub struct Post {
    /// Canonical source file, absolute.
    pub path: PathBuf,
    /// Markdown body with the header block stripped.
    pub body: String,
    pub header: Header,
    /// Co-located files and directories, copied verbatim on render.
    pub siblings: Vec<PathBuf>,
    /// Indices of the chronological neighbors within the collection.
    /// `previous` points at the newer post, `next` at the older one.
    pub next: Option<usize>,
    pub previous: Option<usize>,
}

impl Post {
    /// Path relative to the posts root.
    pub fn rel_path<'a>(&'a self, posts_root: &Path) -> Result<&'a Path> {
        Ok(self.path.strip_prefix(posts_root)?)
    }

    /// Site-relative href.
    ///
    /// `slug/index.md` collapses to `/posts/slug`, a plain file maps to
    /// its path with the extension stripped.
    pub fn href(&self, posts_root: &Path) -> Result<String> {
        let rel = self.rel_path(posts_root)?;
        let trimmed = if rel.file_name().is_some_and(|name| name == INDEX_FILE) {
            rel.parent().unwrap_or(Path::new("")).to_path_buf()
        } else {
            rel.with_extension("")
        };
        Ok(format!("/posts/{}", trimmed.display()))
    }

    /// True only for posts explicitly marked published.
    pub fn is_published(&self) -> bool {
        self.header.published == Some(true)
    }
}

/// Discover, read, sort, and cross-link every post under `posts_root`.
///
/// The list is sorted by `published_at` descending; posts without a
/// timestamp sort last. Ties keep discovery order (the sort is stable).
/// The comparison is textual and only chronological within a single
/// timestamp style — `2026-01-02T...` (RFC 3339, what `publish` stamps)
/// sorts after `2026-01-02 ...`, so keep headers to one format.
/// Neighbor indices are assigned over the full list before any draft
/// filtering, so a published post may link to an excluded draft.
///
/// A single unreadable or malformed post aborts the whole collection.
pub fn collect(posts_root: &Path) -> Result<Vec<Post>> {
    let mut posts = Vec::new();

    for entry in read_dir_sorted(posts_root)? {
        let path = entry;
        let (file, siblings) = if path.is_dir() {
            let siblings = read_dir_sorted(&path)?
                .into_iter()
                .filter(|p| !p.ends_with(INDEX_FILE))
                .collect();
            (path.join(INDEX_FILE), siblings)
        } else {
            if !path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(CONTENT_EXT))
            {
                continue;
            }
            (path, Vec::new())
        };

        let text = fs::read_to_string(&file).map_err(|err| SiteError::ContentRead {
            path: file.clone(),
            source: err,
        })?;
        let (header, body) =
            frontmatter::parse(&text).map_err(|err| SiteError::MalformedHeader {
                path: file.clone(),
                source: err,
            })?;

        posts.push(Post {
            path: file,
            body,
            header,
            siblings,
            next: None,
            previous: None,
        });
    }

    posts.sort_by(|a, b| b.header.published_at.cmp(&a.header.published_at));

    let len = posts.len();
    for (i, post) in posts.iter_mut().enumerate() {
        if i != 0 {
            post.previous = Some(i - 1);
        }
        if i + 1 < len {
            post.next = Some(i + 1);
        }
    }

    Ok(posts)
}

/// Immediate children of `dir`, sorted by name.
///
/// Sorting makes discovery order, and with it the tie-break for equal
/// timestamps, deterministic across platforms.
fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|err| SiteError::ContentRead {
        path: dir.to_path_buf(),
        source: err,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| SiteError::ContentRead {
            path: dir.to_path_buf(),
            source: err,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_post(dir: &Path, name: &str, published_at: Option<&str>, published: bool) {
        let stamp = published_at
            .map(|t| format!("published_at: {t}\n"))
            .unwrap_or_default();
        let text = format!(
            "---\ntitle: {name}\n{stamp}published: {published}\n---\nbody of {name}"
        );
        fs::write(dir.join(format!("{name}.md")), text).unwrap();
    }

    #[test]
    fn test_collects_file_and_directory_posts() {
        let root = TempDir::new().unwrap();
        write_post(root.path(), "plain", Some("2026-01-01 10:00:00"), true);

        let dir_post = root.path().join("nested");
        fs::create_dir(&dir_post).unwrap();
        fs::write(
            dir_post.join("index.md"),
            "---\ntitle: nested\npublished_at: 2026-01-02 10:00:00\n---\nbody",
        )
        .unwrap();
        fs::write(dir_post.join("photo.png"), b"png").unwrap();
        fs::write(root.path().join("notes.txt"), "ignored").unwrap();

        let posts = collect(root.path()).unwrap();

        assert_eq!(posts.len(), 2);
        let nested = posts
            .iter()
            .find(|p| p.header.title.as_deref() == Some("nested"))
            .unwrap();
        assert!(nested.path.ends_with("nested/index.md"));
        assert_eq!(nested.siblings.len(), 1);
        assert!(nested.siblings[0].ends_with("photo.png"));

        let plain = posts
            .iter()
            .find(|p| p.header.title.as_deref() == Some("plain"))
            .unwrap();
        assert!(plain.siblings.is_empty());
    }

    #[test]
    fn test_sorted_descending_and_linked() {
        let root = TempDir::new().unwrap();
        write_post(root.path(), "oldest", Some("2026-01-01 08:00:00"), true);
        write_post(root.path(), "newest", Some("2026-03-01 08:00:00"), true);
        write_post(root.path(), "middle", Some("2026-02-01 08:00:00"), true);

        let posts = collect(root.path()).unwrap();

        let titles: Vec<_> = posts
            .iter()
            .map(|p| p.header.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, ["newest", "middle", "oldest"]);

        // single doubly-linked chain over the sorted order
        assert_eq!(posts[0].previous, None);
        assert_eq!(posts[0].next, Some(1));
        assert_eq!(posts[1].previous, Some(0));
        assert_eq!(posts[1].next, Some(2));
        assert_eq!(posts[2].previous, Some(1));
        assert_eq!(posts[2].next, None);
    }

    #[test]
    fn test_posts_without_timestamp_sort_last() {
        let root = TempDir::new().unwrap();
        write_post(root.path(), "dated", Some("2026-01-01 08:00:00"), true);
        write_post(root.path(), "undated", None, false);

        let posts = collect(root.path()).unwrap();

        assert_eq!(posts[0].header.title.as_deref(), Some("dated"));
        assert_eq!(posts[1].header.title.as_deref(), Some("undated"));
    }

    #[test]
    fn test_malformed_header_aborts_collection() {
        let root = TempDir::new().unwrap();
        write_post(root.path(), "good", Some("2026-01-01 08:00:00"), true);
        fs::write(
            root.path().join("bad.md"),
            "---\ntitle: Bad\nbogus_key: true\n---\nbody",
        )
        .unwrap();

        let err = collect(root.path()).unwrap_err();
        let site_err = err.downcast_ref::<SiteError>().unwrap();
        assert!(matches!(site_err, SiteError::MalformedHeader { path, .. } if path.ends_with("bad.md")));
    }

    #[test]
    fn test_directory_without_index_is_read_error() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("empty")).unwrap();

        let err = collect(root.path()).unwrap_err();
        let site_err = err.downcast_ref::<SiteError>().unwrap();
        assert!(
            matches!(site_err, SiteError::ContentRead { path, .. } if path.ends_with("empty/index.md"))
        );
    }

    #[test]
    fn test_href_rules() {
        let root = TempDir::new().unwrap();
        write_post(root.path(), "hello-world", Some("2026-01-01 08:00:00"), true);

        let dir_post = root.path().join("with-assets");
        fs::create_dir(&dir_post).unwrap();
        fs::write(
            dir_post.join("index.md"),
            "---\ntitle: t\npublished_at: 2026-01-02 08:00:00\n---\nb",
        )
        .unwrap();

        let posts = collect(root.path()).unwrap();

        let file_post = posts
            .iter()
            .find(|p| p.header.title.as_deref() == Some("hello-world"))
            .unwrap();
        assert_eq!(
            file_post.href(root.path()).unwrap(),
            "/posts/hello-world"
        );

        let dir_post = posts
            .iter()
            .find(|p| p.path.ends_with("with-assets/index.md"))
            .unwrap();
        assert_eq!(dir_post.href(root.path()).unwrap(), "/posts/with-assets");
    }
}
