//! `[build]` section configuration.
//!
//! Contains build paths and content selection settings. All path fields are
//! relative to the project root in the file and absolute after CLI merging.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in quill.toml - build paths and toggles.
///
/// # Example
/// ```toml
/// [build]
/// posts = "posts"
/// pages = "pages"
/// output = "www"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory. Set from the CLI, not the config file.
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Directory scanned for posts (Markdown with a YAML header).
    #[serde(default = "defaults::build::posts")]
    #[educe(Default = defaults::build::posts())]
    pub posts: PathBuf,

    /// Directory of standalone pages, mirrored onto the output root.
    #[serde(default = "defaults::build::pages")]
    #[educe(Default = defaults::build::pages())]
    pub pages: PathBuf,

    /// Directory of layout templates posts are rendered through.
    #[serde(default = "defaults::build::layout")]
    #[educe(Default = defaults::build::layout())]
    pub layout: PathBuf,

    /// Directory of scaffolding templates for new posts.
    #[serde(default = "defaults::build::templates")]
    #[educe(Default = defaults::build::templates())]
    pub templates: PathBuf,

    /// Directory of static assets, copied verbatim to `<output>/assets`.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Output directory. Deleted and recreated on every build.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Include unpublished posts in the output.
    #[serde(default)]
    pub drafts: bool,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test blog"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.posts, PathBuf::from("posts"));
        assert_eq!(config.build.pages, PathBuf::from("pages"));
        assert_eq!(config.build.layout, PathBuf::from("layout"));
        assert_eq!(config.build.templates, PathBuf::from("templates"));
        assert_eq!(config.build.assets, PathBuf::from("assets"));
        assert_eq!(config.build.output, PathBuf::from("www"));
        assert!(!config.build.drafts);
        assert!(config.build.root.is_none());
    }

    #[test]
    fn test_build_config_overrides() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test blog"

            [build]
            posts = "entries"
            output = "dist"
            drafts = true
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.posts, PathBuf::from("entries"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(config.build.drafts);
        // untouched fields keep their defaults
        assert_eq!(config.build.pages, PathBuf::from("pages"));
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test blog"

            [build]
            unknown_field = "should_fail"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
