//! Site configuration management for `quill.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                      |
//! |-------------|----------------------------------------------|
//! | `[base]`    | Site metadata (title, author, url)           |
//! | `[build]`   | Content, layout, and output paths            |
//! | `[serve]`   | Development server (port, interface, watch)  |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "My Blog"
//! description = "A personal blog"
//! url = "https://example.com"
//!
//! [build]
//! posts = "posts"
//! output = "www"
//!
//! [serve]
//! port = 8080
//! ```

mod base;
mod build;
pub mod defaults;
mod error;
mod serve;

// Internal imports used in this module
use base::BaseConfig;
use build::BuildConfig;
use error::ConfigError;
use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing quill.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Staging directory builds are written into before the swap.
    ///
    /// Dot-prefixed sibling of the output directory, so the watcher's
    /// hidden-path rule skips it.
    pub fn staging_dir(&self) -> PathBuf {
        self.output_sibling("staging")
    }

    /// Parking spot for the previous output during the swap.
    pub fn old_output_dir(&self) -> PathBuf {
        self.output_sibling("old")
    }

    fn output_sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .build
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".into());
        self.build
            .output
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!(".{name}.{suffix}"))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        self.set_root(&root);
        self.update_path_with_root(&root);

        match &cli.command {
            Commands::Build { build_args } => {
                if build_args.draft {
                    self.build.drafts = true;
                }
            }
            Commands::Serve {
                build_args,
                interface,
                port,
                watch,
            } => {
                if build_args.draft {
                    self.build.drafts = true;
                }
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
                self.base.url = Some(format!(
                    "http://{}:{}",
                    self.serve.interface, self.serve.port
                ));
            }
            _ => {}
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let cli = self.get_cli();

        // Normalize root to absolute path
        let root = Self::normalize_path(root);
        self.set_root(&root);

        // Normalize config path
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        // Normalize all directory paths
        self.build.posts = Self::normalize_path(&root.join(&self.build.posts));
        self.build.pages = Self::normalize_path(&root.join(&self.build.pages));
        self.build.layout = Self::normalize_path(&root.join(&self.build.layout));
        self.build.templates = Self::normalize_path(&root.join(&self.build.templates));
        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        let cli = self.get_cli();

        if let Some(base_url) = &self.base.url
            && !base_url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        match &cli.command {
            Commands::Build { .. } | Commands::Serve { .. } => {
                Self::check_directory("[build.posts]", &self.build.posts)?;
                Self::check_directory("[build.pages]", &self.build.pages)?;
                Self::check_directory("[build.layout]", &self.build.layout)?;
                Self::check_directory("[build.assets]", &self.build.assets)?;
            }
            Commands::Post { .. } => {
                Self::check_directory("[build.templates]", &self.build.templates)?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Check that a configured directory exists
    fn check_directory(field: &'static str, path: &Path) -> Result<()> {
        if !path.is_dir() {
            bail!(ConfigError::MissingDirectory {
                field,
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
