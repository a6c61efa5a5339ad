//! Quill - a Markdown blog generator with a watch/serve development loop.

mod build;
mod cli;
mod config;
mod content;
mod context;
mod error;
mod frontmatter;
mod logger;
mod markdown;
mod pages;
mod render;
mod scaffold;
mod serve;
mod templates;
mod utils;
mod watch;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use serve::serve_site;
use std::path::Path;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Post { title, as_dir } => scaffold::new_post(config, title, *as_dir),
        Commands::Publish { path } => scaffold::publish_post(config, path),
        Commands::Build { .. } => build_site(config),
        Commands::Serve { .. } => {
            // The initial build is fatal on failure: there is no previous
            // output worth serving yet. Watcher-triggered rebuilds are not.
            build_site(config)?;
            serve_site(config)
        }
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing `quill.toml` is not an error; the defaults describe a
/// conventional project layout.
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}
