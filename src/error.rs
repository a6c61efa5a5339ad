//! Error types shared across the content pipeline.

use crate::frontmatter::HeaderError;
use std::path::PathBuf;
use thiserror::Error;

/// Content loading and rendering errors
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("malformed header in `{path}`")]
    MalformedHeader {
        path: PathBuf,
        #[source]
        source: HeaderError,
    },

    #[error("failed to read `{path}`")]
    ContentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template `{name}` not found in any template directory")]
    TemplateNotFound { name: String },

    #[error("destination already exists: `{path}`")]
    DestinationExists { path: PathBuf },
}
