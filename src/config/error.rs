//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("`{field}` directory not found: `{path}`")]
    MissingDirectory { field: &'static str, path: PathBuf },

    #[error("Config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("quill.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("quill.toml"));

        let missing = ConfigError::MissingDirectory {
            field: "[build.posts]",
            path: PathBuf::from("posts"),
        };
        let display = format!("{missing}");
        assert!(display.contains("[build.posts]"));
        assert!(display.contains("posts"));
    }
}
