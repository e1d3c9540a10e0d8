use std::path::PathBuf;

use thiserror::Error as ThisError;

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Errors from loading a site configuration or page manifest.
///
/// Synchronizing a head never fails; reading its inputs from disk can.
#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate page path `{0}` in manifest")]
    DuplicatePage(String),

    #[error("pages `{first}` and `{second}` both map to the slug `{slug}`")]
    SlugCollision {
        first: String,
        second: String,
        slug: String,
    },
}
