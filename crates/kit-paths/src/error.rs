use std::path::PathBuf;

/// Errors raised while building a [`KitEnv`](crate::KitEnv).
#[derive(Debug, thiserror::Error)]
pub enum PathsError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for a `KitEnv`.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Neither an explicit root nor `HOME` was available.
    #[error("cannot locate {0}: no explicit path and HOME is not set")]
    NoHome(&'static str),
}

/// Result alias for configuration operations.
pub type PathsResult<T> = Result<T, PathsError>;
