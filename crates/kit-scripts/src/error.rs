use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// How a script lookup interpreted its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupMode {
    /// Input had no path separator: matched against name and command.
    NameOrCommand,
    /// Input was an absolute path: matched against `filePath`.
    Path,
    /// Input was a relative path, which neither mode accepts.
    Unresolvable,
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameOrCommand => f.write_str("name or command"),
            Self::Path => f.write_str("path"),
            Self::Unresolvable => {
                f.write_str("input; expected a \"command-name\" or an absolute \"/path/to/the/script\"")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot find script based on {mode}: {input}")]
    NotFound { input: String, mode: LookupMode },

    #[error("store error: {0}")]
    Db(#[from] kit_db::DbError),

    #[error("cannot read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("script scan failed: {0}")]
    Scan(String),
}

impl ScriptError {
    pub fn not_found(input: impl Into<String>, mode: LookupMode) -> Self {
        Self::NotFound {
            input: input.into(),
            mode,
        }
    }
}

pub type ScriptResult<T> = Result<T, ScriptError>;
