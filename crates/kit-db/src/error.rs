use std::path::PathBuf;

/// Errors from document store operations.
///
/// A missing store directory is deliberately absent from this list: it
/// produces a degraded handle and a warning, not an error.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// I/O failure reading or writing a backing file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a valid document of the expected
    /// shape.
    #[error("malformed document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be converted to or from JSON in memory.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// `write` was called on a store that holds no document.
    #[error("store has no document to write")]
    NotInitialized,

    /// No key was supplied and there is no active script to derive one from.
    #[error("no store key given and no active script to derive one from")]
    MissingKey,

    /// The defaults producer reported a failure.
    #[error("defaults producer failed: {0}")]
    Producer(String),
}

impl DbError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn producer(message: impl std::fmt::Display) -> Self {
        Self::Producer(message.to_string())
    }
}

/// Result alias for store operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_path() {
        let err = DbError::io(
            "/k/db/apps.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/k/db/apps.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn producer_message() {
        let err = DbError::producer("index failed");
        assert_eq!(err.to_string(), "defaults producer failed: index failed");
    }
}
