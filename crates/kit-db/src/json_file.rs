use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::adapter::{Adapter, Document};
use crate::error::{DbError, DbResult};
use crate::guard::parent_dir;

/// Adapter storing a document as pretty-printed JSON in a single file.
///
/// Reads and writes are whole-file. A write replaces the file by rename, so
/// a crash or a concurrent reader never sees a truncated document. A
/// missing file reads as `None`; the parent directory is never created here.
pub struct JsonFile<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _doc: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Document> Adapter<T> for JsonFile<T> {
    async fn read(&self) -> DbResult<Option<T>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no document on disk");
                return Ok(None);
            }
            Err(e) => return Err(DbError::io(&self.path, e)),
        };

        let doc = serde_json::from_str(&text).map_err(|source| DbError::Parse {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = text.len(), "document read");
        Ok(Some(doc))
    }

    async fn write(&self, data: &T) -> DbResult<()> {
        let text = serde_json::to_string_pretty(data)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        let bytes = text.len();
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, text.as_bytes()))
            .await
            .map_err(|e| DbError::io(&self.path, std::io::Error::other(e)))??;
        debug!(path = %self.path.display(), bytes, "document written");
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Write `contents` to a temp file beside `path`, sync it, then rename it
/// over `path`. Readers see the old document or the new one, never a
/// partial write.
fn replace_file(path: &Path, contents: &[u8]) -> DbResult<()> {
    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| DbError::io(path, e))?;
    tmp.write_all(contents).map_err(|e| DbError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| DbError::io(path, e))?;
    tmp.persist(path).map_err(|e| DbError::io(path, e.error))?;
    Ok(())
}

impl<T> std::fmt::Debug for JsonFile<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFile").field("path", &self.path).finish()
    }
}
