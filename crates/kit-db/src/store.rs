use std::path::{Path, PathBuf};

use crate::adapter::{Adapter, Document};
use crate::error::{DbError, DbResult};
use crate::json_file::JsonFile;

/// A document held in memory and persisted through an [`Adapter`].
///
/// `data` starts empty. [`read`](Self::read) replaces it with whatever the
/// adapter holds (possibly nothing); [`write`](Self::write) persists it.
/// Mutating the document never touches the adapter on its own.
pub struct Store<T: Document> {
    adapter: Box<dyn Adapter<T>>,
    data: Option<T>,
}

impl<T: Document> Store<T> {
    pub fn new(adapter: impl Adapter<T> + 'static) -> Self {
        Self {
            adapter: Box::new(adapter),
            data: None,
        }
    }

    /// Store backed by a JSON file at `path`.
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFile::new(path))
    }

    /// Reload the document from the adapter, discarding in-memory changes.
    pub async fn read(&mut self) -> DbResult<()> {
        self.data = self.adapter.read().await?;
        Ok(())
    }

    /// Persist the in-memory document, replacing what the adapter holds.
    pub async fn write(&self) -> DbResult<()> {
        match &self.data {
            Some(doc) => self.adapter.write(doc).await,
            None => Err(DbError::NotInitialized),
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    pub fn set_data(&mut self, data: T) {
        self.data = Some(data);
    }

    pub fn take_data(&mut self) -> Option<T> {
        self.data.take()
    }

    pub fn path(&self) -> Option<&Path> {
        self.adapter.path()
    }
}

impl<T: Document + std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path())
            .field("data", &self.data)
            .finish()
    }
}
