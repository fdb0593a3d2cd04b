//! In-memory adapter for tests and embedding.
//!
//! [`Memory`] keeps the serialized JSON text behind a `RwLock`, so documents
//! go through the same encode/decode path as [`JsonFile`](crate::JsonFile)
//! without touching disk. Data is lost when the adapter is dropped.

use std::marker::PhantomData;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::adapter::{Adapter, Document};
use crate::error::{DbError, DbResult};

pub struct Memory<T> {
    text: RwLock<Option<String>>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Memory<T> {
    /// Create an empty adapter; the first `read` returns `None`.
    pub fn new() -> Self {
        Self {
            text: RwLock::new(None),
            _doc: PhantomData,
        }
    }

    /// Create an adapter pre-loaded with raw JSON text.
    pub fn with_contents(text: impl Into<String>) -> Self {
        Self {
            text: RwLock::new(Some(text.into())),
            _doc: PhantomData,
        }
    }

    /// The JSON text currently stored, if any.
    pub fn contents(&self) -> Option<String> {
        self.text.read().expect("lock poisoned").clone()
    }
}

impl<T> Default for Memory<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> Adapter<T> for Memory<T> {
    async fn read(&self) -> DbResult<Option<T>> {
        let text = self.text.read().expect("lock poisoned");
        match text.as_deref() {
            None => Ok(None),
            Some(t) => serde_json::from_str(t)
                .map(Some)
                .map_err(|e| DbError::Serialization(e.to_string())),
        }
    }

    async fn write(&self, data: &T) -> DbResult<()> {
        let encoded =
            serde_json::to_string(data).map_err(|e| DbError::Serialization(e.to_string()))?;
        *self.text.write().expect("lock poisoned") = Some(encoded);
        Ok(())
    }
}

impl<T> std::fmt::Debug for Memory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self
            .text
            .read()
            .map(|t| t.as_ref().map_or(0, String::len))
            .unwrap_or(0);
        f.debug_struct("Memory").field("bytes", &bytes).finish()
    }
}
