use std::path::Path;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DbResult;

/// Anything that can live in a store: serializable, owned and shareable
/// across tasks.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Document for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Persistence backend for a [`Store`](crate::Store).
///
/// Adapters move whole documents: `read` returns the complete stored
/// document and `write` replaces it. There is no partial update, append or
/// merge, and no locking between concurrent writers.
#[async_trait]
pub trait Adapter<T: Document>: Send + Sync {
    /// Load the stored document.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    /// Returns `Err` if the stored bytes are not a valid `T` or on I/O failure.
    async fn read(&self) -> DbResult<Option<T>>;

    /// Replace the stored document with `data`.
    async fn write(&self, data: &T) -> DbResult<()>;

    /// Backing file, for adapters that have one.
    fn path(&self) -> Option<&Path> {
        None
    }
}
