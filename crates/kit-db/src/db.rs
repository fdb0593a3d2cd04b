use std::path::PathBuf;

use kit_paths::KitEnv;
use tracing::{debug, warn};

use crate::adapter::Document;
use crate::defaults::{Defaults, Items, ItemsDoc};
use crate::error::{DbError, DbResult};
use crate::guard::{ensure_ready, parent_dir};
use crate::handle::Handle;
use crate::store::Store;

/// Options for [`Db::load`].
#[derive(Debug)]
pub struct DbOptions<T> {
    /// Store key. `None` derives `_<command>` from the active script.
    pub key: Option<String>,
    pub defaults: Defaults<T>,
    /// `false` recomputes and rewrites the defaults even if a file exists.
    pub from_cache: bool,
}

impl<T: Default> Default for DbOptions<T> {
    fn default() -> Self {
        Self {
            key: None,
            defaults: Defaults::default(),
            from_cache: true,
        }
    }
}

impl<T: Default> DbOptions<T> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }
}

impl<T> DbOptions<T> {
    pub fn defaults(mut self, defaults: Defaults<T>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn from_cache(mut self, from_cache: bool) -> Self {
        self.from_cache = from_cache;
        self
    }
}

/// Options for [`Db::load_array`]. Defaults may be a bare list or a
/// wrapped `{items}` document.
pub type ArrayOptions<T> = DbOptions<Items<T>>;

/// Entry point for loading stores within one kit environment.
///
/// Cheap to clone; holds only the environment used for key resolution.
#[derive(Clone, Debug)]
pub struct Db {
    env: KitEnv,
}

impl Db {
    pub fn new(env: KitEnv) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &KitEnv {
        &self.env
    }

    /// File backing `key`, or the active script's default key when `None`.
    pub fn resolve(&self, key: Option<&str>) -> DbResult<PathBuf> {
        match key {
            Some(k) => Ok(self.env.resolve_db_key(k)),
            None => {
                let k = self.env.default_db_key().ok_or(DbError::MissingKey)?;
                Ok(self.env.resolve_db_key(&k))
            }
        }
    }

    /// Load (creating if needed) an object-shaped store.
    ///
    /// If the store's directory does not exist the returned handle is
    /// degraded: it holds the static defaults (or `T::default()` for a
    /// producer, which is not run) and never writes.
    pub async fn load<T>(&self, options: DbOptions<T>) -> DbResult<Handle<T>>
    where
        T: Document + Default,
    {
        self.open(options, std::convert::identity).await
    }

    /// Load (creating if needed) a list store shaped `{"items": [...]}`.
    ///
    /// A bare list from the defaults is wrapped into `{items}` before it is
    /// written.
    pub async fn load_array<T>(&self, options: ArrayOptions<T>) -> DbResult<Handle<ItemsDoc<T>>>
    where
        T: Send + Sync + 'static,
        ItemsDoc<T>: Document,
    {
        self.open(options, Items::normalize).await
    }

    async fn open<T, D>(&self, options: DbOptions<D>, finish: fn(D) -> T) -> DbResult<Handle<T>>
    where
        T: Document + Default,
        D: Send + 'static,
    {
        let DbOptions {
            key,
            defaults,
            from_cache,
        } = options;
        let path = self.resolve(key.as_deref())?;

        if !ensure_ready(&path).await {
            warn!(
                dir = %parent_dir(&path).display(),
                "store directory not found; returning defaults"
            );
            let doc = defaults.into_value().map(finish).unwrap_or_default();
            return Ok(Handle::degraded(path, doc));
        }

        let mut store = Store::json_file(&path);
        store.read().await?;

        if store.data().is_none() || !from_cache {
            debug!(
                path = %path.display(),
                from_cache,
                producer = defaults.is_producer(),
                "initializing store"
            );
            let doc = finish(defaults.resolve().await?);
            store.set_data(doc);
            store.write().await?;
        }

        Ok(Handle::live(store))
    }
}
