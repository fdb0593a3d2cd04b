//! Keyed JSON document store for kit scripts.
//!
//! Each store is one JSON file identified by a short key. The first load
//! creates the file from caller-supplied defaults (a value, or an async
//! producer); later loads read it back. Callers get a [`Handle`] exposing the
//! document plus `read`/`write`.
//!
//! # Lifecycle
//!
//! 1. The key is resolved to a path ([`kit_paths::KitEnv::resolve_db_key`]).
//! 2. The [`guard`] checks the parent directory. If it is missing the load
//!    returns a *degraded* handle holding the defaults; its `write` is a
//!    no-op and a warning is logged.
//! 3. The file is read. If it is absent, or the caller asked for a fresh
//!    copy (`from_cache = false`), defaults are computed and written.
//!
//! # Concurrency
//!
//! Every load builds an independent handle with its own copy of the
//! document. Nothing coordinates handles (or processes) sharing a key: two
//! writers race and the last whole-document write wins. Callers that need
//! more must agree on a single writer.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> kit_db::DbResult<()> {
//! use kit_db::{Db, DbOptions, Defaults};
//! use kit_paths::KitEnv;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Counter { count: u64 }
//!
//! let db = Db::new(KitEnv::from_env().expect("env"));
//! let mut counter = db
//!     .load(DbOptions::new("counter").defaults(Defaults::value(Counter { count: 0 })))
//!     .await?;
//! counter.update(|c| c.count += 1);
//! counter.write().await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod db;
pub mod defaults;
pub mod error;
pub mod guard;
pub mod handle;
pub mod json_file;
pub mod memory;
pub mod store;

pub use adapter::{Adapter, Document};
pub use db::{ArrayOptions, Db, DbOptions};
pub use defaults::{Defaults, Items, ItemsDoc};
pub use error::{DbError, DbResult};
pub use handle::Handle;
pub use json_file::JsonFile;
pub use memory::Memory;
pub use store::Store;
