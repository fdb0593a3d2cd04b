//! Environment configuration and path resolution for kit stores.
//!
//! A kit installation is split across two directories:
//!
//! - the **kit** directory, holding the launcher's own state
//!   (`<kit>/db/app.json`, `<kit>/db/scripts.json`, ...)
//! - the **kenv** directory, the user's script environment
//!   (`<kenv>/scripts/*.js`, `<kenv>/db/<key>.json`)
//!
//! [`KitEnv`] carries both roots plus the currently running script, if any,
//! and is passed explicitly to everything that needs to locate a file.
//!
//! # Modules
//!
//! - [`env`] — [`KitEnv`] and [`Platform`], loaded from env vars or TOML
//! - [`resolve`] — key-to-path resolution and script command naming
//! - [`error`] — configuration errors

pub mod env;
pub mod error;
pub mod resolve;

pub use env::{KitEnv, Platform};
pub use error::{PathsError, PathsResult};
pub use resolve::{script_command, strip_script_extension, DB_DIR, SCRIPT_EXTENSIONS};
