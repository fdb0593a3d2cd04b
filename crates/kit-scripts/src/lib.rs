//! Query helpers layered on [`kit_db`] stores.
//!
//! - [`scripts`] — the script index (`<kit>/db/scripts.json`), refreshed from
//!   a [`ScriptSource`], and lookups by name, command or absolute path
//! - [`source`] — discovering scripts on disk and reading their metadata
//!   comments
//! - [`app`] — typed launcher stores: app settings, shortcuts, prefs and
//!   prompt state
//!
//! None of these change how a store loads or persists; they only decide
//! keys, defaults and document shapes.

pub mod app;
pub mod error;
pub mod script;
pub mod scripts;
pub mod source;

pub use app::{AppDb, KenvEntry, KitStores, PrefsDb, PromptDb, ShortcutsDb};
pub use error::{LookupMode, ScriptError, ScriptResult};
pub use script::{Choice, Script, ScriptField, ScriptsDoc};
pub use scripts::{find_script, Scripts};
pub use source::{DirScriptSource, ScriptSource};
