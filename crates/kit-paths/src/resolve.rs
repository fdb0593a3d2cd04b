//! Key-to-path resolution.
//!
//! A store key is either a literal file path (anything ending in `.json`)
//! or a bare name that lives under the environment's `db` directory:
//!
//! ```text
//! "apps"                    -> <root>/db/apps.json
//! "/tmp/cache.json"         -> /tmp/cache.json
//! "/var/kit/state"          -> /var/kit/state.json   (absolute: root dropped)
//! ```
//!
//! `<root>` is the directory two levels above the running script when a
//! script context is set, otherwise the configured kenv path.

use std::path::{Component, Path, PathBuf};

use crate::env::KitEnv;

/// Subdirectory holding bare-keyed stores.
pub const DB_DIR: &str = "db";

/// Extensions recognised as runnable scripts.
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "ts", "mjs"];

/// Strip a trailing `.js`, `.ts` or `.mjs` from a script name.
pub fn strip_script_extension(name: &str) -> &str {
    for ext in SCRIPT_EXTENSIONS {
        if let Some(stem) = name.strip_suffix(ext).and_then(|s| s.strip_suffix('.')) {
            if !stem.is_empty() {
                return stem;
            }
        }
    }
    name
}

/// The command name of a script file: its file name minus the script
/// extension.
///
/// ```
/// use std::path::Path;
/// use kit_paths::script_command;
///
/// assert_eq!(script_command(Path::new("/k/scripts/hello-world.ts")).as_deref(), Some("hello-world"));
/// assert_eq!(script_command(Path::new("/")), None);
/// ```
pub fn script_command(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    Some(strip_script_extension(name).to_string())
}

impl KitEnv {
    /// Join `parts` onto the kit directory.
    pub fn kit_path(&self, parts: &[&str]) -> PathBuf {
        join_all(&self.kit_path, parts)
    }

    /// Join `parts` onto the configured kenv directory.
    pub fn kenv_path(&self, parts: &[&str]) -> PathBuf {
        join_all(&self.kenv_path, parts)
    }

    /// The environment root for bare keys.
    ///
    /// A relative script path is taken relative to the current directory.
    pub fn environment_root(&self) -> PathBuf {
        self.script
            .as_deref()
            .filter(|s| !s.as_os_str().is_empty())
            .and_then(|s| std::path::absolute(s).ok())
            .map(|s| normalize(&s.join("..").join("..")))
            .unwrap_or_else(|| self.kenv_path.clone())
    }

    /// Join `parts` onto [`environment_root`](Self::environment_root).
    pub fn resolve_kenv(&self, parts: &[&str]) -> PathBuf {
        join_all(&self.environment_root(), parts)
    }

    /// Map a store key to the file that backs it.
    pub fn resolve_db_key(&self, key: &str) -> PathBuf {
        if key.ends_with(".json") {
            return PathBuf::from(key);
        }
        self.resolve_kenv(&[DB_DIR, &format!("{key}.json")])
    }

    /// Key used when a caller does not name one: `_<command>` of the
    /// active script.
    pub fn default_db_key(&self) -> Option<String> {
        let command = script_command(self.script.as_deref()?)?;
        Some(format!("_{command}"))
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.kenv_path(&["scripts"])
    }

    pub fn main_script_path(&self) -> PathBuf {
        self.kit_path(&["main", "index.js"])
    }

    pub fn scripts_db_path(&self) -> PathBuf {
        self.kit_path(&[DB_DIR, "scripts.json"])
    }

    pub fn app_db_path(&self) -> PathBuf {
        self.kit_path(&[DB_DIR, "app.json"])
    }

    pub fn shortcuts_path(&self) -> PathBuf {
        self.kit_path(&[DB_DIR, "shortcuts.json"])
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.kit_path(&[DB_DIR, "prefs.json"])
    }

    pub fn prompt_db_path(&self) -> PathBuf {
        self.kit_path(&[DB_DIR, "prompt.json"])
    }
}

fn join_all(root: &Path, parts: &[&str]) -> PathBuf {
    parts.iter().fold(root.to_path_buf(), |acc, p| acc.join(p))
}

/// Drop `.` and fold `..` lexically. `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
