use std::collections::BTreeMap;

use kit_db::{Db, DbOptions, Defaults, Document, Handle};
use kit_paths::KitEnv;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ScriptResult;

/// A secondary kenv listed in `app.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KenvEntry {
    pub name: String,
    pub value: String,
}

/// `<kit>/db/app.json`. Unknown keys are kept so writes do not drop fields
/// owned by other writers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppDb {
    pub needs_restart: bool,
    pub version: String,
    pub auto_update: bool,
    pub tray: bool,
    pub open_at_login: bool,
    pub preview_scripts: bool,
    #[serde(rename = "KENVS", default, skip_serializing_if = "Vec::is_empty")]
    pub kenvs: Vec<KenvEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppDb {
    fn default() -> Self {
        Self {
            needs_restart: false,
            version: "0.0.0".into(),
            auto_update: true,
            tray: true,
            open_at_login: true,
            preview_scripts: false,
            kenvs: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// `<kit>/db/shortcuts.json`: script path to shortcut.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutsDb {
    pub shortcuts: BTreeMap<String, String>,
}

impl ShortcutsDb {
    /// The main launcher script bound to `cmd ;` on macOS, `ctrl ;`
    /// elsewhere.
    pub fn for_env(env: &KitEnv) -> Self {
        let key = if env.platform.is_mac() { "cmd ;" } else { "ctrl ;" };
        let mut shortcuts = BTreeMap::new();
        shortcuts.insert(
            env.main_script_path().display().to_string(),
            key.to_string(),
        );
        Self { shortcuts }
    }
}

/// `<kit>/db/prefs.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrefsDb {
    pub show_join: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PrefsDb {
    fn default() -> Self {
        Self {
            show_join: true,
            extra: Map::new(),
        }
    }
}

/// `<kit>/db/prompt.json`: saved prompt geometry per screen.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptDb {
    pub screens: Map<String, Value>,
    pub clear: bool,
}

/// Typed stores the launcher keeps under `<kit>/db`.
#[derive(Clone, Debug)]
pub struct KitStores {
    db: Db,
}

impl KitStores {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn app_db(&self) -> ScriptResult<Handle<AppDb>> {
        let key = key(self.db.env().app_db_path());
        self.load(key, AppDb::default()).await
    }

    pub async fn shortcuts_db(&self) -> ScriptResult<Handle<ShortcutsDb>> {
        let env = self.db.env();
        self.load(key(env.shortcuts_path()), ShortcutsDb::for_env(env))
            .await
    }

    pub async fn prefs_db(&self) -> ScriptResult<Handle<PrefsDb>> {
        let key = key(self.db.env().prefs_path());
        self.load(key, PrefsDb::default()).await
    }

    pub async fn prompt_db(&self) -> ScriptResult<Handle<PromptDb>> {
        let key = key(self.db.env().prompt_db_path());
        self.load(key, PromptDb::default()).await
    }

    /// Secondary kenvs recorded in `app.json`.
    pub async fn kenvs(&self) -> ScriptResult<Vec<KenvEntry>> {
        let app = self.app_db().await?;
        Ok(app.into_doc().map(|a| a.kenvs).unwrap_or_default())
    }

    async fn load<T>(&self, key: String, defaults: T) -> ScriptResult<Handle<T>>
    where
        T: Document + Default,
    {
        let options = DbOptions::new(key).defaults(Defaults::value(defaults));
        Ok(self.db.load(options).await?)
    }
}

fn key(path: std::path::PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
