use std::path::{Path, MAIN_SEPARATOR};
use std::sync::Arc;

use kit_db::{Db, DbError, DbOptions, Defaults, Handle};
use kit_paths::{strip_script_extension, KitEnv};
use tracing::debug;

use crate::error::{LookupMode, ScriptError, ScriptResult};
use crate::script::{Choice, Script, ScriptField, ScriptsDoc};
use crate::source::{DirScriptSource, ScriptSource};

/// The script index and the lookups built on it.
///
/// The index lives at `<kit>/db/scripts.json`. When that file is missing,
/// or a caller bypasses the cache, it is rebuilt from the [`ScriptSource`].
#[derive(Clone)]
pub struct Scripts {
    db: Db,
    source: Arc<dyn ScriptSource>,
}

impl Scripts {
    pub fn new(db: Db, source: impl ScriptSource + 'static) -> Self {
        Self {
            db,
            source: Arc::new(source),
        }
    }

    /// Index the scripts of `env`'s kenv.
    pub fn for_env(env: KitEnv) -> Self {
        let source = DirScriptSource::for_env(&env);
        Self::new(Db::new(env), source)
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Load the index, rescanning when the file is missing or `from_cache`
    /// is false.
    pub async fn scripts_db(&self, from_cache: bool) -> ScriptResult<Handle<ScriptsDoc>> {
        let key = self.db.env().scripts_db_path().to_string_lossy().into_owned();
        let source = Arc::clone(&self.source);
        let defaults = Defaults::producer(move || async move {
            let scripts = source.parse_scripts().await.map_err(DbError::producer)?;
            Ok(ScriptsDoc { scripts })
        });

        let options = DbOptions::new(key)
            .defaults(defaults)
            .from_cache(from_cache);
        Ok(self.db.load(options).await?)
    }

    /// Rescan and rewrite the index.
    pub async fn refresh_scripts_db(&self) -> ScriptResult<()> {
        let handle = self.scripts_db(false).await?;
        debug!(
            count = handle.doc().map(|d| d.scripts.len()).unwrap_or(0),
            "refreshed script index"
        );
        Ok(())
    }

    pub async fn scripts(&self, from_cache: bool) -> ScriptResult<Vec<Script>> {
        let handle = self.scripts_db(from_cache).await?;
        Ok(handle.into_doc().unwrap_or_default().scripts)
    }

    /// Find a script by name, command or absolute file path.
    pub async fn script_from_string(&self, input: &str) -> ScriptResult<Script> {
        let scripts = self.scripts(true).await?;
        find_script(&scripts, input)
    }

    /// Every script as a menu choice whose value is `pluck`.
    pub async fn script_choices(
        &self,
        pluck: ScriptField,
        from_cache: bool,
    ) -> ScriptResult<Vec<Choice>> {
        let scripts = self.scripts(from_cache).await?;
        Ok(scripts
            .into_iter()
            .map(|script| Choice {
                value: script.get(pluck),
                script,
            })
            .collect())
    }
}

impl std::fmt::Debug for Scripts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scripts").field("db", &self.db).finish_non_exhaustive()
    }
}

/// Look `input` up in `scripts`.
///
/// Input without a path separator matches a script's name, or its command
/// once any script extension is stripped. Input rooted at the filesystem
/// root matches a file path exactly. Anything else is rejected.
pub fn find_script(scripts: &[Script], input: &str) -> ScriptResult<Script> {
    let (mode, found) = if !input.contains(MAIN_SEPARATOR) {
        let command = strip_script_extension(input);
        let found = scripts
            .iter()
            .find(|s| s.name == input || s.command == command);
        (LookupMode::NameOrCommand, found)
    } else if Path::new(input).has_root() {
        let path = Path::new(input);
        (LookupMode::Path, scripts.iter().find(|s| s.file_path == path))
    } else {
        (LookupMode::Unresolvable, None)
    };

    found
        .cloned()
        .ok_or_else(|| ScriptError::not_found(input, mode))
}
