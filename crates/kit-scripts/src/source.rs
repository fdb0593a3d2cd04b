use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kit_paths::{script_command, KitEnv, SCRIPT_EXTENSIONS};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ScriptError, ScriptResult};
use crate::script::Script;

/// Produces the current list of scripts for the index.
#[async_trait]
pub trait ScriptSource: Send + Sync {
    async fn parse_scripts(&self) -> ScriptResult<Vec<Script>>;
}

/// Scans script directories on disk.
///
/// Only the top level of each directory is read. A missing directory yields
/// no scripts; an unreadable file is skipped with a warning.
#[derive(Clone, Debug)]
pub struct DirScriptSource {
    dirs: Vec<(Option<String>, PathBuf)>,
}

impl DirScriptSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dirs: vec![(None, dir.into())],
        }
    }

    /// `<kenv>/scripts` of `env`.
    pub fn for_env(env: &KitEnv) -> Self {
        Self::new(env.scripts_dir())
    }

    /// Also scan `dir`, tagging its scripts with kenv `name`.
    pub fn with_kenv(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push((Some(name.into()), dir.into()));
        self
    }

    fn scan(dirs: &[(Option<String>, PathBuf)]) -> Vec<Script> {
        let mut scripts = Vec::new();

        for (kenv, dir) in dirs {
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "script dir not found");
                continue;
            }

            let entries = WalkDir::new(dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(e) => Some(e),
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                        None
                    }
                });

            for entry in entries {
                let path = entry.path();
                if !entry.file_type().is_file() || !is_script(path) {
                    continue;
                }
                match read_script(path) {
                    Ok(mut script) => {
                        script.kenv = kenv.clone();
                        scripts.push(script);
                    }
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping script"),
                }
            }
        }

        scripts.sort_by(|a, b| a.name.cmp(&b.name));
        scripts
    }
}

#[async_trait]
impl ScriptSource for DirScriptSource {
    async fn parse_scripts(&self) -> ScriptResult<Vec<Script>> {
        let dirs = self.dirs.clone();
        let scripts = tokio::task::spawn_blocking(move || Self::scan(&dirs))
            .await
            .map_err(|e| ScriptError::Scan(e.to_string()))?;
        debug!(count = scripts.len(), "scanned scripts");
        Ok(scripts)
    }
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SCRIPT_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

fn read_script(path: &Path) -> ScriptResult<Script> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let command = script_command(path).unwrap_or_default();

    let mut script = Script::new(command, path);
    if let Some(name) = metadata(&contents, "Name") {
        script.name = name;
    }
    script.description = metadata(&contents, "Description");
    script.shortcut = metadata(&contents, "Shortcut");
    Ok(script)
}

/// First `// Key: value` comment line for `key`.
fn metadata(contents: &str, key: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let comment = line.trim_start().strip_prefix("//")?;
        let (k, v) = comment.split_once(':')?;
        if k.trim() != key {
            return None;
        }
        let v = v.trim();
        (!v.is_empty()).then(|| v.to_string())
    })
}
