use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PathsError, PathsResult};

/// Environment variable naming the kit directory.
pub const KIT_VAR: &str = "KIT";
/// Environment variable naming the kenv directory.
pub const KENV_VAR: &str = "KENV";
/// Environment variable naming the script currently being run.
pub const SCRIPT_VAR: &str = "KIT_SCRIPT";

/// Host platform, used to pick platform-specific defaults such as the
/// main-menu shortcut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    #[default]
    Linux,
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Mac
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    pub fn is_mac(self) -> bool {
        self == Self::Mac
    }
}

/// Locations of the kit and kenv directories plus the active script.
///
/// This is the explicit replacement for process-wide globals: every store
/// and helper receives a `KitEnv` instead of reaching for ambient state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitEnv {
    pub kit_path: PathBuf,
    pub kenv_path: PathBuf,
    /// Script being executed, if the store is used from inside a script.
    #[serde(default)]
    pub script: Option<PathBuf>,
    #[serde(default = "Platform::current")]
    pub platform: Platform,
}

impl Default for KitEnv {
    fn default() -> Self {
        Self {
            kit_path: PathBuf::from(".kit"),
            kenv_path: PathBuf::from(".kenv"),
            script: None,
            platform: Platform::current(),
        }
    }
}

impl KitEnv {
    pub fn new(kit_path: impl Into<PathBuf>, kenv_path: impl Into<PathBuf>) -> Self {
        Self {
            kit_path: kit_path.into(),
            kenv_path: kenv_path.into(),
            ..Self::default()
        }
    }

    /// Build from the process environment.
    ///
    /// `KIT` and `KENV` win when set; otherwise `$HOME/.kit` and
    /// `$HOME/.kenv` are used. `KIT_SCRIPT` sets the active script.
    pub fn from_env() -> PathsResult<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> PathsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = lookup("HOME").map(PathBuf::from);

        let kit_path = match lookup(KIT_VAR) {
            Some(p) => PathBuf::from(p),
            None => home.as_ref().map(|h| h.join(".kit")).ok_or(PathsError::NoHome("kit"))?,
        };
        let kenv_path = match lookup(KENV_VAR) {
            Some(p) => PathBuf::from(p),
            None => home.as_ref().map(|h| h.join(".kenv")).ok_or(PathsError::NoHome("kenv"))?,
        };
        let script = lookup(SCRIPT_VAR).filter(|s| !s.is_empty()).map(PathBuf::from);

        debug!(kit = %kit_path.display(), kenv = %kenv_path.display(), "environment resolved");

        Ok(Self {
            kit_path,
            kenv_path,
            script,
            platform: Platform::current(),
        })
    }

    pub fn from_toml_str(s: &str) -> PathsResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: &Path) -> PathsResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PathsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_kit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.kit_path = path.into();
        self
    }

    pub fn with_kenv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.kenv_path = path.into();
        self
    }

    /// Set the active script. Bare keys then resolve next to that script's
    /// environment instead of the configured kenv.
    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script = Some(script.into());
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn explicit_vars_win() {
        let env = KitEnv::from_vars(vars(&[
            ("HOME", "/home/u"),
            ("KIT", "/opt/kit"),
            ("KENV", "/work/kenv"),
        ]))
        .unwrap();
        assert_eq!(env.kit_path, PathBuf::from("/opt/kit"));
        assert_eq!(env.kenv_path, PathBuf::from("/work/kenv"));
        assert!(env.script.is_none());
    }

    #[test]
    fn home_fallback() {
        let env = KitEnv::from_vars(vars(&[("HOME", "/home/u")])).unwrap();
        assert_eq!(env.kit_path, PathBuf::from("/home/u/.kit"));
        assert_eq!(env.kenv_path, PathBuf::from("/home/u/.kenv"));
    }

    #[test]
    fn missing_home_is_an_error() {
        let err = KitEnv::from_vars(vars(&[("KENV", "/k")])).unwrap_err();
        assert!(matches!(err, PathsError::NoHome("kit")));
    }

    #[test]
    fn script_var_sets_context() {
        let env = KitEnv::from_vars(vars(&[
            ("HOME", "/home/u"),
            ("KIT_SCRIPT", "/home/u/.kenv/scripts/hello.js"),
        ]))
        .unwrap();
        assert_eq!(env.script, Some(PathBuf::from("/home/u/.kenv/scripts/hello.js")));
    }

    #[test]
    fn empty_script_var_ignored() {
        let env = KitEnv::from_vars(vars(&[("HOME", "/h"), ("KIT_SCRIPT", "")])).unwrap();
        assert!(env.script.is_none());
    }

    #[test]
    fn toml_config() {
        let env = KitEnv::from_toml_str(
            r#"
            kit_path = "/opt/kit"
            kenv_path = "/opt/kenv"
            platform = "mac"
            "#,
        )
        .unwrap();
        assert_eq!(env.kit_path, PathBuf::from("/opt/kit"));
        assert_eq!(env.platform, Platform::Mac);
        assert!(env.script.is_none());
    }

    #[test]
    fn toml_missing_field_rejected() {
        let err = KitEnv::from_toml_str("kit_path = \"/x\"").unwrap_err();
        assert!(matches!(err, PathsError::Toml(_)));
    }

    #[test]
    fn toml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kit.toml");
        std::fs::write(&path, "kit_path = \"/a\"\nkenv_path = \"/b\"\n").unwrap();
        let env = KitEnv::from_toml_file(&path).unwrap();
        assert_eq!(env.kenv_path, PathBuf::from("/b"));

        let missing = KitEnv::from_toml_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, PathsError::Io { .. }));
    }

    #[test]
    fn builder() {
        let env = KitEnv::new("/k", "/e")
            .with_script("/e/scripts/a.ts")
            .with_platform(Platform::Windows);
        assert_eq!(env.script, Some(PathBuf::from("/e/scripts/a.ts")));
        assert!(!env.platform.is_mac());
    }
}
