use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One entry of the script index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    /// Display name: the `// Name:` metadata, else the command.
    pub name: String,
    /// File name without its script extension.
    pub command: String,
    pub file_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    /// Name of the secondary kenv the script lives in; `None` for the main
    /// kenv.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kenv: Option<String>,
}

impl Script {
    pub fn new(command: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        let command = command.into();
        Self {
            name: command.clone(),
            command,
            file_path: file_path.into(),
            description: None,
            shortcut: None,
            kenv: None,
        }
    }

    /// Value of `field` as text, if set.
    pub fn get(&self, field: ScriptField) -> Option<String> {
        match field {
            ScriptField::Name => Some(self.name.clone()),
            ScriptField::Command => Some(self.command.clone()),
            ScriptField::FilePath => Some(self.file_path.display().to_string()),
            ScriptField::Description => self.description.clone(),
            ScriptField::Shortcut => self.shortcut.clone(),
            ScriptField::Kenv => self.kenv.clone(),
        }
    }
}

/// A script field that can be plucked into a [`Choice`] value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptField {
    Name,
    Command,
    FilePath,
    Description,
    Shortcut,
    Kenv,
}

/// Document stored at `<kit>/db/scripts.json`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptsDoc {
    pub scripts: Vec<Script>,
}

/// A script presented as a menu choice: every script field plus `value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(flatten)]
    pub script: Script,
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_and_skips_empty() {
        let s = Script::new("hello", "/k/scripts/hello.js");
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({"name": "hello", "command": "hello", "filePath": "/k/scripts/hello.js"})
        );
    }

    #[test]
    fn reads_index_written_elsewhere() {
        let s: Script = serde_json::from_value(json!({
            "name": "Hello World",
            "command": "hello-world",
            "filePath": "/k/scripts/hello-world.ts",
            "description": "says hi",
            "img": "ignored"
        }))
        .unwrap();
        assert_eq!(s.description.as_deref(), Some("says hi"));
        assert!(s.shortcut.is_none());
    }

    #[test]
    fn pluck_fields() {
        let mut s = Script::new("a", "/k/scripts/a.js");
        s.shortcut = Some("cmd a".into());
        assert_eq!(s.get(ScriptField::FilePath).as_deref(), Some("/k/scripts/a.js"));
        assert_eq!(s.get(ScriptField::Shortcut).as_deref(), Some("cmd a"));
        assert_eq!(s.get(ScriptField::Description), None);
    }

    #[test]
    fn choice_flattens_script() {
        let choice = Choice {
            script: Script::new("a", "/k/scripts/a.js"),
            value: Some("a".into()),
        };
        let v = serde_json::to_value(&choice).unwrap();
        assert_eq!(v["command"], json!("a"));
        assert_eq!(v["value"], json!("a"));
    }
}
