use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use kit_db::{Db, DbOptions, Store};
use kit_paths::KitEnv;
use kit_scripts::{DirScriptSource, KitStores, Script, Scripts};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let env = build_env(&cli)?;
    debug!(kit = %env.kit_path.display(), kenv = %env.kenv_path.display(), "environment");
    let db = Db::new(env);
    let format = cli.format;

    match cli.command {
        Command::Show(args) => cmd_show(&db, args, format).await,
        Command::Get(args) => cmd_get(&db, args, format).await,
        Command::Set(args) => cmd_set(&db, args, format).await,
        Command::Scripts(args) => cmd_scripts(&db, args, format).await,
        Command::Find(args) => cmd_find(&db, args, format).await,
        Command::Kenvs => cmd_kenvs(&db, format).await,
    }
}

fn build_env(cli: &Cli) -> anyhow::Result<KitEnv> {
    let mut env = match &cli.config {
        Some(path) => KitEnv::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => KitEnv::from_env()?,
    };
    if let Some(kit) = &cli.kit {
        env = env.with_kit_path(kit);
    }
    if let Some(kenv) = &cli.kenv {
        env = env.with_kenv_path(kenv);
    }
    if let Some(script) = &cli.script {
        env = env.with_script(script);
    }
    Ok(env)
}

/// Read a store without creating it.
async fn peek(db: &Db, key: Option<&str>) -> anyhow::Result<(std::path::PathBuf, Option<Value>)> {
    let path = db.resolve(key)?;
    let mut store = Store::<Value>::json_file(&path);
    store.read().await?;
    Ok((path, store.take_data()))
}

async fn cmd_show(db: &Db, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (path, doc) = peek(db, args.key.as_deref()).await?;
    match (doc, format) {
        (Some(doc), _) => print_json(&doc)?,
        (None, OutputFormat::Json) => println!("null"),
        (None, OutputFormat::Text) => missing(&path),
    }
    Ok(())
}

async fn cmd_get(db: &Db, args: GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (path, doc) = peek(db, Some(&args.key)).await?;
    let Some(doc) = doc else {
        if format == OutputFormat::Text {
            missing(&path);
        } else {
            println!("null");
        }
        return Ok(());
    };

    match doc.get(&args.field) {
        Some(value) => print_json(value)?,
        None if format == OutputFormat::Json => println!("null"),
        None => println!("{} has no field {}", args.key.bold(), args.field.yellow()),
    }
    Ok(())
}

async fn cmd_set(db: &Db, args: SetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let value = parse_value(&args.value);
    let mut handle = db.load::<Map<String, Value>>(DbOptions::new(&args.key)).await?;

    if !handle.set_field(&args.field, &value) {
        bail!("store {} has no document to update", args.key);
    }
    handle.write().await?;

    if handle.is_degraded() {
        warn!(key = %args.key, "store directory missing; change not persisted");
    }
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "key": args.key,
            "field": args.field,
            "value": value,
            "persisted": !handle.is_degraded(),
        }))?,
        OutputFormat::Text if handle.is_degraded() => {
            println!("{} {} not persisted", "!".yellow().bold(), args.key.bold())
        }
        OutputFormat::Text => println!(
            "{} {}.{} = {}",
            "✓".green().bold(),
            args.key.bold(),
            args.field,
            value.to_string().cyan()
        ),
    }
    Ok(())
}

async fn cmd_scripts(db: &Db, args: ScriptsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let scripts = script_index(db).scripts(!args.refresh).await?;
    match format {
        OutputFormat::Json => print_json(&scripts)?,
        OutputFormat::Text if scripts.is_empty() => println!("No scripts."),
        OutputFormat::Text => scripts.iter().for_each(print_script),
    }
    Ok(())
}

async fn cmd_find(db: &Db, args: FindArgs, format: OutputFormat) -> anyhow::Result<()> {
    let script = script_index(db).script_from_string(&args.input).await?;
    match format {
        OutputFormat::Json => print_json(&script)?,
        OutputFormat::Text => {
            print_script(&script);
            println!("  {}", script.file_path.display());
        }
    }
    Ok(())
}

async fn cmd_kenvs(db: &Db, format: OutputFormat) -> anyhow::Result<()> {
    let kenvs = KitStores::new(db.clone()).kenvs().await?;
    match format {
        OutputFormat::Json => print_json(&kenvs)?,
        OutputFormat::Text if kenvs.is_empty() => println!("No kenvs."),
        OutputFormat::Text => {
            for kenv in &kenvs {
                println!("{}  {}", kenv.name.yellow(), kenv.value.dimmed());
            }
        }
    }
    Ok(())
}

fn script_index(db: &Db) -> Scripts {
    Scripts::new(db.clone(), DirScriptSource::for_env(db.env()))
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_script(script: &Script) {
    let mut line = format!("{}  {}", script.name.bold(), script.command.dimmed());
    if let Some(shortcut) = &script.shortcut {
        line.push_str(&format!("  [{}]", shortcut.cyan()));
    }
    if let Some(description) = &script.description {
        line.push_str(&format!("  {description}"));
    }
    println!("{line}");
}

fn missing(path: &Path) {
    println!("No store at {}", path.display().to_string().dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kit-db").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn raw_values_fall_back_to_strings() {
        assert_eq!(parse_value("3"), serde_json::json!(3));
        assert_eq!(parse_value("{\"a\":true}"), serde_json::json!({"a": true}));
        assert_eq!(parse_value("dark"), serde_json::json!("dark"));
    }

    #[test]
    fn env_from_config_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("kit.toml");
        std::fs::write(&config, "kit_path = \"/opt/kit\"\nkenv_path = \"/opt/kenv\"\n").unwrap();

        let config_arg = config.display().to_string();
        let env = build_env(&cli(&["--config", &config_arg, "--kenv", "/other", "kenvs"])).unwrap();
        assert_eq!(env.kit_path, Path::new("/opt/kit"));
        assert_eq!(env.kenv_path, Path::new("/other"));
        assert!(env.script.is_none());
    }

    #[tokio::test]
    async fn set_creates_and_updates_store() {
        let dir = tempfile::tempdir().unwrap();
        let kenv = dir.path().join("kenv");
        std::fs::create_dir_all(kenv.join("db")).unwrap();
        let db = Db::new(KitEnv::new(dir.path().join("kit"), &kenv));

        let set = |field: &str, value: &str| SetArgs {
            key: "prefs".into(),
            field: field.into(),
            value: value.into(),
        };
        cmd_set(&db, set("zoom", "3"), OutputFormat::Text).await.unwrap();
        cmd_set(&db, set("theme", "dark"), OutputFormat::Json).await.unwrap();

        let (_, doc) = peek(&db, Some("prefs")).await.unwrap();
        assert_eq!(doc, Some(serde_json::json!({"zoom": 3, "theme": "dark"})));
    }

    #[tokio::test]
    async fn show_does_not_create_store() {
        let dir = tempfile::tempdir().unwrap();
        let kenv = dir.path().join("kenv");
        std::fs::create_dir_all(kenv.join("db")).unwrap();
        let db = Db::new(KitEnv::new(dir.path().join("kit"), &kenv));

        let args = ShowArgs { key: Some("nothing".into()) };
        cmd_show(&db, args, OutputFormat::Text).await.unwrap();
        assert!(!kenv.join("db").join("nothing.json").exists());
    }

    #[tokio::test]
    async fn find_reports_missing_script() {
        let dir = tempfile::tempdir().unwrap();
        let kit = dir.path().join("kit");
        std::fs::create_dir_all(kit.join("db")).unwrap();
        let db = Db::new(KitEnv::new(&kit, dir.path().join("kenv")));

        let err = cmd_find(&db, FindArgs { input: "ghost".into() }, OutputFormat::Text)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn find_from_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let kit = dir.path().join("kit");
        let kenv = dir.path().join("kenv");
        std::fs::create_dir_all(kit.join("db")).unwrap();
        std::fs::create_dir_all(kenv.join("scripts")).unwrap();
        std::fs::write(kenv.join("scripts").join("greet.js"), "// Name: Greet\n").unwrap();
        let config = dir.path().join("kit.toml");
        std::fs::write(
            &config,
            format!("kit_path = {:?}\nkenv_path = {:?}\n", kit.display().to_string(), kenv.display().to_string()),
        )
        .unwrap();
        let config_arg = config.display().to_string();

        run_command(cli(&["--config", &config_arg, "find", "greet"])).await.unwrap();
        let err = run_command(cli(&["--config", &config_arg, "find", "ghost", "--format", "json"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
        assert!(kit.join("db").join("scripts.json").exists());
    }
}
