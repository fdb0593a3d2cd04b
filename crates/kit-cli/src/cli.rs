use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "kit-db",
    about = "Inspect and edit kit JSON stores",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Environment file (TOML) with kit_path, kenv_path and script
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the kit directory
    #[arg(long, global = true)]
    pub kit: Option<PathBuf>,

    /// Override the kenv directory
    #[arg(long, global = true)]
    pub kenv: Option<PathBuf>,

    /// Act as if running this script (sets the default key and root)
    #[arg(long, global = true)]
    pub script: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a store's document
    Show(ShowArgs),
    /// Print one top-level field of a store
    Get(GetArgs),
    /// Set one top-level field of a store, creating the store if needed
    Set(SetArgs),
    /// List indexed scripts
    Scripts(ScriptsArgs),
    /// Find a script by name, command or absolute path
    Find(FindArgs),
    /// List secondary kenvs recorded in app.json
    Kenvs,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Store key; defaults to `_<command>` of --script
    pub key: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
    pub field: String,
}

#[derive(Args)]
pub struct SetArgs {
    pub key: String,
    pub field: String,
    /// JSON value; anything that does not parse is stored as a string
    pub value: String,
}

#[derive(Args)]
pub struct ScriptsArgs {
    /// Rescan the scripts directory before listing
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args)]
pub struct FindArgs {
    /// Script name, command, or absolute path
    pub input: String,
}
