use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::load::LoadPolicy;

#[derive(Debug, Parser)]
#[command(author, version, about = "Sync a Smartsheet sheet into a SQLite table", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Pull the configured sheet and write it to the SQLite database
    Sync(SyncArgs),
    /// Show how configured mappings resolve against the sheet's columns
    Columns(SourceArgs),
    /// List the sheets visible to the configured access token
    Sheets(SourceArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Path to the YAML sync configuration (e.g. config.yml)
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,
    /// Read sheets from a JSON export instead of the Smartsheet API
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Override the configured load policy
    #[arg(long, value_enum)]
    pub policy: Option<LoadPolicy>,
    /// Override the configured database file
    #[arg(long = "db-file", value_name = "PATH")]
    pub db_file: Option<PathBuf>,
}
