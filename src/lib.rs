pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod load;
pub mod pipeline;
pub mod remote;
pub mod resolve;
pub mod schema;
pub mod sink;
pub mod smartsheet;
pub mod snapshot;
pub mod table;
pub mod transform;
pub mod type_map;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, SourceArgs, SyncArgs},
    config::SyncConfig,
    remote::SheetSource,
    sink::SqliteSink,
    smartsheet::SmartsheetClient,
    snapshot::SnapshotSource,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_sync", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => handle_sync(&args),
        Commands::Columns(args) => handle_columns(&args),
        Commands::Sheets(args) => handle_sheets(&args),
    }
}

fn load_config(path: &std::path::Path) -> Result<SyncConfig> {
    let config =
        SyncConfig::load(path).with_context(|| format!("Loading configuration from {path:?}"))?;
    debug!(
        "Configuration for sheet '{}' with {} mapping(s)",
        config.sheet_name,
        config.mappings.len()
    );
    Ok(config)
}

fn open_source(args: &SourceArgs, config: &SyncConfig) -> Result<Box<dyn SheetSource>> {
    match &args.snapshot {
        Some(path) => {
            info!("Reading sheets from snapshot {path:?}");
            let source = SnapshotSource::load(path)
                .with_context(|| format!("Loading sheet snapshot {path:?}"))?;
            Ok(Box::new(source))
        }
        None => {
            let client = SmartsheetClient::new(&config.access_token, &config.api_base)
                .context("Creating Smartsheet client")?;
            Ok(Box::new(client))
        }
    }
}

fn handle_sync(args: &SyncArgs) -> Result<()> {
    let mut config = load_config(&args.source.config)?;
    if let Some(policy) = args.policy {
        config.load_policy = policy;
    }
    if let Some(db_file) = &args.db_file {
        config.db_file = db_file.clone();
    }
    let source = open_source(&args.source, &config)?;
    info!(
        "Syncing sheet '{}' into {:?} ({} policy)",
        config.sheet_name,
        config.db_file,
        config.load_policy.as_str()
    );
    let plan = pipeline::plan(&config, &source)
        .with_context(|| format!("Syncing sheet '{}'", config.sheet_name))?;
    let mut sink = SqliteSink::open(&config.db_file)
        .map_err(|source| error::SyncError::Open {
            path: config.db_file.clone(),
            source,
        })?;
    let report = pipeline::execute(plan, &mut sink, config.load_policy)
        .with_context(|| format!("Syncing sheet '{}'", config.sheet_name))?;
    if !report.unmatched.is_empty() {
        info!(
            "{} mapping(s) had no matching column: {}",
            report.unmatched.len(),
            report.unmatched.join(", ")
        );
    }
    info!(
        "Wrote {} row(s) across {} column(s) to table '{}'{}",
        report.rows_written,
        report.columns,
        report.table,
        if report.replaced_existing {
            " (replaced existing table)"
        } else {
            ""
        }
    );
    Ok(())
}

fn handle_columns(args: &SourceArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let source = open_source(args, &config)?;
    let plan = pipeline::plan(&config, &source)
        .with_context(|| format!("Resolving mappings for sheet '{}'", config.sheet_name))?;
    let headers = ["#", "sheet column", "remote type", "db column", "sql type"]
        .map(String::from)
        .to_vec();
    let rows = plan
        .matched
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.remote_name.clone(),
                column.remote_type.to_string(),
                column.local_name.clone(),
                column.sql_type.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    println!("table: {}", plan.schema.table_name);
    table::print_table(&headers, &rows);
    for name in &plan.unmatched {
        println!("unmatched: {name}");
    }
    Ok(())
}

fn handle_sheets(args: &SourceArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let source = open_source(args, &config)?;
    let sheets = source.list_sheets().context("Listing sheets")?;
    let headers = vec!["id".to_string(), "name".to_string()];
    let rows = sheets
        .iter()
        .map(|sheet| vec![sheet.id.to_string(), sheet.name.clone()])
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    info!("Listed {} sheet(s)", sheets.len());
    Ok(())
}
