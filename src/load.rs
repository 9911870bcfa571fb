//! Load executor. Both policies run in one begin/commit scope on the sink.

use clap::ValueEnum;
use log::{info, warn};
use serde::Deserialize;

use crate::{
    error::{Result, SyncError},
    schema::TableSchema,
    sink::{Ddl, RelationalSink, SinkError},
    transform::Row,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Create the table; fail if it already exists.
    #[default]
    Create,
    /// Drop any existing table, recreate it, and insert all rows.
    Replace,
}

impl LoadPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadPolicy::Create => "create",
            LoadPolicy::Replace => "replace",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub table: String,
    pub policy: LoadPolicy,
    pub rows_written: usize,
    /// Whether `replace` dropped a table that already existed.
    pub replaced_existing: bool,
}

enum Failure {
    Exists,
    Sink(SinkError),
}

impl From<SinkError> for Failure {
    fn from(err: SinkError) -> Self {
        Failure::Sink(err)
    }
}

pub fn load<S: RelationalSink + ?Sized>(
    schema: &TableSchema,
    rows: &[Row],
    sink: &mut S,
    policy: LoadPolicy,
) -> Result<LoadSummary> {
    let table = schema.table_name.as_str();
    let load_failure = |source: SinkError| SyncError::LoadFailure {
        table: table.to_string(),
        rows: rows.len(),
        source,
    };

    sink.begin().map_err(load_failure)?;
    match write_table(schema, rows, sink, policy) {
        Ok(replaced_existing) => {
            if let Err(err) = sink.commit() {
                rollback_quietly(sink, table);
                return Err(load_failure(err));
            }
            info!(
                "Loaded {} row(s) into '{}' ({} policy)",
                rows.len(),
                table,
                policy.as_str()
            );
            Ok(LoadSummary {
                table: table.to_string(),
                policy,
                rows_written: rows.len(),
                replaced_existing,
            })
        }
        Err(failure) => {
            rollback_quietly(sink, table);
            Err(match failure {
                Failure::Exists => SyncError::TableExists {
                    table: table.to_string(),
                },
                Failure::Sink(err) => load_failure(err),
            })
        }
    }
}

fn write_table<S: RelationalSink + ?Sized>(
    schema: &TableSchema,
    rows: &[Row],
    sink: &mut S,
    policy: LoadPolicy,
) -> std::result::Result<bool, Failure> {
    let table = schema.table_name.as_str();
    let exists = sink.table_exists(table)?;
    match policy {
        LoadPolicy::Create if exists => return Err(Failure::Exists),
        LoadPolicy::Create => {}
        LoadPolicy::Replace => sink.execute_ddl(Ddl::DropTable(table))?,
    }
    sink.execute_ddl(Ddl::CreateTable(schema))?;
    sink.bulk_insert(schema, rows)?;
    Ok(exists)
}

fn rollback_quietly<S: RelationalSink + ?Sized>(sink: &mut S, table: &str) {
    if let Err(err) = sink.rollback() {
        warn!("Rolling back load of '{table}' failed: {err}");
    }
}
