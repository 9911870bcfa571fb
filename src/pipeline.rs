//! End-to-end sync. Callers must not run two syncs against one database file
//! at once.

use log::{info, warn};

use crate::{
    config::SyncConfig,
    error::{Result, SyncError},
    load::{LoadPolicy, LoadSummary, load},
    remote::{RemoteSheet, SheetSource, SheetSummary},
    resolve::{MatchedColumn, ResolveOptions, resolve},
    schema::{TableSchema, build_schema},
    sink::RelationalSink,
    transform::transform_rows,
};

/// Everything derived from the remote sheet before touching the database.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub sheet: RemoteSheet,
    pub matched: Vec<MatchedColumn>,
    pub unmatched: Vec<String>,
    pub schema: TableSchema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub sheet_name: String,
    pub table: String,
    pub columns: usize,
    pub rows_written: usize,
    pub policy: LoadPolicy,
    pub replaced_existing: bool,
    pub unmatched: Vec<String>,
}

pub fn find_sheet<S: SheetSource + ?Sized>(source: &S, sheet_name: &str) -> Result<SheetSummary> {
    let mut candidates = source
        .list_sheets()?
        .into_iter()
        .filter(|sheet| sheet.name == sheet_name)
        .collect::<Vec<_>>();
    match candidates.len() {
        0 => Err(SyncError::SheetNotFound {
            sheet: sheet_name.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => {
            let ids = candidates
                .iter()
                .map(|sheet| sheet.id.to_string())
                .collect::<Vec<_>>();
            Err(SyncError::config(format!(
                "sheet name '{sheet_name}' is shared by sheets {}",
                ids.join(", ")
            )))
        }
    }
}

pub fn plan<S: SheetSource + ?Sized>(config: &SyncConfig, source: &S) -> Result<SyncPlan> {
    config.validate()?;
    let summary = find_sheet(source, &config.sheet_name)?;
    let sheet = source.get_sheet(summary.id)?;
    info!(
        "Fetched sheet '{}' ({} column(s), {} row(s))",
        sheet.name,
        sheet.columns.len(),
        sheet.rows.len()
    );
    let resolution = resolve(
        &sheet.columns,
        &config.mappings,
        ResolveOptions {
            order: config.column_order,
            on_unmatched: config.on_unmatched,
        },
    )?;
    let schema = build_schema(&resolution.matched, &config.sheet_name)?;
    Ok(SyncPlan {
        sheet,
        matched: resolution.matched,
        unmatched: resolution.unmatched,
        schema,
    })
}

pub fn run_sync<S, K>(config: &SyncConfig, source: &S, sink: &mut K) -> Result<SyncReport>
where
    S: SheetSource + ?Sized,
    K: RelationalSink + ?Sized,
{
    let plan = plan(config, source)?;
    execute(plan, sink, config.load_policy)
}

/// Transforms the planned rows and loads them through `sink`.
pub fn execute<K: RelationalSink + ?Sized>(
    plan: SyncPlan,
    sink: &mut K,
    policy: LoadPolicy,
) -> Result<SyncReport> {
    let rows = transform_rows(&plan.sheet.rows, &plan.matched);
    if rows.is_empty() {
        warn!("Sheet '{}' has no rows", plan.sheet.name);
    }
    let LoadSummary {
        table,
        policy,
        rows_written,
        replaced_existing,
    } = load(&plan.schema, &rows, sink, policy)?;
    Ok(SyncReport {
        sheet_name: plan.sheet.name,
        table,
        columns: plan.schema.column_count(),
        rows_written,
        policy,
        replaced_existing,
        unmatched: plan.unmatched,
    })
}
