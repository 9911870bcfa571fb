//! YAML sync configuration.
//!
//! A configuration names the sheet to pull, the SQLite file to write, and the
//! ordered column mappings. Loading validates everything it can before the
//! caller touches the network or the database:
//!
//! ```yaml
//! access_token: abc123
//! sheet_name: Q1 Report
//! db_file: reports.db
//! load_policy: replace        # create (default) | replace
//! column_order: mapping       # mapping (default) | alphabetical
//! on_unmatched: warn          # drop (default) | warn | error
//! mappings:
//!   - ss_col_name: Full Name
//!     db_col_name: full_name
//!   - ss_col_name: Due Date   # db_col_name defaults to due_date
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use heck::ToSnakeCase;
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    error::{Result, SyncError},
    load::LoadPolicy,
    resolve::{ColumnOrder, UnmatchedPolicy},
    smartsheet::DEFAULT_API_BASE,
};

const CONFIG_EXTENSIONS: &[&str] = &["yml", "yaml"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub remote_name: String,
    pub local_name: String,
}

impl ColumnMapping {
    pub fn new(remote_name: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            remote_name: remote_name.into(),
            local_name: local_name.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingEntry {
    #[serde(alias = "remote_name")]
    ss_col_name: String,
    #[serde(default, alias = "local_name")]
    db_col_name: Option<String>,
}

impl MappingEntry {
    fn into_mapping(self) -> ColumnMapping {
        let local_name = match self.db_col_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.ss_col_name.to_snake_case(),
        };
        ColumnMapping {
            remote_name: self.ss_col_name,
            local_name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    sheet_name: Option<String>,
    #[serde(default)]
    db_file: Option<PathBuf>,
    #[serde(default)]
    mappings: Vec<MappingEntry>,
    #[serde(default)]
    load_policy: LoadPolicy,
    #[serde(default)]
    column_order: ColumnOrder,
    #[serde(default)]
    on_unmatched: UnmatchedPolicy,
    #[serde(default)]
    api_base: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub access_token: String,
    pub sheet_name: String,
    pub db_file: PathBuf,
    pub mappings: Vec<ColumnMapping>,
    pub load_policy: LoadPolicy,
    pub column_order: ColumnOrder,
    pub on_unmatched: UnmatchedPolicy,
    pub api_base: String,
}

impl SyncConfig {
    pub fn new(
        access_token: impl Into<String>,
        sheet_name: impl Into<String>,
        db_file: impl Into<PathBuf>,
        mappings: Vec<ColumnMapping>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            sheet_name: sheet_name.into(),
            db_file: db_file.into(),
            mappings,
            load_policy: LoadPolicy::default(),
            column_order: ColumnOrder::default(),
            on_unmatched: UnmatchedPolicy::default(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(SyncError::config("missing path to configuration file"));
        }
        if !path.is_file() {
            return Err(SyncError::config(format!(
                "configuration file {path:?} does not exist"
            )));
        }
        let has_yaml_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                CONFIG_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            });
        if !has_yaml_extension {
            return Err(SyncError::config(format!(
                "configuration file {path:?} must have a .yml or .yaml extension"
            )));
        }
        let contents = fs::read_to_string(path).map_err(|err| {
            SyncError::config(format!("reading configuration file {path:?}: {err}"))
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(contents)
            .map_err(|err| SyncError::config(format!("parsing configuration YAML: {err}")))?;
        let config = SyncConfig {
            access_token: required(raw.access_token, "access_token")?,
            sheet_name: required(raw.sheet_name, "sheet_name")?,
            db_file: raw
                .db_file
                .filter(|path| !path.as_os_str().is_empty())
                .ok_or_else(|| SyncError::config("db_file is required"))?,
            mappings: raw
                .mappings
                .into_iter()
                .map(MappingEntry::into_mapping)
                .collect(),
            load_policy: raw.load_policy,
            column_order: raw.column_order,
            on_unmatched: raw.on_unmatched,
            api_base: raw
                .api_base
                .filter(|base| !base.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the resolver and loader rely on.
    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(SyncError::config("access_token is required"));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(SyncError::config("sheet_name is required"));
        }
        if self.db_file.as_os_str().is_empty() {
            return Err(SyncError::config("db_file is required"));
        }
        if self.mappings.is_empty() {
            return Err(SyncError::config("mappings must list at least one column"));
        }
        if let Some(mapping) = self.mappings.iter().find(|m| m.remote_name.is_empty()) {
            return Err(SyncError::config(format!(
                "mapping to '{}' has an empty ss_col_name",
                mapping.local_name
            )));
        }
        if let Some(mapping) = self.mappings.iter().find(|m| m.local_name.is_empty()) {
            return Err(SyncError::config(format!(
                "mapping for '{}' has no usable db_col_name",
                mapping.remote_name
            )));
        }
        let duplicate_remote = self
            .mappings
            .iter()
            .map(|m| m.remote_name.as_str())
            .duplicates()
            .collect::<Vec<_>>();
        if !duplicate_remote.is_empty() {
            return Err(SyncError::config(format!(
                "ss_col_name must be unique; repeated: {}",
                duplicate_remote.join(", ")
            )));
        }
        let duplicate_local = self
            .mappings
            .iter()
            .map(|m| m.local_name.to_ascii_lowercase())
            .duplicates()
            .collect::<Vec<_>>();
        if !duplicate_local.is_empty() {
            return Err(SyncError::config(format!(
                "db_col_name must be unique (case-insensitive); repeated: {}",
                duplicate_local.join(", ")
            )));
        }
        Ok(())
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SyncError::config(format!("{field} is required")))
}
