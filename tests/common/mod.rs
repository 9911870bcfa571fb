#![allow(dead_code)]

use std::cell::Cell;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value as JsonValue, json};
use sheet_sync::remote::{
    RawRow, RemoteColumn, RemoteResult, RemoteSheet, SheetId, SheetSource, SheetSummary,
};
use sheet_sync::snapshot::SnapshotSource;
use sheet_sync::type_map::RemoteType;
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn raw_row(pairs: &[(&str, JsonValue)]) -> RawRow {
    pairs
        .iter()
        .map(|(title, value)| (title.to_string(), value.clone()))
        .collect()
}

/// Two mapped columns plus an unmapped "Notes" column.
pub fn report_sheet() -> RemoteSheet {
    RemoteSheet {
        id: 100,
        name: "Q1  Report".into(),
        columns: vec![
            RemoteColumn::new("Full Name", RemoteType::TextNumber),
            RemoteColumn::new("Due Date", RemoteType::Date),
            RemoteColumn::new("Notes", RemoteType::TextNumber),
        ],
        rows: vec![raw_row(&[
            ("Full Name", json!("Alice")),
            ("Due Date", json!("2024-01-01")),
            ("Notes", json!("x")),
        ])],
    }
}

/// One column of every supported remote type.
pub fn every_type_sheet() -> RemoteSheet {
    RemoteSheet {
        id: 200,
        name: "All Types".into(),
        columns: vec![
            RemoteColumn::new("Started", RemoteType::AbstractDatetime),
            RemoteColumn::new("Done", RemoteType::Checkbox),
            RemoteColumn::new("Owner", RemoteType::ContactList),
            RemoteColumn::new("Due", RemoteType::Date),
            RemoteColumn::new("Effort", RemoteType::Duration),
            RemoteColumn::new("Status", RemoteType::Picklist),
            RemoteColumn::new("Depends", RemoteType::Predecessor),
            RemoteColumn::new("Title", RemoteType::TextNumber),
        ],
        rows: vec![
            raw_row(&[
                ("Started", json!("2024-03-01T09:30:00Z")),
                ("Done", json!(true)),
                ("Owner", json!("alice@example.com")),
                ("Due", json!("2024-03-15")),
                ("Effort", json!("3d")),
                ("Status", json!("In Progress")),
                ("Depends", json!("2FS")),
                ("Title", json!("Write report")),
            ]),
            raw_row(&[("Done", json!(false)), ("Title", json!(42))]),
        ],
    }
}

/// In-memory source that counts sheet fetches.
pub struct FixedSource {
    inner: SnapshotSource,
    pub fetches: Cell<usize>,
}

impl FixedSource {
    pub fn new(sheets: Vec<RemoteSheet>) -> Self {
        Self {
            inner: SnapshotSource::from_sheets(sheets),
            fetches: Cell::new(0),
        }
    }
}

impl SheetSource for FixedSource {
    fn list_sheets(&self) -> RemoteResult<Vec<SheetSummary>> {
        self.inner.list_sheets()
    }

    fn get_sheet(&self, id: SheetId) -> RemoteResult<RemoteSheet> {
        self.fetches.set(self.fetches.get() + 1);
        self.inner.get_sheet(id)
    }
}
