use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use serde::Deserialize;

use crate::remote::{
    RemoteError, RemoteResult, RemoteSheet, SheetId, SheetPayload, SheetSource, SheetSummary,
};

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Many(Vec<SheetPayload>),
    One(SheetPayload),
}

#[derive(Debug, Clone)]
pub struct SnapshotSource {
    sheets: Vec<RemoteSheet>,
}

impl SnapshotSource {
    /// Reads a single sheet or an array of sheets in the `GET /sheets/{id}` shape.
    pub fn load(path: &Path) -> RemoteResult<Self> {
        let file = File::open(path)?;
        let parsed: SnapshotFile = serde_json::from_reader(BufReader::new(file))?;
        Self::from_payloads(match parsed {
            SnapshotFile::Many(payloads) => payloads,
            SnapshotFile::One(payload) => vec![payload],
        })
    }

    pub fn from_sheets(sheets: Vec<RemoteSheet>) -> Self {
        Self { sheets }
    }

    /// Sheets without an `id` take their 1-based position, or the next free id.
    fn from_payloads(payloads: Vec<SheetPayload>) -> RemoteResult<Self> {
        let mut taken = HashSet::new();
        for payload in &payloads {
            if payload.id != 0 && !taken.insert(payload.id) {
                return Err(RemoteError::DuplicateSheetId(payload.id));
            }
        }
        let mut sheets = Vec::with_capacity(payloads.len());
        for (idx, payload) in payloads.into_iter().enumerate() {
            let mut sheet = payload.into_sheet();
            if sheet.id == 0 {
                let mut id = idx as SheetId + 1;
                while !taken.insert(id) {
                    id += 1;
                }
                sheet.id = id;
            }
            sheets.push(sheet);
        }
        Ok(Self { sheets })
    }
}

impl SheetSource for SnapshotSource {
    fn list_sheets(&self) -> RemoteResult<Vec<SheetSummary>> {
        Ok(self
            .sheets
            .iter()
            .map(|sheet| SheetSummary {
                id: sheet.id,
                name: sheet.name.clone(),
            })
            .collect())
    }

    fn get_sheet(&self, id: SheetId) -> RemoteResult<RemoteSheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.id == id)
            .cloned()
            .ok_or(RemoteError::UnknownSheet(id))
    }
}
