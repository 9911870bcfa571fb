use std::collections::BTreeMap;

use serde::Deserialize;

use crate::type_map::RemoteType;

pub type SheetId = i64;

/// One fetched record keyed by remote column title.
pub type RawRow = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SheetSummary {
    pub id: SheetId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteColumn {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub column_type: RemoteType,
}

impl RemoteColumn {
    pub fn new(title: impl Into<String>, column_type: RemoteType) -> Self {
        Self {
            id: 0,
            title: title.into(),
            column_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSheet {
    pub id: SheetId,
    pub name: String,
    pub columns: Vec<RemoteColumn>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("reading sheet snapshot failed")]
    Io(#[from] std::io::Error),

    #[error("decoding sheet payload failed")]
    Json(#[from] serde_json::Error),

    #[error("sheet {0} is not available from this source")]
    UnknownSheet(SheetId),

    #[error("sheet id {0} appears more than once in the snapshot")]
    DuplicateSheetId(SheetId),
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

pub trait SheetSource {
    fn list_sheets(&self) -> RemoteResult<Vec<SheetSummary>>;
    fn get_sheet(&self, id: SheetId) -> RemoteResult<RemoteSheet>;
}

impl<S: SheetSource + ?Sized> SheetSource for &S {
    fn list_sheets(&self) -> RemoteResult<Vec<SheetSummary>> {
        (**self).list_sheets()
    }

    fn get_sheet(&self, id: SheetId) -> RemoteResult<RemoteSheet> {
        (**self).get_sheet(id)
    }
}

impl<S: SheetSource + ?Sized> SheetSource for Box<S> {
    fn list_sheets(&self) -> RemoteResult<Vec<SheetSummary>> {
        (**self).list_sheets()
    }

    fn get_sheet(&self, id: SheetId) -> RemoteResult<RemoteSheet> {
        (**self).get_sheet(id)
    }
}

/// Wire shape of `GET /sheets/{id}`, shared by the HTTP client and snapshots.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SheetPayload {
    #[serde(default)]
    pub id: SheetId,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<RemoteColumn>,
    #[serde(default)]
    pub rows: Vec<RowPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RowPayload {
    #[serde(default)]
    pub cells: Vec<CellPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CellPayload {
    pub column_id: i64,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl SheetPayload {
    /// Re-keys cells from column ids to column titles.
    ///
    /// Cells without a value are left out of the row, which the row
    /// transformer treats the same as a missing field. When two columns share
    /// a title the first cell wins here; the resolver rejects such titles
    /// before any row is read.
    pub(crate) fn into_sheet(self) -> RemoteSheet {
        let titles: BTreeMap<i64, &str> = self
            .columns
            .iter()
            .map(|column| (column.id, column.title.as_str()))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut raw = RawRow::new();
                for cell in &row.cells {
                    let (Some(title), Some(value)) = (titles.get(&cell.column_id), &cell.value)
                    else {
                        continue;
                    };
                    raw.entry((*title).to_string())
                        .or_insert_with(|| value.clone());
                }
                raw
            })
            .collect();
        RemoteSheet {
            id: self.id,
            name: self.name,
            columns: self.columns,
            rows,
        }
    }
}
