use std::path::PathBuf;

use crate::remote::RemoteError;
use crate::sink::SinkError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Bad or missing configuration. Raised before any network or database I/O.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("sheet '{sheet}' was not found")]
    SheetNotFound { sheet: String },

    #[error("column '{column}' has unsupported type '{remote_type}'")]
    UnsupportedType { column: String, remote_type: String },

    /// A mapped remote title occurs more than once in the sheet.
    #[error("column title '{title}' appears {count} times in the sheet; rename the duplicates")]
    DuplicateColumn { title: String, count: usize },

    #[error("no configured mapping matched a column of sheet '{sheet}'")]
    EmptySchema { sheet: String },

    #[error("table '{table}' already exists; use the replace policy to overwrite it")]
    TableExists { table: String },

    #[error("loading {rows} row(s) into table '{table}' failed")]
    LoadFailure {
        table: String,
        rows: usize,
        #[source]
        source: SinkError,
    },

    #[error("database '{path}' could not be opened")]
    Open {
        path: PathBuf,
        #[source]
        source: SinkError,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl SyncError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SyncError::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
