//! Relational sink the load executor writes through. SQL text is only
//! assembled here, with every identifier passed through [`quote_identifier()`].

use std::path::Path;

use log::debug;
use rusqlite::{
    Connection, ToSql,
    types::{ToSqlOutput, Value as SqlValue, ValueRef},
};

use crate::{data::Value, schema::TableSchema, transform::Row};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid SQL identifier {0:?}")]
    InvalidIdentifier(String),

    #[error("row {row} has {found} field(s) but table '{table}' has {expected} column(s)")]
    RowWidth {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },
}

pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Schema statements the loader may issue.
#[derive(Debug, Clone, Copy)]
pub enum Ddl<'a> {
    CreateTable(&'a TableSchema),
    DropTable(&'a str),
}

pub trait RelationalSink {
    fn table_exists(&mut self, table: &str) -> SinkResult<bool>;
    fn execute_ddl(&mut self, statement: Ddl<'_>) -> SinkResult<()>;
    /// Inserts `rows` into `schema.table_name`, returning the count written.
    fn bulk_insert(&mut self, schema: &TableSchema, rows: &[Row]) -> SinkResult<usize>;
    fn begin(&mut self) -> SinkResult<()>;
    fn commit(&mut self) -> SinkResult<()>;
    fn rollback(&mut self) -> SinkResult<()>;
}

/// Wraps `name` in double quotes, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> SinkResult<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(SinkError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

pub fn render_ddl(statement: Ddl<'_>) -> SinkResult<String> {
    match statement {
        Ddl::CreateTable(schema) => {
            let columns = schema
                .columns
                .iter()
                .map(|column| -> SinkResult<String> {
                    Ok(format!("{} {}", quote_identifier(&column.name)?, column.sql_type))
                })
                .collect::<SinkResult<Vec<_>>>()?;
            Ok(format!(
                "CREATE TABLE {} ({})",
                quote_identifier(&schema.table_name)?,
                columns.join(", ")
            ))
        }
        Ddl::DropTable(table) => Ok(format!("DROP TABLE IF EXISTS {}", quote_identifier(table)?)),
    }
}

fn render_insert(schema: &TableSchema) -> SinkResult<String> {
    let columns = schema
        .columns
        .iter()
        .map(|column| quote_identifier(&column.name))
        .collect::<SinkResult<Vec<_>>>()?;
    let placeholders = (1..=columns.len())
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>();
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(&schema.table_name)?,
        columns.join(", "),
        placeholders.join(", ")
    ))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// `SQLite` sink over one exclusively owned connection.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens or creates the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> SinkResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> SinkResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RelationalSink for SqliteSink {
    fn table_exists(&mut self, table: &str) -> SinkResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn execute_ddl(&mut self, statement: Ddl<'_>) -> SinkResult<()> {
        let sql = render_ddl(statement)?;
        debug!("{sql}");
        self.conn.execute_batch(&sql)?;
        Ok(())
    }

    fn bulk_insert(&mut self, schema: &TableSchema, rows: &[Row]) -> SinkResult<usize> {
        let sql = render_insert(schema)?;
        let mut stmt = self.conn.prepare_cached(&sql)?;
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != schema.column_count() {
                return Err(SinkError::RowWidth {
                    table: schema.table_name.clone(),
                    row: idx + 1,
                    expected: schema.column_count(),
                    found: row.len(),
                });
            }
            stmt.execute(rusqlite::params_from_iter(row.values()))?;
        }
        Ok(rows.len())
    }

    fn begin(&mut self) -> SinkResult<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> SinkResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> SinkResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}
