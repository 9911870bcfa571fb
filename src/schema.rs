use crate::{
    error::{Result, SyncError},
    resolve::MatchedColumn,
    type_map::SqlType,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub name: String,
    pub sql_type: SqlType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<TableColumn>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Sheet name with surrounding whitespace removed and each inner whitespace
/// run replaced by a single underscore.
pub fn table_name(sheet_name: &str) -> String {
    sheet_name.split_whitespace().collect::<Vec<_>>().join("_")
}

pub fn build_schema(matched: &[MatchedColumn], sheet_name: &str) -> Result<TableSchema> {
    if matched.is_empty() {
        return Err(SyncError::EmptySchema {
            sheet: sheet_name.to_string(),
        });
    }
    let table_name = table_name(sheet_name);
    if table_name.is_empty() {
        return Err(SyncError::config(format!(
            "sheet name {sheet_name:?} does not yield a table name"
        )));
    }
    let columns = matched
        .iter()
        .map(|column| TableColumn {
            name: column.local_name.clone(),
            sql_type: column.sql_type,
        })
        .collect();
    Ok(TableSchema {
        table_name,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_map::RemoteType;

    fn matched(local: &str, sql_type: SqlType) -> MatchedColumn {
        MatchedColumn {
            remote_name: local.to_uppercase(),
            local_name: local.to_string(),
            remote_type: RemoteType::TextNumber,
            sql_type,
        }
    }

    #[test]
    fn whitespace_runs_collapse_to_one_underscore() {
        assert_eq!(table_name("Q1  Report"), "Q1_Report");
        assert_eq!(table_name(" Team\tTasks \n2024 "), "Team_Tasks_2024");
        assert_eq!(table_name("Plain"), "Plain");
    }

    #[test]
    fn schema_preserves_matched_order_and_types() {
        let schema = build_schema(
            &[
                matched("full_name", SqlType::Text),
                matched("due_date", SqlType::Numeric),
            ],
            "Q1 Report",
        )
        .unwrap();
        assert_eq!(schema.table_name, "Q1_Report");
        assert_eq!(schema.column_names(), vec!["full_name", "due_date"]);
        assert_eq!(schema.columns[1].sql_type, SqlType::Numeric);
    }

    #[test]
    fn empty_matches_never_produce_a_schema() {
        let err = build_schema(&[], "Q1 Report").expect_err("empty schema");
        assert!(matches!(err, SyncError::EmptySchema { ref sheet } if sheet == "Q1 Report"));
    }

    #[test]
    fn blank_sheet_name_is_rejected() {
        let err = build_schema(&[matched("a", SqlType::Text)], "   ").expect_err("blank");
        assert!(matches!(err, SyncError::Config(_)));
    }
}
