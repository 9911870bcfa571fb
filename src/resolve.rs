use std::collections::HashMap;

use log::{debug, warn};
use serde::Deserialize;

use crate::{
    config::ColumnMapping,
    error::{Result, SyncError},
    remote::RemoteColumn,
    type_map::{RemoteType, SqlType, map_type},
};

/// Order of matched columns in the table and in every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnOrder {
    /// The order mappings are declared in the configuration.
    #[default]
    Mapping,
    /// Sorted by remote column name.
    Alphabetical,
}

/// What to do with a mapping whose remote column is absent from the sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    #[default]
    Drop,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub order: ColumnOrder,
    pub on_unmatched: UnmatchedPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedColumn {
    pub remote_name: String,
    pub local_name: String,
    pub remote_type: RemoteType,
    pub sql_type: SqlType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub matched: Vec<MatchedColumn>,
    /// Remote names of mappings that matched no column, in mapping order.
    pub unmatched: Vec<String>,
}

pub fn resolve(
    remote_columns: &[RemoteColumn],
    mappings: &[ColumnMapping],
    options: ResolveOptions,
) -> Result<Resolution> {
    let mut by_title: HashMap<&str, (&RemoteColumn, usize)> = HashMap::new();
    for column in remote_columns {
        by_title
            .entry(column.title.as_str())
            .and_modify(|(_, count)| *count += 1)
            .or_insert((column, 1));
    }

    let mut ordered: Vec<&ColumnMapping> = mappings.iter().collect();
    if options.order == ColumnOrder::Alphabetical {
        ordered.sort_by(|a, b| a.remote_name.cmp(&b.remote_name));
    }

    let mut resolution = Resolution::default();
    for mapping in ordered {
        let Some(&(column, count)) = by_title.get(mapping.remote_name.as_str()) else {
            resolution.unmatched.push(mapping.remote_name.clone());
            continue;
        };
        if count > 1 {
            return Err(SyncError::DuplicateColumn {
                title: mapping.remote_name.clone(),
                count,
            });
        }
        let sql_type =
            map_type(&column.column_type).map_err(|err| SyncError::UnsupportedType {
                column: column.title.clone(),
                remote_type: err.0,
            })?;
        resolution.matched.push(MatchedColumn {
            remote_name: column.title.clone(),
            local_name: mapping.local_name.clone(),
            remote_type: column.column_type.clone(),
            sql_type,
        });
    }

    if !resolution.unmatched.is_empty() {
        let names = resolution.unmatched.join(", ");
        match options.on_unmatched {
            UnmatchedPolicy::Drop => debug!("Dropping unmatched mapping(s): {names}"),
            UnmatchedPolicy::Warn => warn!("Mapping(s) matched no sheet column: {names}"),
            UnmatchedPolicy::Error => {
                return Err(SyncError::config(format!(
                    "mapping(s) matched no sheet column: {names}"
                )));
            }
        }
    }
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<RemoteColumn> {
        vec![
            RemoteColumn::new("Notes", RemoteType::TextNumber),
            RemoteColumn::new("Due Date", RemoteType::Date),
            RemoteColumn::new("Full Name", RemoteType::TextNumber),
        ]
    }

    fn mappings() -> Vec<ColumnMapping> {
        vec![
            ColumnMapping::new("Full Name", "full_name"),
            ColumnMapping::new("Due Date", "due_date"),
        ]
    }

    fn local_names(resolution: &Resolution) -> Vec<&str> {
        resolution
            .matched
            .iter()
            .map(|m| m.local_name.as_str())
            .collect()
    }

    #[test]
    fn matched_columns_follow_mapping_order() {
        let resolution = resolve(&columns(), &mappings(), ResolveOptions::default()).unwrap();
        assert_eq!(local_names(&resolution), vec!["full_name", "due_date"]);
        assert_eq!(resolution.matched[1].sql_type, SqlType::Numeric);
        assert!(resolution.unmatched.is_empty());
    }

    #[test]
    fn alphabetical_order_sorts_by_remote_name() {
        let options = ResolveOptions {
            order: ColumnOrder::Alphabetical,
            ..ResolveOptions::default()
        };
        let resolution = resolve(&columns(), &mappings(), options).unwrap();
        assert_eq!(local_names(&resolution), vec!["due_date", "full_name"]);
    }

    #[test]
    fn title_match_is_case_sensitive() {
        let mappings = vec![ColumnMapping::new("full name", "full_name")];
        let resolution = resolve(&columns(), &mappings, ResolveOptions::default()).unwrap();
        assert!(resolution.matched.is_empty());
        assert_eq!(resolution.unmatched, vec!["full name"]);
    }

    #[test]
    fn unmatched_error_policy_names_every_missing_mapping() {
        let mut mappings = mappings();
        mappings.push(ColumnMapping::new("Owner", "owner"));
        mappings.push(ColumnMapping::new("Status", "status"));
        let options = ResolveOptions {
            on_unmatched: UnmatchedPolicy::Error,
            ..ResolveOptions::default()
        };
        let err = resolve(&columns(), &mappings, options).expect_err("unmatched");
        let msg = err.to_string();
        assert!(msg.contains("Owner, Status"), "got: {msg}");
    }

    #[test]
    fn duplicate_titles_are_reported_when_mapped() {
        let mut remote = columns();
        remote.push(RemoteColumn::new("Full Name", RemoteType::ContactList));
        let err = resolve(&remote, &mappings(), ResolveOptions::default()).expect_err("dup");
        assert!(matches!(
            err,
            SyncError::DuplicateColumn { ref title, count: 2 } if title == "Full Name"
        ));
    }

    #[test]
    fn duplicate_titles_are_ignored_when_unmapped() {
        let mut remote = columns();
        remote.push(RemoteColumn::new("Notes", RemoteType::TextNumber));
        let resolution = resolve(&remote, &mappings(), ResolveOptions::default()).unwrap();
        assert_eq!(resolution.matched.len(), 2);
    }

    #[test]
    fn unsupported_type_names_the_column() {
        let remote = vec![RemoteColumn::new(
            "Full Name",
            RemoteType::Unknown("MULTI_CONTACT_LIST".into()),
        )];
        let err = resolve(&remote, &mappings(), ResolveOptions::default()).expect_err("type");
        assert!(matches!(
            err,
            SyncError::UnsupportedType { ref column, ref remote_type }
                if column == "Full Name" && remote_type == "MULTI_CONTACT_LIST"
        ));
    }

    #[test]
    fn unsupported_type_on_unmapped_column_is_ignored() {
        let mut remote = columns();
        remote.push(RemoteColumn::new(
            "Tags",
            RemoteType::Unknown("MULTI_PICKLIST".into()),
        ));
        assert!(resolve(&remote, &mappings(), ResolveOptions::default()).is_ok());
    }
}
