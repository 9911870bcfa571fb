use std::collections::BTreeMap;

use log::warn;

use crate::{data::Value, remote::RawRow, resolve::MatchedColumn};

/// One transformed record, fields in matched-column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub fields: Vec<(String, Value)>,
}

impl Row {
    pub fn get(&self, local_name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == local_name)
            .map(|(_, value)| value)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Absent remote fields become [`Value::Null`]; unmapped fields are dropped.
pub fn transform(raw_row: &RawRow, matched: &[MatchedColumn]) -> Row {
    let fields = matched
        .iter()
        .map(|column| {
            let value = raw_row
                .get(&column.remote_name)
                .map_or(Value::Null, |cell| Value::from_cell(cell, column.sql_type));
            (column.local_name.clone(), value)
        })
        .collect();
    Row { fields }
}

/// Transforms every row, logging one warning per column that was missing
/// from at least one row.
pub fn transform_rows(raw_rows: &[RawRow], matched: &[MatchedColumn]) -> Vec<Row> {
    let mut missing: BTreeMap<&str, usize> = BTreeMap::new();
    let rows = raw_rows
        .iter()
        .map(|raw| {
            for column in matched {
                if !raw.contains_key(&column.remote_name) {
                    *missing.entry(column.remote_name.as_str()).or_insert(0) += 1;
                }
            }
            transform(raw, matched)
        })
        .collect();
    for (column, count) in missing {
        warn!("Column '{column}' was empty in {count} row(s); stored as NULL");
    }
    rows
}
