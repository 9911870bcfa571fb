use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteType {
    AbstractDatetime,
    Checkbox,
    ContactList,
    Date,
    Duration,
    Picklist,
    Predecessor,
    TextNumber,
    Unknown(String),
}

impl RemoteType {
    pub fn as_str(&self) -> &str {
        match self {
            RemoteType::AbstractDatetime => "ABSTRACT_DATETIME",
            RemoteType::Checkbox => "CHECKBOX",
            RemoteType::ContactList => "CONTACT_LIST",
            RemoteType::Date => "DATE",
            RemoteType::Duration => "DURATION",
            RemoteType::Picklist => "PICKLIST",
            RemoteType::Predecessor => "PREDECESSOR",
            RemoteType::TextNumber => "TEXT_NUMBER",
            RemoteType::Unknown(token) => token,
        }
    }

    pub fn known() -> &'static [RemoteType] {
        KNOWN_TYPES
    }
}

const KNOWN_TYPES: &[RemoteType] = &[
    RemoteType::AbstractDatetime,
    RemoteType::Checkbox,
    RemoteType::ContactList,
    RemoteType::Date,
    RemoteType::Duration,
    RemoteType::Picklist,
    RemoteType::Predecessor,
    RemoteType::TextNumber,
];

impl FromStr for RemoteType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s {
            "ABSTRACT_DATETIME" => RemoteType::AbstractDatetime,
            "CHECKBOX" => RemoteType::Checkbox,
            "CONTACT_LIST" => RemoteType::ContactList,
            "DATE" => RemoteType::Date,
            "DURATION" => RemoteType::Duration,
            "PICKLIST" => RemoteType::Picklist,
            "PREDECESSOR" => RemoteType::Predecessor,
            "TEXT_NUMBER" => RemoteType::TextNumber,
            other => RemoteType::Unknown(other.to_string()),
        };
        Ok(parsed)
    }
}

impl fmt::Display for RemoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RemoteType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        let Ok(parsed) = token.parse::<RemoteType>();
        Ok(parsed)
    }
}

/// SQLite column affinities produced by [`map_type()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Numeric,
    Integer,
    Text,
}

impl SqlType {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Numeric => "NUMERIC",
            SqlType::Integer => "INTEGER",
            SqlType::Text => "TEXT",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported remote column type '{0}'")]
pub struct UnsupportedType(pub String);

pub fn map_type(remote_type: &RemoteType) -> Result<SqlType, UnsupportedType> {
    match remote_type {
        RemoteType::AbstractDatetime | RemoteType::Date => Ok(SqlType::Numeric),
        RemoteType::Checkbox => Ok(SqlType::Integer),
        RemoteType::ContactList
        | RemoteType::Duration
        | RemoteType::Picklist
        | RemoteType::Predecessor
        | RemoteType::TextNumber => Ok(SqlType::Text),
        RemoteType::Unknown(token) => Err(UnsupportedType(token.clone())),
    }
}
