use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::comment::ColumnComment;

/// Server-side default keyword for `date` columns
pub const CURRENT_DATE: &str = "current_date";
/// Server-side default keyword for `datetime`/`timestamp` columns
pub const CURRENT_TIME: &str = "current_time";

/// Logical column types understood by callers.
///
/// Hive degrades most of these to `string` or `int` server-side, so the
/// logical type is carried in the column comment and restored on reflection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicalType {
    String,
    Text,
    Integer,
    Float,
    Double,
    Datetime,
    Timestamp,
    Time,
    Date,
    Binary,
    Boolean,
    /// Any engine type outside the logical vocabulary (e.g. `bigint`, `map<string,int>`)
    Other(String),
}

/// Logical type vocabulary with the native Hive type each one is stored as
pub const NATIVE_DATABASE_TYPES: &[(LogicalType, &str)] = &[
    (LogicalType::String, "string"),
    (LogicalType::Text, "string"),
    (LogicalType::Integer, "int"),
    (LogicalType::Float, "float"),
    (LogicalType::Double, "double"),
    (LogicalType::Datetime, "string"),
    (LogicalType::Timestamp, "string"),
    (LogicalType::Time, "string"),
    (LogicalType::Date, "string"),
    (LogicalType::Binary, "string"),
    (LogicalType::Boolean, "tinyint"),
];

impl LogicalType {
    /// Parse a logical type name as written in the `ar_type` comment key
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "string" => LogicalType::String,
            "text" => LogicalType::Text,
            "integer" => LogicalType::Integer,
            "float" => LogicalType::Float,
            "double" => LogicalType::Double,
            "datetime" => LogicalType::Datetime,
            "timestamp" => LogicalType::Timestamp,
            "time" => LogicalType::Time,
            "date" => LogicalType::Date,
            "binary" => LogicalType::Binary,
            "boolean" => LogicalType::Boolean,
            _ => LogicalType::Other(name.trim().to_string()),
        }
    }

    /// Map a declared Hive type back into the logical vocabulary.
    /// Used when a column carries no `ar_type` metadata.
    pub fn from_native(sql_type: &str) -> Self {
        let normalized = sql_type.trim().to_lowercase();
        match normalized.as_str() {
            "string" => LogicalType::String,
            "int" | "integer" | "bigint" | "smallint" | "tinyint" => LogicalType::Integer,
            "float" => LogicalType::Float,
            "double" => LogicalType::Double,
            "boolean" => LogicalType::Boolean,
            "timestamp" => LogicalType::Timestamp,
            "date" => LogicalType::Date,
            "binary" => LogicalType::Binary,
            s if s.starts_with("varchar") || s.starts_with("char") => LogicalType::String,
            _ => LogicalType::Other(sql_type.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LogicalType::String => "string",
            LogicalType::Text => "text",
            LogicalType::Integer => "integer",
            LogicalType::Float => "float",
            LogicalType::Double => "double",
            LogicalType::Datetime => "datetime",
            LogicalType::Timestamp => "timestamp",
            LogicalType::Time => "time",
            LogicalType::Date => "date",
            LogicalType::Binary => "binary",
            LogicalType::Boolean => "boolean",
            LogicalType::Other(name) => name,
        }
    }

    /// Native Hive type this logical type is stored as
    pub fn native_type(&self) -> &str {
        match self {
            LogicalType::Other(name) => name,
            known => NATIVE_DATABASE_TYPES
                .iter()
                .find(|(logical, _)| logical == known)
                .map(|(_, native)| *native)
                .unwrap_or("string"),
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LogicalType {
    fn from(name: String) -> Self {
        LogicalType::parse(&name)
    }
}

impl From<LogicalType> for String {
    fn from(logical: LogicalType) -> Self {
        logical.as_str().to_string()
    }
}

/// A column default realized into a concrete value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// A Hive column with the logical type and default restored from its comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    /// Type as declared to (and reported by) Hive
    pub sql_type: String,
    /// Logical type recorded in the column comment, overriding `sql_type`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logged_type: Option<LogicalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub partition: bool,
}

impl ColumnDefinition {
    /// New regular column of the given logical type
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            sql_type: logical_type.native_type().to_string(),
            logged_type: Some(logical_type),
            default: None,
            partition: false,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Column as reported by DESCRIBE, with its decoded comment metadata
    pub fn reflected(
        name: impl Into<String>,
        sql_type: impl Into<String>,
        comment: ColumnComment,
        partition: bool,
    ) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            logged_type: comment.logical_type.as_deref().map(LogicalType::parse),
            default: comment.default,
            partition,
        }
    }

    /// Effective logical type: the logged type if present, otherwise the declared one
    pub fn logical_type(&self) -> LogicalType {
        self.logged_type
            .clone()
            .unwrap_or_else(|| LogicalType::from_native(&self.sql_type))
    }

    /// Default exactly as stored; `current_date`/`current_time` stay unevaluated
    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_partition(&self) -> bool {
        self.partition
    }

    /// Comment metadata written alongside this column
    pub fn comment(&self) -> ColumnComment {
        ColumnComment {
            logical_type: Some(self.logical_type().to_string()),
            default: self.default.clone(),
        }
    }

    /// Default realized against the local clock
    pub fn realized_default(&self) -> Option<DefaultValue> {
        self.realized_default_at(chrono::Local::now().naive_local())
    }

    /// Default realized against `now`.
    ///
    /// `current_date` on a date column and `current_time` on a datetime or
    /// timestamp column become concrete values; numeric and boolean literals
    /// are cast; anything that does not parse stays text.
    pub fn realized_default_at(&self, now: NaiveDateTime) -> Option<DefaultValue> {
        let literal = self.default.as_deref()?;
        let logical = self.logical_type();

        let value = match (&logical, literal) {
            (LogicalType::Date, CURRENT_DATE) => DefaultValue::Date(now.date()),
            (LogicalType::Datetime | LogicalType::Timestamp, CURRENT_TIME) => {
                DefaultValue::DateTime(now)
            }
            (LogicalType::Integer, s) => s
                .trim()
                .parse()
                .map(DefaultValue::Integer)
                .unwrap_or_else(|_| DefaultValue::Text(s.to_string())),
            (LogicalType::Float | LogicalType::Double, s) => s
                .trim()
                .parse()
                .map(DefaultValue::Float)
                .unwrap_or_else(|_| DefaultValue::Text(s.to_string())),
            (LogicalType::Boolean, s) => match s.trim().to_lowercase().as_str() {
                "true" | "t" | "1" => DefaultValue::Boolean(true),
                "false" | "f" | "0" => DefaultValue::Boolean(false),
                _ => DefaultValue::Text(s.to_string()),
            },
            (LogicalType::Date, s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(DefaultValue::Date)
                .unwrap_or_else(|_| DefaultValue::Text(s.to_string())),
            (LogicalType::Datetime | LogicalType::Timestamp, s) => {
                NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
                    .map(DefaultValue::DateTime)
                    .unwrap_or_else(|_| DefaultValue::Text(s.to_string()))
            }
            (_, s) => DefaultValue::Text(s.to_string()),
        };

        Some(value)
    }
}
