//! Tagged metadata values
//!
//! Error metadata is a string-keyed map whose values are one of a closed set
//! of shapes. Callers match on the variant instead of guessing at runtime
//! whether a value is a list of strings or a list of validation records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Metadata map carried by error templates and instances
pub type MetaMap = BTreeMap<String, MetaValue>;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub field: String,
    pub message: String,
}

impl ValidationRecord {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Value stored under a metadata key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    String(String),
    StringList(Vec<String>),
    ValidationList(Vec<ValidationRecord>),
    /// Anything else, kept as JSON
    Raw(serde_json::Value),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetaValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            MetaValue::StringList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_validations(&self) -> Option<&[ValidationRecord]> {
        match self {
            MetaValue::ValidationList(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Int(i) => write!(f, "{}", i),
            MetaValue::String(s) => write!(f, "{}", s),
            MetaValue::StringList(items) => write!(f, "[{}]", items.join(", ")),
            MetaValue::ValidationList(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", v.field, v.message)?;
                }
                write!(f, "]")
            }
            MetaValue::Raw(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Int(value)
    }
}

impl From<i32> for MetaValue {
    fn from(value: i32) -> Self {
        MetaValue::Int(i64::from(value))
    }
}

impl From<u32> for MetaValue {
    fn from(value: u32) -> Self {
        MetaValue::Int(i64::from(value))
    }
}

impl From<u8> for MetaValue {
    fn from(value: u8) -> Self {
        MetaValue::Int(i64::from(value))
    }
}

impl From<usize> for MetaValue {
    fn from(value: usize) -> Self {
        MetaValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::String(value)
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(value: Vec<String>) -> Self {
        MetaValue::StringList(value)
    }
}

impl From<Vec<ValidationRecord>> for MetaValue {
    fn from(value: Vec<ValidationRecord>) -> Self {
        MetaValue::ValidationList(value)
    }
}

impl From<serde_json::Value> for MetaValue {
    fn from(value: serde_json::Value) -> Self {
        MetaValue::Raw(value)
    }
}
