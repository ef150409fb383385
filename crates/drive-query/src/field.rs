//! Queryable fields and the registry that types them.
//!
//! The registry is the only place a field's value type is declared. Predicate
//! constructors resolve field names through it so operator and literal
//! compatibility is checked locally, before any request reaches the store.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DriveQueryError, Result};

pub const TITLE: &str = "title";
pub const MIME_TYPE: &str = "mimeType";
pub const STARRED: &str = "starred";
pub const TRASHED: &str = "trashed";
pub const MODIFIED_TIME: &str = "modifiedTime";
pub const LAST_VIEWED_BY_ME: &str = "lastViewedByMe";

/// Value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Boolean,
    Timestamp,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
        }
    }

    /// Whether values of this type have a total order usable by range operators.
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Timestamp)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed record attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    name: String,
    value_type: ValueType,
}

impl Field {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

/// Fixed table of queryable fields.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: Vec<Field>,
    by_name: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Builds a registry from a field table. Field names must be unique.
    pub fn from_fields(fields: impl IntoIterator<Item = Field>) -> Result<Self> {
        let fields = fields.into_iter().collect::<Vec<_>>();
        let mut by_name = HashMap::with_capacity(fields.len());
        for (slot, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(DriveQueryError::InvalidConfig(
                    "field name must not be empty".to_string(),
                ));
            }
            if by_name.insert(field.name.clone(), slot).is_some() {
                return Err(DriveQueryError::InvalidConfig(format!(
                    "duplicate field: {}",
                    field.name
                )));
            }
        }
        Ok(Self { fields, by_name })
    }

    pub fn lookup(&self, name: &str) -> Result<&Field> {
        self.by_name
            .get(name)
            .map(|slot| &self.fields[*slot])
            .ok_or_else(|| DriveQueryError::UnknownField(name.to_string()))
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldRegistry {
    /// The Drive metadata fields searchable by the sample queries.
    fn default() -> Self {
        let fields = [
            Field::new(TITLE, ValueType::String),
            Field::new(MIME_TYPE, ValueType::String),
            Field::new(STARRED, ValueType::Boolean),
            Field::new(TRASHED, ValueType::Boolean),
            Field::new(MODIFIED_TIME, ValueType::Timestamp),
            Field::new(LAST_VIEWED_BY_ME, ValueType::Timestamp),
        ];
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(slot, field)| (field.name.clone(), slot))
            .collect();
        Self {
            fields: fields.to_vec(),
            by_name,
        }
    }
}
