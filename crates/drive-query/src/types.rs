//! Literal values, result records and result batches.
//!
//! Records are what the remote store hands back; the pipeline moves them from
//! the store into the adapter without copying.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{ValueType, MIME_TYPE, MODIFIED_TIME, TITLE};
use crate::predicate::SpecialKind;

/// A typed literal used in comparisons and record attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Literal {
    String(String),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl Literal {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Timestamp(_) => ValueType::Timestamp,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "'{}'", value.replace('\'', "\\'")),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Timestamp(value) => write!(f, "'{}'", value.to_rfc3339()),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for Literal {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Opaque identity assigned to a record by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file metadata record returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    attributes: BTreeMap<String, Literal>,
    #[serde(default)]
    flags: BTreeSet<SpecialKind>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(id),
            attributes: BTreeMap::new(),
            flags: BTreeSet::new(),
        }
    }

    /// Sets an attribute, replacing any previous value.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    /// Marks a special predicate as holding for this record.
    pub fn with_flag(mut self, kind: SpecialKind) -> Self {
        self.flags.insert(kind);
        self
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn value(&self, field: &str) -> Option<&Literal> {
        self.attributes.get(field)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn has_flag(&self, kind: SpecialKind) -> bool {
        self.flags.contains(&kind)
    }

    pub fn title(&self) -> Option<&str> {
        self.value(TITLE).and_then(Literal::as_str)
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.value(MIME_TYPE).and_then(Literal::as_str)
    }

    pub fn modified_time(&self) -> Option<DateTime<Utc>> {
        self.value(MODIFIED_TIME).and_then(Literal::as_timestamp)
    }
}

/// Ordered records returned by one successful execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultBatch {
    records: Vec<Record>,
}

impl ResultBatch {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for ResultBatch {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for ResultBatch {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for ResultBatch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultBatch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
