//! Named query catalog and its JSON configuration.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{check_index, DriveQueryError, Result};
use crate::field::{Field, FieldRegistry, ValueType, MIME_TYPE, STARRED, TITLE};
use crate::predicate::{ComparisonOperator, Filters, PredicateNode, SpecialKind};
use crate::query::Query;
use crate::types::Literal;

/// A query offered for selection, with its display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
    pub title: String,
    pub query: Query,
}

impl NamedQuery {
    pub fn new(title: impl Into<String>, query: Query) -> Self {
        Self {
            title: title.into(),
            query,
        }
    }
}

/// The queries a selection controller can run, plus the registry they were
/// validated against.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    registry: FieldRegistry,
    entries: Vec<NamedQuery>,
}

impl QueryCatalog {
    pub fn new(registry: FieldRegistry, entries: Vec<NamedQuery>) -> Self {
        Self { registry, entries }
    }

    /// The sample Drive queries over the default registry.
    pub fn drive_samples() -> Result<Self> {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let entries = vec![
            NamedQuery::new(
                "Files not of type text/plain",
                Query::builder()
                    .add_filter(filters.not(filters.eq(MIME_TYPE, "text/plain")?))
                    .build(),
            ),
            NamedQuery::new(
                "Files shared with me",
                Query::builder().add_filter(filters.shared_with_me()).build(),
            ),
            NamedQuery::new(
                "Files of type text/plain",
                Query::builder()
                    .add_filter(filters.eq(MIME_TYPE, "text/plain")?)
                    .build(),
            ),
            NamedQuery::new(
                "Files with 'a' in the title",
                Query::builder()
                    .add_filter(filters.contains(TITLE, "a")?)
                    .build(),
            ),
            NamedQuery::new(
                "Starred text/plain files",
                Query::builder()
                    .add_filter(filters.and([
                        filters.eq(MIME_TYPE, "text/plain")?,
                        filters.eq(STARRED, true)?,
                    ])?)
                    .build(),
            ),
            NamedQuery::new(
                "Files of type text/html or text/plain",
                Query::builder()
                    .add_filter(filters.or([
                        filters.eq(MIME_TYPE, "text/html")?,
                        filters.eq(MIME_TYPE, "text/plain")?,
                    ])?)
                    .build(),
            ),
        ];
        Ok(Self::new(registry, entries))
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&NamedQuery> {
        check_index(index, self.entries.len())?;
        Ok(&self.entries[index])
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.title.as_str())
    }
}

/// On-disk catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    /// Custom field table; the default Drive fields when absent.
    #[serde(default)]
    pub fields: Option<Vec<Field>>,
    pub queries: Vec<NamedQueryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedQueryConfig {
    pub title: String,
    /// Filters ANDed in order; empty matches everything.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

/// Serialized predicate tree. Literals are plain JSON values typed by the
/// field they are compared against; timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSpec {
    Eq { field: String, value: serde_json::Value },
    Contains { field: String, value: String },
    Lt { field: String, value: serde_json::Value },
    Lte { field: String, value: serde_json::Value },
    Gt { field: String, value: serde_json::Value },
    Gte { field: String, value: serde_json::Value },
    Not(Box<FilterSpec>),
    And(Vec<FilterSpec>),
    Or(Vec<FilterSpec>),
    Special(SpecialKind),
}

impl CatalogConfig {
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source)
            .map_err(|error| DriveQueryError::InvalidConfig(format!("catalog parse: {error}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_json_str(&source).map_err(|error| match error {
            DriveQueryError::InvalidConfig(message) => {
                DriveQueryError::InvalidConfig(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Validates every filter and assembles the catalog.
    pub fn into_catalog(self) -> Result<QueryCatalog> {
        let registry = match self.fields {
            Some(fields) => FieldRegistry::from_fields(fields)?,
            None => FieldRegistry::default(),
        };
        if self.queries.is_empty() {
            return Err(DriveQueryError::InvalidConfig(
                "catalog has no queries".to_string(),
            ));
        }

        let filters = Filters::new(&registry);
        let mut entries = Vec::with_capacity(self.queries.len());
        for named in self.queries {
            let mut builder = Query::builder();
            for spec in &named.filters {
                builder = builder.add_filter(build_filter(&filters, spec)?);
            }
            entries.push(NamedQuery::new(named.title, builder.build()));
        }

        log::info!(
            "query catalog loaded fields={} queries={}",
            registry.len(),
            entries.len()
        );
        Ok(QueryCatalog::new(registry, entries))
    }
}

fn build_filter(filters: &Filters<'_>, spec: &FilterSpec) -> Result<PredicateNode> {
    match spec {
        FilterSpec::Eq { field, value } => compare(filters, field, ComparisonOperator::Eq, value),
        FilterSpec::Contains { field, value } => filters.contains(field, value.as_str()),
        FilterSpec::Lt { field, value } => {
            compare(filters, field, ComparisonOperator::LessThan, value)
        }
        FilterSpec::Lte { field, value } => {
            compare(filters, field, ComparisonOperator::LessThanOrEqual, value)
        }
        FilterSpec::Gt { field, value } => {
            compare(filters, field, ComparisonOperator::GreaterThan, value)
        }
        FilterSpec::Gte { field, value } => {
            compare(filters, field, ComparisonOperator::GreaterThanOrEqual, value)
        }
        FilterSpec::Not(inner) => Ok(filters.not(build_filter(filters, inner)?)),
        FilterSpec::And(children) => filters.and(
            children
                .iter()
                .map(|child| build_filter(filters, child))
                .collect::<Result<Vec<_>>>()?,
        ),
        FilterSpec::Or(children) => filters.or(
            children
                .iter()
                .map(|child| build_filter(filters, child))
                .collect::<Result<Vec<_>>>()?,
        ),
        FilterSpec::Special(kind) => Ok(filters.special(*kind)),
    }
}

fn compare(
    filters: &Filters<'_>,
    field: &str,
    operator: ComparisonOperator,
    value: &serde_json::Value,
) -> Result<PredicateNode> {
    let declared = filters.registry().lookup(field)?;
    let literal = json_literal(declared, value)?;
    filters.compare(field, operator, literal)
}

/// Reads a JSON value as a literal of the field's type where the JSON shape
/// allows it; otherwise returns the literal the JSON naturally denotes so the
/// comparison reports the mismatch.
fn json_literal(field: &Field, value: &serde_json::Value) -> Result<Literal> {
    match (field.value_type(), value) {
        (ValueType::Timestamp, serde_json::Value::String(raw)) => {
            DateTime::parse_from_rfc3339(raw)
                .map(|at| Literal::Timestamp(at.with_timezone(&Utc)))
                .map_err(|error| {
                    DriveQueryError::InvalidConfig(format!(
                        "field {}: invalid timestamp {raw:?}: {error}",
                        field.name()
                    ))
                })
        }
        (_, serde_json::Value::String(raw)) => Ok(Literal::String(raw.clone())),
        (_, serde_json::Value::Bool(flag)) => Ok(Literal::Boolean(*flag)),
        (_, other) => Err(DriveQueryError::InvalidConfig(format!(
            "field {}: unsupported literal {other}",
            field.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::MODIFIED_TIME;
    use crate::types::Record;
    use chrono::TimeZone;
    use std::io::Write;

    const CATALOG: &str = r#"{
        "queries": [
            { "title": "Not plain text",
              "filters": [ { "not": { "eq": { "field": "mimeType", "value": "text/plain" } } } ] },
            { "title": "Shared", "filters": [ { "special": "sharedWithMe" } ] },
            { "title": "Everything" },
            { "title": "Recent starred",
              "filters": [
                { "eq": { "field": "starred", "value": true } },
                { "gte": { "field": "modifiedTime", "value": "2024-01-01T00:00:00Z" } }
              ] }
        ]
    }"#;

    #[test]
    fn drive_samples_match_reference_queries() {
        let catalog = QueryCatalog::drive_samples().expect("catalog");
        assert_eq!(catalog.len(), 6);

        let plain = Record::new("p").with(MIME_TYPE, "text/plain").with(STARRED, true);
        let html = Record::new("h").with(MIME_TYPE, "text/html").with(TITLE, "a.html");

        let first = &catalog.get(0).unwrap().query;
        assert!(!first.matches(&plain));
        assert!(first.matches(&html));
        assert!(catalog.get(4).unwrap().query.matches(&plain));
        assert!(catalog.get(5).unwrap().query.matches(&html));
        assert!(catalog.get(6).is_err());
    }

    #[test]
    fn parses_and_validates_json_catalog() {
        let catalog = CatalogConfig::from_json_str(CATALOG)
            .expect("parse")
            .into_catalog()
            .expect("catalog");

        assert_eq!(
            catalog.titles().collect::<Vec<_>>(),
            vec!["Not plain text", "Shared", "Everything", "Recent starred"]
        );
        assert!(catalog.get(2).unwrap().query.matches_all());

        let recent = Record::new("r")
            .with(STARRED, true)
            .with(MODIFIED_TIME, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        let old = Record::new("o")
            .with(STARRED, true)
            .with(MODIFIED_TIME, Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap());
        let query = &catalog.get(3).unwrap().query;
        assert!(query.matches(&recent));
        assert!(!query.matches(&old));
    }

    #[test]
    fn json_filters_equal_code_built_filters() {
        let catalog = CatalogConfig::from_json_str(CATALOG)
            .unwrap()
            .into_catalog()
            .unwrap();
        let samples = QueryCatalog::drive_samples().unwrap();

        assert_eq!(catalog.get(0).unwrap().query, samples.get(0).unwrap().query);
        assert_eq!(catalog.get(1).unwrap().query, samples.get(1).unwrap().query);
    }

    #[test]
    fn mistyped_literal_surfaces_type_mismatch() {
        let source = r#"{ "queries": [ { "title": "bad",
            "filters": [ { "eq": { "field": "starred", "value": "yes" } } ] } ] }"#;
        let error = CatalogConfig::from_json_str(source)
            .unwrap()
            .into_catalog()
            .unwrap_err();
        assert!(matches!(error, DriveQueryError::TypeMismatch { .. }));
    }

    #[test]
    fn unknown_field_and_empty_combinator_are_reported() {
        let unknown = r#"{ "queries": [ { "title": "x",
            "filters": [ { "contains": { "field": "owner", "value": "me" } } ] } ] }"#;
        assert!(matches!(
            CatalogConfig::from_json_str(unknown).unwrap().into_catalog(),
            Err(DriveQueryError::UnknownField(_))
        ));

        let empty = r#"{ "queries": [ { "title": "x", "filters": [ { "or": [] } ] } ] }"#;
        assert!(matches!(
            CatalogConfig::from_json_str(empty).unwrap().into_catalog(),
            Err(DriveQueryError::EmptyCombinator("or"))
        ));
    }

    #[test]
    fn custom_field_table_replaces_defaults() {
        let source = r#"{
            "fields": [ { "name": "label", "valueType": "string" } ],
            "queries": [ { "title": "labelled",
                "filters": [ { "eq": { "field": "label", "value": "red" } } ] } ]
        }"#;
        let catalog = CatalogConfig::from_json_str(source)
            .unwrap()
            .into_catalog()
            .expect("catalog");

        assert_eq!(catalog.registry().len(), 1);
        assert!(catalog.registry().lookup(MIME_TYPE).is_err());
    }

    #[test]
    fn load_reads_catalog_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(CATALOG.as_bytes()).expect("write");

        let config = CatalogConfig::load(file.path()).expect("load");
        assert_eq!(config.queries.len(), 4);
    }

    #[test]
    fn load_reports_missing_file_and_bad_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            CatalogConfig::load(&missing),
            Err(DriveQueryError::Io(_))
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").expect("write");
        assert!(matches!(
            CatalogConfig::load(&broken),
            Err(DriveQueryError::InvalidConfig(_))
        ));
    }
}
