//! Datapackage file handling (datapackage.json)
//!
//! The datapackage describes the dataset: one entry per table with its
//! declared columns, key annotations, and the relative path to its CSV
//! data, in the Frictionless camelCase layout.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A dataset description file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Datapackage {
    /// Dataset name
    pub name: String,

    /// Human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Dataset description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared tables
    #[serde(default)]
    pub resources: Vec<ResourceMeta>,
}

/// One declared table and its data file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceMeta {
    /// Declared table name (not yet normalized)
    pub name: String,

    /// Path to the data file, relative to the datapackage file
    pub path: String,

    /// CSV dialect hints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,

    /// Declared table schema
    #[serde(default)]
    pub schema: TableSchema,
}

/// CSV dialect hints for a resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dialect {
    /// Field delimiter, a single character
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

/// Declared schema of one table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Declared columns, in order
    #[serde(default)]
    pub fields: Vec<FieldMeta>,

    /// Declared primary key column(s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKey>,

    /// Declared foreign keys
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyMeta>,
}

/// One declared column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMeta {
    /// Declared column name (not yet normalized)
    pub name: String,

    /// Declared data type (e.g. "string", "integer", "float")
    #[serde(rename = "type", default = "default_field_type")]
    pub data_type: String,

    /// Column description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_field_type() -> String {
    "string".to_string()
}

/// Primary key declaration: a single column or a list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PrimaryKey {
    Single(String),
    Multiple(Vec<String>),
}

impl PrimaryKey {
    /// Declared primary-key column names
    pub fn columns(&self) -> Vec<&str> {
        match self {
            PrimaryKey::Single(name) => vec![name.as_str()],
            PrimaryKey::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// One declared foreign key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForeignKeyMeta {
    /// Local columns making up the key
    pub fields: Vec<String>,

    /// The referenced resource and columns
    pub reference: FkReference,
}

/// Target of a foreign-key declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FkReference {
    /// Referenced resource name (as declared in this datapackage)
    pub resource: String,

    /// Referenced columns
    pub fields: Vec<String>,
}

impl Datapackage {
    /// Load a datapackage from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::invalid_datapackage(format!(
                "file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let package: Datapackage = serde_json::from_str(&content).map_err(|e| {
            PipelineError::invalid_datapackage(format!("failed to parse JSON: {}", e))
        })?;

        package.validate()?;
        Ok(package)
    }

    /// Validate the datapackage structure
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(PipelineError::invalid_datapackage(
                "missing required field: 'name'",
            ));
        }

        if self.resources.is_empty() {
            return Err(PipelineError::invalid_datapackage(
                "datapackage declares no resources",
            ));
        }

        for resource in &self.resources {
            if resource.name.is_empty() {
                return Err(PipelineError::invalid_datapackage(
                    "resource with empty name",
                ));
            }
            if resource.path.is_empty() {
                return Err(PipelineError::invalid_datapackage(format!(
                    "resource '{}' declares no data path",
                    resource.name
                )));
            }
        }

        Ok(())
    }

    /// Find a resource by declared name, case-insensitively
    pub fn resource(&self, name: &str) -> Option<&ResourceMeta> {
        self.resources
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

impl ResourceMeta {
    /// Field delimiter for this resource's data file
    ///
    /// Uses the declared dialect when present, otherwise falls back by
    /// file extension (`.tsv` is tab-separated, everything else comma).
    pub fn delimiter(&self) -> u8 {
        if let Some(dialect) = &self.dialect {
            if let Some(d) = &dialect.delimiter {
                if let Some(c) = d.chars().next() {
                    if c.is_ascii() && d.chars().count() == 1 {
                        return c as u8;
                    }
                }
            }
        }

        if self.path.to_lowercase().ends_with(".tsv") {
            b'\t'
        } else {
            b','
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "name": "wind_park_survey",
            "title": "Wind park survey 2023",
            "resources": [
                {
                    "name": "Wind Parks",
                    "path": "data/wind_parks.csv",
                    "schema": {
                        "fields": [
                            {"name": "id", "type": "integer"},
                            {"name": "Site Name", "type": "string"}
                        ],
                        "primaryKey": ["id"]
                    }
                },
                {
                    "name": "Output",
                    "path": "data/output.tsv",
                    "dialect": {"delimiter": "\t"},
                    "schema": {
                        "fields": [
                            {"name": "park", "type": "integer"},
                            {"name": "Value (kWh)", "type": "float"}
                        ],
                        "foreignKeys": [
                            {
                                "fields": ["park"],
                                "reference": {"resource": "Wind Parks", "fields": ["id"]}
                            }
                        ]
                    }
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_sample() {
        let package: Datapackage = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(package.name, "wind_park_survey");
        assert_eq!(package.resources.len(), 2);

        let parks = &package.resources[0];
        assert_eq!(parks.schema.fields.len(), 2);
        assert_eq!(
            parks.schema.primary_key.as_ref().unwrap().columns(),
            vec!["id"]
        );

        let output = &package.resources[1];
        assert_eq!(output.schema.foreign_keys.len(), 1);
        assert_eq!(output.schema.foreign_keys[0].reference.resource, "Wind Parks");
    }

    #[test]
    fn test_primary_key_accepts_single_string() {
        let schema: TableSchema =
            serde_json::from_str(r#"{"fields": [], "primaryKey": "id"}"#).unwrap();
        assert_eq!(schema.primary_key.unwrap().columns(), vec!["id"]);
    }

    #[test]
    fn test_field_type_defaults_to_string() {
        let field: FieldMeta = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(field.data_type, "string");
    }

    #[test]
    fn test_delimiter_resolution() {
        let package: Datapackage = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(package.resources[0].delimiter(), b',');
        assert_eq!(package.resources[1].delimiter(), b'\t');

        let bare_tsv = ResourceMeta {
            name: "t".to_string(),
            path: "data/t.TSV".to_string(),
            dialect: None,
            schema: TableSchema::default(),
        };
        assert_eq!(bare_tsv.delimiter(), b'\t');
    }

    #[test]
    fn test_validate_rejects_missing_name() {
        let package: std::result::Result<Datapackage, _> =
            serde_json::from_str(r#"{"name": "", "resources": [{"name": "t", "path": "d.csv"}]}"#);
        assert!(package.unwrap().validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_resources() {
        let package: Datapackage =
            serde_json::from_str(r#"{"name": "pkg", "resources": []}"#).unwrap();
        assert!(package.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Datapackage::load("/nonexistent/datapackage.json").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDatapackage(_)));
    }

    #[test]
    fn test_resource_lookup_is_case_insensitive() {
        let package: Datapackage = serde_json::from_str(sample_json()).unwrap();
        assert!(package.resource("wind parks").is_some());
        assert!(package.resource("missing").is_none());
    }
}
