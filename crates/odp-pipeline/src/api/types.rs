//! API request and response types
//!
//! Matches the platform's table API wire format.

use crate::schema::Resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Row-ingest request body
#[derive(Debug, Serialize)]
pub struct RowsPayload<'a> {
    pub query: &'a [Map<String, Value>],
}

/// Table-creation request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablePayload {
    pub query: TableDefinition,
}

/// DDL description of one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    pub columns: Vec<ColumnDefinition>,
    pub constraints: Vec<ConstraintDefinition>,
}

/// DDL description of one column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

/// DDL constraint entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    pub constraint_type: String,
    pub constraint_parameter: String,
}

/// Error body shape returned by the platform on failures
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Best-effort human-readable detail
    pub fn message(&self) -> Option<&str> {
        self.reason.as_deref().or(self.detail.as_deref())
    }
}

impl TableDefinition {
    /// Build the DDL payload for a mapped resource
    ///
    /// The synthesized id column becomes an auto-incrementing bigserial;
    /// declared columns keep their (mapped) types and are nullable. The
    /// primary key and any uniqueness constraints ride along as constraint
    /// entries.
    pub fn from_resource(resource: &Resource) -> Self {
        let columns = resource
            .columns
            .iter()
            .map(|column| ColumnDefinition {
                name: column.name.clone(),
                data_type: if column.primary_key && column.is_synthesized() {
                    "bigserial".to_string()
                } else {
                    platform_type(&column.data_type).to_string()
                },
                is_nullable: !column.primary_key,
            })
            .collect();

        let mut constraints = Vec::new();
        for column in &resource.columns {
            if column.primary_key {
                constraints.push(ConstraintDefinition {
                    constraint_type: "PRIMARY KEY".to_string(),
                    constraint_parameter: column.name.clone(),
                });
            } else if column.unique {
                constraints.push(ConstraintDefinition {
                    constraint_type: "UNIQUE".to_string(),
                    constraint_parameter: column.name.clone(),
                });
            }
        }

        Self {
            columns,
            constraints,
        }
    }
}

/// Map a declared field type to the platform's SQL type
pub fn platform_type(declared: &str) -> &'static str {
    match declared.to_lowercase().as_str() {
        "integer" | "int" => "bigint",
        "number" | "float" | "double" => "double precision",
        "decimal" | "numeric" => "numeric",
        "boolean" | "bool" => "boolean",
        "date" => "date",
        "time" => "time",
        "datetime" | "timestamp" => "timestamp",
        "object" | "array" | "json" => "jsonb",
        // strings and anything unrecognized upload fine as text
        _ => "text",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn column(name: &str, data_type: &str) -> Column {
        Column {
            original_name: Some(name.to_string()),
            name: name.to_string(),
            data_type: data_type.to_string(),
            primary_key: false,
            foreign_key: false,
            unique: false,
        }
    }

    fn resource_with(columns: Vec<Column>) -> Resource {
        Resource {
            original_name: "t".to_string(),
            name: "t".to_string(),
            path: "data/t.csv".to_string(),
            delimiter: b',',
            columns,
        }
    }

    #[test]
    fn test_platform_type_mapping() {
        assert_eq!(platform_type("integer"), "bigint");
        assert_eq!(platform_type("Float"), "double precision");
        assert_eq!(platform_type("string"), "text");
        assert_eq!(platform_type("anything-else"), "text");
        assert_eq!(platform_type("datetime"), "timestamp");
    }

    #[test]
    fn test_synthesized_id_becomes_bigserial() {
        let mut id = Column {
            original_name: None,
            name: "id".to_string(),
            data_type: "integer".to_string(),
            primary_key: true,
            foreign_key: false,
            unique: false,
        };
        let definition =
            TableDefinition::from_resource(&resource_with(vec![id.clone(), column("v", "float")]));

        assert_eq!(definition.columns[0].data_type, "bigserial");
        assert!(!definition.columns[0].is_nullable);
        assert_eq!(definition.columns[1].data_type, "double precision");
        assert!(definition.columns[1].is_nullable);

        // a declared id keeps its declared type
        id.original_name = Some("id".to_string());
        let definition = TableDefinition::from_resource(&resource_with(vec![id]));
        assert_eq!(definition.columns[0].data_type, "bigint");
    }

    #[test]
    fn test_constraints_cover_pk_and_unique() {
        let mut code = column("code", "string");
        code.unique = true;
        let mut pk = column("id", "integer");
        pk.primary_key = true;
        pk.unique = true; // pk implies unique, no extra constraint emitted

        let definition = TableDefinition::from_resource(&resource_with(vec![pk, code]));
        let kinds: Vec<(&str, &str)> = definition
            .constraints
            .iter()
            .map(|c| (c.constraint_type.as_str(), c.constraint_parameter.as_str()))
            .collect();
        assert_eq!(kinds, vec![("PRIMARY KEY", "id"), ("UNIQUE", "code")]);
    }

    #[test]
    fn test_rows_payload_shape() {
        let mut row = Map::new();
        row.insert("id".to_string(), Value::from(1));
        let rows = vec![row];
        let payload = RowsPayload { query: &rows };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"query":[{"id":1}]}"#);
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"reason": "column mismatch"}"#).unwrap();
        assert_eq!(body.message(), Some("column mismatch"));

        let body: ErrorBody = serde_json::from_str(r#"{"detail": "nope"}"#).unwrap();
        assert_eq!(body.message(), Some("nope"));
    }
}
