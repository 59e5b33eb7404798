//! Schema mapping
//!
//! Turns declared resources into platform-ready table definitions: every
//! identifier normalized, exactly one primary-key column named `id`
//! (synthesized and prepended when the data has none), and a per-table
//! mapping from original CSV headers to normalized column names.

use crate::datapackage::{Datapackage, ResourceMeta};
use crate::error::{PipelineError, Result};
use crate::normalize::{normalize, NameKind};
use std::collections::HashMap;

/// A table ready for creation and upload
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Name as declared in the datapackage
    pub original_name: String,

    /// Normalized table name
    pub name: String,

    /// Data file path, relative to the datapackage file (never normalized)
    pub path: String,

    /// CSV field delimiter
    pub delimiter: u8,

    /// Columns in upload order
    pub columns: Vec<Column>,
}

impl Resource {
    /// The primary-key column
    ///
    /// Mapping guarantees exactly one exists.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// One table column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Name as declared in the datapackage; None for the synthesized id
    pub original_name: Option<String>,

    /// Normalized column name
    pub name: String,

    /// Declared data type
    pub data_type: String,

    /// Whether this column is the table's primary key
    pub primary_key: bool,

    /// Whether this column is part of a foreign key in its own table
    pub foreign_key: bool,

    /// Whether this column needs a uniqueness constraint (it is referenced
    /// as a foreign-key target by another resource)
    pub unique: bool,
}

impl Column {
    /// Whether this column was synthesized rather than declared
    pub fn is_synthesized(&self) -> bool {
        self.original_name.is_none()
    }
}

/// Mapping from original CSV headers to normalized column names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameMapping {
    entries: HashMap<String, String>,
    synthesized_id: bool,
}

impl NameMapping {
    /// Normalized name for an original header, if the column is declared
    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    /// Whether the `id` column is synthesized (has no CSV counterpart)
    pub fn synthesized_id(&self) -> bool {
        self.synthesized_id
    }

    /// Number of declared columns in the mapping
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping holds no declared columns
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Map a single declared resource to a [`Resource`] and its [`NameMapping`]
///
/// Cross-resource concerns (uniqueness of foreign-key targets) are handled
/// by [`map_datapackage`].
pub fn map_resource(meta: &ResourceMeta) -> Result<(Resource, NameMapping)> {
    let table_name = normalize(&meta.name, NameKind::Table)?;

    let fk_fields: Vec<&str> = meta
        .schema
        .foreign_keys
        .iter()
        .flat_map(|fk| fk.fields.iter().map(String::as_str))
        .collect();

    let mut columns = Vec::with_capacity(meta.schema.fields.len() + 1);
    let mut mapping = NameMapping::default();
    // normalized name -> first original that produced it
    let mut seen: HashMap<String, String> = HashMap::new();

    for field in &meta.schema.fields {
        let normalized = normalize(&field.name, NameKind::Column)?;

        if let Some(first) = seen.get(&normalized) {
            return Err(PipelineError::NameCollision {
                first: first.clone(),
                second: field.name.clone(),
                normalized,
            });
        }
        seen.insert(normalized.clone(), field.name.clone());

        columns.push(Column {
            original_name: Some(field.name.clone()),
            name: normalized.clone(),
            data_type: field.data_type.clone(),
            primary_key: false,
            foreign_key: fk_fields.iter().any(|f| *f == field.name),
            unique: false,
        });
        mapping.entries.insert(field.name.clone(), normalized);
    }

    // The platform requires a single-column integer primary key named "id".
    // A declared "id" column (case-insensitive, pre-normalization) wins over
    // any primaryKey declaration in the schema; otherwise one is synthesized.
    let id_position = meta
        .schema
        .fields
        .iter()
        .position(|f| f.name.eq_ignore_ascii_case("id"));

    match id_position {
        Some(pos) => {
            columns[pos].primary_key = true;
        },
        None => {
            if let Some(clashing) = columns.iter().find(|c| c.name == "id") {
                // a declared column already occupies the synthesized name
                return Err(PipelineError::NameCollision {
                    first: clashing.original_name.clone().unwrap_or_default(),
                    second: "id".to_string(),
                    normalized: "id".to_string(),
                });
            }
            columns.insert(
                0,
                Column {
                    original_name: None,
                    name: "id".to_string(),
                    data_type: "integer".to_string(),
                    primary_key: true,
                    foreign_key: false,
                    unique: false,
                },
            );
            mapping.synthesized_id = true;
        },
    }

    Ok((
        Resource {
            original_name: meta.name.clone(),
            name: table_name,
            path: meta.path.clone(),
            delimiter: meta.delimiter(),
            columns,
        },
        mapping,
    ))
}

/// Map every resource of a datapackage
///
/// After per-resource mapping, columns referenced as foreign-key targets by
/// sibling resources are flagged unique so the platform accepts them as
/// reference targets. References to resources outside the package are
/// ignored; references to unknown columns of a known resource are an error.
pub fn map_datapackage(package: &Datapackage) -> Result<Vec<(Resource, NameMapping)>> {
    let mut mapped: Vec<(Resource, NameMapping)> = package
        .resources
        .iter()
        .map(map_resource)
        .collect::<Result<_>>()?;

    for meta in &package.resources {
        for fk in &meta.schema.foreign_keys {
            let Some((target, _)) = mapped
                .iter_mut()
                .find(|(r, _)| r.original_name.eq_ignore_ascii_case(&fk.reference.resource))
            else {
                continue;
            };

            for field in &fk.reference.fields {
                let column = target
                    .columns
                    .iter_mut()
                    .find(|c| c.original_name.as_deref() == Some(field.as_str()))
                    .ok_or_else(|| {
                        PipelineError::invalid_datapackage(format!(
                            "foreign key in '{}' references unknown column '{}' of '{}'",
                            meta.name, field, fk.reference.resource
                        ))
                    })?;
                column.unique = true;
            }
        }
    }

    Ok(mapped)
}
