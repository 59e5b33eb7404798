//! CLI command implementations

pub mod check;
pub mod create;
pub mod metadata;
pub mod upload;

use crate::error::{CliError, Result};
use odp_pipeline::datapackage::Datapackage;
use odp_pipeline::order;
use odp_pipeline::schema::{map_datapackage, NameMapping, Resource};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A loaded datapackage with mapped schemas and upload order
///
/// `mapped[i]` corresponds to `package.resources[i]`; `order` holds indices
/// into both, parents before children.
pub(crate) struct PackageContext {
    pub package: Datapackage,
    pub mapped: Vec<(Resource, NameMapping)>,
    pub order: Vec<usize>,
    /// Directory of the datapackage file; data paths resolve against it
    pub root: PathBuf,
}

impl PackageContext {
    /// Load and map a datapackage; fails fast before any network call
    pub fn load(datapackage_path: &Path) -> Result<Self> {
        let package = Datapackage::load(datapackage_path)?;
        let mapped = map_datapackage(&package)?;
        let order = order::upload_order(&package)?;

        let root = datapackage_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        debug!(
            package = %package.name,
            resources = package.resources.len(),
            "datapackage mapped"
        );

        Ok(Self {
            package,
            mapped,
            order,
            root,
        })
    }

    /// Resource indices in upload order, optionally filtered to one table
    ///
    /// The filter matches the declared name (case-insensitive) or the
    /// normalized name.
    pub fn select(&self, table: Option<&str>) -> Result<Vec<usize>> {
        let Some(table) = table else {
            return Ok(self.order.clone());
        };

        let selected: Vec<usize> = self
            .order
            .iter()
            .copied()
            .filter(|&i| {
                let resource = &self.mapped[i].0;
                resource.original_name.eq_ignore_ascii_case(table) || resource.name == table
            })
            .collect();

        if selected.is_empty() {
            return Err(CliError::TableNotFound(table.to_string()));
        }
        Ok(selected)
    }

    /// Absolute path of a resource's data file
    pub fn data_path(&self, resource: &Resource) -> PathBuf {
        self.root.join(&resource.path)
    }
}
