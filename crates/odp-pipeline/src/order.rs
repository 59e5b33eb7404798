//! Foreign-key upload ordering
//!
//! Tables referenced by other tables must exist and be populated first, so
//! both table creation and data upload walk the resources parents-first.
//! The ordering comes from the datapackage's declared foreign keys;
//! references to resources outside the package are ignored.

use crate::datapackage::Datapackage;
use crate::error::{PipelineError, Result};

/// Resource indices in parents-first order
///
/// Kahn's algorithm over the declared foreign-key graph. Declaration order
/// is preserved among resources with no ordering constraint between them.
/// A cycle is an error naming the tables involved.
pub fn upload_order(package: &Datapackage) -> Result<Vec<usize>> {
    let n = package.resources.len();

    // parents[i] = indices of resources that resource i references
    let mut parents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, resource) in package.resources.iter().enumerate() {
        for fk in &resource.schema.foreign_keys {
            let target = package
                .resources
                .iter()
                .position(|r| r.name.eq_ignore_ascii_case(&fk.reference.resource));
            if let Some(p) = target {
                if p != i && !parents[i].contains(&p) {
                    parents[i].push(p);
                }
            }
        }
    }

    let mut remaining: Vec<usize> = (0..n).map(|i| parents[i].len()).collect();
    let mut emitted = vec![false; n];
    let mut order = Vec::with_capacity(n);

    while order.len() < n {
        // first not-yet-emitted resource with all parents emitted, keeping
        // declaration order stable
        let next = (0..n).find(|&i| !emitted[i] && remaining[i] == 0);

        let Some(next) = next else {
            let cycle: Vec<&str> = (0..n)
                .filter(|&i| !emitted[i])
                .map(|i| package.resources[i].name.as_str())
                .collect();
            return Err(PipelineError::ForeignKeyCycle(cycle.join(", ")));
        };

        emitted[next] = true;
        order.push(next);

        for i in 0..n {
            if !emitted[i] && parents[i].contains(&next) {
                remaining[i] -= 1;
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::datapackage::{
        FieldMeta, FkReference, ForeignKeyMeta, ResourceMeta, TableSchema,
    };

    fn resource(name: &str, references: &[&str]) -> ResourceMeta {
        ResourceMeta {
            name: name.to_string(),
            path: format!("data/{name}.csv"),
            dialect: None,
            schema: TableSchema {
                fields: vec![FieldMeta {
                    name: "id".to_string(),
                    data_type: "integer".to_string(),
                    description: None,
                }],
                primary_key: None,
                foreign_keys: references
                    .iter()
                    .map(|target| ForeignKeyMeta {
                        fields: vec!["id".to_string()],
                        reference: FkReference {
                            resource: target.to_string(),
                            fields: vec!["id".to_string()],
                        },
                    })
                    .collect(),
            },
        }
    }

    fn package(resources: Vec<ResourceMeta>) -> Datapackage {
        Datapackage {
            name: "pkg".to_string(),
            title: None,
            description: None,
            resources,
        }
    }

    #[test]
    fn test_parents_come_first() {
        // child declared before its parent
        let pkg = package(vec![resource("child", &["parent"]), resource("parent", &[])]);
        let order = upload_order(&pkg).unwrap();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_declaration_order_preserved_without_constraints() {
        let pkg = package(vec![
            resource("a", &[]),
            resource("b", &[]),
            resource("c", &[]),
        ]);
        assert_eq!(upload_order(&pkg).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_chain_and_external_references() {
        let pkg = package(vec![
            resource("c", &["b"]),
            resource("b", &["a", "not_in_package"]),
            resource("a", &[]),
        ]);
        assert_eq!(upload_order(&pkg).unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_cycle_is_an_error() {
        let pkg = package(vec![resource("a", &["b"]), resource("b", &["a"])]);
        let err = upload_order(&pkg).unwrap_err();
        match err {
            PipelineError::ForeignKeyCycle(tables) => {
                assert!(tables.contains('a'));
                assert!(tables.contains('b'));
            },
            other => panic!("expected ForeignKeyCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let pkg = package(vec![resource("a", &["a"])]);
        assert_eq!(upload_order(&pkg).unwrap(), vec![0]);
    }
}
